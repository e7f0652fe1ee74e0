pub mod list_controller;
