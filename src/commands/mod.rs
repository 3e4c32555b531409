// Command pattern for the login coroutine
// This module defines commands sent from the UI to the coroutine owning the flow

pub mod login_commands;

pub use login_commands::LoginCommand;
