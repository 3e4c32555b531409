pub mod app;
pub mod login_screen;

pub use app::{App, LoginStatus};
pub use login_screen::LoginScreen;
