use log::info;

mod commands;
mod components;

use components::App;

fn main() {
    // Initialize logging
    env_logger::init();

    info!("Starting SIP account login");

    // Launch the Dioxus desktop application
    dioxus::launch(App);
}
