mod api;
mod app;
mod error;
mod groups;
mod ui;
mod utils;

use adw::prelude::*;
use adw::Application;

fn main() {
    let debug = std::env::var("GOPHISH_GROUPS_DEBUG").is_ok_and(|v| v == "1");
    let log_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let app = Application::builder()
        .application_id("org.gophish.GroupsGtk")
        .build();
    app.connect_activate(|app| {
        log::info!("Starting groups client");
        crate::app::build_ui(app);
    });
    app.run();
}
