mod app;
mod assessment;
mod capture;
mod catalog;
mod commands;
mod config;
mod feedback;
mod logging;
mod practice;
mod setup;
mod transcription;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
