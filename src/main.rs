mod aggregate;
mod cli;
mod error;
mod filter;
mod fmt;
mod loader;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod settings;
mod state;
mod tui;

use clap::Parser;

use cli::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
