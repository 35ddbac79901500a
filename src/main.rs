mod audio;
mod config;
mod error;
mod library;
mod logging;
mod lyrics;
mod mpris;
mod player;
mod playlist;
mod resource;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
