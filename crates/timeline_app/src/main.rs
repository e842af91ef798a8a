mod app;
mod cli;
mod effects;
mod input;
mod render;
mod settings_file;
mod source;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    app::run_app(cli::Cli::parse())
}
