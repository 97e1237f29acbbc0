use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipbot")]
#[command(author, version)]
#[command(about = "A Rust-powered Twitch bot that greets chatters and makes clips.")]
pub struct Cli {
    #[arg(short = 'c', long = "config", default_value = "clipbot.toml")]
    pub config: PathBuf,
    /// Authorization code to exchange, overriding the config file.
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub debug: bool,
}
