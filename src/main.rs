use clap::Parser;
use std::process::ExitCode;

mod auth;
mod bot;
mod chat;
mod cli;
mod config;
mod twitch;

#[tokio::main]
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Cli::parse();

    let mut config = config::Config::load(&args.config).await?;
    if let Some(code) = args.code {
        config.twitch.authorization_code = code;
    }
    config.validate()?;

    let default_filter = if args.debug || config.exec.debug {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let api = twitch::ApiClient::new(&config.api.helix_url, config.api.timeout())?;
    let controller = bot::SessionController::new(
        api,
        chat::client::IrcTransport::new(),
        bot::command::CommandRegistry::builtin(),
    );
    let pending = bot::data::PendingSession::new(config.twitch);

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl-C, shutting down"),
            Err(err) => {
                log::error!("Cannot listen for Ctrl-C: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    controller.launch(pending, shutdown).await?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
