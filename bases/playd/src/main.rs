mod clients;
mod config;
mod error;
mod server;

use clap::Parser;
use clock::SystemTimeSource;
use color_eyre::Result;
use playback_engine::SymphoniaAudioSystem;
use player::Player;
use server::Server;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playd=info,player=info,playback_engine=info".into()),
        )
        .init();

    let args = config::CliArgs::parse();
    let config = config::Config::from_args(args)?;

    let audio = SymphoniaAudioSystem::new(SystemTimeSource, config.position_period);
    let player = Player::new(Box::new(audio));

    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let server = Server::new(player, &config)?;

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            shutdown.cancel();
        }
    });

    server.run(listener).await?;

    Ok(())
}
