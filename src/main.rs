use std::sync::Arc;

use cuetrack::{
    audio::{
        backend::RodioBackend, controller::PlaybackController, playback::player,
    },
    cli::{self, hook},
    config::Config,
    event::channel,
    library::Storage,
    producer::CommandProducer,
    stream::{transfer::RemoteStore, transport::ZmqTransport},
};
use color_eyre::eyre::eyre;
use tracing::info;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv::dotenv().ok();
    hook::install_hooks()?;
    hook::init_tracing()?;

    let config = Config::from_env()?;
    let storage = Storage::open(&config.songs_dir)?;
    info!("Songs directory: {}", storage.dir().display());

    // Must outlive every sink and stay on this thread.
    let (_stream, output) = player::init()?;
    let backend = Arc::new(RodioBackend::new(output));

    let (tx, rx) = channel::channel(config.queue_capacity);
    let controller = PlaybackController::new(rx, backend, storage.clone());
    let player = tokio::spawn(controller.run());

    let remote = RemoteStore::new(ZmqTransport::new(&config.server), storage);
    let mut producer = CommandProducer::new(remote, tx);
    let loaded = producer
        .load_library()
        .await
        .map_err(|e| eyre!("{e:#}"))?;
    info!("{loaded} local songs, remote store at {}", config.server);

    cli::run(producer).await?;
    player.await?;

    Ok(())
}
