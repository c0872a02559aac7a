use anyhow::Context;
use tracing::{debug, error, info};

use crate::{
    event::{
        channel::CommandSender,
        events::{Command, CommandKind, TrackId},
    },
    library::Storage,
    stream::{transfer::RemoteStore, transport::Transport},
};

/// Turns user intent into queued commands, downloading tracks first when a
/// command needs them on disk.
pub struct CommandProducer<T> {
    remote: RemoteStore<T>,
    commands: CommandSender,
}

impl<T: Transport> CommandProducer<T> {
    pub fn new(remote: RemoteStore<T>, commands: CommandSender) -> Self {
        Self { remote, commands }
    }

    pub fn storage(&self) -> &Storage {
        self.remote.storage()
    }

    /// Queues `command`. `add` and `play` with arguments only go through with
    /// the tracks that are, or could be made, available locally. Returns
    /// whether anything was queued.
    pub async fn submit(&mut self, command: Command) -> anyhow::Result<bool> {
        let command = match command.kind() {
            CommandKind::Add | CommandKind::Play if !command.args().is_empty() => {
                let (kind, args) = command.into_parts();
                let accepted = self.remote.ensure_all(&args).await;
                if accepted.is_empty() {
                    debug!("Nothing to {kind}");
                    return Ok(false);
                }
                Command::new(kind, accepted)
            }
            _ => command,
        };

        self.commands
            .enqueue(command)
            .await
            .context("playback controller is not running")?;

        Ok(true)
    }

    /// Deletes the local files, then drops the tracks from the playlist.
    pub async fn delete(&mut self, tracks: Vec<TrackId>) -> anyhow::Result<()> {
        for track in &tracks {
            match self.storage().delete(track) {
                Ok(()) => debug!("'{track}' deleted"),
                Err(e) => error!("Can't delete '{track}': {e}"),
            }
        }

        self.submit(Command::new(CommandKind::Remove, tracks)).await?;

        Ok(())
    }

    pub async fn search(&mut self, terms: &[String]) -> anyhow::Result<Vec<String>> {
        let files = self
            .remote
            .search(terms)
            .await
            .context("search request failed")?;
        if files.is_empty() {
            info!("No files containing {terms:?} were found");
        }

        Ok(files)
    }

    pub fn list_local(&self) -> anyhow::Result<Vec<TrackId>> {
        self.storage()
            .list()
            .with_context(|| format!("can't list {}", self.storage().dir().display()))
    }

    /// Queues every track already in the songs directory.
    pub async fn load_library(&mut self) -> anyhow::Result<usize> {
        let tracks = self.list_local()?;
        let count = tracks.len();
        if count > 0 {
            self.submit(Command::new(CommandKind::Add, tracks)).await?;
        }

        Ok(count)
    }
}
