use std::path::Path;

use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::{error::TransferError, event::events::TrackId, library::Storage};

use super::transport::{Request, Transport};

/// Outcome of [`RemoteStore::ensure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fetched {
    /// Already in the songs directory, nothing was transferred.
    Present,
    Downloaded { bytes: u64, chunks: usize },
}

/// State of one in-flight download. Lives only while chunks are arriving.
#[derive(Debug)]
pub struct TransferSession {
    track: TrackId,
    bytes_written: u64,
    chunk_index: usize,
}

impl TransferSession {
    fn new(track: TrackId) -> Self {
        Self {
            track,
            bytes_written: 0,
            chunk_index: 0,
        }
    }

    /// Writes `first` and every following chunk to `path`, acknowledging each
    /// one before asking for the next. An empty chunk ends the stream.
    ///
    /// A local write failure doesn't cut the exchange short: the remaining
    /// chunks are still acknowledged and discarded so the store is ready for
    /// the next request, then the failure is returned.
    async fn run<T: Transport + ?Sized>(
        mut self,
        transport: &mut T,
        path: &Path,
        first: Bytes,
    ) -> Result<Self, TransferError> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await;

        let mut chunk = first;
        while !chunk.is_empty() {
            if let Ok(out) = file.as_mut() {
                let written = out.write_all(&chunk).await;
                match written {
                    Ok(()) => self.bytes_written += chunk.len() as u64,
                    Err(e) => file = Err(e),
                }
            }
            self.chunk_index += 1;

            chunk = transport.acknowledge().await?;
        }
        file?.flush().await?;

        debug!(
            "'{}': {} bytes in {} chunks",
            self.track, self.bytes_written, self.chunk_index
        );

        Ok(self)
    }
}

/// Client side of the remote store: downloads tracks into local storage and
/// answers search queries. One request is in flight at a time.
pub struct RemoteStore<T> {
    transport: T,
    storage: Storage,
}

impl<T: Transport> RemoteStore<T> {
    pub fn new(transport: T, storage: Storage) -> Self {
        Self { transport, storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Makes sure `track` exists locally, downloading it if needed.
    pub async fn ensure(
        &mut self,
        track: &TrackId,
    ) -> Result<Fetched, TransferError> {
        if self.storage.contains(track) {
            debug!("'{track}' already downloaded");
            return Ok(Fetched::Present);
        }

        let first = self.transport.request(&Request::download(track)).await?;
        if first.is_empty() {
            return Err(TransferError::Unavailable(track.clone()));
        }

        debug!("Downloading '{track}'...");
        let partial = self.storage.partial_path(track);
        match self.download(track, &partial, first).await {
            Ok(session) => {
                debug!("'{track}' downloaded");
                Ok(Fetched::Downloaded {
                    bytes: session.bytes_written,
                    chunks: session.chunk_index,
                })
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&partial).await {
                    debug!("No partial file to clean up for '{track}': {rm}");
                }
                Err(e)
            }
        }
    }

    async fn download(
        &mut self,
        track: &TrackId,
        partial: &Path,
        first: Bytes,
    ) -> Result<TransferSession, TransferError> {
        let session = TransferSession::new(track.clone())
            .run(&mut self.transport, partial, first)
            .await?;
        fs::rename(partial, self.storage.path(track)).await?;

        Ok(session)
    }

    /// Downloads each track independently and returns the ones now available
    /// locally, in request order. Failures are logged and skipped.
    pub async fn ensure_all(&mut self, tracks: &[TrackId]) -> Vec<TrackId> {
        let mut accepted = Vec::with_capacity(tracks.len());
        for track in tracks {
            match self.ensure(track).await {
                Ok(_) => accepted.push(track.clone()),
                Err(e) => warn!("{e}"),
            }
        }

        accepted
    }
}
