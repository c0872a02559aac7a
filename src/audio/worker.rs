use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use flume::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{error::PlaybackError, event::events::TrackId};

use super::backend::{AudioBackend, PlaybackHandle};

pub(crate) struct QueuedTrack {
    pub id: TrackId,
    pub path: PathBuf,
}

/// Reports from the playback worker to the controller.
pub(crate) enum WorkerEvent {
    Started {
        track: TrackId,
        handle: Arc<dyn PlaybackHandle>,
    },
    /// The track ran to its end or was halted.
    Finished { track: TrackId },
    Failed {
        track: TrackId,
        error: PlaybackError,
    },
}

/// Blocking task that plays the tracks it is handed, one at a time.
pub(crate) struct Worker {
    tracks: Option<Sender<QueuedTrack>>,
    events: Receiver<WorkerEvent>,
    cancelled: Arc<Mutex<bool>>,
    join: JoinHandle<()>,
}

impl Worker {
    pub fn spawn(backend: Arc<dyn AudioBackend>) -> Self {
        let (tracks_tx, tracks_rx) = flume::unbounded();
        let (events_tx, events_rx) = flume::unbounded();
        let cancelled = Arc::new(Mutex::new(false));

        let join = {
            let cancelled = cancelled.clone();
            tokio::task::spawn_blocking(move || {
                run(backend, tracks_rx, events_tx, cancelled)
            })
        };

        Self {
            tracks: Some(tracks_tx),
            events: events_rx,
            cancelled,
            join,
        }
    }

    pub fn play(&self, track: QueuedTrack) -> bool {
        self.tracks
            .as_ref()
            .is_some_and(|tx| tx.send(track).is_ok())
    }

    pub fn events(&self) -> Receiver<WorkerEvent> {
        self.events.clone()
    }

    /// Halts whatever is playing and keeps the worker from starting anything
    /// new.
    pub fn cancel(&mut self, backend: &dyn AudioBackend) {
        self.tracks = None;
        match self.cancelled.lock() {
            Ok(mut cancelled) => {
                *cancelled = true;
                backend.stop_all();
            }
            Err(_) => backend.stop_all(),
        }
    }

    /// Waits for the worker to exit and discards its remaining reports.
    pub async fn shutdown(mut self) {
        self.tracks = None;
        if let Err(e) = self.join.await {
            error!("Playback worker failed: {e}");
        }
        let stale = self.events.drain().count();
        debug!("Playback worker exited, {stale} reports discarded");
    }
}

fn run(
    backend: Arc<dyn AudioBackend>,
    tracks: Receiver<QueuedTrack>,
    events: Sender<WorkerEvent>,
    cancelled: Arc<Mutex<bool>>,
) {
    while let Ok(QueuedTrack { id, path }) = tracks.recv() {
        let event = match backend.open(&path) {
            Ok(session) => {
                let handle = {
                    let Ok(guard) = cancelled.lock() else {
                        break;
                    };
                    if *guard {
                        break;
                    }
                    session.play()
                };

                let _ = events.send(WorkerEvent::Started {
                    track: id.clone(),
                    handle: handle.clone(),
                });
                handle.wait_until_finished();

                WorkerEvent::Finished { track: id }
            }
            Err(error) => WorkerEvent::Failed { track: id, error },
        };

        if events.send(event).is_err() {
            break;
        }
    }
}
