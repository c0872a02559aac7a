use std::sync::Arc;

use flume::Receiver;
use tracing::{debug, error, info, warn};

use crate::{
    event::{
        channel::CommandReceiver,
        events::{Command, CommandKind, TrackId},
    },
    library::Storage,
};

use super::{
    backend::{AudioBackend, PlaybackHandle},
    playlist::PlaylistState,
    worker::{QueuedTrack, Worker, WorkerEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Playing,
    Paused,
}

enum Step {
    Command(Option<Command>),
    Worker(Option<WorkerEvent>),
}

/// Consumes queued commands in order and drives the playback worker.
///
/// All playlist state lives here. The worker only ever plays the track it is
/// handed and reports back, so every mutation happens on this loop.
pub struct PlaybackController {
    commands: CommandReceiver,
    backend: Arc<dyn AudioBackend>,
    storage: Storage,
    playlist: PlaylistState,
    worker: Option<Worker>,
    current: Option<(TrackId, Arc<dyn PlaybackHandle>)>,
    paused: bool,
    announced: bool,
}

impl PlaybackController {
    pub fn new(
        commands: CommandReceiver,
        backend: Arc<dyn AudioBackend>,
        storage: Storage,
    ) -> Self {
        Self {
            commands,
            backend,
            storage,
            playlist: PlaylistState::default(),
            worker: None,
            current: None,
            paused: false,
            announced: false,
        }
    }

    pub fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    pub fn status(&self) -> PlayerStatus {
        match (&self.worker, self.paused) {
            (None, _) => PlayerStatus::Idle,
            (Some(_), true) => PlayerStatus::Paused,
            (Some(_), false) => PlayerStatus::Playing,
        }
    }

    /// The track the player has actually started, if any.
    pub fn current_track(&self) -> Option<&TrackId> {
        self.current.as_ref().map(|(track, _)| track)
    }

    /// Runs until every command producer is gone, then stops playback.
    pub async fn run(mut self) {
        while self.step().await {}

        debug!("Command queue closed, shutting down");
        self.stop(true).await;
    }

    /// Handles one worker report or one command, whichever comes first.
    /// Returns `false` once the command queue is closed.
    pub async fn step(&mut self) -> bool {
        let events = self.worker.as_ref().map(Worker::events);

        let step = tokio::select! {
            biased;
            event = next_event(events) => Step::Worker(event),
            command = self.commands.dequeue() => Step::Command(command),
        };

        match step {
            Step::Command(Some(command)) => self.handle_command(command).await,
            Step::Command(None) => return false,
            Step::Worker(Some(event)) => self.handle_worker_event(event).await,
            Step::Worker(None) => {
                error!("Playback worker stopped unexpectedly");
                self.stop(false).await;
            }
        }

        true
    }

    pub async fn handle_command(&mut self, command: Command) {
        let (kind, args) = command.into_parts();
        debug!("Handling '{kind}' {args:?}");

        match kind {
            CommandKind::Add => self.add(args),
            CommandKind::Play => self.play(args),
            CommandKind::Stop => self.stop(true).await,
            CommandKind::Pause => self.pause(),
            CommandKind::Resume => self.resume(),
            CommandKind::Next => self.switch(1).await,
            CommandKind::Prev => self.switch(-1).await,
            CommandKind::Remove => self.remove(args),
            CommandKind::Info => self.info(),
        }
    }

    fn add(&mut self, tracks: Vec<TrackId>) {
        for track in &tracks {
            debug!("'{track}' added to playlist");
        }
        self.playlist.add(tracks);
        self.log_playlist();
    }

    fn play(&mut self, tracks: Vec<TrackId>) {
        if self.worker.is_some() {
            if self.paused {
                self.resume();
            } else {
                debug!("Already playing");
            }
            return;
        }

        if !tracks.is_empty() {
            let present = self.present(tracks);
            if present.is_empty() {
                info!(
                    "Type the name of the songs from '{}', or download them \
                     from the server using 'add'",
                    self.storage.dir().display()
                );
                return;
            }
            self.playlist.set_overlay(present);
        }

        if self.playlist.active().is_empty() {
            info!(
                "Add songs to the playlist using 'add', or use \
                 'play song1 song2 ...' to play certain songs"
            );
            return;
        }

        self.playlist.rewind_if_out_of_range();
        if !self.announced {
            self.log_playlist();
            self.announced = true;
        }

        self.worker = Some(Worker::spawn(self.backend.clone()));
        self.dispatch();
    }

    fn present(&self, tracks: Vec<TrackId>) -> Vec<TrackId> {
        tracks
            .into_iter()
            .filter(|track| {
                let found = self.storage.contains(track);
                if !found {
                    warn!("'{track}' not found");
                }
                found
            })
            .collect()
    }

    /// Hands the track under the cursor to the worker.
    fn dispatch(&mut self) {
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        let Some(track) = self.playlist.current().cloned() else {
            return;
        };

        self.playlist.begin_track();
        let queued = QueuedTrack {
            path: self.storage.path(&track),
            id: track,
        };
        if !worker.play(queued) {
            error!("Playback worker is not accepting tracks");
        }
    }

    /// Halts playback and waits for the worker to exit. A user stop also
    /// rewinds the playlist and drops the overlay.
    async fn stop(&mut self, reset: bool) {
        let Some(mut worker) = self.worker.take() else {
            debug!("No song is currently playing");
            return;
        };

        self.resume();
        worker.cancel(self.backend.as_ref());
        self.paused = false;
        worker.shutdown().await;
        self.current = None;

        if reset {
            self.playlist.reset();
            self.announced = false;
        }
    }

    /// Pausing before the worker reports the track as started is remembered
    /// and applied once it does.
    fn pause(&mut self) {
        if self.worker.is_none() {
            debug!("No song is currently playing");
            return;
        }
        if self.paused {
            debug!("Already paused");
            return;
        }

        if let Some((_, handle)) = self.current.as_ref() {
            handle.pause();
        }
        self.paused = true;
    }

    fn resume(&mut self) {
        if !self.paused {
            return;
        }

        self.paused = false;
        if let Some((_, handle)) = self.current.as_ref() {
            handle.resume();
        }
    }

    async fn switch(&mut self, delta: isize) {
        if self.worker.is_none() {
            info!("Play a playlist first");
            return;
        }
        if self.playlist.offset(delta).is_none() {
            debug!(
                "Index {} is not valid",
                self.playlist.index() as isize + delta
            );
            return;
        }

        self.stop(false).await;
        self.playlist.step(delta);
        self.play(Vec::new());
    }

    fn remove(&mut self, tracks: Vec<TrackId>) {
        if tracks.is_empty() {
            warn!("Provide the name of the songs to remove");
            return;
        }

        for track in &tracks {
            match self.playlist.remove(track) {
                Some(_) => debug!("'{track}' removed from the playlist"),
                None => warn!("'{track}' not in playlist"),
            }
        }
        self.log_playlist();
    }

    fn info(&self) {
        self.log_playlist();
        info!(
            "Status: {:?}, current song: {}",
            self.status(),
            self.current_track().map_or("-", TrackId::as_str)
        );
    }

    async fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Started { track, handle } => {
                if self.paused {
                    handle.pause();
                }
                self.current = Some((track, handle));
                self.log_now_playing();
            }
            WorkerEvent::Finished { track } => {
                debug!("'{track}' finished");
                self.current = None;
                self.paused = false;
                if self.playlist.track_finished() {
                    self.dispatch();
                } else {
                    self.finish().await;
                }
            }
            WorkerEvent::Failed { track, error } => {
                error!("Can't play '{track}': {error}");
                self.current = None;
                self.paused = false;
                if self.playlist.track_failed(&track) {
                    self.dispatch();
                } else {
                    self.finish().await;
                }
            }
        }
    }

    /// The active sequence ran out.
    async fn finish(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown().await;
        }
        self.announced = false;
        info!("Reached the end of the playlist");
    }

    fn log_playlist(&self) {
        info!("Playlist: {:?}", names(self.playlist.active()));
    }

    fn log_now_playing(&self) {
        let name = |track: Option<&TrackId>| {
            track.map_or_else(|| "-".to_owned(), TrackId::to_string)
        };

        info!(
            "\n{:<20}{:^20}{:>20}\n{:<20}{:^20}{:>20}\n{:<20}{:^20}{:>20}",
            "Previous",
            "Current",
            "Next",
            "--------",
            "--------",
            "--------",
            name(self.playlist.neighbour(-1)),
            name(self.current_track()),
            name(self.playlist.neighbour(1)),
        );
    }
}

async fn next_event(events: Option<Receiver<WorkerEvent>>) -> Option<WorkerEvent> {
    match events {
        Some(events) => events.recv_async().await.ok(),
        None => std::future::pending().await,
    }
}

fn names(tracks: &[TrackId]) -> Vec<&str> {
    tracks.iter().map(TrackId::as_str).collect()
}
