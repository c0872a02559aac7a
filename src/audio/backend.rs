use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use rodio::{decoder::DecoderError, Decoder, OutputStreamHandle, Sink, Source};
use tracing::debug;

use crate::error::PlaybackError;

/// Turns a file into something playable.
pub trait AudioBackend: Send + Sync + 'static {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackSession>, PlaybackError>;

    /// Halts every handle this backend ever produced.
    fn stop_all(&self);
}

/// A decoded track that has not started yet.
pub trait PlaybackSession: Send {
    fn play(self: Box<Self>) -> Arc<dyn PlaybackHandle>;
}

/// Control over a playing track. Safe to call from any thread while another
/// one is blocked in `wait_until_finished`.
pub trait PlaybackHandle: Send + Sync {
    fn pause(&self);
    fn resume(&self);
    fn wait_until_finished(&self);
}

type LiveSinks = Arc<Mutex<Vec<Weak<Sink>>>>;

pub struct RodioBackend {
    stream: OutputStreamHandle,
    live: LiveSinks,
}

impl RodioBackend {
    pub fn new(stream: OutputStreamHandle) -> Self {
        Self {
            stream,
            live: LiveSinks::default(),
        }
    }
}

impl AudioBackend for RodioBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackSession>, PlaybackError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PlaybackError::NotFound(path.to_path_buf()),
            _ => e.into(),
        })?;
        if file.metadata()?.len() == 0 {
            return Err(PlaybackError::Empty(path.to_path_buf()));
        }

        let source = Decoder::new(BufReader::new(file)).map_err(|e| match e {
            DecoderError::UnrecognizedFormat => {
                PlaybackError::UnsupportedFormat(path.to_path_buf())
            }
            e => PlaybackError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        if source.total_duration() == Some(Duration::ZERO) {
            return Err(PlaybackError::Empty(path.to_path_buf()));
        }

        let sink = Sink::try_new(&self.stream)
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        sink.pause();
        sink.append(source);

        Ok(Box::new(RodioSession {
            sink: Arc::new(sink),
            live: self.live.clone(),
        }))
    }

    fn stop_all(&self) {
        if let Ok(mut live) = self.live.lock() {
            live.retain(|sink| match sink.upgrade() {
                Some(sink) => {
                    sink.stop();
                    true
                }
                None => false,
            });
            debug!("Stopped {} sinks", live.len());
        }
    }
}

struct RodioSession {
    sink: Arc<Sink>,
    live: LiveSinks,
}

impl PlaybackSession for RodioSession {
    fn play(self: Box<Self>) -> Arc<dyn PlaybackHandle> {
        if let Ok(mut live) = self.live.lock() {
            live.retain(|sink| sink.strong_count() > 0);
            live.push(Arc::downgrade(&self.sink));
        }
        self.sink.play();

        Arc::new(RodioHandle { sink: self.sink })
    }
}

struct RodioHandle {
    sink: Arc<Sink>,
}

impl PlaybackHandle for RodioHandle {
    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn wait_until_finished(&self) {
        self.sink.sleep_until_end();
    }
}
