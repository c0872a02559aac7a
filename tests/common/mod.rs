#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    fs,
    path::Path,
    sync::{Arc, Condvar, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;
use cuetrack::{
    audio::backend::{AudioBackend, PlaybackHandle, PlaybackSession},
    error::{PlaybackError, TransportError},
    library::Storage,
    stream::transport::{Request, Transport, ACK},
};

/// Playable fixture contents start with this header.
pub const HEADER: &[u8] = b"RIFF";

pub fn wav(storage: &Storage, name: &str) {
    let mut bytes = HEADER.to_vec();
    bytes.extend_from_slice(name.as_bytes());
    fs::write(storage.path(&name.into()), bytes).unwrap();
}

#[derive(Default)]
struct HandleState {
    paused: bool,
    done: bool,
}

#[derive(Default)]
pub struct FakeHandle {
    state: Mutex<HandleState>,
    cv: Condvar,
}

impl FakeHandle {
    pub fn finish(&self) {
        self.state.lock().unwrap().done = true;
        self.cv.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }
}

impl PlaybackHandle for FakeHandle {
    fn pause(&self) {
        self.state.lock().unwrap().paused = true;
    }

    fn resume(&self) {
        self.state.lock().unwrap().paused = false;
    }

    fn wait_until_finished(&self) {
        let mut state = self.state.lock().unwrap();
        while !state.done {
            state = self.cv.wait(state).unwrap();
        }
    }
}

#[derive(Default)]
struct Played {
    handles: Vec<Arc<FakeHandle>>,
    tracks: Vec<(String, Vec<u8>)>,
}

/// Audio backend that "plays" a file until the test finishes it.
#[derive(Default)]
pub struct FakeBackend {
    played: Arc<Mutex<Played>>,
}

impl FakeBackend {
    pub fn played(&self) -> Vec<String> {
        let played = self.played.lock().unwrap();
        played.tracks.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn played_bytes(&self, index: usize) -> Vec<u8> {
        self.played.lock().unwrap().tracks[index].1.clone()
    }

    pub fn current(&self) -> Arc<FakeHandle> {
        self.played.lock().unwrap().handles.last().cloned().unwrap()
    }

    pub fn finish_current(&self) {
        self.current().finish();
    }
}

impl AudioBackend for FakeBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackSession>, PlaybackError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlaybackError::NotFound(path.to_path_buf()),
            _ => e.into(),
        })?;
        if bytes.is_empty() {
            return Err(PlaybackError::Empty(path.to_path_buf()));
        }
        if !bytes.starts_with(HEADER) {
            return Err(PlaybackError::UnsupportedFormat(path.to_path_buf()));
        }

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        Ok(Box::new(FakeSession {
            name,
            bytes,
            played: self.played.clone(),
        }))
    }

    fn stop_all(&self) {
        for handle in &self.played.lock().unwrap().handles {
            handle.finish();
        }
    }
}

struct FakeSession {
    name: String,
    bytes: Vec<u8>,
    played: Arc<Mutex<Played>>,
}

impl PlaybackSession for FakeSession {
    fn play(self: Box<Self>) -> Arc<dyn PlaybackHandle> {
        let FakeSession {
            name,
            bytes,
            played,
        } = *self;
        let handle = Arc::new(FakeHandle::default());
        let mut played = played.lock().unwrap();
        played.handles.push(handle.clone());
        played.tracks.push((name, bytes));
        drop(played);

        handle
    }
}

/// In-memory remote store speaking the lock-step download protocol. Panics on
/// any frame that breaks it.
#[derive(Default)]
pub struct ScriptedStore {
    files: HashMap<String, Vec<Bytes>>,
    pending: Option<VecDeque<Bytes>>,
    /// Fail the exchange after this many frames have been answered.
    fail_after: Option<usize>,
    pub frames: Vec<String>,
}

impl ScriptedStore {
    pub fn with_file(mut self, name: &str, chunks: &[&[u8]]) -> Self {
        self.files.insert(
            name.to_owned(),
            chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect(),
        );
        self
    }

    pub fn failing_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn heal(&mut self) {
        self.fail_after = None;
        self.pending = None;
    }
}

#[async_trait]
impl Transport for ScriptedStore {
    async fn exchange(&mut self, frame: Bytes) -> Result<Bytes, TransportError> {
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(TransportError::Closed);
        }

        if frame == ACK {
            self.frames.push("ok".to_owned());
            let pending = self.pending.as_mut().expect("ack outside a download");
            return Ok(match pending.pop_front() {
                Some(chunk) => chunk,
                None => {
                    self.pending = None;
                    Bytes::new()
                }
            });
        }

        assert!(self.pending.is_none(), "new request during a download");
        let request: Request = serde_json::from_slice(&frame)?;
        match request.command.as_str() {
            "down" => {
                let name = request.args.as_str().unwrap().to_owned();
                self.frames.push(format!("down {name}"));
                let mut chunks: VecDeque<Bytes> =
                    self.files.get(&name).cloned().unwrap_or_default().into();
                Ok(match chunks.pop_front() {
                    Some(first) => {
                        self.pending = Some(chunks);
                        first
                    }
                    None => Bytes::new(),
                })
            }
            "search" => {
                self.frames.push("search".to_owned());
                let terms: Vec<String> =
                    serde_json::from_value(request.args).unwrap();
                let mut files: Vec<&String> = self
                    .files
                    .keys()
                    .filter(|name| terms.iter().all(|t| name.contains(t.as_str())))
                    .collect();
                files.sort();
                let reply = serde_json::json!({ "files": files });
                Ok(Bytes::from(serde_json::to_vec(&reply)?))
            }
            other => panic!("unexpected command {other}"),
        }
    }
}
