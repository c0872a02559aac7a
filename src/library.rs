use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::event::events::TrackId;

const PARTIAL_SUFFIX: &str = ".part";

/// The flat directory holding every downloaded track, keyed by file name.
#[derive(Clone, Debug)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Opens the songs directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, track: &TrackId) -> PathBuf {
        self.dir.join(track.as_str())
    }

    /// Where an in-flight download is written before it is complete.
    pub fn partial_path(&self, track: &TrackId) -> PathBuf {
        self.dir.join(format!("{}{PARTIAL_SUFFIX}", track.as_str()))
    }

    pub fn contains(&self, track: &TrackId) -> bool {
        self.path(track).is_file()
    }

    /// Every complete track in the directory, sorted by name.
    pub fn list(&self) -> io::Result<Vec<TrackId>> {
        let mut tracks = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(PARTIAL_SUFFIX) {
                continue;
            }
            tracks.push(TrackId::from(name));
        }
        tracks.sort();

        Ok(tracks)
    }

    pub fn delete(&self, track: &TrackId) -> io::Result<()> {
        fs::remove_file(self.path(track))
    }
}
