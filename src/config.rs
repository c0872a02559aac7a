use std::path::PathBuf;

use directories::ProjectDirs;

use crate::{error::ConfigError, event::channel::DEFAULT_CAPACITY};

pub const DEFAULT_SERVER: &str = "localhost:5555";

const SERVER_KEY: &str = "CUETRACK_SERVER";
const SONGS_DIR_KEY: &str = "CUETRACK_SONGS_DIR";
const QUEUE_CAPACITY_KEY: &str = "CUETRACK_QUEUE_CAPACITY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `host:port` of the remote store.
    pub server: String,
    pub songs_dir: PathBuf,
    pub queue_capacity: usize,
}

impl Config {
    /// Reads settings from the process environment. Call `dotenv` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let server = lookup(SERVER_KEY)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_owned());

        let songs_dir = lookup(SONGS_DIR_KEY)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_songs_dir);

        let queue_capacity = match lookup(QUEUE_CAPACITY_KEY) {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: QUEUE_CAPACITY_KEY,
                        value,
                    })
                }
            },
            None => DEFAULT_CAPACITY,
        };

        Ok(Self {
            server,
            songs_dir,
            queue_capacity,
        })
    }
}

fn default_songs_dir() -> PathBuf {
    ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.data_dir().join("songs"))
        .unwrap_or_else(|| PathBuf::from("songs"))
}
