use std::path::PathBuf;

use crate::event::events::TrackId;

/// Reasons a single track could not be played.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("'{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("'{}' is not a supported audio container", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("'{}' is empty", .0.display())]
    Empty(PathBuf),

    #[error("failed to decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Socket(#[from] zeromq::ZmqError),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("connection closed by the remote store")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The remote store answered the download request with an empty chunk.
    #[error("'{0}' not found or it's empty")]
    Unavailable(TrackId),

    #[error("malformed reply: {0}")]
    MalformedReply(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected user input. Never changes any state.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("enter a valid command")]
    Empty,

    #[error("command '{0}' not supported")]
    UnknownCommand(String),

    #[error("provide the name of the songs\nusage: {0} 'song1' 'song2' ...")]
    MissingTracks(String),

    #[error("'{0}' takes no arguments")]
    UnexpectedArguments(String),

    #[error("'{0}' is not a valid track name")]
    InvalidTrack(String),

    #[error("no closing quotation")]
    UnterminatedQuote,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}
