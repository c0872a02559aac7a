use std::fmt;

/// Name of a track, both in the local songs directory and on the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A plain file name: no separators, not `.` or `..`.
    pub fn is_plain_name(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\'])
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TrackId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Play,
    Stop,
    Pause,
    Resume,
    Next,
    Prev,
    Remove,
    Info,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Add => "add",
            CommandKind::Play => "play",
            CommandKind::Stop => "stop",
            CommandKind::Pause => "pause",
            CommandKind::Resume => "resume",
            CommandKind::Next => "next",
            CommandKind::Prev => "prev",
            CommandKind::Remove => "rm",
            CommandKind::Info => "info",
        };
        f.write_str(name)
    }
}

/// A playback instruction. Immutable once built and consumed exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    args: Vec<TrackId>,
}

impl Command {
    pub fn new(kind: CommandKind, args: Vec<TrackId>) -> Self {
        Self { kind, args }
    }

    pub fn bare(kind: CommandKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn args(&self) -> &[TrackId] {
        &self.args
    }

    pub fn into_parts(self) -> (CommandKind, Vec<TrackId>) {
        (self.kind, self.args)
    }
}
