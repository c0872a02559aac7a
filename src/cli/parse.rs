use crate::{
    error::ParseError,
    event::events::{Command, CommandKind, TrackId},
};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Delete local files, then remove them from the playlist.
    Delete(Vec<TrackId>),
    Search(Vec<String>),
    List,
    Exit,
}

enum Arity {
    None,
    Any,
    AtLeastOne,
}

pub fn parse(line: &str) -> Result<Input, ParseError> {
    let mut words = tokenize(line)?.into_iter();
    let name = words.next().ok_or(ParseError::Empty)?.to_lowercase();
    let args: Vec<String> = words.collect();

    let (input, arity) = match name.as_str() {
        "play" => (Kind::Playback(CommandKind::Play), Arity::Any),
        "stop" => (Kind::Playback(CommandKind::Stop), Arity::None),
        "pause" => (Kind::Playback(CommandKind::Pause), Arity::None),
        "resume" => (Kind::Playback(CommandKind::Resume), Arity::None),
        "next" | "skip" => (Kind::Playback(CommandKind::Next), Arity::None),
        "prev" => (Kind::Playback(CommandKind::Prev), Arity::None),
        "rm" => (Kind::Playback(CommandKind::Remove), Arity::AtLeastOne),
        "info" => (Kind::Playback(CommandKind::Info), Arity::None),
        "add" => (Kind::Playback(CommandKind::Add), Arity::AtLeastOne),
        "del" => (Kind::Delete, Arity::AtLeastOne),
        "search" => (Kind::Search, Arity::Any),
        "ls" => (Kind::List, Arity::None),
        "exit" | "quit" => (Kind::Exit, Arity::None),
        _ => return Err(ParseError::UnknownCommand(name.clone())),
    };

    match arity {
        Arity::None if !args.is_empty() => {
            return Err(ParseError::UnexpectedArguments(name))
        }
        Arity::AtLeastOne if args.is_empty() => {
            return Err(ParseError::MissingTracks(name))
        }
        _ => {}
    }

    Ok(match input {
        Kind::Playback(kind) => Input::Command(Command::new(kind, tracks(args)?)),
        Kind::Delete => Input::Delete(tracks(args)?),
        Kind::Search => Input::Search(args),
        Kind::List => Input::List,
        Kind::Exit => Input::Exit,
    })
}

enum Kind {
    Playback(CommandKind),
    Delete,
    Search,
    List,
    Exit,
}

fn tracks(args: Vec<String>) -> Result<Vec<TrackId>, ParseError> {
    args.into_iter()
        .map(|arg| {
            let track = TrackId::from(arg);
            if track.is_plain_name() {
                Ok(track)
            } else {
                Err(ParseError::InvalidTrack(track.to_string()))
            }
        })
        .collect()
}

/// Splits a line into words the way a POSIX shell would for plain words,
/// `'single'` and `"double"` quotes and backslash escapes.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => word.push(c),
                            Some(c) => {
                                word.push('\\');
                                word.push(c);
                            }
                            None => return Err(ParseError::UnterminatedQuote),
                        },
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    word.push(c);
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }
    if in_word {
        words.push(word);
    }

    Ok(words)
}
