pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod library;
pub mod producer;
pub mod stream;
