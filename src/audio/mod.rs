pub mod backend;
pub mod controller;
pub mod playback;
pub mod playlist;
mod worker;
