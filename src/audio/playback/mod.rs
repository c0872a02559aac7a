pub mod player;
mod utils;
