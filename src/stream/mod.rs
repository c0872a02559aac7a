pub mod remote;
pub mod transfer;
pub mod transport;
