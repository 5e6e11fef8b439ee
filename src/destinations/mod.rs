//! Destination implementations

pub mod file;
pub mod socket;

pub use file::FileDestination;
pub use socket::SocketDestination;

pub use crate::core::Destination;
