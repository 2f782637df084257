pub mod config;
pub mod connection;
mod error;
pub mod fields;
pub mod packet;
pub mod tracker;
pub mod types;

pub use config::TrackerConfig;
pub use connection::{Clock, Connection, SystemClock, Transport};
pub use error::*;
pub use strum;
