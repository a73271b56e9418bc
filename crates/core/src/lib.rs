#![forbid(unsafe_code)]

pub mod error;
pub mod ingest;
pub mod model;
pub mod progress;
pub mod search;
pub mod time;
pub mod tree;

pub use time::Clock;
pub use error::Error;
