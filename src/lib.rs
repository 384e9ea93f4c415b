pub mod analysis;
pub mod config;
pub mod error;
pub mod espn;
pub mod fetch;
pub mod output;

pub use error::Error;
