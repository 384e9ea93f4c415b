pub mod cache;
pub mod client;
pub mod conferences;
pub mod html;
pub mod rankings;
pub mod results;
pub mod source;
pub mod types;

pub use cache::CacheConfig;
pub use client::create_client;
pub use source::EspnSource;
pub use types::{ConferenceRow, GameResultRow, Rank, RankingRow, RawTables};
