//! Core abstractions: feeds, local tables and the sync state machine

pub mod bitcoins;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod log;
pub mod rates;
pub mod result;
pub mod state;
pub mod stocks;
pub mod sync;
pub mod table;

// Re-export main types for cleaner imports
pub use error::FetchError;
pub use feed::{Feed, QuoteFetcher, QuotesResponse};
pub use result::{DataSource, UiState};
pub use state::StateHolder;
pub use sync::Synchronizer;
pub use table::{Row, Table};
