// src/feed/mod.rs
pub mod http;
pub mod parse;
pub mod types;

pub use http::HttpFeed;
pub use parse::parse_calls;
pub use types::{CallRecord, FeedSource};
