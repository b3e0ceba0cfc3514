//! Where incident payloads come from
//!
//! Both the HTTP client and the file-backed store hand back the raw JSON
//! payload; decoding is left to [`crate::incidents::parse`].

pub mod file;
pub mod http;

pub use file::FileStore;
pub use http::{validate_response, HttpSource};

use crate::error::Result;
use async_trait::async_trait;

/// A provider of raw incident payloads
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Retrieve the full payload
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable origin, for logs and error context
    fn describe(&self) -> String;
}
