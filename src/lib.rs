//! # incident-tally
//!
//! Fetch an incident report and count incidents by priority.
//!
//! ## Usage
//!
//! ```bash
//! tally serve --file incidents.json
//! tally report http://127.0.0.1:3000/api/v1/list/incidents --workers 4
//! ```
//!
//! ## Modules
//!
//! - `pipeline` - Cancellable fan-out/fan-in aggregation (source, reducer pool, final reduce)
//! - `incidents` - Incident data model and JSON decoding
//! - `source` - Record sources: HTTP client with retries and the file-backed store
//! - `server` - HTTP endpoint serving the file-backed store
//! - `format` - Fixed-width table rendering
//! - `config` - TOML/env configuration
//! - `app` - Logging, runtime signals and fatal error handling
pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod incidents;
pub mod pipeline;
pub mod server;
pub mod source;

pub use error::{Error, Result};
pub use pipeline::{aggregate, aggregate_until, AggregateResult, CancellationSignal, Pipeline};
