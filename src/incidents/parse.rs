//! Decoding and encoding of incident payloads

use super::model::Incidents;
use crate::error::{Error, Result};

/// Decode a raw JSON payload
pub fn parse(bytes: &[u8]) -> Result<Incidents> {
    serde_json::from_slice(bytes).map_err(Error::Parse)
}

/// Encode incidents back to JSON, keeping only known fields
pub fn to_json(incidents: &Incidents) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(incidents)?)
}
