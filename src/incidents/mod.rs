//! Incident records: the data the pipeline counts

pub mod model;
pub mod parse;

pub use model::{Incident, Incidents, PrioritySum};
pub use parse::{parse, to_json};
