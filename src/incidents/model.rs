//! Incident report data model

use crate::format::TableRow;
use crate::pipeline::{AggregateResult, GroupKey};
use serde::{Deserialize, Deserializer, Serialize};

/// A single incident. Fields missing from the payload, or `null`, default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Incident {
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub assigned_to: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
}

impl GroupKey for Incident {
    fn group_key(&self) -> &str {
        &self.priority
    }
}

impl TableRow for Incident {
    fn headers() -> Vec<&'static str> {
        vec![
            "Number",
            "AssignedTo",
            "Description",
            "State",
            "Priority",
            "Severity",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.assigned_to.clone(),
            self.description.clone(),
            self.state.clone(),
            self.priority.clone(),
            self.severity.clone(),
        ]
    }
}

/// Envelope returned by the incident endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incidents {
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(rename = "Report", default, deserialize_with = "null_as_default")]
    pub report: Vec<Incident>,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Aggregated incident count for one priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritySum {
    pub priority: String,
    pub sum: u64,
}

impl PrioritySum {
    /// One row per bucket, in the aggregate's key order
    pub fn from_result(result: &AggregateResult) -> Vec<PrioritySum> {
        result
            .iter()
            .map(|pair| PrioritySum {
                priority: pair.key.clone(),
                sum: pair.sum,
            })
            .collect()
    }
}

impl TableRow for PrioritySum {
    fn headers() -> Vec<&'static str> {
        vec!["Priority", "Sum"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.priority.clone(), self.sum.to_string()]
    }
}
