use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metrics accumulated over one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Every query sent to the engine, including import and cleanup
    pub queries_issued: usize,

    /// Classes listed by the inventory query
    pub classes_inventoried: usize,

    /// Classes turned into entities
    pub classes_built: usize,

    /// Classes dropped by the external-class filter
    pub classes_filtered: usize,

    /// Single-query instruction fetches for whole classes
    pub deferred_class_queries: usize,

    /// Instruction fetches for individual methods
    pub deferred_method_queries: usize,

    /// Whether the single aggregate query path was used
    pub small_project: bool,

    #[serde(with = "duration_millis")]
    pub inventory_time: Duration,

    #[serde(with = "duration_millis")]
    pub retrieval_time: Duration,

    #[serde(with = "duration_millis")]
    pub instruction_time: Duration,

    #[serde(with = "duration_millis")]
    pub total_time: Duration,
}

// Helper module for serializing Duration
pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: u64 = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl RunMetrics {
    /// Instruction queries issued after the main retrieval pass
    pub fn deferred_queries(&self) -> usize {
        self.deferred_class_queries + self.deferred_method_queries
    }
}
