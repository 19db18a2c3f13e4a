use serde::{Deserialize, Serialize};

/// Where a purge request comes from.
///
/// Maintenance scripts that save thousands of posts would otherwise fire
/// thousands of purges, so only the request-serving context may purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Live request or operator action
    Request,
    /// Command-line / bulk maintenance run
    Batch,
}

impl ExecutionContext {
    pub fn from_batch_flag(batch: bool) -> Self {
        if batch {
            ExecutionContext::Batch
        } else {
            ExecutionContext::Request
        }
    }

    pub fn allows_purge(self) -> bool {
        self == ExecutionContext::Request
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionContext::Request => write!(f, "request"),
            ExecutionContext::Batch => write!(f, "batch"),
        }
    }
}
