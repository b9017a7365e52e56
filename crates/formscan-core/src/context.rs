//! Per-run context passed to every capability call.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context information for a single pipeline run.
///
/// One context is created per processed document and handed to each
/// outbound capability call so that log lines can be correlated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// Context creation timestamp.
    pub created_at: Timestamp,
}

impl Context {
    /// Create a new context with a fresh run ID.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            created_at: Timestamp::now(),
        }
    }

    /// Get the run ID.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Calculate elapsed time since context creation.
    pub fn elapsed(&self) -> SignedDuration {
        Timestamp::now().duration_since(self.created_at)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
