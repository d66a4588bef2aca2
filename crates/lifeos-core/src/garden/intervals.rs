//! Stage-indexed review intervals.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Ascending review intervals in days. Stages past the end reuse the last
/// entry, so growth stops at the table's maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct IntervalTable(Vec<u32>);

impl IntervalTable {
    pub const FIBONACCI: [u32; 11] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144];

    /// Build a table; it must be non-empty and strictly ascending from at
    /// least one day.
    pub fn new(days: Vec<u32>) -> Result<Self, ValidationError> {
        if days.is_empty() {
            return Err(ValidationError::EmptyCollection("interval table".into()));
        }
        if days[0] == 0 {
            return Err(ValidationError::InvalidValue {
                field: "intervals".into(),
                message: "intervals must be at least one day".into(),
            });
        }
        if days.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::InvalidValue {
                field: "intervals".into(),
                message: "intervals must be strictly ascending".into(),
            });
        }
        Ok(Self(days))
    }

    pub fn fibonacci() -> Self {
        Self(Self::FIBONACCI.to_vec())
    }

    /// Interval for `stage`, clamped to the last entry.
    pub fn interval_for(&self, stage: u32) -> u32 {
        let last = self.0.len() - 1;
        let index = usize::try_from(stage).map_or(last, |s| s.min(last));
        self.0[index]
    }

    pub fn max_interval(&self) -> u32 {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self::fibonacci()
    }
}

impl TryFrom<Vec<u32>> for IntervalTable {
    type Error = ValidationError;

    fn try_from(days: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<IntervalTable> for Vec<u32> {
    fn from(table: IntervalTable) -> Self {
        table.0
    }
}
