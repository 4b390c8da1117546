//! Query filters for registry records.

use crate::chain::{Domain, Record};
use crate::core::Timestamp;
use serde::{Deserialize, Serialize};

/// Filter for querying records.
///
/// The time range is `[from, until)`. Pagination applies `offset` before `limit`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Filter by subject (uses the subject index)
    pub subject: Option<String>,
    /// Filter by operator
    pub operator: Option<String>,
    /// Filter by classification label
    pub classification: Option<String>,
    /// Inclusive lower bound on the record timestamp
    pub from: Option<Timestamp>,
    /// Exclusive upper bound on the record timestamp
    pub until: Option<Timestamp>,
    /// Records to skip
    pub offset: Option<usize>,
    /// Maximum results
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Create a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by subject.
    pub fn by_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Filter by operator.
    pub fn by_operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    /// Filter by classification label.
    pub fn by_classification(mut self, classification: &str) -> Self {
        self.classification = Some(classification.to_string());
        self
    }

    /// Filter by time range `[from, until)`.
    pub fn by_time_range(mut self, from: Timestamp, until: Timestamp) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    /// Set pagination offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a record matches every set criterion. Pagination is not applied here.
    pub fn matches<D: Domain>(&self, record: &Record<D::Payload>) -> bool {
        let payload = record.payload();

        if let Some(subject) = &self.subject {
            if D::subject(payload) != subject {
                return false;
            }
        }

        if let Some(operator) = &self.operator {
            if D::operator(payload) != operator {
                return false;
            }
        }

        if let Some(classification) = &self.classification {
            if D::classification(payload) != classification {
                return false;
            }
        }

        let at = record.created_at();
        if let Some(from) = self.from {
            if at < from {
                return false;
            }
        }

        if let Some(until) = self.until {
            if at >= until {
                return false;
            }
        }

        true
    }
}
