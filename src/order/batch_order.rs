use crate::ExportBatch;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort key applied to the aggregated batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BatchOrder {
    CreatedTimeAsc,
    CreatedTimeDesc,
    UpdatedTimeAsc,
    #[default]
    UpdatedTimeDesc,
}

impl BatchOrder {
    pub const ALL: [BatchOrder; 4] = [
        BatchOrder::CreatedTimeAsc,
        BatchOrder::CreatedTimeDesc,
        BatchOrder::UpdatedTimeAsc,
        BatchOrder::UpdatedTimeDesc,
    ];

    /// Wire name as accepted by the `orderby` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchOrder::CreatedTimeAsc => "createdTime",
            BatchOrder::CreatedTimeDesc => "-createdTime",
            BatchOrder::UpdatedTimeAsc => "updatedTime",
            BatchOrder::UpdatedTimeDesc => "-updatedTime",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, BatchOrder::CreatedTimeDesc | BatchOrder::UpdatedTimeDesc)
    }

    /// Representative timestamp of a batch for this order: the max over its members
    pub fn key(&self, batch: &ExportBatch) -> Option<DateTime<Utc>> {
        match self {
            BatchOrder::CreatedTimeAsc | BatchOrder::CreatedTimeDesc => batch.max_created_time(),
            BatchOrder::UpdatedTimeAsc | BatchOrder::UpdatedTimeDesc => batch.max_updated_time(),
        }
    }

    /// Compare two batches under this order
    ///
    /// Equal keys fall back to the batch id (named batches first) and then to
    /// the smallest member key, so the result never depends on input order.
    pub fn compare(&self, a: &ExportBatch, b: &ExportBatch) -> Ordering {
        let by_key = self.key(a).cmp(&self.key(b));
        let by_key = if self.is_descending() { by_key.reverse() } else { by_key };
        by_key
            .then_with(|| match (&a.batch_id, &b.batch_id) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.first_pk.cmp(&b.first_pk))
    }

    pub fn sort(&self, batches: &mut [ExportBatch]) {
        batches.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for BatchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an `orderby` value outside the closed set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrder(pub String);

impl fmt::Display for UnknownOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not one of createdTime, -createdTime, updatedTime, -updatedTime",
            self.0
        )
    }
}

impl std::error::Error for UnknownOrder {}

impl FromStr for BatchOrder {
    type Err = UnknownOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| UnknownOrder(s.to_string()))
    }
}
