use crate::{
    error::MonitorError,
    matcher::{BatchMatcher, ExportPredicate, QueuePredicate},
    order::BatchOrder,
    validation::range::DateTimeRange,
    TaskStatus,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Longest accepted offset/limit, in digits
const MAX_PAGINATION_DIGITS: usize = 5;

/// Raw query parameters of `GET /monitor/export/batch`
///
/// Nothing here is trusted; [`QueryValidator::validate`] turns it into a
/// [`BatchQuery`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchQueryParams {
    #[serde(rename = "dicomDeviceName")]
    pub device_name: Option<String>,
    #[serde(rename = "ExporterID")]
    pub exporter_id: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "createdTime")]
    pub created_time: Option<String>,
    #[serde(rename = "updatedTime")]
    pub updated_time: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub orderby: Option<String>,
}

/// Validated, immutable batch query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub matcher: BatchMatcher,
    pub order: BatchOrder,
    pub offset: usize,
    /// `None` means no cap was requested
    pub limit: Option<usize>,
}

/// Turns raw request parameters into a [`BatchQuery`]
///
/// All checks run before any store access, so a bad request never triggers
/// a partial query.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValidator;

impl QueryValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every parameter, returning the first failure
    pub fn validate(&self, params: &BatchQueryParams) -> Result<BatchQuery, MonitorError> {
        debug!("Validating batch query {:?}", params);

        let device_name = present(&params.device_name).map(str::to_string);
        let exporter_id = present(&params.exporter_id).map(str::to_string);
        let status = self.parse_status(present(&params.status))?;
        let created_time = self.parse_range("createdTime", present(&params.created_time))?;
        let updated_time = self.parse_range("updatedTime", present(&params.updated_time))?;
        let order = self.parse_order(present(&params.orderby))?;
        let offset = self.parse_offset(present(&params.offset))?;
        let limit = self.parse_limit(present(&params.limit))?;

        let matcher = BatchMatcher::new(
            QueuePredicate { device_name: device_name.clone(), status },
            ExportPredicate { exporter_id, device_name, created_time, updated_time },
        );

        Ok(BatchQuery { matcher, order, offset, limit })
    }

    fn parse_status(&self, value: Option<&str>) -> Result<Option<TaskStatus>, MonitorError> {
        value
            .map(|value| {
                value.parse::<TaskStatus>().map_err(|e| {
                    warn!("Rejected status filter: {}", e);
                    MonitorError::InvalidFilter(format!("status: {e}"))
                })
            })
            .transpose()
    }

    fn parse_range(&self, name: &str, value: Option<&str>) -> Result<Option<DateTimeRange>, MonitorError> {
        value
            .map(|value| {
                value.parse::<DateTimeRange>().map_err(|e| {
                    warn!("Rejected {} filter: {}", name, e);
                    MonitorError::InvalidFilter(format!("{name}: {e}"))
                })
            })
            .transpose()
    }

    fn parse_order(&self, value: Option<&str>) -> Result<BatchOrder, MonitorError> {
        match value {
            None => Ok(BatchOrder::default()),
            Some(value) => value.parse::<BatchOrder>().map_err(|e| {
                warn!("Rejected orderby: {}", e);
                MonitorError::InvalidOrder(e.to_string())
            }),
        }
    }

    /// `0` or a positive number of at most five digits, without leading zeros
    fn parse_offset(&self, value: Option<&str>) -> Result<usize, MonitorError> {
        match value {
            None | Some("0") => Ok(0),
            Some(value) => parse_positive("offset", value),
        }
    }

    /// A positive number of at most five digits, without leading zeros
    fn parse_limit(&self, value: Option<&str>) -> Result<Option<usize>, MonitorError> {
        value.map(|value| parse_positive("limit", value)).transpose()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_positive(name: &str, value: &str) -> Result<usize, MonitorError> {
    let well_formed = !value.is_empty()
        && value.len() <= MAX_PAGINATION_DIGITS
        && value.bytes().all(|b| b.is_ascii_digit())
        && !value.starts_with('0');
    if !well_formed {
        warn!("Rejected {}: '{}'", name, value);
        return Err(MonitorError::InvalidPagination(format!(
            "{name} must be a positive integer of at most {MAX_PAGINATION_DIGITS} digits, got '{value}'"
        )));
    }
    value
        .parse()
        .map_err(|_| MonitorError::InvalidPagination(format!("{name}: '{value}'")))
}
