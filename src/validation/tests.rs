//! Tests for query validation
//! 
//! Each rejected parameter must map to the right error class before any
//! store access happens.

#[cfg(test)]
mod tests {
    use crate::{
        error::MonitorError,
        order::BatchOrder,
        validation::{BatchQueryParams, QueryValidator},
        TaskStatus,
    };

    fn validate(params: BatchQueryParams) -> Result<crate::validation::BatchQuery, MonitorError> {
        QueryValidator::new().validate(&params)
    }

    #[test]
    fn test_no_parameters_yields_defaults() {
        let query = validate(BatchQueryParams::default()).unwrap();
        assert_eq!(query.order, BatchOrder::UpdatedTimeDesc);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, None);
        assert!(query.matcher.queue.device_name.is_none());
        assert!(query.matcher.queue.status.is_none());
        assert!(query.matcher.export.created_time.is_none());
    }

    #[test]
    fn test_filters_are_carried_into_both_predicates() {
        let query = validate(BatchQueryParams {
            device_name: Some("dcm4chee-arc".to_string()),
            exporter_id: Some("STORESCU".to_string()),
            status: Some("IN PROCESS".to_string()),
            created_time: Some("20180101-".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query.matcher.queue.device_name.as_deref(), Some("dcm4chee-arc"));
        assert_eq!(query.matcher.export.device_name.as_deref(), Some("dcm4chee-arc"));
        assert_eq!(query.matcher.queue.status, Some(TaskStatus::InProcess));
        assert_eq!(query.matcher.export.exporter_id.as_deref(), Some("STORESCU"));
        assert!(query.matcher.export.created_time.is_some());
        assert!(query.matcher.export.updated_time.is_none());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let query = validate(BatchQueryParams {
            status: Some(String::new()),
            limit: Some(String::new()),
            orderby: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(query.matcher.queue.status.is_none());
        assert_eq!(query.limit, None);
        assert_eq!(query.order, BatchOrder::default());
    }

    #[test]
    fn test_unknown_status_is_invalid_filter() {
        for status in ["completed", "IN_PROCESS", "DONE"] {
            let err = validate(BatchQueryParams { status: Some(status.to_string()), ..Default::default() })
                .unwrap_err();
            assert!(matches!(err, MonitorError::InvalidFilter(_)), "{status}");
        }
    }

    #[test]
    fn test_malformed_range_is_invalid_filter() {
        let err = validate(BatchQueryParams { updated_time: Some("last week".to_string()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidFilter(_)));
    }

    #[test]
    fn test_unknown_order_is_invalid_order() {
        let err = validate(BatchQueryParams { orderby: Some("foo".to_string()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidOrder(_)));
    }

    #[test]
    fn test_pagination_accepts_bounded_integers() {
        let query = validate(BatchQueryParams {
            offset: Some("0".to_string()),
            limit: Some("99999".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, Some(99999));

        let query = validate(BatchQueryParams { offset: Some("20".to_string()), ..Default::default() }).unwrap();
        assert_eq!(query.offset, 20);
    }

    #[test]
    fn test_bad_pagination_is_rejected() {
        for offset in ["-1", "00", "01", "100000", "1.5", "ten", "+3"] {
            let err = validate(BatchQueryParams { offset: Some(offset.to_string()), ..Default::default() })
                .unwrap_err();
            assert!(matches!(err, MonitorError::InvalidPagination(_)), "offset {offset}");
        }
        for limit in ["0", "-5", "007", "123456", "abc"] {
            let err = validate(BatchQueryParams { limit: Some(limit.to_string()), ..Default::default() })
                .unwrap_err();
            assert!(matches!(err, MonitorError::InvalidPagination(_)), "limit {limit}");
        }
    }
}
