//! Report generation routes.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use domain::models::{DateRange, ReportKind};
use shared::validation::validate_report_date;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::export::{render, ReportFormat};
use crate::services::report::ReportGenerationError;

/// Query parameters for the reports endpoint.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: Option<String>,
}

/// Generate a report.
///
/// GET /api/v1/reports/:kind?from=YYYY-MM-DD&to=YYYY-MM-DD&format=csv|json
/// (admin only)
///
/// `from` and `to` must be supplied together. The range applies to the
/// attendance report; it is accepted but ignored for the summary kinds.
pub async fn generate_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let kind: ReportKind = kind
        .parse()
        .map_err(|e: String| ApiError::Validation(e))?;

    let range = parse_range(&query)?;
    let format = ReportFormat::from_query(query.format.as_deref());

    let report = state
        .report_builder()
        .build(kind, range.as_ref())
        .await
        .map_err(|e| match e {
            ReportGenerationError::Store(store) => ApiError::from(store),
        })?;

    let body = render(&report, format);
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, format.content_type())],
        body,
    )
        .into_response();

    if format == ReportFormat::Csv {
        let filename = format!(
            "{}-report-{}.{}",
            kind,
            Utc::now().format("%Y%m%d"),
            format.extension()
        );
        let disposition = format!("attachment; filename=\"{}\"", filename);
        if let Ok(value) = disposition.parse() {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

fn parse_range(query: &ReportQuery) -> Result<Option<DateRange>, ApiError> {
    match (&query.from, &query.to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => {
            for bound in [from, to] {
                validate_report_date(bound).map_err(|_| {
                    ApiError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", bound))
                })?;
            }
            if from > to {
                return Err(ApiError::Validation(
                    "'from' must not be after 'to'".to_string(),
                ));
            }
            Ok(Some(DateRange::new(from.clone(), to.clone())))
        }
        _ => Err(ApiError::Validation(
            "'from' and 'to' must be supplied together".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: Option<&str>, to: Option<&str>) -> ReportQuery {
        ReportQuery {
            from: from.map(String::from),
            to: to.map(String::from),
            format: None,
        }
    }

    #[test]
    fn test_range_requires_both_bounds() {
        assert!(parse_range(&query(None, None)).unwrap().is_none());
        assert!(parse_range(&query(Some("2024-01-01"), None)).is_err());
        assert!(parse_range(&query(None, Some("2024-01-31"))).is_err());

        let range = parse_range(&query(Some("2024-01-01"), Some("2024-01-31")))
            .unwrap()
            .unwrap();
        assert_eq!(range.start, "2024-01-01");
        assert_eq!(range.end, "2024-01-31");
    }

    #[test]
    fn test_range_rejects_bad_dates() {
        assert!(parse_range(&query(Some("Jan 1"), Some("2024-01-31"))).is_err());
        assert!(parse_range(&query(Some("2024-01-31"), Some("2024-01-01"))).is_err());
    }
}
