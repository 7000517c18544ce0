//! Report rendering for download and API consumption.

use domain::models::Report;
use serde_json::json;

/// Output formats the reports endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// Parses the `format` query parameter. Only `csv` selects CSV;
    /// anything else falls back to JSON, matching how the admin UI has
    /// always called this endpoint.
    pub fn from_query(raw: Option<&str>) -> ReportFormat {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
            _ => ReportFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv; charset=utf-8",
            ReportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Renders a report in the requested format.
pub fn render(report: &Report, format: ReportFormat) -> String {
    match format {
        ReportFormat::Csv => to_csv(report),
        ReportFormat::Json => to_json(report),
    }
}

/// Serializes a report as CSV with `\r\n` line endings.
///
/// Fields containing a comma, quote, or line break are quoted and embedded
/// quotes doubled per RFC 4180.
pub fn to_csv(report: &Report) -> String {
    let mut out = String::new();
    write_csv_row(&mut out, &report.header);
    for row in &report.rows {
        write_csv_row(&mut out, row);
    }
    out
}

fn write_csv_row(out: &mut String, row: &[String]) {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_csv_field(field));
    }
    out.push_str("\r\n");
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Serializes a report as a JSON envelope with the row count included.
pub fn to_json(report: &Report) -> String {
    let envelope = json!({
        "kind": report.kind,
        "header": report.header,
        "rows": report.rows,
        "count": report.len(),
    });
    serde_json::to_string(&envelope).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::ReportKind;
    use serde_json::Value;

    fn sample_report() -> Report {
        let mut report = Report::new(ReportKind::Users, &["Name", "Email"]);
        report.push_row(vec!["Ana Cruz".into(), "ana@x.com".into()]);
        report.push_row(vec!["Cruz, Jose".into(), "jose@x.com".into()]);
        report
    }

    #[test]
    fn test_format_from_query() {
        assert_eq!(ReportFormat::from_query(Some("csv")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_query(Some("CSV")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_query(Some("json")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_query(Some("xlsx")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_query(None), ReportFormat::Json);
    }

    #[test]
    fn test_csv_output() {
        let csv = to_csv(&sample_report());
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "Name,Email");
        assert_eq!(lines[1], "Ana Cruz,ana@x.com");
        // The comma in the name forces quoting.
        assert_eq!(lines[2], "\"Cruz, Jose\",jose@x.com");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_csv_escapes_embedded_quotes() {
        let mut report = Report::new(ReportKind::Events, &["Title"]);
        report.push_row(vec!["The \"Big\" Day".into()]);
        let csv = to_csv(&report);
        assert!(csv.contains("\"The \"\"Big\"\" Day\""));
    }

    #[test]
    fn test_json_envelope() {
        let parsed: Value = serde_json::from_str(&to_json(&sample_report())).unwrap();
        assert_eq!(parsed["kind"], "users");
        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["rows"][0][0], "Ana Cruz");
        assert_eq!(parsed["header"][1], "Email");
    }
}
