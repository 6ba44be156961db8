//! Admin report: summary plus the full visit log

use serde::Serialize;

use crate::analytics::{summarize, VisitSummary};
use crate::models::VisitRecord;
use crate::storage::{StorageResult, VisitStore};

#[derive(Debug, Serialize)]
pub struct AdminReport {
    #[serde(flatten)]
    pub summary: VisitSummary,
    /// Most recent first
    pub records: Vec<VisitRecord>,
}

impl AdminReport {
    pub async fn load(store: &dyn VisitStore) -> StorageResult<Self> {
        let records = store.all().await?;
        let summary = summarize(&records);
        Ok(Self { summary, records })
    }
}

/// Escape text for use in HTML element content and attribute values
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 20px; }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { font-size: 28px; margin-bottom: 20px; color: #38bdf8; }
        .stats { display: flex; gap: 20px; margin-bottom: 30px; flex-wrap: wrap; }
        .stat-card { background: #1e293b; padding: 20px; border-radius: 12px; min-width: 150px; }
        .stat-card h3 { color: #94a3b8; font-size: 14px; margin-bottom: 8px; }
        .stat-card .value { font-size: 32px; font-weight: bold; color: #38bdf8; }
        .country-list { display: flex; gap: 10px; flex-wrap: wrap; margin-top: 10px; }
        .country-tag { background: #334155; padding: 4px 12px; border-radius: 20px; font-size: 13px; }
        table { width: 100%; border-collapse: collapse; background: #1e293b; border-radius: 12px; overflow: hidden; }
        th, td { padding: 14px 16px; text-align: left; }
        th { background: #334155; color: #94a3b8; font-weight: 500; font-size: 13px; text-transform: uppercase; }
        td { border-bottom: 1px solid #334155; }
        .ip { font-family: monospace; color: #fbbf24; }
        .country { color: #4ade80; }
        .time { color: #94a3b8; font-size: 13px; }
        .empty { text-align: center; padding: 60px; color: #64748b; }
"#;

pub fn render_admin_page(report: &AdminReport) -> String {
    let country_tags: String = report
        .summary
        .countries_by_count()
        .into_iter()
        .map(|(country, count)| {
            format!(
                r#"<span class="country-tag">{}: {}</span>"#,
                escape_html(country),
                count
            )
        })
        .collect::<Vec<_>>()
        .join("\n                    ");

    let rows = if report.records.is_empty() {
        r#"<tr><td colspan="4" class="empty">No visits recorded yet</td></tr>"#.to_string()
    } else {
        report
            .records
            .iter()
            .map(|r| {
                format!(
                    r#"<tr><td class="ip">{}</td><td class="country">{}</td><td>{}</td><td class="time">{}</td></tr>"#,
                    escape_html(&r.ip),
                    escape_html(&r.country),
                    escape_html(&r.city),
                    r.visit_time_display()
                )
            })
            .collect::<Vec<_>>()
            .join("\n                ")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Visitor log</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <h1>Visitor log</h1>
        <div class="stats">
            <div class="stat-card">
                <h3>Total visits</h3>
                <div class="value">{total}</div>
            </div>
            <div class="stat-card">
                <h3>Countries</h3>
                <div class="country-list">
                    {country_tags}
                </div>
            </div>
        </div>
        <table>
            <thead>
                <tr><th>IP</th><th>Country</th><th>City</th><th>Time (UTC)</th></tr>
            </thead>
            <tbody>
                {rows}
            </tbody>
        </table>
    </div>
</body>
</html>
"#,
        style = PAGE_STYLE,
        total = report.summary.total,
        country_tags = country_tags,
        rows = rows,
    )
}
