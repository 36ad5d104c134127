//! CSV and printable report export.
//!
//! Both exporters are read-only over the records. The report is an HTML
//! document meant for the host's print / save-as-PDF facility; no PDF
//! encoding happens here.

use crate::{ChildRecord, Error, Result, Stats};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tera::{Context, Tera};

/// Default file name for the CSV download
pub const CSV_FILENAME: &str = "posyandu_records.csv";

/// Default file name for the printable report
pub const REPORT_FILENAME: &str = "posyandu_report.html";

/// CSV header row
pub const CSV_HEADERS: [&str; 8] = [
    "Name",
    "Age (months)",
    "Gender",
    "Height (cm)",
    "Weight (kg)",
    "BMI",
    "Status",
    "Parent Contact",
];

const REPORT_TEMPLATE_NAME: &str = "report.html";

const REPORT_TEMPLATE: &str = r#"<html>
  <head>
    <title>Posyandu Report</title>
    <style>
      body { font-family: Arial, sans-serif; padding: 16px; }
      h1 { font-size: 18px; }
      table { width: 100%; border-collapse: collapse; }
      th, td { border: 1px solid #ddd; padding: 6px; font-size: 12px; }
      th { background: #f7fafc; }
    </style>
  </head>
  <body>
    <h1>Posyandu Growth Report</h1>
    <p>{{ summary }}</p>
    <p class="generated">Generated {{ generated_at }}</p>
    <table>
      <thead>
        <tr>
          <th>Name</th><th>Age (m)</th><th>Gender</th><th>Height</th><th>Weight</th><th>BMI</th><th>Status</th><th>Parent Contact</th>
        </tr>
      </thead>
      <tbody>
{%- for row in rows %}
        <tr><td>{{ row.name }}</td><td>{{ row.age_months }}</td><td>{{ row.gender }}</td><td>{{ row.height_cm }}</td><td>{{ row.weight_kg }}</td><td>{{ row.bmi }}</td><td>{{ row.status }}</td><td>{{ row.parent_contact }}</td></tr>
{%- endfor %}
      </tbody>
    </table>
  </body>
</html>
"#;

/// A record flattened to display strings, shared by both exporters
#[derive(Debug, Serialize)]
struct ExportRow {
    name: String,
    age_months: String,
    gender: String,
    height_cm: String,
    weight_kg: String,
    bmi: String,
    status: String,
    parent_contact: String,
}

impl From<&ChildRecord> for ExportRow {
    fn from(record: &ChildRecord) -> Self {
        ExportRow {
            name: record.name.clone(),
            age_months: record.age_months.to_string(),
            gender: record.gender.to_string(),
            height_cm: record.height_cm.to_string(),
            weight_kg: record.weight_kg.to_string(),
            bmi: record.bmi.to_string(),
            status: record.status.to_string(),
            parent_contact: record.parent_contact.clone().unwrap_or_default(),
        }
    }
}

impl ExportRow {
    fn fields(&self) -> [&str; 8] {
        [
            self.name.as_str(),
            self.age_months.as_str(),
            self.gender.as_str(),
            self.height_cm.as_str(),
            self.weight_kg.as_str(),
            self.bmi.as_str(),
            self.status.as_str(),
            self.parent_contact.as_str(),
        ]
    }
}

/// Serialize records to CSV text in store order.
///
/// Every field is double-quoted. Embedded quotes are escaped by doubling them.
pub fn export_csv(records: &[ChildRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for record in records {
        let row = ExportRow::from(record);
        writer.write_record(row.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::Other(format!("CSV output is not UTF-8: {}", e)))?;

    tracing::debug!("Serialized {} records to CSV", records.len());
    Ok(text)
}

/// Render the printable HTML report with a summary line and one row per record
pub fn render_report(
    records: &[ChildRecord],
    stats: &Stats,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;

    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();

    let mut context = Context::new();
    context.insert("summary", &stats.summary_line());
    context.insert(
        "generated_at",
        &generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    context.insert("rows", &rows);

    let html = tera.render(REPORT_TEMPLATE_NAME, &context)?;
    tracing::debug!("Rendered report with {} rows", rows.len());
    Ok(html)
}

/// Write export contents to `path` atomically.
///
/// The contents go to a temp file in the same directory, which is synced
/// and then renamed over the destination.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote export to {:?}", path);
    Ok(())
}
