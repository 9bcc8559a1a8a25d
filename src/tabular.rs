//! Tabular ingestion and export.
//!
//! These sit outside the sort core: they turn a CSV, JSON or XLSX file into
//! records and write ranked records back out with the rank column first. No
//! column names or value types are validated.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{display_value, Attribute, RankedRecord, Record, RecordError, DEFAULT_RANK_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    Csv,
    Json,
    Xlsx,
}

impl TabularFormat {
    /// Infer from a file extension (`.csv`, `.json` or `.xlsx`, case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TabularFormat::Csv),
            "json" => Some(TabularFormat::Json),
            "xlsx" => Some(TabularFormat::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("row {row}: {source}")]
    Record { row: usize, source: RecordError },
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("ranking does not fit in a worksheet")]
    SheetTooLarge,
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Name of the leading rank column.
    pub rank_column: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            rank_column: DEFAULT_RANK_COLUMN.to_string(),
        }
    }
}

fn resolve_format(path: &Path, format: Option<TabularFormat>) -> Option<TabularFormat> {
    format.or_else(|| TabularFormat::from_path(path))
}

// =============================================================================
// Ingestion
// =============================================================================

pub fn read_records(
    path: impl AsRef<Path>,
    format: Option<TabularFormat>,
) -> Result<Vec<Record>, IngestError> {
    let path = path.as_ref();
    let format = resolve_format(path, format)
        .ok_or_else(|| IngestError::UnsupportedFormat(path.display().to_string()))?;
    let records = match format {
        TabularFormat::Csv => parse_csv_records(&std::fs::read_to_string(path)?)?,
        TabularFormat::Json => parse_json_records(&std::fs::read_to_string(path)?)?,
        TabularFormat::Xlsx => read_xlsx_records(path)?,
    };
    tracing::info!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Header row names the attributes; each data row becomes one record.
///
/// Rows where every cell is blank are skipped.
pub fn parse_csv_records(raw: &str) -> Result<Vec<Record>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let attributes: Vec<Attribute> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| Attribute::new(name.clone(), cell))
            .collect();
        let record = Record::from_attributes(attributes)
            .map_err(|source| IngestError::Record { row: idx + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

/// A JSON array of objects; key order is kept.
pub fn parse_json_records(raw: &str) -> Result<Vec<Record>, IngestError> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            Record::try_from(row).map_err(|source| IngestError::Record { row: idx + 1, source })
        })
        .collect()
}

/// First worksheet of a workbook; the first row names the attributes.
///
/// Blank rows are skipped like in CSV. Whole-number cells come back as
/// integers, since the format itself only stores floats.
pub fn read_xlsx_records(path: impl AsRef<Path>) -> Result<Vec<Record>, IngestError> {
    use calamine::{open_workbook, Reader, Xlsx};

    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|cell| cell.to_string().trim().is_empty()) {
            continue;
        }
        let attributes: Vec<Attribute> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| Attribute::new(name.clone(), cell_value(cell)))
            .collect();
        let record = Record::from_attributes(attributes)
            .map_err(|source| IngestError::Record { row: idx + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

fn cell_value(cell: &calamine::Data) -> Value {
    use calamine::Data;

    match cell {
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(*f as i64),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::String(s.clone()),
        Data::Empty => Value::String(String::new()),
        other => Value::String(other.to_string()),
    }
}

// =============================================================================
// Export
// =============================================================================

pub fn write_ranked(
    path: impl AsRef<Path>,
    format: Option<TabularFormat>,
    ranked: &[RankedRecord],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let format = resolve_format(path, format)
        .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;
    let body = match format {
        TabularFormat::Csv => ranked_to_csv(ranked, options)?.into_bytes(),
        TabularFormat::Json => ranked_to_json(ranked, options)?.into_bytes(),
        TabularFormat::Xlsx => ranked_to_xlsx(ranked, options)?,
    };
    std::fs::write(path, body)?;
    tracing::info!(path = %path.display(), records = ranked.len(), "wrote ranking");
    Ok(())
}

/// CSV with the rank column first, then every attribute name in first-seen order.
pub fn ranked_to_csv(ranked: &[RankedRecord], options: &ExportOptions) -> Result<String, ExportError> {
    let rows = ranked_rows(ranked, options);
    let headers = collect_headers(&rows, &options.rank_column);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map(display_value).unwrap_or_default()),
        )?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Single-sheet workbook laid out like the CSV export.
pub fn ranked_to_xlsx(ranked: &[RankedRecord], options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let rows = ranked_rows(ranked, options);
    let headers = collect_headers(&rows, &options.rank_column);

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| ExportError::SheetTooLarge)?;
        sheet.write_string(0, col, header.as_str())?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let line = u32::try_from(idx + 1).map_err(|_| ExportError::SheetTooLarge)?;
        for (col, header) in headers.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| ExportError::SheetTooLarge)?;
            match row.get(header) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        sheet.write_number(line, col, f)?;
                    }
                    None => {
                        sheet.write_string(line, col, n.to_string())?;
                    }
                },
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(line, col, *b)?;
                }
                Some(other) => {
                    sheet.write_string(line, col, display_value(other))?;
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn ranked_to_json(ranked: &[RankedRecord], options: &ExportOptions) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&ranked_rows(ranked, options))?)
}

/// Plain-text table for a terminal: one header line, a rule, then one line per rank.
pub fn render_ranked_table(ranked: &[RankedRecord], options: &ExportOptions) -> String {
    let rows = ranked_rows(ranked, options);
    let headers = collect_headers(&rows, &options.rank_column);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = format_line(&headers);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for line in &cells {
        out.push_str(&format_line(line));
        out.push('\n');
    }
    out
}

fn ranked_rows(ranked: &[RankedRecord], options: &ExportOptions) -> Vec<Map<String, Value>> {
    ranked
        .iter()
        .map(|r| r.to_map(&options.rank_column))
        .collect()
}

/// Rank column first, then every attribute name in first-seen order.
fn collect_headers(rows: &[Map<String, Value>], rank_column: &str) -> Vec<String> {
    // `preserve_order` makes this an insertion-ordered set.
    let mut seen = Map::new();
    seen.insert(rank_column.to_string(), Value::Null);
    for row in rows {
        for key in row.keys() {
            if !seen.contains_key(key) {
                seen.insert(key.clone(), Value::Null);
            }
        }
    }
    seen.into_iter().map(|(key, _)| key).collect()
}
