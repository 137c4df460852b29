//! Frame: in-memory tabular data with per-column inferred element types.
//!
//! A [`Frame`] is the opaque handle the tabular helper works with: named
//! columns, equal row counts, and an element type per column decided at load
//! time. Statistics use sample standard deviation and linear-interpolation
//! quantiles, skipping missing values and non-finite floats.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;

// ── Columns ─────────────────────────────────────────────────────────────────

/// Column storage, tagged by inferred element type.
///
/// Missing cells (empty, `na`, `nan`, `null` in the source) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype_name(&self) -> &'static str {
        match &self.data {
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Text(_) => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Int(_) | ColumnData::Float(_))
    }

    /// Present numeric values as `f64`, in row order. `None` cells and
    /// non-finite floats are skipped. Empty for text columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.numeric_values_at(None)
    }

    /// Like [`numeric_values`](Column::numeric_values) but restricted to the
    /// given row subset when `rows` is `Some`.
    fn numeric_values_at(&self, rows: Option<&[usize]>) -> Vec<f64> {
        let keep = |i: usize| rows.is_none_or(|r| r.contains(&i));
        match &self.data {
            ColumnData::Int(v) => v
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .filter_map(|(_, x)| x.map(|x| x as f64))
                .collect(),
            ColumnData::Float(v) => v
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .filter_map(|(_, x)| *x)
                .filter(|x| x.is_finite())
                .collect(),
            ColumnData::Text(_) => Vec::new(),
        }
    }

    /// Cell rendered for display; missing cells render as empty.
    pub fn cell_string(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Int(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnData::Float(v) => v.get(row).copied().flatten().map(fmt_num),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
        .unwrap_or_default()
    }
}

// ── Frame ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<Column>,
    nrows: usize,
}

impl Frame {
    /// Build a frame from pre-typed columns. All columns must have the same
    /// length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, AppError> {
        let nrows = columns.first().map(Column::len).unwrap_or(0);
        for col in &columns {
            if col.len() != nrows {
                return Err(AppError::Frame(format!(
                    "column '{}' has {} rows, expected {nrows}",
                    col.name,
                    col.len()
                )));
            }
        }
        Ok(Self { columns, nrows })
    }

    /// Parse delimited text with a header row. Element types are inferred
    /// per column: all-integer parses as int, all-numeric as float,
    /// anything else as text.
    pub fn from_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Self, AppError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AppError::Frame(format!("cannot read header row: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record.map_err(|e| AppError::Frame(format!("cannot read row: {e}")))?;
            for (i, slot) in cells.iter_mut().enumerate() {
                slot.push(record.get(i).unwrap_or("").trim().to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column {
                name,
                data: infer_column(raw),
            })
            .collect();
        Self::from_columns(columns)
    }

    /// Read a `.csv` or `.tsv` file, inferring the delimiter from the
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::Frame(format!("cannot open {}: {e}", path.display())))?;
        Self::from_delimited(file, delimiter)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    /// Per-column descriptive statistics rendered as text. Numeric columns
    /// report count, mean, std, min, quartiles, and max; text columns
    /// report count, unique, top, and freq.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for col in &self.columns {
            let _ = writeln!(out, "{} ({}): {}", col.name, col.dtype_name(), describe_column(col, None));
        }
        out
    }

    /// Group rows by the named column and render per-group numeric
    /// statistics. `None` when the column does not exist. Rows with a
    /// missing key are dropped, matching the NaN-skip convention.
    pub fn group_by(&self, key: &str) -> Option<String> {
        let key_col = self.column(key)?;

        // First-appearance group order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for row in 0..self.nrows {
            let label = key_col.cell_string(row);
            if label.is_empty() {
                continue;
            }
            if !groups.contains_key(&label) {
                order.push(label.clone());
            }
            groups.entry(label).or_default().push(row);
        }

        let numeric: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.is_numeric() && !c.name.eq_ignore_ascii_case(&key_col.name))
            .collect();

        let mut out = String::new();
        for label in order {
            let rows = &groups[&label];
            let _ = writeln!(out, "{} = {} ({} rows)", key_col.name, label, rows.len());
            if numeric.is_empty() {
                out.push_str("  (no numeric columns)\n");
                continue;
            }
            for col in &numeric {
                let _ = writeln!(out, "  {} ({}): {}", col.name, col.dtype_name(), describe_column(col, Some(rows)));
            }
        }
        Some(out)
    }

    /// First `n` rows as an aligned text table, header included.
    pub fn preview(&self, n: usize) -> String {
        if self.columns.is_empty() {
            return "(empty frame)".to_string();
        }
        let rows = self.nrows.min(n);

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.chars().count()).collect();
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows);
        for row in 0..rows {
            let cells: Vec<String> = self.columns.iter().map(|c| c.cell_string(row)).collect();
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
            grid.push(cells);
        }

        let mut out = String::new();
        let render_row = |cells: Vec<String>, out: &mut String| {
            let padded: Vec<String> = cells
                .into_iter()
                .enumerate()
                .map(|(i, c)| format!("{c:<width$}", width = widths[i]))
                .collect();
            out.push_str(padded.join("  ").trim_end());
            out.push('\n');
        };
        render_row(self.columns.iter().map(|c| c.name.clone()).collect(), &mut out);
        for cells in grid {
            render_row(cells, &mut out);
        }
        if self.nrows > rows {
            let _ = writeln!(out, "... {} more rows", self.nrows - rows);
        }
        out
    }
}

// ── Type inference ──────────────────────────────────────────────────────────

fn is_missing(raw: &str) -> bool {
    raw.is_empty()
        || raw.eq_ignore_ascii_case("na")
        || raw.eq_ignore_ascii_case("nan")
        || raw.eq_ignore_ascii_case("null")
}

fn infer_column(raw: Vec<String>) -> ColumnData {
    let present: Vec<&str> = raw.iter().map(String::as_str).filter(|s| !is_missing(s)).collect();

    if !present.is_empty() && present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnData::Int(
            raw.iter()
                .map(|s| if is_missing(s) { None } else { s.parse().ok() })
                .collect(),
        );
    }
    if !present.is_empty() && present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnData::Float(
            raw.iter()
                .map(|s| if is_missing(s) { None } else { s.parse().ok() })
                .collect(),
        );
    }
    ColumnData::Text(
        raw.into_iter()
            .map(|s| if is_missing(&s) { None } else { Some(s) })
            .collect(),
    )
}

// ── Statistics ──────────────────────────────────────────────────────────────

fn describe_column(col: &Column, rows: Option<&[usize]>) -> String {
    if col.is_numeric() {
        numeric_summary(&col.numeric_values_at(rows))
    } else {
        text_summary(col, rows)
    }
}

fn numeric_summary(values: &[f64]) -> String {
    if values.is_empty() {
        return "count 0".to_string();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = sample_std(&sorted, mean).map(fmt_num).unwrap_or_else(|| "-".to_string());

    format!(
        "count {count}  mean {}  std {std}  min {}  25% {}  50% {}  75% {}  max {}",
        fmt_num(mean),
        fmt_num(sorted[0]),
        fmt_num(quantile(&sorted, 0.25)),
        fmt_num(quantile(&sorted, 0.50)),
        fmt_num(quantile(&sorted, 0.75)),
        fmt_num(sorted[count - 1]),
    )
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let sq_dev: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sq_dev / (n - 1) as f64).sqrt())
}

/// Quantile by linear interpolation between the two nearest ranks.
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

fn text_summary(col: &Column, rows: Option<&[usize]>) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut count = 0usize;

    let nrows = col.len();
    for row in 0..nrows {
        if let Some(keep) = rows
            && !keep.contains(&row)
        {
            continue;
        }
        let cell = col.cell_string(row);
        if cell.is_empty() {
            continue;
        }
        count += 1;
        if !counts.contains_key(&cell) {
            first_seen.push(cell.clone());
        }
        *counts.entry(cell).or_insert(0) += 1;
    }

    if count == 0 {
        return "count 0".to_string();
    }

    // Most frequent value; ties resolved by first appearance.
    let mut top = String::new();
    let mut freq = 0usize;
    for value in &first_seen {
        let c = counts[value];
        if c > freq {
            freq = c;
            top = value.clone();
        }
    }

    format!("count {count}  unique {}  top {top}  freq {freq}", counts.len())
}

/// Compact number rendering: integers without a decimal point, everything
/// else with up to four decimals, trailing zeros trimmed.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    if v.fract().abs() < 1e-9 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
