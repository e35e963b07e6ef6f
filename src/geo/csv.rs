//! Track CSV sidecars: two numeric columns per row, `;`-delimited.
//!
//! Projected tracks exported by third-party tools are accepted as-is,
//! including decimal commas.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::PipelineError;
use crate::types::ProjPoint;

/// Write `a;b` rows to a CSV file.
pub fn write_track_csv<I>(path: &Path, rows: I) -> Result<(), String>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let file = fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for (a, b) in rows {
        writeln!(writer, "{a};{b}").map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Load a projected track CSV. The file must exist; each non-empty row must
/// carry at least two numeric columns. Decimal commas are tolerated.
pub fn read_projected_csv(path: &Path) -> Result<Vec<ProjPoint>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let data = fs::read_to_string(path).map_err(|e| PipelineError::Io {
        detail: format!("failed to read {}: {e}", path.display()),
    })?;

    let mut points = Vec::new();
    for (line_no, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cols = line.split(';');
        let x = parse_column(cols.next(), path, line_no)?;
        let y = parse_column(cols.next(), path, line_no)?;
        points.push(ProjPoint::new(x, y));
    }
    Ok(points)
}

fn parse_column(col: Option<&str>, path: &Path, line_no: usize) -> Result<f64, PipelineError> {
    let text = col.ok_or_else(|| PipelineError::Io {
        detail: format!("{}:{}: expected two columns", path.display(), line_no + 1),
    })?;
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| PipelineError::Io {
            detail: format!("{}:{}: {e}", path.display(), line_no + 1),
        })
}
