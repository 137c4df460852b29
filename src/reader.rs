//! File reading for the console's `:load` command.
//!
//! Plain text loads as a document; delimited files load as a [`Frame`].
//! The spreadsheet case also produces a preview+statistics blob for the
//! load confirmation. PDF and Word formats are out of scope and reported
//! as unsupported.

use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::frame::Frame;

/// What a path loaded as.
#[derive(Debug)]
pub enum LoadedFile {
    Text(String),
    Table(Frame),
}

/// Read `path` according to its extension.
pub fn read(path: &Path) -> Result<LoadedFile, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" | "md" => {
            let text = fs::read_to_string(path)
                .map_err(|e| AppError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))?;
            Ok(LoadedFile::Text(text))
        }
        "csv" | "tsv" => Ok(LoadedFile::Table(Frame::from_path(path)?)),
        other => Err(AppError::UnsupportedFile(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}

/// Preview+statistics text blob shown when a spreadsheet is loaded.
pub fn spreadsheet_preview(frame: &Frame) -> String {
    format!("Preview:\n{}\nStats:\n{}", frame.preview(5), frame.describe())
}

/// Document/table id derived from a file name (stem, lowercased).
pub fn file_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;

    #[test]
    fn reads_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "plain text body").unwrap();

        match read(&path).unwrap() {
            LoadedFile::Text(text) => assert!(text.contains("plain text body")),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn reads_csv_as_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,x\n2,y\n").unwrap();

        match read(&path).unwrap() {
            LoadedFile::Table(frame) => {
                assert_eq!(frame.nrows(), 2);
                assert_eq!(frame.column_names(), vec!["a", "b"]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-").unwrap();

        match read(&path) {
            Err(AppError::UnsupportedFile(msg)) => assert_eq!(msg, ".pdf"),
            other => panic!("expected unsupported-file error, got {other:?}"),
        }
    }

    #[test]
    fn spreadsheet_preview_has_both_sections() {
        let frame = Frame::from_delimited("a,b\n1,x\n".as_bytes(), b',').unwrap();
        let blob = spreadsheet_preview(&frame);
        assert!(blob.starts_with("Preview:\n"));
        assert!(blob.contains("Stats:\n"));
        assert!(blob.contains("a (int)"));
    }

    #[test]
    fn file_id_uses_lowercased_stem() {
        assert_eq!(file_id(Path::new("/tmp/Quarterly Report.TXT")), "quarterly report");
        assert_eq!(file_id(Path::new("data.csv")), "data");
    }
}
