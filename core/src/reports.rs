// Outcome reports for batch conversion runs.
// One `FileReport` per PHP file found, collected into a `BatchReport` that
// the CLI renders as a table or serializes to JSON.

use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ok,
    ParseError,
    LoweringError,
    /// The file could not be read or its output could not be written.
    IoError,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Ok => "ok",
            FileStatus::ParseError => "parse_error",
            FileStatus::LoweringError => "lowering_error",
            FileStatus::IoError => "io_error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    /// Where the listing or failure text went; `None` when nothing was written.
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub instructions: usize,
    pub message: Option<String>,
}

impl FileReport {
    pub fn ok(input: &Path, output: &Path, instructions: usize) -> Self {
        FileReport {
            input: input.to_path_buf(),
            output: Some(output.to_path_buf()),
            status: FileStatus::Ok,
            instructions,
            message: None,
        }
    }

    pub fn failed(input: &Path, output: Option<&Path>, status: FileStatus, message: String) -> Self {
        FileReport {
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            status,
            instructions: 0,
            message: Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }
}

/// Summary of one `convert_directory` run. Files are kept sorted by input
/// path so reports are stable across thread schedules.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub output_root: PathBuf,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new(root: &Path, output_root: &Path) -> Self {
        BatchReport {
            root: root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            started_at: Local::now().to_rfc3339(),
            finished_at: None,
            files: Vec::new(),
        }
    }

    pub fn finish(&mut self, mut files: Vec<FileReport>) {
        files.sort_by(|a, b| a.input.cmp(&b.input));
        self.files = files;
        self.finished_at = Some(Local::now().to_rfc3339());
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn file(&self, input: &Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.input == input)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_status() {
        let mut report = BatchReport::new(Path::new("src"), Path::new("src_TAC"));
        report.finish(vec![
            FileReport::failed(Path::new("src/b.php"), None, FileStatus::ParseError, "bad".into()),
            FileReport::ok(Path::new("src/a.php"), Path::new("src_TAC/a.php"), 3),
        ]);
        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.count(FileStatus::ParseError), 1);
        assert_eq!(report.files[0].input, PathBuf::from("src/a.php"));
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn status_serializes_snake_case() {
        let file = FileReport::failed(Path::new("x.php"), None, FileStatus::LoweringError, "nope".into());
        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"status\":\"lowering_error\""));
    }
}
