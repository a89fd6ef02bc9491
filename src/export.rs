//! Delimited-text export of the accumulation.
//!
//! Format: one header line of quoted field names, then one line per thread.
//! Every value is wrapped in `"` with embedded quotes doubled, fields are
//! joined by `;`, and every line (including the last) ends with `\n`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::source::Thread;

pub const FILENAME: &str = "threads.csv";
pub const MIME_TYPE: &str = "text/csv";
const DELIMITER: &str = ";";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A ready-to-save export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub contents: String,
}

impl ExportFile {
    pub fn threads(threads: &[Thread]) -> Self {
        Self {
            filename: FILENAME,
            mime_type: MIME_TYPE,
            contents: to_delimited(threads),
        }
    }

    /// Write the payload into `dir`, replacing any previous export.
    ///
    /// The file is written next to its destination and persisted into place
    /// so a reader never sees a half-written export.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let target = dir.join(self.filename);
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.contents.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
        Ok(target)
    }
}

/// Render `threads` in the export format.
pub fn to_delimited(threads: &[Thread]) -> String {
    let mut out = join_quoted(Thread::FIELD_NAMES.iter().copied());
    out.push('\n');
    for thread in threads {
        out.push_str(&join_quoted(thread.field_values().iter().map(String::as_str)));
        out.push('\n');
    }
    out
}

fn join_quoted<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{}\"", v.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(author: &str, title: &str, score: i64) -> Thread {
        Thread {
            author_name: author.to_string(),
            author_id: format!("t2_{author}"),
            title: title.to_string(),
            body: String::new(),
            score,
            score_ratio: 0.5,
            permalink: format!("/r/test/comments/{score}/"),
        }
    }

    const HEADER: &str =
        r#""authorName";"authorId";"title";"body";"score";"scoreRatio";"permalink""#;

    #[test]
    fn header_is_quoted_field_names() {
        let text = to_delimited(&[]);
        assert_eq!(text, format!("{HEADER}\n"));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let text = to_delimited(&[thread("a", r#"He said "hi""#, 5)]);
        assert!(text.contains(r#""He said ""hi""""#), "{text}");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            r#""a";"t2_a";"He said ""hi""";"";"5";"0.5";"/r/test/comments/5/""#
        );
    }

    #[test]
    fn rows_follow_accumulation_order_with_trailing_newline() {
        let text = to_delimited(&[thread("a", "first", 1), thread("b", "second", 2)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("first"));
        assert!(lines[2].contains("second"));
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn delimiter_inside_values_stays_quoted() {
        let text = to_delimited(&[thread("a", "x;y", 1)]);
        assert!(text.contains(r#";"x;y";"#));
    }

    #[test]
    fn export_file_metadata() {
        let file = ExportFile::threads(&[]);
        assert_eq!(file.filename, "threads.csv");
        assert_eq!(file.mime_type, "text/csv");
    }

    #[test]
    fn save_in_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = ExportFile::threads(&[thread("a", "t", 1)]);

        let path = file.save_in(&dir.path().join("nested")).unwrap();

        assert_eq!(path.file_name().unwrap(), "threads.csv");
        assert_eq!(fs::read_to_string(&path).unwrap(), file.contents);
        assert_eq!(fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }

    #[test]
    fn save_in_replaces_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        ExportFile::threads(&[thread("a", "old", 1)]).save_in(dir.path()).unwrap();
        let newer = ExportFile::threads(&[thread("b", "new", 2)]);

        let path = newer.save_in(dir.path()).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), newer.contents);
    }
}
