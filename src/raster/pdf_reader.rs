use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::core::error::InputError;

/// PDF readers accept the header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// A PDF on disk that passed the header check.
#[derive(Debug, Clone)]
pub struct PdfReader {
    path: PathBuf,
}

impl PdfReader {
    /// Validate that `path` exists, is readable and looks like a PDF.
    pub fn open(path: &Path) -> Result<Self, InputError> {
        check_header(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> Result<usize> {
        get_page_count(&self.path)
    }
}

fn check_header(path: &Path) -> Result<(), InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(InputError::Unreadable {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let unreadable = |source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut head = Vec::with_capacity(HEADER_WINDOW);
    file.take(HEADER_WINDOW as u64)
        .read_to_end(&mut head)
        .map_err(unreadable)?;

    if has_pdf_header(&head) {
        Ok(())
    } else {
        Err(InputError::NotPdf(path.to_path_buf()))
    }
}

fn has_pdf_header(head: &[u8]) -> bool {
    head.windows(5).any(|w| w == b"%PDF-")
}

fn get_page_count(pdf_path: &Path) -> Result<usize> {
    let output = Command::new("pdfinfo")
        .arg(pdf_path)
        .output()
        .with_context(|| "failed to invoke pdfinfo; is poppler-utils installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InputError::InvalidPdf {
            path: pdf_path.to_path_buf(),
            reason: stderr.trim().to_string(),
        }
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_page_count(&stdout).ok_or_else(|| {
        InputError::InvalidPdf {
            path: pdf_path.to_path_buf(),
            reason: "pdfinfo output did not contain a 'Pages:' line".to_string(),
        }
        .into()
    })
}

fn parse_page_count(pdfinfo_stdout: &str) -> Option<usize> {
    pdfinfo_stdout
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn finds_header_after_junk_prefix() {
        assert!(has_pdf_header(b"%PDF-1.7\n"));
        assert!(has_pdf_header(b"\xef\xbb\xbf%PDF-1.4"));
        assert!(!has_pdf_header(b"PK\x03\x04 zip archive"));
        assert!(!has_pdf_header(b""));
    }

    #[test]
    fn parses_pdfinfo_pages_line() {
        let out = "Producer:       pdfTeX\nPages:          3\nEncrypted:      no\n";
        assert_eq!(parse_page_count(out), Some(3));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn rejects_missing_and_non_pdf_inputs() -> Result<()> {
        let missing = std::env::temp_dir().join("bubblescan-definitely-missing.pdf");
        assert!(matches!(
            PdfReader::open(&missing),
            Err(InputError::NotFound(_))
        ));

        let mut not_pdf = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        not_pdf.write_all(b"just some text, not a document")?;
        assert!(matches!(
            PdfReader::open(not_pdf.path()),
            Err(InputError::NotPdf(_))
        ));

        let dir = tempfile::tempdir()?;
        assert!(matches!(
            PdfReader::open(dir.path()),
            Err(InputError::Unreadable { .. })
        ));
        Ok(())
    }

    #[test]
    fn corrupt_body_is_an_invalid_pdf() -> Result<()> {
        if Command::new("pdfinfo").arg("-v").output().is_err() {
            eprintln!("Skipping test: pdfinfo not installed");
            return Ok(());
        }

        let mut corrupt = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        corrupt.write_all(b"%PDF-1.7\n\x00\x01 garbage where objects should be \xff\n")?;
        let reader = PdfReader::open(corrupt.path())?;

        let err = reader.page_count().unwrap_err();
        assert!(
            matches!(err.downcast_ref::<InputError>(), Some(InputError::InvalidPdf { .. })),
            "unexpected error: {err:#}"
        );
        Ok(())
    }
}
