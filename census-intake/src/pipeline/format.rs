//! Accepted spreadsheet formats

use std::path::Path;

use super::PipelineError;

/// Extensions accepted by both intake channels (lower-case)
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["csv", "txt", "xls", "xlsx"];

/// Spreadsheet format, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadsheetFormat {
    /// `.csv` / `.txt`
    DelimitedText,
    /// `.xls` (BIFF)
    LegacySheet,
    /// `.xlsx` (Office Open XML)
    ModernSheet,
}

impl SpreadsheetFormat {
    /// Map a lower- or mixed-case extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(SpreadsheetFormat::DelimitedText),
            "xls" => Some(SpreadsheetFormat::LegacySheet),
            "xlsx" => Some(SpreadsheetFormat::ModernSheet),
            _ => None,
        }
    }

    /// Detect the format of a submitted filename
    ///
    /// Returns the format and the lower-cased extension tag.
    pub fn detect(filename: &str) -> Result<(Self, String), PipelineError> {
        let extension = file_extension(filename).ok_or_else(|| {
            PipelineError::UnsupportedFormat(format!("{} has no file extension", filename))
        })?;

        Self::from_extension(&extension)
            .map(|format| (format, extension.clone()))
            .ok_or_else(|| {
                PipelineError::UnsupportedFormat(format!(
                    ".{} is not one of {}",
                    extension,
                    ACCEPTED_EXTENSIONS.join(", ")
                ))
            })
    }
}

/// Lower-cased extension of a filename or path, if any
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// True when the extension belongs to the accepted set
pub fn is_accepted_extension(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| SpreadsheetFormat::from_extension(&ext).is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_accepted_extensions_case_insensitively() {
        assert_eq!(
            SpreadsheetFormat::detect("members.CSV").unwrap(),
            (SpreadsheetFormat::DelimitedText, "csv".to_string())
        );
        assert_eq!(
            SpreadsheetFormat::detect("members.txt").unwrap().0,
            SpreadsheetFormat::DelimitedText
        );
        assert_eq!(
            SpreadsheetFormat::detect("members.Xls").unwrap().0,
            SpreadsheetFormat::LegacySheet
        );
        assert_eq!(
            SpreadsheetFormat::detect("members.xlsx").unwrap().0,
            SpreadsheetFormat::ModernSheet
        );
    }

    #[test]
    fn test_detect_rejects_other_extensions() {
        for name in ["archive.zip", "members.pdf", "members", "members.csv.bak"] {
            assert!(
                matches!(
                    SpreadsheetFormat::detect(name),
                    Err(PipelineError::UnsupportedFormat(_))
                ),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_is_accepted_extension() {
        assert!(is_accepted_extension("a/b/members.xlsx"));
        assert!(!is_accepted_extension("archive.zip"));
        assert!(!is_accepted_extension("README"));
    }
}
