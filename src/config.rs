use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::error::LoadError;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "TRADEME_DASHBOARD_CONFIG";

pub const DEFAULT_DATA_PATH: &str = "TradeMeNZ.xlsx";
pub const DEFAULT_SHEET: &str = "Clean Data";
pub const DEFAULT_MAX_ROWS: usize = 63_675;

// ---------------------------------------------------------------------------
// ColumnRange – spreadsheet column letters, e.g. "A:J"
// ---------------------------------------------------------------------------

/// Inclusive, zero-based span of sheet columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnRange {
    first: usize,
    last: usize,
}

impl ColumnRange {
    pub fn new(first: usize, last: usize) -> Option<Self> {
        (first <= last).then_some(ColumnRange { first, last })
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, column: usize) -> bool {
        self.first <= column && column <= self.last
    }
}

impl Default for ColumnRange {
    /// `A:J`, the ten listing columns.
    fn default() -> Self {
        ColumnRange { first: 0, last: 9 }
    }
}

fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
    .map(|n| n - 1)
}

fn index_to_letters(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.iter().rev().collect()
}

impl FromStr for ColumnRange {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoadError::InvalidColumnRange(s.to_string());
        let (a, b) = match s.trim().split_once(':') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s.trim(), s.trim()),
        };
        let first = letters_to_index(a).ok_or_else(invalid)?;
        let last = letters_to_index(b).ok_or_else(invalid)?;
        ColumnRange::new(first, last).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ColumnRange {
    type Error = LoadError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ColumnRange> for String {
    fn from(r: ColumnRange) -> Self {
        r.to_string()
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            index_to_letters(self.first),
            index_to_letters(self.last)
        )
    }
}

// ---------------------------------------------------------------------------
// Load options and dashboard config
// ---------------------------------------------------------------------------

/// Which part of the source file to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Worksheet name; ignored for CSV, JSON and Parquet sources.
    pub sheet: String,
    pub columns: ColumnRange,
    /// Maximum number of data rows read after the header. `None` reads all.
    pub max_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            sheet: DEFAULT_SHEET.to_string(),
            columns: ColumnRange::default(),
            max_rows: Some(DEFAULT_MAX_ROWS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub source: LoadOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            source: LoadOptions::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from the first CLI argument, then [`CONFIG_ENV`],
    /// then the built-in defaults.
    ///
    /// A CLI argument ending in `.json` is a config file; anything else is
    /// taken as the data file with default load options.
    pub fn resolve(arg: Option<&str>, env: Option<&str>) -> Result<Self> {
        if let Some(arg) = arg {
            let path = Path::new(arg);
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if is_json {
                return Self::from_file(path);
            }
            return Ok(DashboardConfig {
                data_path: path.to_path_buf(),
                ..Default::default()
            });
        }
        match env {
            Some(path) => Self::from_file(Path::new(path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spreadsheet_ranges() {
        let r: ColumnRange = "A:J".parse().unwrap();
        assert_eq!((r.first(), r.last(), r.width()), (0, 9, 10));
        let r: ColumnRange = "aa:ac".parse().unwrap();
        assert_eq!((r.first(), r.last()), (26, 28));
        let r: ColumnRange = "C".parse().unwrap();
        assert_eq!((r.first(), r.last()), (2, 2));
        assert_eq!(r.to_string(), "C:C");
        assert_eq!(ColumnRange::new(25, 27).unwrap().to_string(), "Z:AB");
    }

    #[test]
    fn rejects_bad_ranges() {
        for bad in ["J:A", "", "A1:J", "A:", ":"] {
            assert!(bad.parse::<ColumnRange>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn config_fields_default_individually() {
        let cfg: DashboardConfig =
            serde_json::from_str(r#"{ "source": { "columns": "B:K" } }"#).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(cfg.source.sheet, DEFAULT_SHEET);
        assert_eq!(cfg.source.columns, "B:K".parse::<ColumnRange>().unwrap());
        assert_eq!(cfg.source.max_rows, Some(DEFAULT_MAX_ROWS));
    }

    #[test]
    fn bad_column_range_in_config_is_an_error() {
        let res: std::result::Result<DashboardConfig, _> =
            serde_json::from_str(r#"{ "source": { "columns": "Z:A" } }"#);
        assert!(res.is_err());
    }

    #[test]
    fn non_json_argument_is_the_data_path() {
        let cfg = DashboardConfig::resolve(Some("listings.csv"), Some("ignored.json")).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("listings.csv"));
        assert_eq!(cfg.source, LoadOptions::default());
    }

    #[test]
    fn defaults_without_argument_or_env() {
        assert_eq!(
            DashboardConfig::resolve(None, None).unwrap(),
            DashboardConfig::default()
        );
    }
}
