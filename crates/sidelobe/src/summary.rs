//! Result-file analysis: per-case verdict counts across runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sidelobe_types::Verdict;

use crate::ResultSet;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a result file: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Expands each path into result files: files are taken as-is, directories
/// contribute their immediate regular files.
pub fn result_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, SummaryError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = fs::read_dir(path).map_err(|source| SummaryError::Io {
                path: path.clone(),
                source,
            })?;
            let mut dir_files: Vec<PathBuf> = entries
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            dir_files.sort();
            files.extend(dir_files);
        } else {
            files.push(path.clone());
        }
    }
    files.dedup();
    Ok(files)
}

pub fn load(path: &Path) -> Result<ResultSet, SummaryError> {
    let json = fs::read_to_string(path).map_err(|source| SummaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ResultSet::from_json(&json).map_err(|source| SummaryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Verdict counts for one case index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseSummary {
    pub case_index: usize,
    pub valid: usize,
    pub invalid: usize,
    pub unknown: usize,
    /// Hex of the first recorded test case, when the run recorded raw data.
    pub example: Option<String>,
}

/// Per-case counts for one result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub generator: String,
    pub cases: Vec<CaseSummary>,
}

impl RunSummary {
    pub fn of(source: impl Into<String>, set: &ResultSet) -> Self {
        let cases = set
            .results
            .iter()
            .map(|(&case_index, results)| {
                let count = |v: Verdict| results.iter().filter(|r| r.verdict == v).count();
                CaseSummary {
                    case_index,
                    valid: count(Verdict::Valid),
                    invalid: count(Verdict::Invalid),
                    unknown: count(Verdict::Unknown),
                    example: results
                        .first()
                        .and_then(|r| r.test_case_hex())
                        .map(str::to_string),
                }
            })
            .collect();
        Self {
            source: source.into(),
            generator: set.generator.name.clone(),
            cases,
        }
    }

    /// Cases with at least one invalid verdict.
    pub fn findings(&self) -> impl Iterator<Item = &CaseSummary> {
        self.cases.iter().filter(|c| c.invalid > 0)
    }
}
