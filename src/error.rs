use thiserror::Error;

/// Fatal failures. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to parse {path} (line {line}): {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
    #[error("Alignment table {path} is missing required column(s): {missing}")]
    AlignmentFormat { path: String, missing: String },
    #[error("No data in region {region} on the {axis} axis")]
    EmptyRegion { region: String, axis: String },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn parse(path: &str, line: usize, message: impl Into<String>) -> Self {
        AppError::Parse {
            path: path.to_string(),
            line,
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Data-quality notices. Reported to the user, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    AlignmentGaps { sample_id: String, count: usize },
    DuplicateAlignmentPositions { count: usize },
    RegionBeyondData {
        region: String,
        observed_min: i64,
        observed_max: i64,
    },
    NonPositiveExcluded { count: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AlignmentGaps { sample_id, count } => write!(
                f,
                "{}: {} position(s) have no alignment entry and were dropped",
                sample_id, count
            ),
            Warning::DuplicateAlignmentPositions { count } => write!(
                f,
                "alignment table has {} duplicated aln_pos entr(ies); first occurrence is used",
                count
            ),
            Warning::RegionBeyondData {
                region,
                observed_min,
                observed_max,
            } => write!(
                f,
                "region {} extends beyond observed positions {}..{}; uncovered positions have no data",
                region, observed_min, observed_max
            ),
            Warning::NonPositiveExcluded { count } => write!(
                f,
                "{} row(s) with a non-positive mean excluded before log transform",
                count
            ),
        }
    }
}
