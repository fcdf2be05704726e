use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Line prefixes that mark track headers rather than data
const HEADER_PREFIXES: [&str; 5] = ["track", "variableStep", "fixedStep", "browser", "#"];

/// Native coordinate system of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqType {
    Reference,
    Query,
}

impl FromStr for SeqType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reference" | "ref" => Ok(SeqType::Reference),
            "query" | "qry" => Ok(SeqType::Query),
            _ => Err(format!("Unknown sequence type: {} (expected reference or query)", s)),
        }
    }
}

impl fmt::Display for SeqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqType::Reference => write!(f, "reference"),
            SeqType::Query => write!(f, "query"),
        }
    }
}

/// Coordinates recorded for a point after alignment mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub original: i64,
    pub alignment: i64,
    pub reference: Option<i64>,
    pub query: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub position: i64,
    /// `None` means the track reports no measurement here
    pub value: Option<f64>,
    pub mapping: Option<Coordinates>,
}

impl Point {
    pub fn new(position: i64, value: Option<f64>) -> Self {
        Self {
            position,
            value,
            mapping: None,
        }
    }
}

/// One replicate track
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub seq_type: SeqType,
    pub points: Vec<Point>,
}

impl Sample {
    /// Same sample with its values replaced in point order
    pub fn with_values(&self, values: Vec<Option<f64>>) -> Sample {
        let points = self
            .points
            .iter()
            .zip(values)
            .map(|(p, value)| Point { value, ..p.clone() })
            .collect();
        Sample {
            id: self.id.clone(),
            seq_type: self.seq_type,
            points,
        }
    }
}

/// One input track as requested on the command line
#[derive(Debug, Clone)]
pub struct TrackSpec {
    pub path: String,
    pub sample_id: Option<String>,
    pub seq_type: SeqType,
}

fn is_header(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Parse a value field. "NA" and every NaN spelling mean missing; infinities are invalid.
fn parse_value(s: &str) -> Option<Option<f64>> {
    if s.eq_ignore_ascii_case("na") {
        return Some(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Some(None),
        Ok(v) if v.is_finite() => Some(Some(v)),
        _ => None,
    }
}

fn default_sample_id(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Read a two-column position/value track
pub fn read_track(path: &str, sample_id: Option<&str>, seq_type: SeqType) -> AppResult<Sample> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut points = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || is_header(trimmed) {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(AppError::parse(
                path,
                idx + 1,
                format!("expected 2 fields, found {}", fields.len()),
            ));
        }
        let position = fields[0].parse::<i64>().map_err(|_| {
            AppError::parse(path, idx + 1, format!("invalid position: {}", fields[0]))
        })?;
        let value = parse_value(fields[1]).ok_or_else(|| {
            AppError::parse(path, idx + 1, format!("invalid value: {}", fields[1]))
        })?;
        points.push(Point::new(position, value));
    }

    Ok(Sample {
        id: sample_id
            .map(|s| s.to_string())
            .unwrap_or_else(|| default_sample_id(path)),
        seq_type,
        points,
    })
}

/// Read all tracks, keeping input order. The first failing track in input order is reported.
pub fn read_tracks(specs: &[TrackSpec]) -> AppResult<Vec<Sample>> {
    let results: Vec<AppResult<Sample>> = specs
        .par_iter()
        .map(|spec| read_track(&spec.path, spec.sample_id.as_deref(), spec.seq_type))
        .collect();
    let samples = results.into_iter().collect::<AppResult<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for sample in &samples {
        if !seen.insert(sample.id.as_str()) {
            return Err(AppError::Configuration(format!(
                "duplicate sample id: {} (use --sample-ids to disambiguate)",
                sample.id
            )));
        }
    }
    Ok(samples)
}
