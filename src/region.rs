use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::str::FromStr;

use crate::error::{AppError, AppResult, Warning};
use crate::track::Sample;

/// Coordinate system the analysis window is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSystem {
    Alignment,
    Reference,
    Query,
}

impl FromStr for CoordSystem {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alignment" | "aln" => Ok(CoordSystem::Alignment),
            "reference" | "ref" => Ok(CoordSystem::Reference),
            "query" | "qry" => Ok(CoordSystem::Query),
            _ => Err(format!(
                "Unknown region type: {}. Supported: alignment, reference, query",
                s
            )),
        }
    }
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordSystem::Alignment => write!(f, "alignment"),
            CoordSystem::Reference => write!(f, "reference"),
            CoordSystem::Query => write!(f, "query"),
        }
    }
}

/// Widest window a run may request; every position gets a grid row
pub const MAX_REGION_SPAN: usize = 10_000_000;

/// Inclusive coordinate window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: i64,
    pub end: i64,
}

impl Region {
    pub fn new(start: i64, end: i64) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Configuration(format!(
                "region start {} is greater than end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, position: i64) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn positions(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    /// Reject windows wider than `MAX_REGION_SPAN`
    pub fn check_span(&self) -> AppResult<()> {
        if self.len() > MAX_REGION_SPAN {
            return Err(AppError::Configuration(format!(
                "region {} spans {} positions, more than the maximum of {}",
                self,
                self.len(),
                MAX_REGION_SPAN
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        (self.end.abs_diff(self.start) as usize).saturating_add(1)
    }
}

impl FromStr for Region {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AppError::Configuration(format!(
                "invalid region '{}', expected <start>:<end> with integer bounds",
                s
            ))
        };
        let (start, end) = s.trim().split_once(':').ok_or_else(invalid)?;
        let start = start.trim().parse::<i64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<i64>().map_err(|_| invalid())?;
        Region::new(start, end)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Per-sample means on the complete region grid
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    pub region: Region,
    pub axis: CoordSystem,
    pub sample_ids: Vec<String>,
    /// Every grid position, one cell per sample (in `sample_ids` order)
    pub cells: BTreeMap<i64, Vec<Option<f64>>>,
    pub warnings: Vec<Warning>,
}

impl RegionTable {
    /// (position, value) pairs of one sample; `None` where it has no data
    pub fn sample_series(&self, idx: usize) -> Vec<(i64, Option<f64>)> {
        self.cells.iter().map(|(&pos, row)| (pos, row[idx])).collect()
    }
}

/// Position of a point on the requested axis. Unmapped points keep their own position.
fn axis_position(point: &crate::track::Point, axis: CoordSystem) -> Option<i64> {
    match point.mapping {
        None => Some(point.position),
        Some(m) => match axis {
            CoordSystem::Alignment => Some(m.alignment),
            CoordSystem::Reference => m.reference,
            CoordSystem::Query => m.query,
        },
    }
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn aggregate(samples: &[Sample], region: Region, axis: CoordSystem) -> AppResult<RegionTable> {
    let mut observed: Option<(i64, i64)> = None;
    // (sample index, position) -> non-missing raw values
    let mut raw: BTreeMap<(usize, i64), Vec<f64>> = BTreeMap::new();

    for (idx, sample) in samples.iter().enumerate() {
        for point in &sample.points {
            let Some(pos) = axis_position(point, axis) else {
                continue;
            };
            observed = Some(match observed {
                None => (pos, pos),
                Some((lo, hi)) => (lo.min(pos), hi.max(pos)),
            });
            if !region.contains(pos) {
                continue;
            }
            let values = raw.entry((idx, pos)).or_default();
            if let Some(v) = point.value {
                values.push(v);
            }
        }
    }

    if raw.is_empty() {
        return Err(AppError::EmptyRegion {
            region: region.to_string(),
            axis: axis.to_string(),
        });
    }

    let mut warnings = Vec::new();
    if let Some((lo, hi)) = observed {
        if region.start < lo || region.end > hi {
            warnings.push(Warning::RegionBeyondData {
                region: region.to_string(),
                observed_min: lo,
                observed_max: hi,
            });
        }
    }

    let mut cells: BTreeMap<i64, Vec<Option<f64>>> = region
        .positions()
        .map(|pos| (pos, vec![None; samples.len()]))
        .collect();
    for ((idx, pos), values) in &raw {
        if let Some(row) = cells.get_mut(pos) {
            row[*idx] = mean_of(values);
        }
    }

    Ok(RegionTable {
        region,
        axis,
        sample_ids: samples.iter().map(|s| s.id.clone()).collect(),
        cells,
        warnings,
    })
}

/// Per-sample profile table: Position followed by one column per sample
pub fn save_profile(table: &RegionTable, output_path: &str) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    writeln!(writer, "Position,{}", table.sample_ids.join(","))?;
    for (pos, row) in &table.cells {
        let fields: Vec<String> = row
            .iter()
            .map(|v| v.map(|x| format!("{:.6}", x)).unwrap_or_else(|| "NA".to_string()))
            .collect();
        writeln!(writer, "{},{}", pos, fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}
