use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::{AppError, AppResult, Warning};
use crate::region::RegionTable;
use crate::stats::{regress, RegressionStats};

/// Two disjoint replicate groups, as sample indices into the region table
#[derive(Debug, Clone, PartialEq)]
pub struct Groups {
    pub names: [String; 2],
    pub members: [Vec<usize>; 2],
}

impl Groups {
    /// One label per track; exactly two distinct labels, in order of first appearance
    pub fn from_labels(labels: &[String]) -> AppResult<Self> {
        let mut names: Vec<String> = Vec::new();
        for label in labels {
            let label = label.trim();
            if label.is_empty() {
                return Err(AppError::Configuration("group labels cannot be empty".into()));
            }
            if !names.iter().any(|n| n == label) {
                names.push(label.to_string());
            }
        }
        if names.len() != 2 {
            return Err(AppError::Configuration(format!(
                "exactly two distinct groups are required, got {} ({})",
                names.len(),
                names.join(", ")
            )));
        }

        let mut members = [Vec::new(), Vec::new()];
        for (idx, label) in labels.iter().enumerate() {
            let g = if label.trim() == names[0] { 0 } else { 1 };
            members[g].push(idx);
        }
        Ok(Self {
            names: [names[0].clone(), names[1].clone()],
            members,
        })
    }

    pub fn pair_label(&self) -> String {
        format!("{} vs {}", self.names[0], self.names[1])
    }
}

/// Mean of one group at one position; `None` when no sample of the group has data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupCell {
    pub mean: Option<f64>,
}

impl GroupCell {
    pub fn has_data(&self) -> bool {
        self.mean.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub names: [String; 2],
    pub cells: BTreeMap<i64, [GroupCell; 2]>,
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn group_means(table: &RegionTable, groups: &Groups) -> GroupAggregate {
    let cells = table
        .cells
        .iter()
        .map(|(&pos, row)| {
            let cell = |g: usize| GroupCell {
                mean: mean_present(groups.members[g].iter().map(|&i| row[i])),
            };
            (pos, [cell(0), cell(1)])
        })
        .collect();
    GroupAggregate {
        names: groups.names.clone(),
        cells,
    }
}

/// Paired group means at one position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    pub position: i64,
    pub mean1: Option<f64>,
    pub has_data1: bool,
    pub mean2: Option<f64>,
    pub has_data2: bool,
    /// Values used for regression; `None` when the row is not paired
    pub transformed: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub names: [String; 2],
    pub log_transform: bool,
    pub rows: Vec<ComparisonRow>,
    pub excluded_non_positive: usize,
    pub warnings: Vec<Warning>,
}

impl Comparison {
    pub fn paired(&self) -> (Vec<f64>, Vec<f64>) {
        self.rows.iter().filter_map(|r| r.transformed).unzip()
    }

    pub fn pair_label(&self) -> String {
        format!("{} vs {}", self.names[0], self.names[1])
    }

    pub fn statistics(&self) -> RegressionStats {
        let (x, y) = self.paired();
        regress(&self.pair_label(), &x, &y)
    }
}

/// One row per grid position of either group. With `log_transform`, rows where
/// either mean is not positive keep their raw means but get no transformed pair.
pub fn compare(aggregate: &GroupAggregate, log_transform: bool) -> Comparison {
    let mut excluded = 0;
    let rows = aggregate
        .cells
        .iter()
        .map(|(&position, [g1, g2])| {
            let transformed = match (g1.mean, g2.mean) {
                (Some(a), Some(b)) if log_transform => {
                    if a <= 0.0 || b <= 0.0 {
                        excluded += 1;
                        None
                    } else {
                        Some((a.log10(), b.log10()))
                    }
                }
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            };
            ComparisonRow {
                position,
                mean1: g1.mean,
                has_data1: g1.has_data(),
                mean2: g2.mean,
                has_data2: g2.has_data(),
                transformed,
            }
        })
        .collect();

    let mut warnings = Vec::new();
    if excluded > 0 {
        warnings.push(Warning::NonPositiveExcluded { count: excluded });
    }
    Comparison {
        names: aggregate.names.clone(),
        log_transform,
        rows,
        excluded_non_positive: excluded,
        warnings,
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.6}", x)).unwrap_or_else(|| "NA".to_string())
}

fn fmt_bool(v: bool) -> &'static str {
    if v {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub fn save_comparison(comparison: &Comparison, output_path: &str) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    let [g1, g2] = &comparison.names;
    writeln!(
        writer,
        "Position,Reactivity_{g1},HasData_{g1},Reactivity_{g2},HasData_{g2},Transformed_{g1},Transformed_{g2}",
        g1 = g1,
        g2 = g2
    )?;
    for row in &comparison.rows {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            row.position,
            fmt_opt(row.mean1),
            fmt_bool(row.has_data1),
            fmt_opt(row.mean2),
            fmt_bool(row.has_data2),
            fmt_opt(row.transformed.map(|t| t.0)),
            fmt_opt(row.transformed.map(|t| t.1)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Plain-text regression report, one block per comparison pair
pub fn save_stats_report(
    stats: &[RegressionStats],
    log_transform: bool,
    output_path: &str,
) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    writeln!(writer, "# Regression of group 2 on group 1")?;
    writeln!(writer, "# Scale: {}", if log_transform { "log10" } else { "linear" })?;
    for s in stats {
        writeln!(writer)?;
        writeln!(writer, "[{}]", s.label)?;
        writeln!(writer, "n\t{}", s.n)?;
        writeln!(writer, "slope\t{:.6}", s.slope)?;
        writeln!(writer, "intercept\t{:.6}", s.intercept)?;
        writeln!(writer, "r_squared\t{:.6}", s.r_squared)?;
        writeln!(writer, "pearson_r\t{:.6}", s.pearson)?;
        writeln!(writer, "spearman_rho\t{:.6}", s.spearman)?;
        writeln!(writer, "p_value_slope_eq_1\t{:.6e}", s.p_value)?;
    }
    writer.flush()?;
    Ok(())
}
