use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::compare::ComparisonRow;
use crate::error::{AppError, AppResult};

/// Reactivity class of one group at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    NoData,
    Zero,
    Low,
    Medium,
    High,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::NoData,
        Category::Zero,
        Category::Low,
        Category::Medium,
        Category::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::NoData => "No data",
            Category::Zero => "Zero",
            Category::Low => "Low",
            Category::Medium => "Medium",
            Category::High => "High",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agreement {
    NoData,
    PartialData,
    AgreementZero,
    AgreementLow,
    AgreementHigh,
    Disagreement,
}

impl Agreement {
    pub const ALL: [Agreement; 6] = [
        Agreement::NoData,
        Agreement::PartialData,
        Agreement::AgreementZero,
        Agreement::AgreementLow,
        Agreement::AgreementHigh,
        Agreement::Disagreement,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Agreement::NoData => "No data",
            Agreement::PartialData => "Partial data",
            Agreement::AgreementZero => "Agreement (zero)",
            Agreement::AgreementLow => "Agreement (low)",
            Agreement::AgreementHigh => "Agreement (high)",
            Agreement::Disagreement => "Disagreement",
        }
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Three strictly ascending cut points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds([f64; 3]);

impl Thresholds {
    pub fn new(values: &[f64]) -> AppResult<Self> {
        if values.len() != 3 {
            return Err(AppError::Validation(format!(
                "exactly three heatmap thresholds are required, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Validation("heatmap thresholds must be finite".into()));
        }
        if !(values[0] < values[1] && values[1] < values[2]) {
            return Err(AppError::Validation(format!(
                "heatmap thresholds must be strictly ascending, got {:?}",
                values
            )));
        }
        Ok(Self([values[0], values[1], values[2]]))
    }

    /// Parse "t1,t2,t3"
    pub fn parse(s: &str) -> AppResult<Self> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim().parse::<f64>().map_err(|_| {
                    AppError::Validation(format!("invalid heatmap threshold: {}", v.trim()))
                })
            })
            .collect::<AppResult<Vec<f64>>>()?;
        Self::new(&values)
    }

    pub fn values(&self) -> [f64; 3] {
        self.0
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self([0.0, 0.25, 0.75])
    }
}

/// Bucket one group mean. Right-closed intervals; negatives count as zero.
pub fn categorize(value: Option<f64>, has_data: bool, thresholds: &Thresholds) -> Category {
    let value = match value {
        Some(v) if has_data && !v.is_nan() => v.max(0.0),
        _ => return Category::NoData,
    };
    let [t1, t2, t3] = thresholds.0;
    if value <= t1 {
        Category::Zero
    } else if value <= t2 {
        Category::Low
    } else if value <= t3 {
        Category::Medium
    } else {
        Category::High
    }
}

pub fn categorize_all(
    values: &[Option<f64>],
    has_data: &[bool],
    thresholds: &Thresholds,
) -> Vec<Category> {
    values
        .iter()
        .zip(has_data)
        .map(|(&v, &h)| categorize(v, h, thresholds))
        .collect()
}

/// Medium and High both count as high agreement
pub fn agreement(cat1: Category, cat2: Category) -> Agreement {
    use Category::*;
    match (cat1, cat2) {
        (NoData, NoData) => Agreement::NoData,
        (NoData, _) | (_, NoData) => Agreement::PartialData,
        (Zero, Zero) => Agreement::AgreementZero,
        (Low, Low) => Agreement::AgreementLow,
        (Medium | High, Medium | High) => Agreement::AgreementHigh,
        _ => Agreement::Disagreement,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapRow {
    pub position: i64,
    pub reactivity1: Option<f64>,
    pub reactivity2: Option<f64>,
    pub category1: Category,
    pub category2: Category,
    pub agreement: Agreement,
}

/// Categories and agreement for every comparison row, from raw group means
pub fn build_heatmap(rows: &[ComparisonRow], thresholds: &Thresholds) -> Vec<HeatmapRow> {
    let column = |g: usize| -> (Vec<Option<f64>>, Vec<bool>) {
        rows.iter()
            .map(|r| if g == 0 { (r.mean1, r.has_data1) } else { (r.mean2, r.has_data2) })
            .unzip()
    };
    let (values1, has_data1) = column(0);
    let (values2, has_data2) = column(1);
    let categories1 = categorize_all(&values1, &has_data1, thresholds);
    let categories2 = categorize_all(&values2, &has_data2, thresholds);

    rows.iter()
        .zip(categories1.into_iter().zip(categories2))
        .map(|(row, (category1, category2))| HeatmapRow {
            position: row.position,
            reactivity1: row.mean1,
            reactivity2: row.mean2,
            category1,
            category2,
            agreement: agreement(category1, category2),
        })
        .collect()
}

pub fn agreement_counts(rows: &[HeatmapRow]) -> Vec<(Agreement, usize)> {
    Agreement::ALL
        .iter()
        .map(|&a| (a, rows.iter().filter(|r| r.agreement == a).count()))
        .collect()
}

pub fn save_categories(
    rows: &[HeatmapRow],
    group1: &str,
    group2: &str,
    output_path: &str,
) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    writeln!(
        writer,
        "Position,Reactivity_{g1},Reactivity_{g2},Category_{g1},Category_{g2},Agreement",
        g1 = group1,
        g2 = group2
    )?;
    let fmt_value = |v: Option<f64>| v.map(|x| format!("{:.6}", x)).unwrap_or_else(|| "NA".into());
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            row.position,
            fmt_value(row.reactivity1),
            fmt_value(row.reactivity2),
            row.category1,
            row.category2,
            row.agreement
        )?;
    }
    writer.flush()?;
    Ok(())
}
