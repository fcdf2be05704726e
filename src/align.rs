use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::{AppError, AppResult, Warning};
use crate::track::{Coordinates, Point, Sample, SeqType};

const REQUIRED_COLUMNS: [&str; 3] = ["aln_pos", "ref_pos", "query_pos"];
const NULL_TOKENS: [&str; 6] = ["", "na", "nan", "none", "null", "-"];

/// One row of a pairwise alignment table; `None` marks an unaligned side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentRow {
    pub aln_pos: Option<i64>,
    pub ref_pos: Option<i64>,
    pub query_pos: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct AlignmentTable {
    pub rows: Vec<AlignmentRow>,
}

/// Samples moved onto alignment coordinates
#[derive(Debug, Clone)]
pub struct MappedSamples {
    pub samples: Vec<Sample>,
    pub gaps: Vec<(String, usize)>,
    pub warnings: Vec<Warning>,
}

fn parse_cell(path: &str, line: usize, column: &str, raw: &str) -> AppResult<Option<i64>> {
    let cell = raw.trim().trim_matches('"');
    if NULL_TOKENS.contains(&cell.to_lowercase().as_str()) {
        return Ok(None);
    }
    if let Ok(v) = cell.parse::<i64>() {
        return Ok(Some(v));
    }
    // nullable integer columns are often written as floats
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        _ => Err(AppError::parse(
            path,
            line,
            format!("column {} is not an integer: {}", column, cell),
        )),
    }
}

impl AlignmentTable {
    pub fn load(path: &str) -> AppResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(AppError::AlignmentFormat {
                    path: path.to_string(),
                    missing: REQUIRED_COLUMNS.join(", "),
                })
            }
        };
        let delimiter = if header.contains('\t') { '\t' } else { ',' };
        let columns: Vec<String> = header
            .split(delimiter)
            .map(|c| c.trim().trim_matches('"').to_string())
            .collect();

        let mut indices = [0usize; 3];
        let mut missing = Vec::new();
        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match columns.iter().position(|c| c == name) {
                Some(i) => indices[slot] = i,
                None => missing.push(*name),
            }
        }
        if !missing.is_empty() {
            return Err(AppError::AlignmentFormat {
                path: path.to_string(),
                missing: missing.join(", "),
            });
        }

        let mut rows = Vec::new();
        for (idx, line) in lines.enumerate() {
            let line = line?;
            let line_no = idx + 2;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(delimiter).collect();
            let mut values = [None; 3];
            for (slot, &col) in indices.iter().enumerate() {
                let raw = fields.get(col).copied().unwrap_or("");
                values[slot] = parse_cell(path, line_no, REQUIRED_COLUMNS[slot], raw)?;
            }
            rows.push(AlignmentRow {
                aln_pos: values[0],
                ref_pos: values[1],
                query_pos: values[2],
            });
        }

        Ok(Self { rows })
    }

    /// Number of rows whose aln_pos repeats an earlier row
    pub fn duplicate_alignment_positions(&self) -> usize {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|r| r.aln_pos)
            .filter(|p| !seen.insert(*p))
            .count()
    }

    /// Lookup from one native coordinate to its row. First row in file order wins.
    fn index_by(&self, from: SeqType) -> HashMap<i64, AlignmentRow> {
        let mut index = HashMap::new();
        for row in &self.rows {
            let key = match from {
                SeqType::Reference => row.ref_pos,
                SeqType::Query => row.query_pos,
            };
            if let Some(key) = key {
                index.entry(key).or_insert(*row);
            }
        }
        index
    }
}

/// Map one sample onto alignment coordinates. Returns the sample and its gap count.
pub fn map_sample(sample: &Sample, index: &HashMap<i64, AlignmentRow>) -> (Sample, usize) {
    let mut points = Vec::with_capacity(sample.points.len());
    let mut gaps = 0;

    for point in &sample.points {
        let row = index.get(&point.position);
        match row.and_then(|r| r.aln_pos.map(|aln| (r, aln))) {
            Some((row, aln)) => points.push(Point {
                position: aln,
                value: point.value,
                mapping: Some(Coordinates {
                    original: point.position,
                    alignment: aln,
                    reference: row.ref_pos,
                    query: row.query_pos,
                }),
            }),
            None => gaps += 1,
        }
    }

    (
        Sample {
            id: sample.id.clone(),
            seq_type: sample.seq_type,
            points,
        },
        gaps,
    )
}

/// Map every sample from its own sequence type
pub fn map_samples(samples: &[Sample], table: &AlignmentTable) -> MappedSamples {
    let by_reference = table.index_by(SeqType::Reference);
    let by_query = table.index_by(SeqType::Query);

    let mut warnings = Vec::new();
    let duplicates = table.duplicate_alignment_positions();
    if duplicates > 0 {
        warnings.push(Warning::DuplicateAlignmentPositions { count: duplicates });
    }

    let mut mapped = Vec::with_capacity(samples.len());
    let mut gaps = Vec::with_capacity(samples.len());
    for sample in samples {
        let index = match sample.seq_type {
            SeqType::Reference => &by_reference,
            SeqType::Query => &by_query,
        };
        let (aligned, gap_count) = map_sample(sample, index);
        if gap_count > 0 {
            warnings.push(Warning::AlignmentGaps {
                sample_id: sample.id.clone(),
                count: gap_count,
            });
        }
        gaps.push((sample.id.clone(), gap_count));
        mapped.push(aligned);
    }

    MappedSamples {
        samples: mapped,
        gaps,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn row(aln: Option<i64>, r: Option<i64>, q: Option<i64>) -> AlignmentRow {
        AlignmentRow {
            aln_pos: aln,
            ref_pos: r,
            query_pos: q,
        }
    }

    fn sample(seq_type: SeqType, points: &[(i64, f64)]) -> Sample {
        Sample {
            id: "s".to_string(),
            seq_type,
            points: points.iter().map(|&(p, v)| Point::new(p, Some(v))).collect(),
        }
    }

    #[test]
    fn loads_tab_table_with_nulls() {
        let f = table_file("aln_pos\tref_pos\tquery_pos\n1\t1\t1\n2\t\t2\n3\t2\tNA\n4\t3.0\t3\n");
        let table = AlignmentTable::load(f.path().to_str().unwrap()).unwrap();
        assert_eq!(
            table.rows,
            vec![
                row(Some(1), Some(1), Some(1)),
                row(Some(2), None, Some(2)),
                row(Some(3), Some(2), None),
                row(Some(4), Some(3), Some(3)),
            ]
        );
    }

    #[test]
    fn loads_csv_with_reordered_and_extra_columns() {
        let f = table_file("query_pos,extra,aln_pos,ref_pos\n7,x,10,5\n");
        let table = AlignmentTable::load(f.path().to_str().unwrap()).unwrap();
        assert_eq!(table.rows, vec![row(Some(10), Some(5), Some(7))]);
    }

    #[test]
    fn missing_columns_are_reported() {
        let f = table_file("aln_pos,ref_pos\n1,1\n");
        match AlignmentTable::load(f.path().to_str().unwrap()) {
            Err(AppError::AlignmentFormat { missing, .. }) => assert_eq!(missing, "query_pos"),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn non_integer_cell_is_parse_error() {
        let f = table_file("aln_pos,ref_pos,query_pos\n1,abc,1\n");
        assert!(matches!(
            AlignmentTable::load(f.path().to_str().unwrap()),
            Err(AppError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn maps_reference_and_query_and_counts_gaps() {
        let table = AlignmentTable {
            rows: vec![
                row(Some(1), Some(10), None),
                row(Some(2), Some(11), Some(20)),
                row(Some(3), None, Some(21)),
                row(Some(4), Some(12), Some(22)),
            ],
        };
        let samples = vec![
            Sample {
                id: "ref".into(),
                ..sample(SeqType::Reference, &[(10, 1.0), (11, 2.0), (99, 3.0)])
            },
            Sample {
                id: "qry".into(),
                ..sample(SeqType::Query, &[(20, 4.0), (21, 5.0)])
            },
        ];
        let mapped = map_samples(&samples, &table);

        let ref_positions: Vec<i64> = mapped.samples[0].points.iter().map(|p| p.position).collect();
        assert_eq!(ref_positions, vec![1, 2]);
        let qry_positions: Vec<i64> = mapped.samples[1].points.iter().map(|p| p.position).collect();
        assert_eq!(qry_positions, vec![2, 3]);

        let coords = mapped.samples[1].points[1].mapping.unwrap();
        assert_eq!(coords.original, 21);
        assert_eq!(coords.reference, None);
        assert_eq!(coords.query, Some(21));

        assert_eq!(mapped.gaps, vec![("ref".to_string(), 1), ("qry".to_string(), 0)]);
        assert_eq!(
            mapped.warnings,
            vec![Warning::AlignmentGaps { sample_id: "ref".into(), count: 1 }]
        );
    }

    #[test]
    fn duplicate_keys_use_first_row_and_warn() {
        let table = AlignmentTable {
            rows: vec![
                row(Some(5), Some(1), Some(1)),
                row(Some(6), Some(1), Some(2)),
                row(Some(6), Some(2), Some(3)),
            ],
        };
        let mapped = map_samples(&[sample(SeqType::Reference, &[(1, 0.5)])], &table);
        assert_eq!(mapped.samples[0].points[0].position, 5);
        assert!(mapped
            .warnings
            .contains(&Warning::DuplicateAlignmentPositions { count: 1 }));
    }

    #[test]
    fn rows_without_alignment_position_count_as_gaps() {
        let table = AlignmentTable {
            rows: vec![row(None, Some(1), None)],
        };
        let mapped = map_samples(&[sample(SeqType::Reference, &[(1, 0.5)])], &table);
        assert!(mapped.samples[0].points.is_empty());
        assert_eq!(mapped.gaps[0].1, 1);
    }
}
