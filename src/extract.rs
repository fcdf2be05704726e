use clap::Args;
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::error::{AppError, AppResult};
use crate::region::Region;
use crate::track::{read_track, SeqType};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// What to extract: track (reactivity values) or structure (dot-bracket file)
    #[arg(short = 'm', long = "mode", default_value = "track")]
    pub mode: String,
    /// Input track or dot-bracket file
    #[arg(short = 'i', long = "input")]
    pub input: String,
    /// Region as <start>:<end> (1-based, inclusive)
    #[arg(short = 'r', long = "region")]
    pub region: String,
    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,
    /// Log file path (optional)
    #[arg(short = 'l', long = "log")]
    pub log: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Track,
    Structure,
}

impl std::str::FromStr for ExtractMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "track" | "wig" => Ok(ExtractMode::Track),
            "structure" | "db" | "dot-bracket" => Ok(ExtractMode::Structure),
            _ => Err(format!("Unknown extract mode: {}. Supported: track, structure", s)),
        }
    }
}

/// Sequence and structure slices of a dot-bracket record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSlice {
    pub sequence: String,
    pub structure: String,
}

fn validate_extract_args(args: &ExtractArgs) -> Result<(), Box<dyn Error>> {
    if args.input.trim().is_empty() {
        return Err("Error: Input file path cannot be empty".into());
    }
    if !Path::new(&args.input).exists() {
        return Err(format!("Error: Input file does not exist: {}", args.input).into());
    }
    args.mode.parse::<ExtractMode>()?;
    args.region.parse::<Region>()?.check_span()?;
    Ok(())
}

/// Values of a track over the region. Positions absent from the track read as 0.0.
pub fn extract_track_values(path: &str, region: Region) -> AppResult<Vec<f64>> {
    let sample = read_track(path, None, SeqType::Reference)?;
    let mut by_position: HashMap<i64, f64> = HashMap::new();
    for point in sample.points {
        // later lines override earlier ones
        by_position.insert(point.position, point.value.unwrap_or(f64::NAN));
    }
    Ok(region
        .positions()
        .map(|pos| by_position.get(&pos).copied().unwrap_or(0.0))
        .collect())
}

/// Slice a dot-bracket file laid out as header, sequence, structure
pub fn extract_structure_region(path: &str, region: Region) -> AppResult<StructureSlice> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().take(3).collect::<Result<Vec<String>, _>>()?;
    if lines.len() < 3 {
        return Err(AppError::parse(
            path,
            lines.len() + 1,
            "dot-bracket file must have a header, a sequence and a structure line",
        ));
    }

    let sequence: Vec<char> = lines[1].trim().chars().collect();
    let structure: Vec<char> = lines[2].trim().chars().collect();
    if region.start < 1 {
        return Err(AppError::Configuration(format!(
            "region start must be 1 or greater, got {}",
            region.start
        )));
    }
    if region.end as usize > sequence.len() {
        return Err(AppError::Configuration(format!(
            "end position {} exceeds sequence length {}",
            region.end,
            sequence.len()
        )));
    }

    let start_idx = (region.start - 1) as usize;
    let end_idx = region.end as usize;
    let slice = |chars: &[char]| -> String {
        chars
            .iter()
            .skip(start_idx)
            .take(end_idx - start_idx)
            .collect()
    };
    Ok(StructureSlice {
        sequence: slice(&sequence),
        structure: slice(&structure),
    })
}

pub fn run_extract(args: &ExtractArgs, logger: &mut crate::Logger) -> Result<(), Box<dyn Error>> {
    validate_extract_args(args)?;
    let start_time = Instant::now();
    let mode: ExtractMode = args.mode.parse()?;
    let region: Region = args.region.parse()?;

    logger.log("=== ReactivityCompare Extract Function Log ===")?;
    logger.log(&format!("Software Version: v{}", crate::VERSION))?;
    logger.log(&format!("Input File: {}", args.input))?;
    logger.log(&format!("Mode: {:?}", mode))?;
    logger.log(&format!("Region: {}", region))?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    match mode {
        ExtractMode::Track => {
            let values = extract_track_values(&args.input, region)?;
            for v in &values {
                writeln!(out, "{:.3}", v)?;
            }
            logger.log(&format!("Extracted {} values", values.len()))?;
        }
        ExtractMode::Structure => {
            let slice = extract_structure_region(&args.input, region)?;
            writeln!(out, ">subsequence")?;
            writeln!(out, "{}", slice.sequence)?;
            writeln!(out, "{}", slice.structure)?;
            logger.log(&format!("Extracted {} nt", slice.sequence.chars().count()))?;
        }
    }
    out.flush()?;

    let elapsed = start_time.elapsed();
    logger.log(&format!("Total time: {:.2}s", elapsed.as_secs_f64()))?;
    if args.output.is_some() {
        println!("{}", crate::progress::format_time_used(elapsed));
    }
    Ok(())
}
