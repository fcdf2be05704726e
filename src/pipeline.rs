use clap::Args;
use std::error::Error;
use std::path::Path;

use crate::align::{map_samples, AlignmentTable};
use crate::category::{agreement_counts, build_heatmap, save_categories, HeatmapRow, Thresholds};
use crate::compare::{compare, group_means, save_comparison, save_stats_report, Comparison, Groups};
use crate::error::{AppError, AppResult, Warning};
use crate::norm::{self, SignalOptions};
use crate::plot;
use crate::progress::{format_time_used, StageTimer};
use crate::region::{aggregate, save_profile, CoordSystem, Region, RegionTable};
use crate::stats::RegressionStats;
use crate::track::{read_tracks, SeqType, TrackSpec};

#[derive(Args, Debug)]
pub struct CompareArgs {
    // Input files
    /// Reactivity tracks (comma-separated, position/value per line)
    #[arg(short = 'i', long = "inputs")]
    pub inputs: String,
    /// Group label per track (comma-separated, exactly two distinct labels)
    #[arg(short = 'g', long = "groups")]
    pub groups: String,
    /// Sample identifier per track (comma-separated, default: file stem)
    #[arg(long = "sample-ids")]
    pub sample_ids: Option<String>,
    /// Sequence type per track: reference or query (comma-separated, default: reference)
    #[arg(long = "seq-types")]
    pub seq_types: Option<String>,
    /// Pairwise alignment table with aln_pos, ref_pos and query_pos columns
    #[arg(short = 'a', long = "alignment")]
    pub alignment: Option<String>,

    // Region configuration
    /// Region of interest as <start>:<end>
    #[arg(short = 'r', long = "region")]
    pub region: String,
    /// Coordinate system of the region: alignment, reference or query
    #[arg(long = "region-type", default_value = "alignment")]
    pub region_type: String,

    // Signal processing
    /// Smooth each track with a centered moving average
    #[arg(long = "smooth", default_value_t = false)]
    pub smooth: bool,
    /// Moving-average window size (rows)
    #[arg(long = "window-size", default_value_t = 25)]
    pub window_size: usize,
    /// Divide all values by the global median
    #[arg(long = "normalize", default_value_t = false)]
    pub normalize: bool,

    // Comparison
    /// Compare log10-transformed group means
    #[arg(long = "log-scale", default_value_t = false)]
    pub log_scale: bool,
    /// Write the category heatmap and per-position categories
    #[arg(long = "heatmap", default_value_t = false)]
    pub heatmap: bool,
    /// Three ascending heatmap thresholds (comma-separated)
    #[arg(long = "thresholds", default_value = "0,0.25,0.75")]
    pub thresholds: String,
    /// Clamp the profile plot y-axis to [0, 1]
    #[arg(long = "clamp-y", default_value_t = false)]
    pub clamp_y: bool,
    /// Write per-sample profile table and plot
    #[arg(long = "profile", default_value_t = false)]
    pub profile: bool,

    // Output configuration
    /// Output directory
    #[arg(short = 'o', long = "output")]
    pub output: String,
    /// Output file name prefix
    #[arg(short = 'p', long = "prefix", default_value = "comparison")]
    pub prefix: String,
    /// Log file path (default: <output>/compare.log)
    #[arg(short = 'l', long = "log")]
    pub log: Option<String>,
}

/// Everything the engine needs, already validated
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tracks: Vec<TrackSpec>,
    pub group_labels: Vec<String>,
    pub alignment: Option<String>,
    pub region: Region,
    pub axis: CoordSystem,
    pub signal: SignalOptions,
    pub log_transform: bool,
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub table: RegionTable,
    pub groups: Groups,
    pub comparison: Comparison,
    pub stats: RegressionStats,
    pub heatmap: Option<Vec<HeatmapRow>>,
    pub normalization_factor: Option<f64>,
    /// Dropped positions per sample when an alignment table is used
    pub gaps: Vec<(String, usize)>,
    pub warnings: Vec<Warning>,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|x| x.trim().to_string()).collect()
}

fn check_per_track(name: &str, values: &[String], tracks: usize) -> AppResult<()> {
    if values.len() != tracks {
        return Err(AppError::Configuration(format!(
            "{} lists {} value(s) but {} track(s) were given",
            name,
            values.len(),
            tracks
        )));
    }
    Ok(())
}

/// Check command-line arguments and turn them into a pipeline configuration
pub fn validate_compare_args(args: &CompareArgs) -> AppResult<PipelineConfig> {
    let inputs = split_list(&args.inputs);
    if inputs.iter().any(|p| p.is_empty()) {
        return Err(AppError::Configuration("input track paths cannot be empty".into()));
    }
    for path in &inputs {
        if !Path::new(path).exists() {
            return Err(AppError::Configuration(format!("input track does not exist: {}", path)));
        }
    }

    let group_labels = split_list(&args.groups);
    check_per_track("--groups", &group_labels, inputs.len())?;

    let sample_ids: Vec<Option<String>> = match &args.sample_ids {
        Some(s) => {
            let ids = split_list(s);
            check_per_track("--sample-ids", &ids, inputs.len())?;
            ids.into_iter().map(Some).collect()
        }
        None => vec![None; inputs.len()],
    };

    let seq_types = match &args.seq_types {
        Some(s) => {
            let types = split_list(s);
            check_per_track("--seq-types", &types, inputs.len())?;
            types
                .iter()
                .map(|t| t.parse::<SeqType>().map_err(AppError::Configuration))
                .collect::<AppResult<Vec<_>>>()?
        }
        None => vec![SeqType::Reference; inputs.len()],
    };

    if let Some(path) = &args.alignment {
        if !Path::new(path).exists() {
            return Err(AppError::Configuration(format!(
                "alignment table does not exist: {}",
                path
            )));
        }
    }

    if args.smooth && args.window_size == 0 {
        return Err(AppError::Configuration("--window-size must be at least 1".into()));
    }

    let thresholds = if args.heatmap {
        Some(Thresholds::parse(&args.thresholds)?)
    } else {
        None
    };

    let region: Region = args.region.parse()?;
    region.check_span()?;

    let tracks = inputs
        .into_iter()
        .zip(sample_ids)
        .zip(seq_types)
        .map(|((path, sample_id), seq_type)| TrackSpec {
            path,
            sample_id,
            seq_type,
        })
        .collect();

    Ok(PipelineConfig {
        tracks,
        group_labels,
        alignment: args.alignment.clone(),
        region,
        axis: args
            .region_type
            .parse::<CoordSystem>()
            .map_err(AppError::Configuration)?,
        signal: SignalOptions {
            normalize: args.normalize,
            smooth_window: if args.smooth { Some(args.window_size) } else { None },
        },
        log_transform: args.log_scale,
        thresholds,
    })
}

/// Tracks in, comparison out. No files are written here.
pub fn run_pipeline(config: &PipelineConfig, timer: &mut StageTimer) -> AppResult<PipelineResult> {
    let mut warnings = Vec::new();

    let groups = Groups::from_labels(&config.group_labels)?;
    let samples = read_tracks(&config.tracks)?;
    timer.lap("read tracks");

    let (samples, gaps) = match &config.alignment {
        Some(path) => {
            let table = AlignmentTable::load(path)?;
            let mapped = map_samples(&samples, &table);
            warnings.extend(mapped.warnings);
            timer.lap("alignment mapping");
            (mapped.samples, mapped.gaps)
        }
        None => (samples, Vec::new()),
    };

    let (samples, normalization_factor) = norm::process(&samples, &config.signal)?;
    timer.lap("signal processing");

    let table = aggregate(&samples, config.region, config.axis)?;
    warnings.extend(table.warnings.iter().cloned());
    timer.lap("region aggregation");

    let comparison = compare(&group_means(&table, &groups), config.log_transform);
    warnings.extend(comparison.warnings.iter().cloned());
    let stats = comparison.statistics();
    timer.lap("comparison");

    let heatmap = config
        .thresholds
        .as_ref()
        .map(|t| build_heatmap(&comparison.rows, t));
    if heatmap.is_some() {
        timer.lap("categorization");
    }

    Ok(PipelineResult {
        table,
        groups,
        comparison,
        stats,
        heatmap,
        normalization_factor,
        gaps,
        warnings,
    })
}

fn output_path(args: &CompareArgs, suffix: &str) -> String {
    Path::new(&args.output)
        .join(format!("{}_{}", args.prefix, suffix))
        .to_string_lossy()
        .to_string()
}

pub fn run_compare(args: &CompareArgs, logger: &mut crate::Logger) -> Result<(), Box<dyn Error>> {
    let mut timer = StageTimer::start();
    let config = validate_compare_args(args)?;

    logger.log("=== ReactivityCompare Compare Function Log ===")?;
    logger.log(&format!("Software Version: v{}", crate::VERSION))?;
    logger.log(&format!("Runtime: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")))?;
    for (track, label) in config.tracks.iter().zip(&config.group_labels) {
        logger.log(&format!(
            "Track: {} (group {}, {} coordinates)",
            track.path, label, track.seq_type
        ))?;
    }
    logger.log(&format!(
        "Alignment Table: {}",
        config.alignment.as_deref().unwrap_or("none")
    ))?;
    logger.log(&format!("Region: {} ({} coordinates)", config.region, config.axis))?;
    logger.log(&format!("Median Normalization: {}", config.signal.normalize))?;
    logger.log(&format!("Smoothing Window: {:?}", config.signal.smooth_window))?;
    logger.log(&format!("Log Scale: {}", config.log_transform))?;
    logger.log(&format!(
        "Heatmap Thresholds: {}",
        config
            .thresholds
            .map(|t| format!("{:?}", t.values()))
            .unwrap_or_else(|| "off".to_string())
    ))?;
    logger.log(&format!("Output Directory: {}", args.output))?;

    println!("[Loading data]");
    println!("    Tracks: {}", config.tracks.len());
    println!("    Region: {} ({})", config.region, config.axis);
    println!();

    logger.progress("Running comparison...")?;
    let result = run_pipeline(&config, &mut timer);
    logger.finish_progress()?;
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            logger.log(&format!("Comparison failed: {}", e))?;
            return Err(e.into());
        }
    };

    for warning in &result.warnings {
        logger.warn(&warning.to_string())?;
    }
    for (sample_id, count) in &result.gaps {
        logger.log(&format!("Alignment gaps in {}: {}", sample_id, count))?;
    }
    if let Some(factor) = result.normalization_factor {
        logger.log(&format!("Normalization median: {:.6}", factor))?;
    }
    if result.comparison.log_transform {
        logger.log(&format!(
            "Rows excluded before log transform: {}",
            result.comparison.excluded_non_positive
        ))?;
    }

    std::fs::create_dir_all(&args.output)?;
    let comparison_csv = output_path(args, "comparison.csv");
    save_comparison(&result.comparison, &comparison_csv)?;
    let stats_txt = output_path(args, "stats.txt");
    save_stats_report(
        std::slice::from_ref(&result.stats),
        result.comparison.log_transform,
        &stats_txt,
    )?;
    let scatter_png = output_path(args, "scatter.png");
    plot::plot_scatter(&result.comparison, &result.stats, &scatter_png)?;

    println!("[Data info]");
    println!("    Positions in region: {}", result.table.region.len());
    println!("    Paired positions: {}", result.stats.n);
    println!(
        "    {}: slope {:.3}, R² {:.3}, Pearson {:.3}, Spearman {:.3}",
        result.stats.label,
        result.stats.slope,
        result.stats.r_squared,
        result.stats.pearson,
        result.stats.spearman
    );
    println!();

    let mut written = vec![comparison_csv, stats_txt, scatter_png];

    if let Some(rows) = &result.heatmap {
        let categories_csv = output_path(args, "categories.csv");
        save_categories(
            rows,
            &result.groups.names[0],
            &result.groups.names[1],
            &categories_csv,
        )?;
        let heatmap_png = output_path(args, "heatmap.png");
        plot::plot_heatmap(rows, &result.groups.names, &heatmap_png)?;
        for (agreement, count) in agreement_counts(rows) {
            logger.log(&format!("{}: {}", agreement, count))?;
        }
        written.push(categories_csv);
        written.push(heatmap_png);
    }

    if args.profile {
        let profile_csv = output_path(args, "profile.csv");
        save_profile(&result.table, &profile_csv)?;
        let profile_png = output_path(args, "profile.png");
        plot::plot_profile(&result.table, &result.groups, args.clamp_y, &profile_png)?;
        written.push(profile_csv);
        written.push(profile_png);
    }
    timer.lap("write outputs");

    for (stage, elapsed) in timer.stages() {
        logger.log(&format!("Stage {}: {:.3}s", stage, elapsed.as_secs_f64()))?;
    }

    println!("[Output]");
    for path in &written {
        println!("    {}", path);
        logger.log(&format!("Wrote {}", path))?;
    }
    println!("{}", format_time_used(timer.total()));
    logger.log(&format!("Total time: {:.2}s", timer.total().as_secs_f64()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Agreement;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    fn args(inputs: &str, groups: &str, region: &str, out: &str) -> CompareArgs {
        CompareArgs {
            inputs: inputs.to_string(),
            groups: groups.to_string(),
            sample_ids: None,
            seq_types: None,
            alignment: None,
            region: region.to_string(),
            region_type: "alignment".to_string(),
            smooth: false,
            window_size: 25,
            normalize: false,
            log_scale: false,
            heatmap: true,
            thresholds: "0,0.25,0.75".to_string(),
            clamp_y: false,
            profile: false,
            output: out.to_string(),
            prefix: "comparison".to_string(),
            log: None,
        }
    }

    #[test]
    fn config_validation_catches_cardinality_errors() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.5\n");
        let b = write(&dir, "b.wig", "1 0.5\n");
        let inputs = format!("{},{}", a, b);
        let out = dir.path().to_string_lossy().to_string();

        assert!(validate_compare_args(&args(&inputs, "x,y", "1:3", &out)).is_ok());
        assert!(matches!(
            validate_compare_args(&args(&inputs, "x", "1:3", &out)),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            validate_compare_args(&args(&inputs, "x,y", "3:1", &out)),
            Err(AppError::Configuration(_))
        ));

        let mut bad_types = args(&inputs, "x,y", "1:3", &out);
        bad_types.seq_types = Some("reference,alignment".into());
        assert!(matches!(validate_compare_args(&bad_types), Err(AppError::Configuration(_))));

        let mut bad_thresholds = args(&inputs, "x,y", "1:3", &out);
        bad_thresholds.thresholds = "0,0.5".into();
        assert!(matches!(validate_compare_args(&bad_thresholds), Err(AppError::Validation(_))));

        let mut bad_region_type = args(&inputs, "x,y", "1:3", &out);
        bad_region_type.region_type = "genome".into();
        assert!(matches!(validate_compare_args(&bad_region_type), Err(AppError::Configuration(_))));

        let missing = args(&format!("{},/nonexistent.wig", a), "x,y", "1:3", &out);
        assert!(matches!(validate_compare_args(&missing), Err(AppError::Configuration(_))));

        let too_wide = args(&inputs, "x,y", "1:3000000000", &out);
        assert!(matches!(validate_compare_args(&too_wide), Err(AppError::Configuration(_))));
    }

    #[test]
    fn same_labels_for_both_tracks_fail_at_run_time() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.5\n");
        let b = write(&dir, "b.wig", "1 0.5\n");
        let out = dir.path().to_string_lossy().to_string();
        let config = validate_compare_args(&args(&format!("{},{}", a, b), "x,x", "1:1", &out)).unwrap();
        assert!(matches!(
            run_pipeline(&config, &mut StageTimer::start()),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn end_to_end_with_alignment_mapping() {
        let dir = TempDir::new().unwrap();
        let wt1 = write(&dir, "wt1.wig", "variableStep chrom=ref\n10 0.1\n11 0.5\n12 1.0\n");
        let wt2 = write(&dir, "wt2.wig", "variableStep chrom=ref\n10 0.3\n11 0.5\n");
        let mt = write(&dir, "mt.wig", "variableStep chrom=qry\n20 0.2\n21 0.9\n22 0.05\n");
        let aln = write(
            &dir,
            "aln.tsv",
            "aln_pos\tref_pos\tquery_pos\n1\t10\t20\n2\t11\t21\n3\t12\t\n4\t\t22\n",
        );
        let out = dir.path().join("out").to_string_lossy().to_string();
        let mut a = args(&format!("{},{},{}", wt1, wt2, mt), "wt,wt,mut", "1:5", &out);
        a.seq_types = Some("reference,reference,query".into());
        a.alignment = Some(aln);

        let config = validate_compare_args(&a).unwrap();
        let result = run_pipeline(&config, &mut StageTimer::start()).unwrap();

        let rows = &result.comparison.rows;
        assert_eq!(rows.len(), 5);
        assert!((rows[0].mean1.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(rows[0].mean2, Some(0.2));
        assert_eq!(rows[2].mean1, Some(1.0));
        assert!(!rows[2].has_data2);
        assert!(!rows[3].has_data1);
        assert_eq!(rows[3].mean2, Some(0.05));
        assert!(!rows[4].has_data1 && !rows[4].has_data2);
        assert_eq!(result.stats.n, 2);

        let heatmap = result.heatmap.as_ref().unwrap();
        assert_eq!(heatmap[0].agreement, Agreement::AgreementLow);
        assert_eq!(heatmap[1].agreement, Agreement::AgreementHigh);
        assert_eq!(heatmap[2].agreement, Agreement::PartialData);
        assert_eq!(heatmap[4].agreement, Agreement::NoData);

        // region 1:5 reaches past the last aligned position
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::RegionBeyondData { .. })));
    }

    #[test]
    fn reference_axis_uses_native_reference_positions() {
        let dir = TempDir::new().unwrap();
        let r = write(&dir, "r.wig", "10 0.4\n11 0.6\n");
        let q = write(&dir, "q.wig", "20 0.4\n21 0.6\n");
        let aln = write(&dir, "aln.csv", "aln_pos,ref_pos,query_pos\n1,10,20\n2,11,21\n");
        let out = dir.path().to_string_lossy().to_string();
        let mut a = args(&format!("{},{}", r, q), "a,b", "10:11", &out);
        a.seq_types = Some("reference,query".into());
        a.alignment = Some(aln);
        a.region_type = "reference".into();

        let result = run_pipeline(&validate_compare_args(&a).unwrap(), &mut StageTimer::start()).unwrap();
        let positions: Vec<i64> = result.comparison.rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![10, 11]);
        assert_eq!(result.comparison.rows[1].mean2, Some(0.6));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn infinite_track_value_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.1\n2 0.2\n3 0.5\n4 0.7\n");
        let b = write(&dir, "b.wig", "1 0.2\n2 0.3\n3 inf\n4 0.6\n");
        let out = dir.path().to_string_lossy().to_string();
        let config = validate_compare_args(&args(&format!("{},{}", a, b), "x,y", "1:4", &out)).unwrap();
        assert!(matches!(
            run_pipeline(&config, &mut StageTimer::start()),
            Err(AppError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn negative_nan_is_missing_data() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.1\n2 -nan\n3 0.5\n4 0.7\n");
        let b = write(&dir, "b.wig", "1 0.2\n2 0.3\n3 0.4\n4 0.6\n");
        let out = dir.path().to_string_lossy().to_string();
        let config = validate_compare_args(&args(&format!("{},{}", a, b), "x,y", "1:4", &out)).unwrap();
        let result = run_pipeline(&config, &mut StageTimer::start()).unwrap();
        assert!(!result.comparison.rows[1].has_data1);
        assert_eq!(result.stats.n, 3);
        assert!(result.stats.p_value.is_finite());
    }

    #[test]
    fn run_compare_writes_every_requested_output() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.1\n2 0.4\n3 1.8\n");
        let b = write(&dir, "b.wig", "1 0.2\n2 0.5\n4 0.3\n");
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let mut compare_args =
            args(&format!("{},{}", a, b), "x,y", "1:4", &out.to_string_lossy());
        compare_args.profile = true;
        compare_args.clamp_y = true;

        let log_path = dir.path().join("compare.log");
        let mut logger = crate::Logger::new(fs::File::create(&log_path).unwrap());
        run_compare(&compare_args, &mut logger).unwrap();

        for suffix in [
            "comparison.csv",
            "stats.txt",
            "scatter.png",
            "categories.csv",
            "heatmap.png",
            "profile.csv",
            "profile.png",
        ] {
            let path = out.join(format!("comparison_{}", suffix));
            assert!(path.exists(), "{} was not written", path.display());
            assert!(fs::metadata(&path).unwrap().len() > 0);
        }

        let profile = fs::read_to_string(out.join("comparison_profile.csv")).unwrap();
        let lines: Vec<&str> = profile.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Position,a,b",
                "1,0.100000,0.200000",
                "2,0.400000,0.500000",
                "3,1.800000,NA",
                "4,NA,0.300000",
            ]
        );

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("Software Version: v"));
        assert!(log.contains("comparison_profile.png"));
    }

    #[test]
    fn empty_region_aborts() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.5\n");
        let b = write(&dir, "b.wig", "2 0.5\n");
        let out = dir.path().to_string_lossy().to_string();
        let config = validate_compare_args(&args(&format!("{},{}", a, b), "x,y", "100:200", &out)).unwrap();
        assert!(matches!(
            run_pipeline(&config, &mut StageTimer::start()),
            Err(AppError::EmptyRegion { .. })
        ));
    }

    #[test]
    fn comparison_and_stats_files_are_written() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.wig", "1 0.1\n2 0.4\n3 0.9\n4 0.2\n");
        let b = write(&dir, "b.wig", "1 0.2\n2 0.5\n3 0.8\n4 NaN\n");
        let config = validate_compare_args(&args(
            &format!("{},{}", a, b),
            "x,y",
            "1:4",
            &dir.path().to_string_lossy(),
        ))
        .unwrap();
        let result = run_pipeline(&config, &mut StageTimer::start()).unwrap();

        let csv = dir.path().join("cmp.csv");
        save_comparison(&result.comparison, csv.to_str().unwrap()).unwrap();
        let text = fs::read_to_string(&csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Position,Reactivity_x,HasData_x"));
        assert_eq!(lines[4], "4,0.200000,TRUE,NA,FALSE,NA,NA");

        let report = dir.path().join("stats.txt");
        save_stats_report(&[result.stats.clone()], false, report.to_str().unwrap()).unwrap();
        let text = fs::read_to_string(&report).unwrap();
        assert!(text.contains("[x vs y]"));
        assert!(text.contains("n\t3"));

        let categories = dir.path().join("cat.csv");
        save_categories(result.heatmap.as_ref().unwrap(), "x", "y", categories.to_str().unwrap())
            .unwrap();
        let text = fs::read_to_string(&categories).unwrap();
        assert!(text.lines().nth(4).unwrap().ends_with("Low,No data,Partial data"));
    }
}
