use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;

use crate::category::{Agreement, Category, HeatmapRow};
use crate::compare::{Comparison, Groups};
use crate::region::RegionTable;
use crate::stats::RegressionStats;

const GROUP_COLORS: [RGBColor; 2] = [RGBColor(31, 119, 180), RGBColor(214, 39, 40)];
/// Upper bound of the profile y-axis when clamping is on
const CLAMP_Y_MAX: f64 = 1.0;

pub fn category_color(category: Category) -> RGBColor {
    match category {
        Category::NoData => RGBColor(128, 128, 128),
        Category::Zero => RGBColor(0, 0, 0),
        Category::Low => RGBColor(0, 0, 255),
        Category::Medium => RGBColor(255, 165, 0),
        Category::High => RGBColor(139, 0, 0),
    }
}

pub fn agreement_color(agreement: Agreement) -> RGBColor {
    match agreement {
        Agreement::NoData => RGBColor(128, 128, 128),
        Agreement::PartialData => RGBColor(200, 200, 200),
        Agreement::AgreementZero => RGBColor(0, 0, 0),
        Agreement::AgreementLow => RGBColor(0, 0, 255),
        Agreement::AgreementHigh => RGBColor(139, 0, 0),
        Agreement::Disagreement => RGBColor(148, 0, 211),
    }
}

/// Padded axis range; (0, 1) when there is nothing to show
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Scatter of the paired group values with the fitted line and y = x
pub fn plot_scatter(
    comparison: &Comparison,
    stats: &RegressionStats,
    output_path: &str,
) -> Result<(), Box<dyn Error>> {
    let (x, y) = comparison.paired();
    let (lo, hi) = axis_range(x.iter().chain(y.iter()).copied());
    let scale = if comparison.log_transform { "log10 " } else { "" };

    let root = BitMapBackend::new(output_path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(comparison.pair_label(), ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(lo..hi, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc(format!("{}reactivity ({})", scale, comparison.names[0]))
        .y_desc(format!("{}reactivity ({})", scale, comparison.names[1]))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            vec![(lo, lo), (hi, hi)],
            RGBColor(160, 160, 160).stroke_width(1),
        ))?
        .label("y = x")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(160, 160, 160)));

    chart.draw_series(
        x.iter()
            .zip(y.iter())
            .map(|(&a, &b)| Circle::new((a, b), 4, GROUP_COLORS[0].mix(0.6).filled())),
    )?;

    if stats.slope.is_finite() && stats.intercept.is_finite() {
        let fit = |v: f64| stats.intercept + stats.slope * v;
        chart
            .draw_series(LineSeries::new(
                vec![(lo, fit(lo)), (hi, fit(hi))],
                RED.stroke_width(2),
            ))?
            .label(format!(
                "fit: y = {:.3}x + {:.3} (R² = {:.3})",
                stats.slope, stats.intercept, stats.r_squared
            ))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.draw(&Text::new(
        format!(
            "n = {}   Pearson r = {:.3}   Spearman rho = {:.3}   p(slope = 1) = {:.3e}",
            stats.n, stats.pearson, stats.spearman, stats.p_value
        ),
        (100, 870),
        ("sans-serif", 16).into_font(),
    ))?;

    root.present()?;
    Ok(())
}

/// Three-row heatmap: group 1 category, group 2 category, agreement
pub fn plot_heatmap(
    rows: &[HeatmapRow],
    names: &[String; 2],
    output_path: &str,
) -> Result<(), Box<dyn Error>> {
    if rows.is_empty() {
        return Err("No positions to draw in the heatmap".into());
    }
    let start = rows.iter().map(|r| r.position).min().unwrap_or(0) as f64;
    let end = rows.iter().map(|r| r.position).max().unwrap_or(0) as f64 + 1.0;

    let root = BitMapBackend::new(output_path, (1600, 420)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(320);

    let mut chart = ChartBuilder::on(&upper)
        .caption("Reactivity categories", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(170)
        .build_cartesian_2d(start..end, 0.0..3.0)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .x_desc("Position")
        .x_label_formatter(&|x| format!("{}", *x as i64))
        .draw()?;

    let track_rows: [(String, Box<dyn Fn(&HeatmapRow) -> RGBColor>); 3] = [
        (names[0].clone(), Box::new(|r: &HeatmapRow| category_color(r.category1))),
        (names[1].clone(), Box::new(|r: &HeatmapRow| category_color(r.category2))),
        ("Agreement".to_string(), Box::new(|r: &HeatmapRow| agreement_color(r.agreement))),
    ];

    for (i, (label, color_of)) in track_rows.iter().enumerate() {
        // first track on top
        let y0 = 2.0 - i as f64;
        chart.draw_series(rows.iter().map(|r| {
            let x0 = r.position as f64;
            Rectangle::new([(x0, y0 + 0.05), (x0 + 1.0, y0 + 0.95)], color_of(r).filled())
        }))?;

        let (px, py) = chart.backend_coord(&(start, y0 + 0.5));
        upper.draw(&Text::new(
            label.clone(),
            (px - 10, py),
            TextStyle::from(("sans-serif", 18).into_font())
                .pos(Pos::new(HPos::Right, VPos::Center)),
        ))?;
    }

    let mut legend: Vec<(String, RGBColor)> = Category::ALL
        .iter()
        .map(|&c| (c.label().to_string(), category_color(c)))
        .collect();
    legend.extend(
        Agreement::ALL
            .iter()
            .filter(|&&a| a != Agreement::NoData)
            .map(|&a| (a.label().to_string(), agreement_color(a))),
    );
    for (i, (label, color)) in legend.iter().enumerate() {
        let x = 30 + (i % 6) as i32 * 260;
        let y = 20 + (i / 6) as i32 * 35;
        lower.draw(&Rectangle::new([(x, y), (x + 18, y + 18)], color.filled()))?;
        lower.draw(&Text::new(label.clone(), (x + 26, y + 2), ("sans-serif", 16).into_font()))?;
    }

    root.present()?;
    Ok(())
}

/// Split a series into runs of consecutive positions with data
fn runs_with_data(series: &[(i64, Option<f64>)], ceiling: Option<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut last: Option<i64> = None;
    for &(pos, value) in series {
        match value {
            Some(v) if last.map_or(true, |l| l + 1 == pos) => {
                let v = ceiling.map_or(v, |c| v.min(c));
                current.push((pos as f64, v));
                last = Some(pos);
            }
            Some(v) => {
                runs.push(std::mem::take(&mut current));
                let v = ceiling.map_or(v, |c| v.min(c));
                current.push((pos as f64, v));
                last = Some(pos);
            }
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                last = None;
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|r| !r.is_empty());
    runs
}

/// Per-sample reactivity profiles over the region, colored by group
pub fn plot_profile(
    table: &RegionTable,
    groups: &Groups,
    clamp_y: bool,
    output_path: &str,
) -> Result<(), Box<dyn Error>> {
    let start = table.region.start as f64;
    let end = table.region.end as f64;
    let ceiling = if clamp_y { Some(CLAMP_Y_MAX) } else { None };
    let (y_lo, y_hi) = if clamp_y {
        let min = table
            .cells
            .values()
            .flatten()
            .flatten()
            .fold(0.0f64, |a, &b| a.min(b));
        (min, CLAMP_Y_MAX)
    } else {
        let (lo, hi) = axis_range(table.cells.values().flatten().flatten().copied());
        (lo.min(0.0), hi)
    };

    let root = BitMapBackend::new(output_path, (1600, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Reactivity profiles ({} coordinates)", table.axis),
            ("sans-serif", 26),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(start..end.max(start + 1.0), y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Position")
        .y_desc("Reactivity")
        .x_label_formatter(&|x| format!("{}", *x as i64))
        .draw()?;

    for (g, members) in groups.members.iter().enumerate() {
        let color = GROUP_COLORS[g];
        for (k, &idx) in members.iter().enumerate() {
            let series = table.sample_series(idx);
            for (r, run) in runs_with_data(&series, ceiling).into_iter().enumerate() {
                let drawn = chart.draw_series(LineSeries::new(run, color.mix(0.7).stroke_width(2)))?;
                if k == 0 && r == 0 {
                    drawn
                        .label(groups.names[g].clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
