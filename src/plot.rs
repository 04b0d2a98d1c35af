//! Visualization utilities for extinction curves

use anyhow::Result;
use plotters::prelude::*;

/// One labelled curve: (wavenumber μm⁻¹, value) pairs.
pub struct Series {
    /// Legend label
    pub label: String,
    /// Points in plotting order
    pub points: Vec<(f64, f64)>,
}

/// Draws curves against wavenumber, one colour per series, with a legend.
pub fn plot_curves(series: &[Series], y_label: &str, out_path: &str) -> Result<()> {
    let root = BitMapBackend::new(out_path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let all = || series.iter().flat_map(|s| s.points.iter()).filter(|(_, y)| y.is_finite());
    let x_max = all().map(|(x, _)| *x).fold(0.0, f64::max).max(1e-12);
    let y_min = all().map(|(_, y)| *y).fold(0.0, f64::min);
    let y_max = all().map(|(_, y)| *y).fold(0.0, f64::max).max(1e-12);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Extinction vs Wave number", ("sans-serif", 28))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..(x_max * 1.02), y_min.min(0.0)..(y_max * 1.05))?;
    chart
        .configure_mesh()
        .x_desc("Wave number [1/um]")
        .y_desc(y_label)
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let pts: Vec<(f64, f64)> =
            s.points.iter().copied().filter(|(_, y)| y.is_finite()).collect();
        chart
            .draw_series(LineSeries::new(pts, color.stroke_width(2)))?
            .label(s.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
