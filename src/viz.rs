//! Chart and console report of the ranked customers using Plotters

use std::path::Path;

use plotters::prelude::*;

use crate::model::CustomerLtv;
use crate::pipeline::RunStats;

/// Bar colors, cycled by rank
const BAR_COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
];

/// Render ranked customers as an SVG bar chart, one bar per customer
///
/// # Arguments
/// * `ranked` - Top-N customers, highest LTV first
/// * `output_path` - Path to save the SVG chart
/// * `chart_title` - Title for the chart
///
/// # Returns
/// * Result indicating success or failure
pub fn create_ltv_chart(
    ranked: &[(&str, &CustomerLtv)],
    output_path: &Path,
    chart_title: Option<&str>,
) -> crate::Result<()> {
    if ranked.is_empty() {
        anyhow::bail!("No customers to plot");
    }
    let title = chart_title.unwrap_or("Top Customers by Estimated Lifetime Value");

    let max_ltv = ranked.iter().map(|(_, totals)| totals.ltv).fold(0.0, f64::max);
    let y_max = if max_ltv > 0.0 { max_ltv * 1.1 } else { 1.0 };

    let root = SVGBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..ranked.len()).into_segmented(), 0f64..y_max)?;

    let customer_label = |x: &SegmentValue<usize>| match x {
        SegmentValue::CenterOf(rank) => ranked
            .get(*rank)
            .map(|(customer_id, _)| customer_id.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(ranked.len())
        .x_label_formatter(&customer_label)
        .x_desc("Customer")
        .y_desc("Estimated LTV")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (rank, (_, totals)) in ranked.iter().enumerate() {
        let color = BAR_COLORS[rank % BAR_COLORS.len()];
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (SegmentValue::Exact(rank), 0.0),
                (SegmentValue::Exact(rank + 1), totals.ltv),
            ],
            color.filled(),
        )))?;
    }

    root.present()?;
    tracing::info!(path = %output_path.display(), bars = ranked.len(), "LTV chart saved");

    Ok(())
}

/// Print run counters and the ranked table to the console
pub fn print_ltv_summary(stats: &RunStats, ranked: &[(&str, &CustomerLtv)]) {
    println!("\n=== Run Statistics ===");
    println!("Records read: {}", stats.records);
    println!("Skipped (no event_time): {}", stats.skipped_no_time);
    println!("Unique customers: {}", stats.customers);
    println!("Weekly buckets: {} ({} gap-filled)", stats.buckets, stats.gap_filled);

    println!("\n=== Top {} Customers by LTV ===", ranked.len());
    println!("  Rank | Customer         |        LTV | Orders |  Amount | Weeks | Avg/Week");
    println!("  -----|------------------|------------|--------|---------|-------|---------");
    for (rank, (customer_id, totals)) in ranked.iter().enumerate() {
        println!(
            "  {:4} | {:16} | {:10.2} | {:6} | {:7.2} | {:5} | {:8.2}",
            rank + 1,
            customer_id,
            totals.ltv,
            totals.total_orders,
            totals.total_order_amount,
            totals.total_weeks,
            totals.avg_weekly_spend()
        );
    }
}
