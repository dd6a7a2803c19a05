//! LtvForge: ranks customers by estimated lifetime value
//!
//! This is the main entrypoint that orchestrates event ingestion, weekly
//! aggregation, LTV estimation, selection and output.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ltvforge::{data, viz, Args, LtvRun};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    run_pipeline(&args)
}

/// Run the full LTV pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    println!("=== Customer LTV Pipeline ===\n");

    let config = args.ltv_config()?;
    let start_time = Instant::now();

    // Step 1: Ingest events
    if args.verbose {
        println!("Step 1: Ingesting events");
        println!("  Input file: {}", args.input.display());
    }

    let ingest_start = Instant::now();
    let records = data::read_records(&args.input)?;
    let mut run = LtvRun::new(config);
    for record in &records {
        run.ingest_value(record)
            .with_context(|| format!("failed to ingest {}", args.input.display()))?;
    }
    let ingest_time = ingest_start.elapsed();

    println!("✓ Events ingested: {} records", records.len());
    if args.verbose {
        println!("  Processing time: {:.2}s", ingest_time.as_secs_f64());
        for (year, range) in run.tracker().iter() {
            println!("  {}: weeks {}..={}", year, range.min_week, range.max_week);
        }
    }

    // Step 2: Gap-fill and estimate
    if args.verbose {
        println!("\nStep 2: Computing LTVs");
        println!(
            "  Horizon: {} weeks/year x {} years",
            config.weeks_per_year, config.years_horizon
        );
    }

    let estimate_start = Instant::now();
    let report = run.finish();
    let ranked = report.top_n(args.top_n);
    let estimate_time = estimate_start.elapsed();

    println!("✓ LTVs computed for {} customers", report.stats.customers);
    if args.verbose {
        println!("  Estimation time: {:.2}s", estimate_time.as_secs_f64());
    }

    viz::print_ltv_summary(&report.stats, &ranked);

    // Step 3: Write output
    if args.verbose {
        println!("\nStep 3: Writing output");
        println!("  Output file: {}", args.output.display());
    }

    data::write_csv(&args.output, &ranked, args.with_metrics)?;
    println!("\n✓ Output written to: {}", args.output.display());

    if let Some(chart_path) = &args.chart {
        if ranked.is_empty() {
            println!("  Chart skipped: no customers selected");
        } else {
            viz::create_ltv_chart(&ranked, chart_path, None)?;
            println!("✓ Chart saved to: {}", chart_path.display());
        }
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
