//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::model::LtvConfig;

/// Rank customers by estimated lifetime value from a JSON event stream
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input events (JSON array or JSON lines)
    #[arg(short, long, default_value = "input/input.json")]
    pub input: PathBuf,

    /// Output path for the ranked CSV
    #[arg(short, long, default_value = "output/top_ltvs.csv")]
    pub output: PathBuf,

    /// Number of customers to return; clamped to [0, min(customers, 500)]
    #[arg(short = 'n', long, default_value = "4", allow_negative_numbers = true)]
    pub top_n: i64,

    /// Weeks per year used to annualize weekly spend
    #[arg(long, default_value = "52")]
    pub weeks_per_year: u32,

    /// Customer lifespan in years
    #[arg(long = "years", default_value = "10")]
    pub years_horizon: u32,

    /// Write every running total to the CSV, not only the LTV
    #[arg(long)]
    pub with_metrics: bool,

    /// Optional path for an SVG bar chart of the ranked customers
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the extrapolation settings, rejecting a zero horizon
    pub fn ltv_config(&self) -> crate::Result<LtvConfig> {
        if self.weeks_per_year == 0 {
            anyhow::bail!("--weeks-per-year must be greater than zero");
        }
        if self.years_horizon == 0 {
            anyhow::bail!("--years must be greater than zero");
        }

        Ok(LtvConfig {
            weeks_per_year: self.weeks_per_year,
            years_horizon: self.years_horizon,
        })
    }
}
