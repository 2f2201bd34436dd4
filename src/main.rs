//! Installment Reserve CLI
//!
//! Command-line interface for the installment present-value calculator

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use installment_reserve::instrument::{CalculatorForm, InstrumentKind};
use installment_reserve::rate_source::{HttpRateSource, RateQuote, StaticRateSource};
use installment_reserve::reserve::{present_value_schedule, CalculationInput, RateTrend, ReserveQuote};
use installment_reserve::scenario::ScenarioRunner;
use installment_reserve::tax::REGRESSIVE_BRACKETS;
use installment_reserve::trajectory::{generate_trajectory, write_csv, TrajectoryInput, TrajectorySummary};

#[derive(Debug, Parser)]
#[command(name = "installment_reserve", version, about = "How much to set aside today to pay your installments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Headline amount to invest today
    Quote {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long)]
        json: bool,
    },
    /// Month-by-month balance of the investment
    Trajectory {
        #[command(flatten)]
        plan: PlanArgs,
        /// Write the series to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Per-installment discounting breakdown
    Schedule {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long)]
        json: bool,
    },
    /// Compare rate trends and safety margin side by side
    Scenarios {
        #[command(flatten)]
        plan: PlanArgs,
        /// Sweep these annual rates (%) instead of the trend grid
        #[arg(long, value_delimiter = ',')]
        rates: Vec<f64>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Total price, comma or dot as decimal separator
    #[arg(long, env = "INSTALLMENT_TOTAL")]
    total: String,

    /// Number of monthly installments (1-99)
    #[arg(long, short = 'n', env = "INSTALLMENT_COUNT", default_value = "6")]
    installments: String,

    /// Annual rate in % (plain) or % of CDI (cdb, lci); empty uses the reference rate
    #[arg(long, env = "ANNUAL_RATE_PCT", default_value = "")]
    rate: String,

    /// Investment class
    #[arg(long, value_enum, env = "INSTRUMENT_KIND", default_value_t = InstrumentKind::PlainRate)]
    class: InstrumentKind,

    /// Rate drift scenario
    #[arg(long, value_enum, env = "RATE_TREND", default_value_t = RateTrend::Stable)]
    trend: RateTrend,

    /// Shrink the rate by 5% for the headline figure
    #[arg(long, env = "SAFETY_MARGIN")]
    safety_margin: bool,

    /// Reference (Selic) rate in % a.a.
    #[arg(long, env = "REFERENCE_RATE_PCT", conflicts_with = "fetch_rate")]
    reference_rate: Option<f64>,

    /// Look the reference rate up online (falls back to 11.25%)
    #[arg(long)]
    fetch_rate: bool,
}

impl PlanArgs {
    fn reference_rate(&self) -> Result<RateQuote> {
        let mut quote = RateQuote::pending();
        if let Some(rate) = self.reference_rate {
            quote = RateQuote::resolve(&StaticRateSource(rate));
        } else if self.fetch_rate {
            let source = HttpRateSource::new().context("Failed to build rate client")?;
            quote = RateQuote::resolve(&source);
        }
        Ok(quote)
    }

    fn to_input(&self) -> Result<CalculationInput> {
        let reference = self.reference_rate()?;
        if reference.is_fallback() {
            eprintln!("Reference rate unavailable, using fallback of {:.2}%", reference.rate.unwrap_or_default());
        }

        let form = CalculatorForm {
            total: self.total.clone(),
            installments: self.installments.clone(),
            rate: self.rate.clone(),
            kind: self.class,
            rate_trend: self.trend,
            safety_margin: self.safety_margin,
        };
        let input = form
            .to_input(reference.rate)
            .context("Invalid calculator input")?;

        info!(
            "{} installments of {:.2} at {:.4}% a.a. ({:?}, exempt={})",
            input.installment_count,
            input.installment_amount(),
            input.annual_rate * 100.0,
            input.rate_trend,
            input.tax_exempt,
        );
        Ok(input)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput {
    input: CalculationInput,
    #[serde(flatten)]
    quote: ReserveQuote,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Quote { plan, json } => run_quote(&plan.to_input()?, json),
        Command::Trajectory { plan, csv } => run_trajectory(&plan.to_input()?, csv),
        Command::Schedule { plan, json } => run_schedule(&plan.to_input()?, json),
        Command::Scenarios { plan, rates, json } => run_scenarios(&plan.to_input()?, &rates, json),
    }
}

fn run_quote(input: &CalculationInput, json: bool) -> Result<()> {
    let quote = ReserveQuote::from_input(input);

    if json {
        let output = QuoteOutput { input: *input, quote };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Installment value:      R$ {:>12.2}", quote.installment_amount);
    println!("Set aside today:        R$ {:>12.2}", quote.present_value);
    println!("Paid by interest:       R$ {:>12.2}", quote.savings);
    println!();
    println!("Installments start in month 2, returns compound monthly and withholding tax");
    println!("is charged on the gain of each withdrawal.");
    match input.rate_trend {
        RateTrend::Falling => println!("Assuming the rate falls 0.25 pp every 3 months."),
        RateTrend::Rising => println!("Assuming the rate rises 0.25 pp every 3 months."),
        RateTrend::Stable => {}
    }
    if input.safety_margin {
        println!("Safety margin on: rate reduced by 5%.");
    }
    if input.tax_exempt {
        println!("Tax exempt investment: no withholding.");
    }
    Ok(())
}

fn run_trajectory(input: &CalculationInput, csv: Option<PathBuf>) -> Result<()> {
    let points = generate_trajectory(&TrajectoryInput::from(input));
    if points.is_empty() {
        println!("Nothing to simulate: total, installments and rate must all be positive.");
        return Ok(());
    }

    println!("{:>5} {:>14} {:>14} {:>14}", "Month", "Balance", "Invested", "Withdrawn");
    println!("{}", "-".repeat(50));
    for point in &points {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2}",
            point.month, point.balance, point.invested, point.withdrawn
        );
    }

    let summary = TrajectorySummary::from_points(&points);
    println!("\nSummary:");
    println!("  Months: {}", summary.total_months);
    println!("  Initial investment: R$ {:.2}", summary.initial_investment);
    println!("  Total withdrawn: R$ {:.2}", summary.total_withdrawn);
    println!("  Final balance: R$ {:.2}", summary.final_balance);
    if let Some(month) = summary.depleted_month {
        println!("  Balance runs out in month {}", month);
    }

    if let Some(path) = csv {
        let file = File::create(&path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        write_csv(&points, file).context("Failed to write trajectory CSV")?;
        println!("\nTrajectory written to: {}", path.display());
    }
    Ok(())
}

fn run_schedule(input: &CalculationInput, json: bool) -> Result<()> {
    let schedule = present_value_schedule(input);

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!("{:>4} {:>5} {:>5} {:>10} {:>6} {:>12} {:>12}",
        "#", "Month", "Days", "Rate a.a.", "Tax", "Installment", "Today");
    println!("{}", "-".repeat(62));
    for value in &schedule {
        println!("{:>4} {:>5} {:>5} {:>9.4}% {:>5.1}% {:>12.2} {:>12.2}",
            value.index + 1,
            value.month,
            value.elapsed_days,
            value.annual_rate * 100.0,
            value.tax_rate * 100.0,
            value.amount,
            value.present_value,
        );
    }

    let total: f64 = schedule.iter().map(|v| v.present_value).sum();
    println!("{}", "-".repeat(62));
    println!("{:>49} {:>12.2}", "Total", total);

    println!("\nWithholding tax by holding period:");
    let mut lower = 0;
    for bracket in &REGRESSIVE_BRACKETS {
        match bracket.max_days {
            Some(max) => println!("  {:>4} to {:>4} days: {:>5.1}%", lower, max, bracket.rate * 100.0),
            None => println!("  above {:>4} days:   {:>5.1}%", lower - 1, bracket.rate * 100.0),
        }
        lower = bracket.max_days.map_or(lower, |max| max + 1);
    }
    Ok(())
}

fn run_scenarios(input: &CalculationInput, rates_pct: &[f64], json: bool) -> Result<()> {
    let runner = ScenarioRunner::new(*input);
    let outcomes = if rates_pct.is_empty() {
        runner.run_grid()
    } else {
        let rates: Vec<f64> = rates_pct.iter().map(|pct| pct / 100.0).collect();
        runner.run_rates(&rates)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    println!("{:>10} {:>8} {:>7} {:>14} {:>14}", "Rate a.a.", "Trend", "Margin", "Today", "By interest");
    println!("{}", "-".repeat(57));
    for outcome in &outcomes {
        println!("{:>9.2}% {:>8} {:>7} {:>14.2} {:>14.2}",
            outcome.annual_rate * 100.0,
            outcome.rate_trend.label(),
            if outcome.safety_margin { "yes" } else { "no" },
            outcome.present_value,
            outcome.savings,
        );
    }
    Ok(())
}
