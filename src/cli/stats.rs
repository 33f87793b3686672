use std::fmt::Display;

use anyhow::Result;
use ansi_term::Colour;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    analyzer::{
        analyze_progress, consistency::DEFAULT_TOP_BLOCKS, report::daily_score_series,
        trend::WeekOverWeek, ProgressReport,
    },
    checklist::catalog::label_from_key,
    storage::log_storage::LogStorage,
    utils::percentage::Percentage,
};

use super::Args;

const CHART_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[arg(
        long = "as-of",
        help = "Day the statistics are computed for. Examples are \"yesterday\", \"15/03/2025\". Defaults to today"
    )]
    as_of: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, default_value_t = DEFAULT_TOP_BLOCKS, help = "Amount of most consistent blocks to show")]
    top: usize,
    #[arg(long, help = "Print the report as json")]
    json: bool,
}

#[derive(Debug, Parser)]
pub struct ChartCommand {
    #[arg(short = 'p', long = "min-score", help = "Only show days with at least this score", default_value_t = Percentage::default())]
    min_score: Percentage,
}

/// Command to process `stats`. Loads every log of the user and prints the [ProgressReport].
pub async fn process_stats_command(
    storage: &impl LogStorage,
    user: &str,
    StatsCommand {
        as_of,
        date_style,
        top,
        json,
    }: StatsCommand,
) -> Result<()> {
    let as_of = parse_as_of(as_of, date_style)?;
    let records = storage.get_all_logs(user).await?;
    let report = analyze_progress(&records, as_of, top);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub async fn process_chart_command(
    storage: &impl LogStorage,
    user: &str,
    ChartCommand { min_score }: ChartCommand,
) -> Result<()> {
    let records = storage.get_all_logs(user).await?;
    let series = daily_score_series(&records);
    let max = series.iter().map(|v| v.completed_count).max().unwrap_or(0);

    for day in series.iter().filter(|v| v.score >= *min_score) {
        println!(
            "{}\t{}\t{}/{}\t{}%",
            day.label(),
            Colour::Yellow.paint(bar(day.completed_count, max, CHART_WIDTH)),
            day.completed_count,
            day.total_blocks,
            day.score
        );
    }
    Ok(())
}

fn parse_as_of(as_of: Option<String>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    match as_of.map(|s| parse_date_string(&s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.with_timezone(&Local).date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to valiate as-of date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

fn print_report(report: &ProgressReport) {
    println!("Streak\t{} days", report.streak);
    println!(
        "Week\t{}\t{}\t({} vs {} blocks)",
        report.week_over_week.current_range_label,
        format_trend(&report.week_over_week),
        report.week_over_week.current_total,
        report.week_over_week.previous_total
    );

    if !report.top_blocks.is_empty() {
        println!();
        for block in &report.top_blocks {
            println!("{}\t{}", block.true_count, label_from_key(&block.block_key));
        }
    }
}

/// `+50%`, `-12%`, or `New` when there was nothing to compare against.
fn format_trend(trend: &WeekOverWeek) -> String {
    let text = match trend.percent_change {
        None => "New".to_string(),
        Some(change) => format!("{change:+}%"),
    };
    if trend.is_positive {
        Colour::Green.paint(text).to_string()
    } else {
        Colour::Red.paint(text).to_string()
    }
}

fn bar(value: u32, max: u32, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(value as usize * width / max as usize)
}
