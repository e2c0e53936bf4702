mod tui;

use anyhow::{bail, Context, Result};
use calgraph_core::{
    IntensityScheme, Scope, SchemeKind, SourceRegistry, StatisticsSnapshot, TrendBucket,
    WeekdaySet,
};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "calgraph")]
#[command(author, version, about = "Calendar heatmap analytics for .ics files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value = "green", global = true)]
    theme: String,

    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Args, Clone)]
struct ViewArgs {
    #[arg(
        short,
        long = "input",
        help = "Calendar file or directory to load (repeatable)",
        global = true
    )]
    inputs: Vec<PathBuf>,

    #[arg(long, help = "Filter by year (YYYY)", global = true)]
    year: Option<i32>,

    #[arg(long, help = "Filter by month (YYYY-MM)", global = true)]
    month: Option<String>,

    #[arg(long, help = "Filter by ISO week (YYYY-Www)", global = true)]
    week: Option<String>,

    #[arg(long, help = "Start date (YYYY-MM-DD)", global = true)]
    since: Option<String>,

    #[arg(long, help = "End date (YYYY-MM-DD)", global = true)]
    until: Option<String>,

    #[arg(
        long,
        help = "Weekday filter: all, weekdays, weekend, or day names (e.g. mon,wed,fri)",
        default_value = "all",
        global = true
    )]
    weekdays: String,

    #[arg(long, help = "Filter events by title substring", global = true)]
    search: Option<String>,

    #[arg(long, help = "Intensity scheme: coarse or fine", default_value = "coarse", global = true)]
    scheme: String,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show summary statistics")]
    Stats {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Export heatmap data")]
    Graph {
        #[arg(short, long, help = "Write JSON to file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Show processing time")]
        benchmark: bool,
    },
    #[command(about = "Show activity trend over time")]
    Trend {
        #[arg(long, help = "Bucket size: day, week, month, or year", default_value = "day")]
        by: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show time totals per calendar source")]
    Categories {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show minutes by hour of day")]
    Hourly {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Open the interactive heatmap view")]
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    }

    let weekdays: WeekdaySet = cli
        .view
        .weekdays
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let scheme_kind: SchemeKind = cli
        .view
        .scheme
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    // A `[intensity] thresholds` entry in ~/.calgraph overrides the built-in
    // schemes entirely.
    let scheme = tui::config::CalgraphConfig::load()
        .custom_thresholds()
        .and_then(IntensityScheme::custom)
        .unwrap_or_else(|| scheme_kind.scheme());
    let scope = build_scope(&cli.view)?;

    match cli.command {
        Some(Commands::Stats { json }) => {
            let registry = load_registry(&cli.view.inputs, json)?;
            run_stats(&registry, &scope, weekdays, cli.view.search.as_deref(), json)
        }
        Some(Commands::Graph { output, benchmark }) => {
            let registry = load_registry(&cli.view.inputs, output.is_none())?;
            run_graph(
                &registry,
                &scope,
                weekdays,
                cli.view.search.as_deref(),
                &scheme,
                output,
                benchmark,
            )
        }
        Some(Commands::Trend { by, json }) => {
            let bucket: TrendBucket = by.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let registry = load_registry(&cli.view.inputs, json)?;
            run_trend(&registry, bucket, &scope, weekdays, json)
        }
        Some(Commands::Categories { json }) => {
            let registry = load_registry(&cli.view.inputs, json)?;
            run_categories(&registry, &scope, weekdays, json)
        }
        Some(Commands::Hourly { json }) => {
            let registry = load_registry(&cli.view.inputs, json)?;
            run_hourly(&registry, &scope, weekdays, json)
        }
        Some(Commands::Tui) | None => {
            let registry = load_registry(&cli.view.inputs, true)?;
            tui::run(registry, &cli.theme, scope, weekdays, scheme)
        }
    }
}

/// Resolve inputs into a registry, one source per file.
///
/// A single explicit file failing to load is fatal. In a batch (several
/// files or a directory scan) a broken file is reported and skipped so one
/// bad calendar cannot take down the whole view.
fn load_registry(inputs: &[PathBuf], quiet: bool) -> Result<SourceRegistry> {
    let files = resolve_inputs(inputs)?;
    if files.is_empty() {
        bail!("no .ics files found; pass calendar files or a directory");
    }

    let progress = if quiet || files.len() < 2 {
        None
    } else {
        let bar = indicatif::ProgressBar::new(files.len() as u64);
        bar.set_style(
            indicatif::ProgressStyle::with_template("  {spinner} loading {pos}/{len} {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    let strict = files.len() == 1;
    let mut registry = SourceRegistry::new();
    for path in &files {
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if let Some(bar) = &progress {
            bar.set_message(source_id.clone());
            bar.inc(1);
        }
        match calgraph_core::ics::load_path(path) {
            Ok(events) => registry.add(source_id, calgraph_core::aggregate(events)),
            Err(e) if strict => return Err(e).context(format!("failed to load {}", path.display())),
            Err(e) => {
                eprintln!("{}", format!("  ! skipping {}: {}", path.display(), e).yellow());
            }
        }
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if registry.is_empty() {
        bail!("none of the {} calendar files could be loaded", files.len());
    }
    Ok(registry)
}

fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Ok(calgraph_core::scanner::scan_directory(
            &std::env::current_dir().context("cannot read current directory")?,
        ));
    }

    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(calgraph_core::scanner::scan_directory(input));
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Translate the date flags into a single scope. Precedence: week, month,
/// year, then since/until; with no flags the current year is used.
fn build_scope(view: &ViewArgs) -> Result<Scope> {
    let given = [
        view.week.is_some(),
        view.month.is_some(),
        view.year.is_some(),
        view.since.is_some() || view.until.is_some(),
    ]
    .iter()
    .filter(|&&g| g)
    .count();
    if given > 1 {
        bail!("pass at most one of --week, --month, --year, or --since/--until");
    }

    if let Some(week) = &view.week {
        return parse_week(week);
    }
    if let Some(month) = &view.month {
        return parse_month(month);
    }
    if let Some(year) = view.year {
        return Ok(Scope::Year(year));
    }
    if view.since.is_some() || view.until.is_some() {
        let today = chrono::Local::now().date_naive();
        let since = match &view.since {
            Some(s) => parse_date(s)?,
            None => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        };
        let until = match &view.until {
            Some(s) => parse_date(s)?,
            None => today,
        };
        if since > until {
            bail!("--since {} is after --until {}", since, until);
        }
        return Ok(Scope::Range(since, until));
    }

    Ok(Scope::Year(chrono::Local::now().year()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

fn parse_month(s: &str) -> Result<Scope> {
    let (year, month) = s
        .split_once('-')
        .with_context(|| format!("invalid month '{}', expected YYYY-MM", s))?;
    let year: i32 = year.parse().with_context(|| format!("invalid year in '{}'", s))?;
    let month: u32 = month.parse().with_context(|| format!("invalid month in '{}'", s))?;
    if !(1..=12).contains(&month) {
        bail!("month must be 1-12, got {}", month);
    }
    Ok(Scope::Month(year, month))
}

fn parse_week(s: &str) -> Result<Scope> {
    let (year, week) = s
        .split_once("-W")
        .or_else(|| s.split_once("-w"))
        .with_context(|| format!("invalid week '{}', expected YYYY-Www", s))?;
    let year: i32 = year.parse().with_context(|| format!("invalid year in '{}'", s))?;
    let week: u32 = week.parse().with_context(|| format!("invalid week in '{}'", s))?;
    if !(1..=53).contains(&week) {
        bail!("week must be 1-53, got {}", week);
    }
    Ok(Scope::Week(year, week))
}

fn scoped_dataset(
    registry: &SourceRegistry,
    search: Option<&str>,
) -> calgraph_core::CalendarDataset {
    let combined = registry.combined();
    match search {
        Some(query) => calgraph_core::search(&combined, query),
        None => combined,
    }
}

fn run_stats(
    registry: &SourceRegistry,
    scope: &Scope,
    weekdays: WeekdaySet,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let dataset = scoped_dataset(registry, search);
    let snapshot = calgraph_core::compute(&dataset, scope, weekdays);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct StatsJson<'a> {
            scope: String,
            sources: usize,
            #[serde(flatten)]
            summary: &'a StatisticsSnapshot,
        }
        let output = StatsJson {
            scope: describe_scope(scope),
            sources: registry.len(),
            summary: &snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Scope".to_string(), describe_scope(scope)]);
    table.add_row(vec!["Sources".to_string(), registry.len().to_string()]);
    table.add_row(vec!["Active days".to_string(), snapshot.active_days.to_string()]);
    table.add_row(vec!["Events".to_string(), snapshot.total_events.to_string()]);
    table.add_row(vec![
        "Total time".to_string(),
        format_duration(snapshot.total_minutes),
    ]);
    table.add_row(vec![
        "Busiest day".to_string(),
        format_duration(snapshot.max_minutes),
    ]);
    table.add_row(vec![
        "Daily average".to_string(),
        format!("{:.1} min", snapshot.average_minutes),
    ]);
    table.add_row(vec![
        "Activity".to_string(),
        format!(
            "{:.1}% of {} days",
            snapshot.activity_percentage, snapshot.capacity_days
        ),
    ]);
    table.add_row(vec![
        "Longest streak".to_string(),
        format!("{} days", snapshot.longest_streak),
    ]);
    table.add_row(vec![
        "Current streak".to_string(),
        format!("{} days", snapshot.current_streak),
    ]);
    println!("{table}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_graph(
    registry: &SourceRegistry,
    scope: &Scope,
    weekdays: WeekdaySet,
    search: Option<&str>,
    scheme: &IntensityScheme,
    output: Option<PathBuf>,
    benchmark: bool,
) -> Result<()> {
    let start = Instant::now();
    let dataset = scoped_dataset(registry, search);
    let processing_time_ms = start.elapsed().as_millis() as u32;
    let report =
        calgraph_core::generate_report(&dataset, scope, weekdays, scheme, processing_time_ms);

    let json_output = serde_json::to_string_pretty(&report)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json_output)
            .with_context(|| format!("cannot write {}", output_path.display()))?;
        eprintln!(
            "{}",
            format!("✓ Heatmap data written to {}", output_path.display()).green()
        );
        eprintln!(
            "{}",
            format!(
                "  {} days, {} sources",
                report.days.len(),
                registry.len()
            )
            .bright_black()
        );
        if benchmark {
            eprintln!(
                "{}",
                format!("  Processing time: {}ms", report.meta.processing_time_ms).bright_black()
            );
        }
    } else {
        println!("{}", json_output);
    }
    Ok(())
}

fn run_trend(
    registry: &SourceRegistry,
    bucket: TrendBucket,
    scope: &Scope,
    weekdays: WeekdaySet,
    json: bool,
) -> Result<()> {
    let series = registry.trend_series(bucket, Some(scope), weekdays);

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Period", "Events", "Time"]);
    for point in &series {
        table.add_row(vec![
            point.bucket.clone(),
            point.event_count.to_string(),
            format_duration(point.total_minutes),
        ]);
    }
    println!("{table}");

    let total: i64 = series.iter().map(|p| p.total_minutes).sum();
    println!("\nTotal: {}", format_duration(total));
    Ok(())
}

fn run_categories(
    registry: &SourceRegistry,
    scope: &Scope,
    weekdays: WeekdaySet,
    json: bool,
) -> Result<()> {
    let totals = registry.category_totals(Some(scope), weekdays);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CategoryJson {
            source: String,
            total_minutes: i64,
        }
        let output: Vec<CategoryJson> = totals
            .into_iter()
            .map(|(source, total_minutes)| CategoryJson {
                source,
                total_minutes,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let grand_total: i64 = totals.iter().map(|(_, t)| t).sum();

    use comfy_table::{ContentArrangement, Table};
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Time", "Share"]);
    for (source, total) in &totals {
        let share = if grand_total > 0 {
            *total as f64 / grand_total as f64 * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            source.clone(),
            format_duration(*total),
            format!("{:.1}%", share),
        ]);
    }
    println!("{table}");
    println!("\nTotal: {}", format_duration(grand_total));
    Ok(())
}

fn run_hourly(
    registry: &SourceRegistry,
    scope: &Scope,
    weekdays: WeekdaySet,
    json: bool,
) -> Result<()> {
    let hours = registry.hourly_distribution(Some(scope), weekdays);

    if json {
        println!("{}", serde_json::to_string_pretty(&hours.to_vec())?);
        return Ok(());
    }

    let max = hours.iter().copied().max().unwrap_or(0);
    for (hour, &minutes) in hours.iter().enumerate() {
        let width = if max > 0 {
            (minutes * 40 / max) as usize
        } else {
            0
        };
        let bar = "█".repeat(width);
        println!(
            "{:>2}:00 {:>8} {}",
            hour,
            format_duration(minutes),
            bar.green()
        );
    }
    Ok(())
}

fn describe_scope(scope: &Scope) -> String {
    match scope {
        Scope::Year(y) => format!("{}", y),
        Scope::Month(y, m) => format!("{:04}-{:02}", y, m),
        Scope::Week(y, w) => format!("{:04}-W{:02}", y, w),
        Scope::Range(since, until) => format!("{} to {}", since, until),
    }
}

fn format_duration(minutes: i64) -> String {
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(f: impl FnOnce(&mut ViewArgs)) -> ViewArgs {
        let mut args = ViewArgs {
            inputs: Vec::new(),
            year: None,
            month: None,
            week: None,
            since: None,
            until: None,
            weekdays: "all".to_string(),
            search: None,
            scheme: "coarse".to_string(),
        };
        f(&mut args);
        args
    }

    #[test]
    fn test_scope_precedence_rejects_conflicts() {
        let args = view(|v| {
            v.year = Some(2024);
            v.month = Some("2024-02".to_string());
        });
        assert!(build_scope(&args).is_err());
    }

    #[test]
    fn test_month_and_week_parsing() {
        let args = view(|v| v.month = Some("2024-02".to_string()));
        assert!(matches!(build_scope(&args).unwrap(), Scope::Month(2024, 2)));

        let args = view(|v| v.week = Some("2024-W05".to_string()));
        assert!(matches!(build_scope(&args).unwrap(), Scope::Week(2024, 5)));

        let args = view(|v| v.week = Some("2024-W60".to_string()));
        assert!(build_scope(&args).is_err());

        let args = view(|v| v.month = Some("2024-13".to_string()));
        assert!(build_scope(&args).is_err());
    }

    #[test]
    fn test_range_scope_validation() {
        let args = view(|v| {
            v.since = Some("2024-03-01".to_string());
            v.until = Some("2024-02-01".to_string());
        });
        assert!(build_scope(&args).is_err());

        let args = view(|v| {
            v.since = Some("2024-02-01".to_string());
            v.until = Some("2024-03-01".to_string());
        });
        assert!(matches!(build_scope(&args).unwrap(), Scope::Range(_, _)));
    }

    #[test]
    fn test_default_scope_is_current_year() {
        let args = view(|_| {});
        let scope = build_scope(&args).unwrap();
        assert_eq!(scope, Scope::Year(chrono::Local::now().year()));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h 00m");
        assert_eq!(format_duration(135), "2h 15m");
    }
}
