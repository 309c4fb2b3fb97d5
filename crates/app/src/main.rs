use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use screening_core::model::{Milestone, Response};
use services::{Clock, ScreeningHistoryService, ScreeningLoopService, ScreeningSession};
use storage::repository::{CatalogRepository, Storage};
use storage::seed::default_milestones;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingAge,
    InvalidAge { raw: String },
    InvalidDbUrl { raw: String },
    InvalidDays { raw: String },
    InvalidLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingAge => {
                write!(f, "screen requires --age <months> (or SCREENING_AGE_MONTHS)")
            }
            ArgsError::InvalidAge { raw } => write!(f, "invalid --age value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- screen  [--db <sqlite_url>] --age <months>");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>] [--days <n>] [--limit <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!("  --days 30, --limit 20");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SCREENING_DB_URL, SCREENING_AGE_MONTHS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Screen,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "screen" => Some(Self::Screen),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    age_months: Option<f64>,
    days: i64,
    limit: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SCREENING_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut age_months = std::env::var("SCREENING_AGE_MONTHS")
            .ok()
            .and_then(|value| value.parse::<f64>().ok());
        let mut days = 30_i64;
        let mut limit = 20_u32;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--age" => {
                    let value = require_value(args, "--age")?;
                    let parsed: f64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidAge { raw: value.clone() })?;
                    age_months = Some(parsed);
                }
                "--days" => {
                    let value = require_value(args, "--days")?;
                    days = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            age_months,
            days,
            limit,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Load the built-in catalog on first run so `screen` works out of the box.
async fn ensure_catalog(
    catalogs: &dyn CatalogRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    let existing = catalogs.fetch_milestones().await?;
    if existing.is_empty() {
        catalogs.replace_milestones(&default_milestones()).await?;
    }
    Ok(())
}

/// One string→response translation for the whole terminal boundary.
fn parse_response(input: &str) -> Option<Response> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Response::Yes),
        "s" | "sometimes" => Some(Response::Sometimes),
        "n" | "no" | "not yet" | "not_yet" => Some(Response::NotYet),
        _ => None,
    }
}

fn ask_question(milestone: &Milestone, number: usize) -> Result<Response, io::Error> {
    println!();
    println!("{number}. {}", milestone.display_name());
    if let Some(description) = milestone.description() {
        println!("   {description}");
    }

    let stdin = io::stdin();
    loop {
        print!("   [y]es / [s]ometimes / [n]ot yet > ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the screening finished",
            ));
        }

        if let Some(response) = parse_response(&line) {
            return Ok(response);
        }
        eprintln!("   please answer y, s, or n");
    }
}

fn print_summary(screening: &ScreeningSession) {
    let Some(result) = screening.result() else {
        return;
    };

    println!();
    println!("Screening complete ({} questions).", result.answers().len());
    println!(
        "  chronological age: {:.1} months",
        screening.chronological_age().months()
    );
    println!(
        "  motor age estimate: {:.1} months",
        result.age_equivalent_months()
    );
    if let Some(status) = screening.status() {
        println!("  status: {}", status.as_str());
    }
    println!("  score: {}/{}", result.raw_score(), result.max_score());

    for (category, score) in result.category_scores() {
        println!("    {}: {}/{}", category, score.raw, score.max);
    }
}

async fn run_screen(
    storage: &Storage,
    age_months: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_catalog(storage.catalog.as_ref()).await?;

    let loop_svc = ScreeningLoopService::new(
        Clock::default_clock(),
        Arc::clone(&storage.catalog),
        Arc::clone(&storage.screenings),
    );

    let mut screening = loop_svc.start_screening(age_months).await?;
    let mut number = 1;

    while let Some(milestone) = screening.current_milestone().cloned() {
        let response = ask_question(&milestone, number)?;
        loop_svc.answer_current(&mut screening, response).await?;
        number += 1;
    }

    print_summary(&screening);
    if let Some(record_id) = screening.record_id() {
        println!("  saved as record #{record_id}");
    }
    Ok(())
}

async fn run_history(
    storage: &Storage,
    days: i64,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = ScreeningHistoryService::new(
        Clock::default_clock(),
        Arc::clone(&storage.screenings),
    );

    let items = history.list_recent_screenings(days, limit).await?;
    if items.is_empty() {
        println!("no screenings in the last {days} days");
        return Ok(());
    }

    for item in items {
        println!(
            "#{} {} age {:.1} mo -> estimate {:.1} mo ({}) score {}/{}",
            item.id,
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.chronological_age_months,
            item.age_equivalent_months,
            item.status.as_str(),
            item.raw_score,
            item.max_score,
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Screen,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Screen,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Screen => {
            let age_months = parsed.age_months.ok_or_else(|| {
                let err = ArgsError::MissingAge;
                eprintln!("{err}");
                print_usage();
                err
            })?;
            run_screen(&storage, age_months).await
        }
        Command::History => run_history(&storage, parsed.days, parsed.limit).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_accepts_shorthand_and_words() {
        assert_eq!(parse_response(" y "), Some(Response::Yes));
        assert_eq!(parse_response("YES"), Some(Response::Yes));
        assert_eq!(parse_response("s"), Some(Response::Sometimes));
        assert_eq!(parse_response("not yet"), Some(Response::NotYet));
        assert_eq!(parse_response("not_yet"), Some(Response::NotYet));
        assert_eq!(parse_response("maybe"), None);
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.sqlite3".into()),
            "sqlite:///tmp/a.sqlite3"
        );
        assert!(normalize_sqlite_url("sqlite:dev.sqlite3".into()).starts_with("sqlite://"));
    }
}
