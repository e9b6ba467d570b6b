use std::{io::Read, process::ExitCode};

use calfeed::{
    ParserOptions, expand_feed,
    types::Tz,
    window::{format_duration, group_by_month, in_display_window, sort_by_start},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "expand-feed")]
#[command(about = "Print the occurrences of the coming months from a calendar feed")]
struct Cli {
    /// Feed file, or `-` to read standard input
    path: String,

    /// IANA time zone to expand in (e.g., "America/New_York"), the system zone by default
    #[arg(long)]
    tz: Option<chrono_tz::Tz>,
}

fn read_input(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Reads a calendar feed and prints the occurrences of the coming months, grouped by month.
pub fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.path;
    let timezone = cli.tz.map_or(Tz::Local, Tz::Olson);

    let input = match read_input(&path) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Unable to load calendar events from {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let options = ParserOptions::new(timezone).pinned();
    let now = options.now();
    let mut occurrences = expand_feed(&input, &options);
    sort_by_start(&mut occurrences);

    for (month, events) in group_by_month(in_display_window(&occurrences, now, &timezone)) {
        println!("{}", month.label());
        for event in events {
            let when = if event.is_all_day {
                event.start.format("%a %b %e, all day").to_string()
            } else {
                format!(
                    "{} ({})",
                    event.start.format("%a %b %e, %l:%M %p"),
                    format_duration(event.duration())
                )
            };
            println!("  {when}  {}", event.title);
            if !event.location.is_empty() {
                println!("      {}", event.location);
            }
        }
    }
    ExitCode::SUCCESS
}
