use std::{fmt::Display, io::Write};

use anyhow::Result;
use chrono::{DateTime, Local};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;

use crate::{storage::entities::SessionRecord, tracker::SessionTracker};

use super::{dashboard::print_history, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
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
pub struct HistoryCommand {
    #[arg(
        long,
        short,
        help = "Only show sessions started after this moment. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\""
    )]
    since: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long = "days",
        default_value_t = false,
        help = "Take --since as a whole day, so \"yesterday\" starts at midnight"
    )]
    treat_as_days: bool,
    #[arg(long, short = 'n', help = "Show at most this many sessions")]
    limit: Option<usize>,
}

/// Prints the session history filtered by the `history` command options.
pub fn process_history_command(
    tracker: &SessionTracker,
    HistoryCommand {
        since,
        date_style,
        treat_as_days,
        limit,
    }: HistoryCommand,
    colored: bool,
    out: &mut impl Write,
) -> Result<()> {
    let since = match since {
        Some(since) => Some(parse_since(&since, date_style, treat_as_days, Local::now())?),
        None => None,
    };
    let history = filter_history(tracker.sessions_history(), since, limit);
    print_history(&history, &Local, colored, out)
}

fn parse_since(
    value: &str,
    date_style: DateStyle,
    treat_as_days: bool,
    now: DateTime<Local>,
) -> Result<DateTime<Local>> {
    let since = match parse_date_string(value, now, date_style.into()) {
        Ok(v) => v.with_timezone(&Local),
        Err(e) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate since date {e}"),
                )
                .into());
        }
    };
    Ok(if treat_as_days {
        since.beginning_of_day()
    } else {
        since
    })
}

/// Expects history ordered most recent first.
fn filter_history(
    history: Vec<SessionRecord>,
    since: Option<DateTime<Local>>,
    limit: Option<usize>,
) -> Vec<SessionRecord> {
    history
        .into_iter()
        .take_while(|v| since.map_or(true, |since| v.start_time >= since))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
