use std::io::Write;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::{DateTime, TimeZone};

use crate::{
    storage::entities::SessionRecord,
    tracker::{stats::DayFocus, SessionTracker},
    utils::time::format_focused_time,
};

const BAR_WIDTH: u64 = 30;

fn paint(style: Style, text: &str, colored: bool) -> String {
    if colored {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Prints the summary block and the chart for the last 7 days.
pub fn print_stats<Tz: TimeZone>(
    tracker: &SessionTracker,
    now: DateTime<Tz>,
    colored: bool,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(
        out,
        "Total focused time\t{}",
        format_focused_time(tracker.total_focused_time())
    )?;
    writeln!(
        out,
        "Sessions\t\t{} ({} completed, {} skipped)",
        tracker.sessions().len(),
        tracker.completed_count(),
        tracker.skipped_count()
    )?;
    writeln!(out, "Skip rate\t\t{:.1}", tracker.skip_percentage())?;
    writeln!(out)?;
    writeln!(out, "Last 7 days")?;
    print_week(&tracker.weekly_breakdown(now), colored, out)
}

fn print_week(week: &[DayFocus], colored: bool, out: &mut impl Write) -> Result<()> {
    let max = week.iter().map(DayFocus::total_seconds).max().unwrap_or(0).max(1);

    for day in week {
        let completed = day.completed_seconds * BAR_WIDTH / max;
        let skipped = day.skipped_seconds * BAR_WIDTH / max;
        writeln!(
            out,
            "{} {}\t{}{}{}\t{}",
            day.weekday_label(),
            day.date.format("%d/%m"),
            paint(Colour::Red.normal(), &"█".repeat(completed as usize), colored),
            paint(Colour::Yellow.dimmed(), &"▒".repeat(skipped as usize), colored),
            " ".repeat((BAR_WIDTH - completed - skipped) as usize),
            format_focused_time(day.total_seconds())
        )?;
    }
    Ok(())
}

/// Prints sessions in the given order, one per line, using `tz` for timestamps.
pub fn print_history<Tz: TimeZone>(
    history: &[SessionRecord],
    tz: &Tz,
    colored: bool,
    out: &mut impl Write,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    if history.is_empty() {
        writeln!(out, "No sessions recorded yet")?;
        return Ok(());
    }
    for session in history {
        let status = if session.is_completed {
            paint(Colour::Green.normal(), "completed", colored)
        } else {
            paint(Colour::Yellow.normal(), "skipped", colored)
        };
        writeln!(
            out,
            "{}\t{}\t{}",
            session.start_time.with_timezone(tz).format("%Y-%m-%d %H:%M"),
            format_focused_time(session.duration),
            status
        )?;
    }
    Ok(())
}
