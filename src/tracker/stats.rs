//! Read side of the tracker. Everything here is a pure function over the recorded sessions.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use now::DateTimeNow;
use tracing::trace;

use crate::{
    storage::entities::SessionRecord,
    utils::percentage::{count_percentage, Percentage},
};

pub const WEEK_DAYS: usize = 7;

/// Seconds of focus across every session, skipped ones included.
pub fn total_focused_time(sessions: &[SessionRecord]) -> u64 {
    sessions.iter().map(|v| v.duration).sum()
}

pub fn completed_count(sessions: &[SessionRecord]) -> usize {
    sessions.iter().filter(|v| v.is_completed).count()
}

pub fn skipped_count(sessions: &[SessionRecord]) -> usize {
    sessions.len() - completed_count(sessions)
}

pub fn skip_percentage(sessions: &[SessionRecord]) -> Percentage {
    count_percentage(skipped_count(sessions), sessions.len())
}

/// Most recent first by start time. Sessions are stored in completion order, which can differ.
pub fn sessions_history(sessions: &[SessionRecord]) -> Vec<SessionRecord> {
    let mut history = sessions.to_vec();
    history.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    history
}

/// Focus accumulated during a single local day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFocus {
    pub date: NaiveDate,
    pub completed_seconds: u64,
    pub skipped_seconds: u64,
}

impl DayFocus {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_seconds: 0,
            skipped_seconds: 0,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.completed_seconds + self.skipped_seconds
    }

    /// Short weekday name, `Mon`, `Tue` and so on.
    pub fn weekday_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

/// Buckets sessions by the local day they started on, for the 7 days ending with `now`. Oldest
/// day comes first. Sessions outside of the window are ignored.
pub fn weekly_breakdown<Tz: TimeZone>(
    sessions: &[SessionRecord],
    now: DateTime<Tz>,
) -> Vec<DayFocus> {
    let window_start = (now.clone() - Duration::days(WEEK_DAYS as i64 - 1)).beginning_of_day();
    let first_day = window_start.date_naive();
    let today = now.date_naive();

    let mut days = first_day
        .iter_days()
        .take(WEEK_DAYS)
        .map(DayFocus::new)
        .collect::<Vec<_>>();

    for session in sessions {
        let started = session.start_time.with_timezone(&now.timezone());
        let date = started.date_naive();
        if started < window_start || date > today {
            trace!("Session {} is outside of the week window", session.id);
            continue;
        }
        let index = (date - first_day).num_days() as usize;
        let Some(day) = days.get_mut(index) else {
            continue;
        };
        if session.is_completed {
            day.completed_seconds += session.duration;
        } else {
            day.skipped_seconds += session.duration;
        }
    }

    days
}
