//! Terminal focus timer. The countdown alternates work and break intervals while
//! [tracker::SessionTracker] records every work session, persists the history and computes the
//! statistics shown by the dashboard commands.
//!

pub mod cli;
pub mod config;
pub mod storage;
pub mod tracker;
pub mod utils;
