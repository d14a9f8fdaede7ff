pub mod countdown;
pub mod dashboard;
pub mod history;
pub mod shutdown;

use std::{
    future,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use countdown::{parse_command, Countdown, CountdownConfig};
use futures::StreamExt;
use history::{process_history_command, HistoryCommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    config::{load_config, Config},
    storage::{kv_store::FileKeyValueStore, session_store::SessionStore},
    tracker::SessionTracker,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::enable_logging,
        time::format_focused_time,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Zendoro", version, long_about = None)]
#[command(about = "Focus timer that keeps track of your pomodoro sessions", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Data directory. By default uses $XDG_STATE_HOME/zendoro or $HOME/.local/state/zendoro"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run the focus countdown. Type p + Enter to pause or resume, s to skip, q to quit"
    )]
    Focus {
        #[arg(long, help = "Length of a work interval in minutes")]
        work: Option<u32>,
        #[arg(long = "break", help = "Length of a break in minutes")]
        rest: Option<u32>,
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Stop after this many work intervals"
        )]
        cycles: Option<u32>,
    },
    #[command(about = "Show total focused time, skip rate and the last 7 days")]
    Stats {},
    #[command(about = "List recorded sessions, most recent first")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Refresh the csv export and print where it is")]
    Export {},
    #[command(about = "Delete all recorded sessions")]
    Reset {
        #[arg(long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir.join("logs"), logging_level, args.log)?;

    let config = load_config(&dir)?;
    let colored = io::stdout().is_terminal();
    let mut tracker = open_tracker(&dir, &config).await?;

    let result = match args.commands {
        Commands::Focus { work, rest, cycles } => {
            let config = CountdownConfig {
                work: minutes(work.unwrap_or(config.work_minutes)),
                rest: minutes(rest.unwrap_or(config.break_minutes)),
                cycles,
                colored,
            };
            run_focus(&mut tracker, config).await
        }
        Commands::Stats {} => {
            dashboard::print_stats(&tracker, Local::now(), colored, &mut io::stdout().lock())
        }
        Commands::History { command } => {
            process_history_command(&tracker, command, colored, &mut io::stdout().lock())
        }
        Commands::Export {} => export(&tracker).await,
        Commands::Reset { yes } => reset(&mut tracker, yes),
    };

    tracker.shutdown().await;
    result
}

fn minutes(value: u32) -> Duration {
    Duration::from_secs(value as u64 * 60)
}

async fn open_tracker(dir: &Path, config: &Config) -> Result<SessionTracker> {
    let store = SessionStore::new(
        FileKeyValueStore::new(dir.join("store"))?,
        config.csv_target(dir),
    );
    let mut tracker = SessionTracker::spawn(store, Box::new(DefaultClock), config.start_policy);
    tracker.load_sessions().await;
    Ok(tracker)
}

async fn run_focus(tracker: &mut SessionTracker, config: CountdownConfig) -> Result<()> {
    if config.work.is_zero() || config.rest.is_zero() {
        bail!("Work and break intervals must be at least a minute long");
    }
    let shutdown = CancellationToken::new();
    let signals = tokio::spawn(shutdown::detect_shutdown(shutdown.clone()));

    let commands = LinesStream::new(BufReader::new(tokio::io::stdin()).lines())
        .filter_map(|line| future::ready(line.ok().and_then(|v| parse_command(&v))));

    let countdown = Countdown::new(
        tracker,
        Box::new(DefaultClock),
        config,
        shutdown.clone(),
        io::stdout(),
    );
    let summary = countdown.run(Box::pin(commands)).await;

    shutdown.cancel();
    let _ = signals.await;

    let summary = summary?;
    println!(
        "{} completed, {} skipped. Focused {} in total",
        summary.completed,
        summary.skipped,
        format_focused_time(tracker.total_focused_time())
    );
    Ok(())
}

async fn export(tracker: &SessionTracker) -> Result<()> {
    match tracker.export_csv().await {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!("Csv export has no file to share, check the csvTarget setting and the logs"),
    }
}

fn reset(tracker: &mut SessionTracker, yes: bool) -> Result<()> {
    if !yes {
        print!(
            "Delete {} recorded sessions? [y/N] ",
            tracker.sessions().len()
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Nothing deleted");
            return Ok(());
        }
    }
    tracker.reset();
    info!("History reset from cli");
    println!("All sessions deleted");
    Ok(())
}
