//! Terminal countdown that alternates work and break intervals. Work intervals are reported to
//! the [SessionTracker]; breaks are not tracked.

use std::{io::Write, time::Duration};

use ansi_term::Colour;
use anyhow::Result;
use futures::{stream::FusedStream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    tracker::SessionTracker,
    utils::{clock::Clock, time::format_countdown},
};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work Session",
            Phase::Break => "Break Time",
        }
    }

    fn colour(self) -> Colour {
        match self {
            Phase::Work => Colour::RGB(0xFF, 0x6B, 0x6B),
            Phase::Break => Colour::RGB(0x4E, 0xCD, 0xC4),
        }
    }

    fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

/// Commands typed while the countdown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    TogglePause,
    Skip,
    Quit,
}

pub fn parse_command(line: &str) -> Option<ControlCommand> {
    match line.trim().to_lowercase().as_str() {
        "p" | "pause" | "r" | "resume" | "" => Some(ControlCommand::TogglePause),
        "s" | "skip" => Some(ControlCommand::Skip),
        "q" | "quit" | "exit" => Some(ControlCommand::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountdownConfig {
    pub work: Duration,
    pub rest: Duration,
    /// Number of work intervals to run. Runs until quit when absent.
    pub cycles: Option<u32>,
    pub colored: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSummary {
    pub completed: u32,
    pub skipped: u32,
}

enum PhaseEnd {
    Finished,
    Skipped,
    Quit,
}

/// Drives the countdown. Ticks come from the clock, commands from any stream, so the same loop
/// runs against stdin and in tests.
pub struct Countdown<'a, W: Write> {
    tracker: &'a mut SessionTracker,
    clock: Box<dyn Clock>,
    config: CountdownConfig,
    shutdown: CancellationToken,
    output: W,
}

impl<'a, W: Write> Countdown<'a, W> {
    pub fn new(
        tracker: &'a mut SessionTracker,
        clock: Box<dyn Clock>,
        config: CountdownConfig,
        shutdown: CancellationToken,
        output: W,
    ) -> Self {
        Self {
            tracker,
            clock,
            config,
            shutdown,
            output,
        }
    }

    pub async fn run(
        mut self,
        commands: impl Stream<Item = ControlCommand> + Unpin,
    ) -> Result<CountdownSummary> {
        let mut commands = commands.fuse();
        let mut summary = CountdownSummary::default();
        let mut phase = Phase::Work;
        let mut work_cycles = 0;

        loop {
            if phase == Phase::Work {
                self.tracker.start_session()?;
            }
            let end = async {
                let end = self.run_phase(phase, &mut commands).await?;
                writeln!(self.output)?;
                anyhow::Ok(end)
            }
            .await;
            let end = match end {
                Ok(end) => end,
                Err(e) => {
                    // Same as quitting, the started session is kept as skipped.
                    if phase == Phase::Work {
                        self.tracker.skip_session();
                    }
                    return Err(e);
                }
            };

            if phase == Phase::Work {
                work_cycles += 1;
                match end {
                    PhaseEnd::Finished => {
                        self.tracker.end_session(true);
                        summary.completed += 1;
                    }
                    PhaseEnd::Skipped | PhaseEnd::Quit => {
                        self.tracker.skip_session();
                        summary.skipped += 1;
                    }
                }
            }

            if matches!(end, PhaseEnd::Quit) {
                break;
            }
            if phase == Phase::Work && self.config.cycles.is_some_and(|v| work_cycles >= v) {
                break;
            }
            phase = phase.next();
        }

        info!(
            "Countdown finished, {} completed, {} skipped",
            summary.completed, summary.skipped
        );
        Ok(summary)
    }

    async fn run_phase(
        &mut self,
        phase: Phase,
        commands: &mut (impl FusedStream<Item = ControlCommand> + Unpin),
    ) -> Result<PhaseEnd> {
        let length = match phase {
            Phase::Work => self.config.work,
            Phase::Break => self.config.rest,
        };
        let mut remaining = length.as_secs();
        let mut paused = false;
        let mut next_tick = self.clock.instant() + TICK;
        debug!("Starting {phase:?} of {remaining}s");

        loop {
            self.render(phase, remaining, paused)?;
            if remaining == 0 {
                return Ok(PhaseEnd::Finished);
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(PhaseEnd::Quit);
                }
                command = commands.next(), if !commands.is_terminated() => {
                    match command {
                        Some(ControlCommand::TogglePause) if paused => {
                            paused = false;
                            next_tick = self.clock.instant() + TICK;
                            if phase == Phase::Work {
                                self.tracker.resume_session();
                            }
                        }
                        Some(ControlCommand::TogglePause) => {
                            paused = true;
                            if phase == Phase::Work {
                                self.tracker.pause_session();
                            }
                        }
                        Some(ControlCommand::Skip) => return Ok(PhaseEnd::Skipped),
                        Some(ControlCommand::Quit) => return Ok(PhaseEnd::Quit),
                        // Input is gone, the countdown keeps going on its own.
                        None => debug!("Command input closed"),
                    }
                }
                _ = self.clock.sleep_until(next_tick), if !paused => {
                    remaining -= 1;
                    next_tick += TICK;
                }
            }
        }
    }

    fn render(&mut self, phase: Phase, remaining: u64, paused: bool) -> Result<()> {
        let label = if self.config.colored {
            phase.colour().bold().paint(phase.label()).to_string()
        } else {
            phase.label().to_string()
        };
        let state = if paused { " (paused)" } else { "         " };
        write!(
            self.output,
            "\r{label}  {}{state}",
            format_countdown(remaining)
        )?;
        self.output.flush()?;
        Ok(())
    }
}
