//! SCBA tracker host simulator.
//!
//! Runs the tracker core against the in-memory storage adapter and a
//! simulated clock, driven by a line script (file or stdin):
//!
//! ```text
//!  up | down | up2 | down2 | select | long     button actions
//!  hold up|down <ms>                           press-and-hold
//!  tick <secs>                                 advance the 1 Hz tick
//!  start <slot> <bottle> <pressure>            direct engine start
//!  confirm <slot> | stop <slot>                direct engine calls
//!  config {json}                               configuration message
//!  facts                                       print every team
//!  # comment
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use clap::{ArgAction, Parser};
use log::{info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

use scbatrack::adapters::log_sink::LogEventSink;
use scbatrack::adapters::persist::MemoryStore;
use scbatrack::adapters::time::{SimulatedClock, SystemClock};
use scbatrack::app::commands::AppCommand;
use scbatrack::app::ports::ClockPort;
use scbatrack::app::screens::{ScreenController, UserAction};
use scbatrack::app::service::AppService;
use scbatrack::catalog::BottleIndex;
use scbatrack::team::TeamSlot;

/// Poll period of the hold repeater in the simulator.
const UI_POLL_MS: u32 = 10;

#[derive(Parser, Debug)]
#[command(name = "scbatrack-sim", author, version, about)]
struct Cli {
    /// Script with one command per line.  Reads stdin when omitted.
    script: Option<PathBuf>,

    /// Epoch seconds the simulated clock starts at.  Defaults to the host
    /// clock.
    #[arg(long, env = "SCBATRACK_START")]
    start: Option<i64>,

    /// UTC offset in whole hours for displayed times.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    utc_offset: i32,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let offset = FixedOffset::east_opt(cli.utc_offset * 3600)
        .with_context(|| format!("UTC offset {}h out of range", cli.utc_offset))?;
    let start = cli.start.unwrap_or_else(|| SystemClock.now());
    let mut sim = Simulator::new(start, offset);

    let reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (nr, line) in reader.lines().enumerate() {
        let line = line.context("reading script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Err(e) = sim.run_line(line) {
            warn!("line {}: {e:#}", nr + 1);
        }
    }
    info!("simulation finished after {} ticks", sim.app.tick_count());
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SCBATRACK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(io::stderr),
        )
        .init();
}

// ── Simulator ─────────────────────────────────────────────────

struct Simulator {
    app: AppService,
    ui: ScreenController,
    storage: MemoryStore,
    sink: LogEventSink,
    clock: SimulatedClock,
    offset: FixedOffset,
    ui_ms: u32,
}

impl Simulator {
    fn new(start: i64, offset: FixedOffset) -> Self {
        let mut storage = MemoryStore::new();
        let mut sink = LogEventSink::new();
        let clock = SimulatedClock::starting_at(start);
        let app = AppService::load(&mut storage, clock.now(), &mut sink);
        Self {
            app,
            ui: ScreenController::new(),
            storage,
            sink,
            clock,
            offset,
            ui_ms: 0,
        }
    }

    fn run_line(&mut self, line: &str) -> Result<()> {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "up" => self.action(UserAction::Up),
            "down" => self.action(UserAction::Down),
            "up2" => self.action(UserAction::UpMulti),
            "down2" => self.action(UserAction::DownMulti),
            "select" => self.action(UserAction::Select),
            "long" => self.action(UserAction::SelectLong),
            "hold" => self.hold(rest),
            "tick" => {
                let secs: u32 = rest.parse().context("tick <secs>")?;
                for _ in 0..secs {
                    let now = self.clock.advance(1);
                    self.app.tick(now, &mut self.storage, &mut self.sink);
                }
                Ok(())
            }
            "start" => {
                let args = numbers::<3>(rest).context("start <slot> <bottle> <pressure>")?;
                self.command(AppCommand::Start {
                    slot: TeamSlot::new(args[0] as usize)?,
                    bottle: BottleIndex::new(args[1] as usize)?,
                    pressure: u16::try_from(args[2]).context("pressure")?,
                })
            }
            "confirm" => {
                let [slot] = numbers::<1>(rest).context("confirm <slot>")?;
                self.command(AppCommand::Confirm(TeamSlot::new(slot as usize)?))
            }
            "stop" => {
                let [slot] = numbers::<1>(rest).context("stop <slot>")?;
                self.command(AppCommand::Stop(TeamSlot::new(slot as usize)?))
            }
            "config" => {
                let applied =
                    self.app
                        .apply_config_message(rest, &mut self.storage, &mut self.sink)?;
                info!("config: {applied} field(s) applied");
                Ok(())
            }
            "facts" => {
                self.print_facts();
                Ok(())
            }
            other => bail!("unknown command '{other}'"),
        }
    }

    fn action(&mut self, action: UserAction) -> Result<()> {
        let commands = self.ui.handle(action, self.ui_ms, &self.app);
        for cmd in commands {
            self.command(cmd)?;
        }
        Ok(())
    }

    fn hold(&mut self, args: &str) -> Result<()> {
        let (dir, ms) = args.split_once(' ').context("hold up|down <ms>")?;
        let (start, stop) = match dir {
            "up" => (UserAction::UpHoldStart, UserAction::UpHoldStop),
            "down" => (UserAction::DownHoldStart, UserAction::DownHoldStop),
            other => bail!("hold direction '{other}'"),
        };
        let ms: u32 = ms.trim().parse().context("hold duration")?;

        self.action(start)?;
        let until = self.ui_ms.wrapping_add(ms);
        while self.ui_ms != until {
            self.ui_ms = self.ui_ms.wrapping_add(UI_POLL_MS.min(until.wrapping_sub(self.ui_ms)));
            if let Some(cmd) = self.ui.tick(self.ui_ms) {
                self.command(cmd)?;
            }
        }
        self.action(stop)
    }

    fn command(&mut self, cmd: AppCommand) -> Result<()> {
        self.app
            .handle_command(cmd, self.clock.now(), &mut self.storage, &mut self.sink)?;
        Ok(())
    }

    fn print_facts(&self) {
        let now = self.clock.now();
        println!(
            "screen={:?} active_slot={}",
            self.ui.screen(),
            self.ui.active_slot().get()
        );
        for slot in TeamSlot::all() {
            let f = self.app.facts(slot, now, self.offset);
            println!(
                "  [{}] team {:>2} | {:>5} {} | start {} | {:>3} min | end {} | {:<10} | {}{}{}",
                slot.get(),
                f.team_number,
                f.pressure,
                f.unit,
                f.start_time,
                f.elapsed_minutes,
                f.end_time,
                f.band.name(),
                f.status.name(),
                if f.alarm_pending { " ALARM" } else { "" },
                if f.mayday { " MAYDAY" } else { "" },
            );
        }
    }
}

fn numbers<const N: usize>(args: &str) -> Result<[u64; N]> {
    let mut out = [0u64; N];
    let mut parts = args.split_whitespace();
    for slot in &mut out {
        *slot = parts.next().context("missing argument")?.parse()?;
    }
    if parts.next().is_some() {
        bail!("expected {N} argument(s)");
    }
    Ok(out)
}
