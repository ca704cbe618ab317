use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use vm8_core::constants::{CPU_CYCLES_PER_TIMER_TICK, STACK_DEPTH};
use vm8_core::{Config, ShiftQuirk, TimerSource, CLOCK_HZ};

mod keymap;
mod run;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Shift {
    /// 8XY6/8XYE shift Vy into Vx
    Legacy,
    /// 8XY6/8XYE shift Vx in place
    Modern,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Timer {
    /// Tick at 60Hz of wall-clock time
    RealTime,
    /// Tick once every --cycles-per-tick cycles
    Cycles,
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs a program on the vm8 virtual machine", long_about = None)]
struct Args {
    /// Path to the program image to run
    rom: PathBuf,

    #[arg(long, value_enum, default_value_t = Shift::Modern)]
    shift: Shift,

    #[arg(long, value_enum, default_value_t = Timer::RealTime)]
    timer: Timer,

    #[arg(long, default_value_t = CPU_CYCLES_PER_TIMER_TICK, help = "Cycles per timer tick with --timer cycles")]
    cycles_per_tick: u32,

    #[arg(long, default_value_t = CLOCK_HZ, help = "Instructions per second")]
    clock_hz: u32,

    #[arg(long, default_value_t = 10, help = "Window pixels per screen pixel")]
    scale: u32,

    #[arg(long, help = "Seed for the random number instruction")]
    seed: Option<u64>,

    #[arg(short, long, action = ArgAction::Count, help = "More logging; repeat for more")]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            shift: match self.shift {
                Shift::Legacy => ShiftQuirk::Legacy,
                Shift::Modern => ShiftQuirk::Modern,
            },
            timer: match self.timer {
                Timer::RealTime => TimerSource::RealTime,
                Timer::Cycles => TimerSource::Cycles {
                    per_tick: self.cycles_per_tick,
                },
            },
            stack_depth: STACK_DEPTH,
            seed: self.seed,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = run::Options {
        clock_hz: args.clock_hz,
        scale: args.scale,
    };
    run::run(&args.rom, args.config(), options)
}
