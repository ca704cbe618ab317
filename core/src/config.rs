use crate::constants::{CPU_CYCLES_PER_TIMER_TICK, STACK_DEPTH};

/// Which register the shift instructions (8XY6, 8XYE) read from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShiftQuirk {
    /// Shift Vy and store the result in Vx; VF takes the bit shifted out of Vy
    Legacy,
    /// Shift Vx in place; VF takes the bit shifted out of Vx
    #[default]
    Modern,
}

/// What drives the 60Hz delay and sound timers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerSource {
    /// One tick every `per_tick` executed cycles.
    /// Only approximates 60Hz when the host paces cycles at `per_tick * 60` per second.
    Cycles { per_tick: u32 },
    /// One tick per 1/60s of wall-clock time reported by the host through `Machine::elapse`
    RealTime,
}

impl TimerSource {
    pub fn legacy() -> Self {
        TimerSource::Cycles {
            per_tick: CPU_CYCLES_PER_TIMER_TICK,
        }
    }
}

impl Default for TimerSource {
    fn default() -> Self {
        TimerSource::RealTime
    }
}

/// Behavior fixed at the time a machine is constructed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub shift: ShiftQuirk,
    pub timer: TimerSource,
    /// Subroutine calls nested deeper than this fault the machine
    pub stack_depth: usize,
    /// Seed for CXNN; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shift: ShiftQuirk::default(),
            timer: TimerSource::default(),
            stack_depth: STACK_DEPTH,
            seed: None,
        }
    }
}
