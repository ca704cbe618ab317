use std::time::Duration;

use log::trace;

use crate::config::TimerSource;
use crate::constants::TIMER_HZ;

/// # Timers
/// - 2 8-bit timers (delay & sound)
///     - both are decremented once per tick while they are above 0
///     - while the sound timer is above 0 a tone should be audible
///
/// Ticks are scheduled either by counting executed cycles or by accumulating
/// wall-clock time handed in by the host.
#[derive(Clone, Debug)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    schedule: Schedule,
}

#[derive(Clone, Debug)]
enum Schedule {
    Cycles { per_tick: u32, count: u32 },
    RealTime { period: Duration, pending: Duration },
}

impl Timers {
    pub fn new(source: TimerSource) -> Self {
        let schedule = match source {
            TimerSource::Cycles { per_tick } => Schedule::Cycles {
                per_tick: per_tick.max(1),
                count: 0,
            },
            TimerSource::RealTime => Schedule::RealTime {
                period: Duration::from_secs(1) / TIMER_HZ,
                pending: Duration::ZERO,
            },
        };
        Timers {
            delay: 0,
            sound: 0,
            schedule,
        }
    }

    /// Decrements both timers if they are above 0
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        trace!("timer tick dt={} st={}", self.delay, self.sound);
    }

    /// Whether a tone should currently be audible
    pub fn tone(&self) -> bool {
        self.sound > 0
    }

    /// Counts one executed cycle, ticking when the divider rolls over.
    /// Returns the number of ticks fired; always 0 when driven by real time.
    pub fn cycle(&mut self) -> u32 {
        let rolled_over = match &mut self.schedule {
            Schedule::Cycles { per_tick, count } => {
                *count += 1;
                if *count >= *per_tick {
                    *count = 0;
                    true
                } else {
                    false
                }
            }
            Schedule::RealTime { .. } => false,
        };
        if rolled_over {
            self.tick();
        }
        u32::from(rolled_over)
    }

    /// Accumulates wall-clock time, ticking once for every whole timer period.
    /// Returns the number of ticks fired; always 0 when driven by cycles.
    pub fn elapse(&mut self, elapsed: Duration) -> u32 {
        let mut ticks = 0;
        if let Schedule::RealTime { period, pending } = &mut self.schedule {
            *pending += elapsed;
            while *pending >= *period {
                *pending -= *period;
                ticks += 1;
            }
        }
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycles(per_tick: u32) -> Timers {
        Timers::new(TimerSource::Cycles { per_tick })
    }

    #[test]
    fn test_tick_decrements_both() {
        let mut timers = cycles(1);
        timers.delay = 2;
        timers.sound = 1;
        timers.tick();
        assert_eq!((timers.delay, timers.sound), (1, 0));
        timers.tick();
        assert_eq!((timers.delay, timers.sound), (0, 0));
    }

    #[test]
    fn test_tick_never_goes_below_zero() {
        let mut timers = cycles(1);
        timers.tick();
        assert_eq!((timers.delay, timers.sound), (0, 0));
    }

    #[test]
    fn test_tone_follows_sound_timer() {
        let mut timers = cycles(1);
        assert!(!timers.tone());
        timers.sound = 1;
        assert!(timers.tone());
        timers.tick();
        assert!(!timers.tone());
    }

    #[test]
    fn test_divider_ticks_once_per_window() {
        let mut timers = cycles(14);
        timers.delay = 0xFF;
        let fired: u32 = (0..14).map(|_| timers.cycle()).sum();
        assert_eq!(fired, 1);
        assert_eq!(timers.delay, 0xFE);
        let fired: u32 = (0..14 * 3).map(|_| timers.cycle()).sum();
        assert_eq!(fired, 3);
        assert_eq!(timers.delay, 0xFB);
    }

    #[test]
    fn test_divider_ignores_elapsed_time() {
        let mut timers = cycles(14);
        timers.delay = 10;
        assert_eq!(timers.elapse(Duration::from_secs(1)), 0);
        assert_eq!(timers.delay, 10);
    }

    #[test]
    fn test_real_time_ticks_per_period() {
        let mut timers = Timers::new(TimerSource::RealTime);
        timers.delay = 100;
        assert_eq!(timers.elapse(Duration::from_millis(10)), 0);
        // 10ms + 10ms crosses one 16.67ms period
        assert_eq!(timers.elapse(Duration::from_millis(10)), 1);
        assert_eq!(timers.delay, 99);
        assert_eq!(timers.elapse(Duration::from_secs(1)), 60);
        assert_eq!(timers.delay, 39);
    }

    #[test]
    fn test_real_time_ignores_cycles() {
        let mut timers = Timers::new(TimerSource::RealTime);
        timers.delay = 10;
        let fired: u32 = (0..1000).map(|_| timers.cycle()).sum();
        assert_eq!(fired, 0);
        assert_eq!(timers.delay, 10);
    }
}
