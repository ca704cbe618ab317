use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::input::Keypad;
use crate::memory::Memory;
use crate::registers::Registers;
use crate::screen::Screen;
use crate::stack::Stack;
use crate::timers::Timers;

/// Everything an instruction can read or mutate
///
/// ## CPU
/// - `registers` V0..VF, I and the program counter
/// - `stack` return addresses of the subroutines currently being executed
/// - `timers` the delay and sound timers
///
/// ## Memory
/// - 4096 bytes of addressable memory with the font and the loaded program
/// - a 64x32 screen
///
/// ## Input
/// - the held keys and the key pressed during the current cycle
///
/// Every machine owns its own `State`; nothing is shared between instances.
#[derive(Clone)]
pub struct State {
    pub registers: Registers,
    pub memory: Memory,
    pub stack: Stack,
    pub timers: Timers,
    pub screen: Screen,
    pub keypad: Keypad,
    pub rng: StdRng,
}

impl State {
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        State {
            registers: Registers::new(),
            memory: Memory::new(),
            stack: Stack::new(config.stack_depth),
            timers: Timers::new(config.timer),
            screen: Screen::new(),
            keypad: Keypad::new(),
            rng,
        }
    }
}
