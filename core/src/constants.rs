/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded at, and execution starts from, this address
pub const PROGRAM_START: u16 = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of general purpose registers (V0..VF)
pub const REGISTER_COUNT: usize = 16;

/// Index of the register doubling as carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// Hardware convention for the depth of the call stack
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// Delay and sound timers count down at this rate
pub const TIMER_HZ: u32 = 60;

/// Legacy coupling of the timers to the CPU: one tick every this many cycles
pub const CPU_CYCLES_PER_TIMER_TICK: u32 = 14;

/// Instructions per second that keeps the legacy divider at `TIMER_HZ`
pub const CLOCK_HZ: u32 = CPU_CYCLES_PER_TIMER_TICK * TIMER_HZ;

/// Address of the first glyph in the font
pub const FONT_START: u16 = 0x000;

/// Every font glyph is 8 pixels wide and this many rows tall
pub const FONT_GLYPH_HEIGHT: u16 = 5;

/// # Font
/// One 4x5 sprite for each hexadecimal digit, stored in the high nibble of each row.
///
/// ```text
/// 0xF0  ####
/// 0x90  #  #
/// 0x90  #  #
/// 0x90  #  #
/// 0xF0  ####
/// ```
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
