//! An interpreter for a small 8-bit virtual machine: sixteen registers, 4KB of
//! memory, a call stack, two 60Hz timers, a 64x32 monochrome screen and a
//! 16 key hexadecimal keypad.
//!
//! The host owns the window, the keyboard and the clock. It drives a
//! [`Machine`] one [`Machine::cycle`] at a time, feeds it [`KeyEvent`]s,
//! reports elapsed time and renders whatever [`Machine::take_frame`] returns.

pub use config::{Config, ShiftQuirk, TimerSource};
pub use constants::CLOCK_HZ;
pub use error::{Fault, LoadError};
pub use input::{Key, KeyEvent, Transition};
pub use machine::{Machine, Status};
pub use memory::Memory;
pub use opcode::Opcode;
pub use registers::Registers;
pub use screen::FrameBuffer;

mod config;
pub mod constants;
mod error;
mod input;
mod instruction;
mod machine;
mod memory;
mod opcode;
mod operations;
mod registers;
mod screen;
mod stack;
mod state;
mod timers;
