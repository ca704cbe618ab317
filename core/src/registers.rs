use crate::constants::{FLAG_REGISTER, PROGRAM_START, REGISTER_COUNT};

/// # Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is overwritten as a carry, borrow or collision flag
/// - (i) a memory address register; only the low 12 bits are meaningful
///
/// Counter
/// - (pc) the address of the next instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
        }
    }

    pub fn v(&self, x: u8) -> u8 {
        self.v[x as usize]
    }

    pub fn set_v(&mut self, x: u8, value: u8) {
        self.v[x as usize] = value;
    }

    /// VF = 1 if `flag` else 0
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = u8::from(flag);
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
