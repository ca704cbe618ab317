use std::io::Read;

use log::debug;

use crate::constants::{FONT, FONT_START, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::LoadError;
use crate::opcode::Opcode;

/// # Memory
/// 4096 bytes of addressable memory.
///
/// ```text
/// 0x000-0x04F  font
/// 0x050-0x1FF  unused (historically the interpreter)
/// 0x200-0xFFF  program
/// ```
///
/// Every address is taken modulo the memory size, so reads and writes
/// can never leave the address space.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Creates zeroed memory with the font resident at `FONT_START`
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let font_start = FONT_START as usize;
        bytes[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    /// Copies a program image to `PROGRAM_START`, clearing whatever was above it.
    /// Images that don't fit are rejected and memory is left untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..].fill(0);
        self.bytes[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// Reads a whole program image from `reader` and loads it.
    ///
    /// # Arguments
    /// * `reader` a source such as a file containing a program image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut program = Vec::with_capacity(MAX_PROGRAM_SIZE);
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[Self::wrap(addr)]
    }

    /// Writes past 0xFFF wrap to the bottom of memory and so land on the font
    pub fn write(&mut self, addr: u16, byte: u8) {
        if addr as usize >= MEMORY_SIZE {
            debug!("write to {:#06X} wrapped to {:#05X}", addr, Self::wrap(addr));
        }
        self.bytes[Self::wrap(addr)] = byte;
    }

    /// Gets the instruction at `addr`.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn opcode(&self, addr: u16) -> Opcode {
        Opcode::from_bytes(self.read(addr), self.read(addr.wrapping_add(1)))
    }

    /// Copies `len` bytes starting at `addr`, wrapping past the end of memory.
    pub fn fetch(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read(addr.wrapping_add(offset as u16)))
            .collect()
    }

    /// The raw contents of memory
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn wrap(addr: u16) -> usize {
        addr as usize % MEMORY_SIZE
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_font_is_resident() {
        let memory = Memory::new();
        assert_eq!(&memory.bytes()[0x00..0x05], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(&memory.bytes()[0x4B..0x50], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_memory_zeroed_above_font() {
        let memory = Memory::new();
        assert!(memory.bytes()[0x50..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_program_load_ok() {
        let mut memory = Memory::new();
        memory.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(&memory.bytes()[0x200..0x202], &[0x00, 0xE0]);
    }

    #[test]
    fn test_program_filling_memory_loads() {
        let mut memory = Memory::new();
        let program = vec![0xAA; MAX_PROGRAM_SIZE];
        memory.load_program(&program).unwrap();
        assert_eq!(memory.read(0xFFF), 0xAA);
    }

    #[test]
    fn test_oversized_program_rejected() {
        let mut memory = Memory::new();
        let program = vec![0xAA; MAX_PROGRAM_SIZE + 1];
        match memory.load_program(&program) {
            Err(LoadError::ProgramTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected ProgramTooLarge but got {:?}", other),
        }
        assert!(memory.bytes()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reload_clears_previous_program() {
        let mut memory = Memory::new();
        memory.load_program(&[0x60, 0x01, 0x61, 0x02]).unwrap();
        memory.load_program(&[0x60, 0x05]).unwrap();
        assert_eq!(&memory.bytes()[0x200..0x204], &[0x60, 0x05, 0x00, 0x00]);
    }

    #[test]
    fn test_load_rom_from_reader() {
        let mut memory = Memory::new();
        let mut rom: &[u8] = &[0x6A, 0x05, 0x7A, 0xFF];
        memory.load_rom(&mut rom).unwrap();
        assert_eq!(&memory.bytes()[0x200..0x204], &[0x6A, 0x05, 0x7A, 0xFF]);
    }

    #[test]
    fn test_opcode_fetch() {
        let mut memory = Memory::new();
        memory.write(0x200, 0xAA);
        memory.write(0x201, 0xBB);
        assert_eq!(memory.opcode(0x200), Opcode(0xAABB));
    }

    #[test]
    fn test_addresses_wrap() {
        let mut memory = Memory::new();
        memory.write(0x1000, 0x42);
        assert_eq!(memory.read(0x000), 0x42);
        memory.write(0xFFF, 0x12);
        memory.write(0x000, 0x34);
        assert_eq!(memory.opcode(0xFFF), Opcode(0x1234));
        assert_eq!(memory.fetch(0xFFF, 2), vec![0x12, 0x34]);
    }
}
