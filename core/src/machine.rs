use std::io::Read;
use std::time::Duration;

use log::{debug, error, trace, warn};

use crate::config::Config;
use crate::error::{Fault, LoadError};
use crate::input::{Key, KeyEvent};
use crate::instruction::{self, Flow};
use crate::memory::Memory;
use crate::registers::Registers;
use crate::screen::FrameBuffer;
use crate::state::State;

/// Whether the host should keep calling `Machine::cycle`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RunState {
    Running,
    /// FX0A found no key; the program counter is held until one is latched
    AwaitingKey { register: u8 },
    /// Terminal; nothing executes any more
    Halted,
}

/// # Machine
/// A single virtual machine instance.
///
/// Tracks:
///  - its `state`, owned exclusively and mutated one cycle at a time
///  - the `config` it was constructed with
///  - whether it is running, waiting for a key or halted (and why)
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - advancing the CPU by a cycle and the timers by wall-clock time
/// - inspecting its frame buffer for rendering by some display
/// - sampling whether a tone should be audible
pub struct Machine {
    state: State,
    config: Config,
    run_state: RunState,
    fault: Option<Fault>,
    cycles: u64,
}

impl Machine {
    pub fn new(config: Config) -> Self {
        Machine {
            state: State::new(&config),
            config,
            run_state: RunState::Running,
            fault: None,
            cycles: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resets the machine and copies a program to 0x200.
    /// Programs that don't fit are refused and the machine is left as it was.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        let mut state = State::new(&self.config);
        state.memory.load_program(program)?;
        self.state = state;
        self.run_state = RunState::Running;
        self.fault = None;
        self.cycles = 0;
        Ok(())
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Advances the CPU by a single cycle
    /// - does nothing once halted
    /// - resumes if awaiting a keypress and one was latched this cycle
    /// - otherwise fetches, decodes and executes the next opcode
    ///
    /// Every cycle that isn't halted counts towards the timer divider and
    /// ends by dropping the key latch.
    pub fn cycle(&mut self) -> Status {
        match self.run_state {
            RunState::Halted => return Status::Halted,
            RunState::AwaitingKey { register } => self.resume(register),
            RunState::Running => self.step(),
        }

        self.state.timers.cycle();
        self.state.keypad.end_cycle();
        self.cycles += 1;
        self.status()
    }

    /// Reports wall-clock time to the timers; returns the number of ticks fired
    pub fn elapse(&mut self, elapsed: Duration) -> u32 {
        if self.run_state == RunState::Halted {
            return 0;
        }
        self.state.timers.elapse(elapsed)
    }

    /// Applies a key transition; presses are latched for the next cycle
    pub fn apply(&mut self, event: KeyEvent) {
        self.state.keypad.apply(event);
    }

    /// Set the pressed status of key and latch it
    pub fn key_press(&mut self, key: Key) {
        self.apply(KeyEvent::pressed(key));
    }

    /// Unset the pressed status of key
    pub fn key_release(&mut self, key: Key) {
        self.apply(KeyEvent::released(key));
    }

    pub fn set_key(&mut self, key: Key, held: bool) {
        self.state.keypad.set_key(key, held);
    }

    /// Marks `key` as pressed during the coming cycle without changing held state
    pub fn latch_key(&mut self, key: Key) {
        self.state.keypad.latch(key);
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        self.state.screen.take_frame()
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.state.screen.frame()
    }

    /// Whether a tone should be audible right now
    pub fn tone(&self) -> bool {
        self.state.timers.tone()
    }

    pub fn status(&self) -> Status {
        match self.run_state {
            RunState::Halted => Status::Halted,
            _ => Status::Running,
        }
    }

    /// Why the machine halted, if it has
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.run_state, RunState::AwaitingKey { .. })
    }

    pub fn registers(&self) -> &Registers {
        &self.state.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.timers.sound
    }

    /// Cycles executed so far, including those spent waiting for a key
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn step(&mut self) {
        let pc = self.state.registers.pc;
        let op = self.state.memory.opcode(pc);

        let operation = match instruction::from_op(op) {
            Some(operation) => operation,
            None => {
                warn!("skipping unknown opcode {} at {:#05X}", op, pc);
                self.advance(0x2);
                return;
            }
        };

        trace!(
            "{:#05X} {} {:<16} v{:02X?} i{:04X}",
            pc,
            op,
            instruction::mnemonic(op),
            self.state.registers.v,
            self.state.registers.i
        );

        match operation(op, &mut self.state, &self.config) {
            Ok(Flow::Next) => self.advance(0x2),
            Ok(Flow::Skip) => self.advance(0x4),
            Ok(Flow::Jump(addr)) => self.state.registers.pc = addr,
            Ok(Flow::Wait(register)) => {
                debug!("waiting for a key for V{:X}", register);
                self.run_state = RunState::AwaitingKey { register };
            }
            Err(fault) => self.halt(fault),
        }
    }

    fn resume(&mut self, register: u8) {
        if let Some(key) = self.state.keypad.latched() {
            debug!("V{:X} = key {:X}; resuming", register, key.index());
            self.state.registers.set_v(register, key.index());
            self.advance(0x2);
            self.run_state = RunState::Running;
        }
    }

    fn advance(&mut self, by: u16) {
        self.state.registers.pc = self.state.registers.pc.wrapping_add(by) & 0x0FFF;
    }

    fn halt(&mut self, fault: Fault) {
        error!("halting at {:#05X}: {}", self.state.registers.pc, fault);
        self.fault = Some(fault);
        self.run_state = RunState::Halted;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimerSource;
    use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, MAX_PROGRAM_SIZE};
    use pretty_assertions::assert_eq;

    fn machine(program: &[u8]) -> Machine {
        let mut machine = Machine::new(Config {
            seed: Some(7),
            timer: TimerSource::legacy(),
            ..Config::default()
        });
        machine.load_program(program).unwrap();
        machine
    }

    fn run(machine: &mut Machine, cycles: usize) {
        for _ in 0..cycles {
            machine.cycle();
        }
    }

    fn key(index: u8) -> Key {
        Key::new(index).unwrap()
    }

    #[test]
    fn test_starts_at_program_start() {
        let machine = machine(&[]);
        assert_eq!(machine.registers().pc, 0x200);
        assert_eq!(machine.status(), Status::Running);
    }

    #[test]
    fn test_load_then_add_wraps() {
        // LD VA, 0x05; ADD VA, 0xFF
        let mut machine = machine(&[0x6A, 0x05, 0x7A, 0xFF]);
        run(&mut machine, 2);
        assert_eq!(machine.registers().v[0xA], 0x04);
        assert_eq!(machine.registers().flag(), 0x00);
        assert_eq!(machine.registers().pc, 0x204);
    }

    #[test]
    fn test_skip_advances_by_four() {
        // SE V0, 0x00
        let mut machine = machine(&[0x30, 0x00]);
        machine.cycle();
        assert_eq!(machine.registers().pc, 0x204);
    }

    #[test]
    fn test_call_then_return_round_trips() {
        // 0x200 CALL 0x206; 0x202 LD V1, 0x01; 0x204 JP 0x204; 0x206 RET
        let mut machine = machine(&[0x22, 0x06, 0x61, 0x01, 0x12, 0x04, 0x00, 0xEE]);
        machine.cycle();
        assert_eq!(machine.registers().pc, 0x206);
        machine.cycle();
        assert_eq!(machine.registers().pc, 0x202);
        machine.cycle();
        assert_eq!(machine.registers().v[0x1], 0x01);
        assert_eq!(machine.status(), Status::Running);
    }

    #[test]
    fn test_return_without_call_halts() {
        let mut machine = machine(&[0x00, 0xEE]);
        assert_eq!(machine.cycle(), Status::Halted);
        assert_eq!(machine.fault(), Some(&Fault::StackUnderflow));
        let cycles = machine.cycles();
        assert_eq!(machine.cycle(), Status::Halted);
        assert_eq!(machine.cycles(), cycles);
        assert_eq!(machine.registers().pc, 0x200);
    }

    #[test]
    fn test_runaway_recursion_halts() {
        // 0x200 CALL 0x200
        let mut machine = machine(&[0x22, 0x00]);
        run(&mut machine, 16);
        assert_eq!(machine.status(), Status::Running);
        assert_eq!(machine.cycle(), Status::Halted);
        assert_eq!(machine.fault(), Some(&Fault::StackOverflow { depth: 16 }));
    }

    #[test]
    fn test_unknown_opcode_is_skipped() {
        let mut machine = machine(&[0xFF, 0xFF, 0x60, 0x2A]);
        assert_eq!(machine.cycle(), Status::Running);
        assert_eq!(machine.registers().pc, 0x202);
        machine.cycle();
        assert_eq!(machine.registers().v[0x0], 0x2A);
    }

    #[test]
    fn test_drawing_twice_clears_and_collides() {
        // CLS; LD I, 0x20A; DRW V0, V1, 1; DRW V0, V1, 1; JP 0x208; 0xFF
        let mut machine = machine(&[
            0x00, 0xE0, 0xA2, 0x0A, 0xD0, 0x11, 0xD0, 0x11, 0x12, 0x08, 0xFF,
        ]);
        run(&mut machine, 3);
        assert_eq!(&machine.frame()[0][0..9], &[1, 1, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(machine.registers().flag(), 0);
        machine.cycle();
        assert_eq!(machine.frame(), &[[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT]);
        assert_eq!(machine.registers().flag(), 1);
    }

    #[test]
    fn test_take_frame_only_after_changes() {
        // CLS; JP 0x202
        let mut machine = machine(&[0x00, 0xE0, 0x12, 0x02]);
        assert_eq!(machine.take_frame(), None);
        machine.cycle();
        assert!(machine.take_frame().is_some());
        machine.cycle();
        assert_eq!(machine.take_frame(), None);
    }

    #[test]
    fn test_divider_ticks_once_per_window() {
        // LD V0, 0x64; LD DT, V0; then a mix of instructions and a loop back
        let mut machine = machine(&[
            0x60, 0x64, 0xF0, 0x15, 0x71, 0x01, 0xA3, 0x00, 0x81, 0x24, 0x12, 0x04,
        ]);
        machine.cycle();
        machine.cycle();
        let delay = machine.delay_timer();
        let window = crate::constants::CPU_CYCLES_PER_TIMER_TICK as usize;
        // the divider is already 2 cycles into its first window
        run(&mut machine, window - 2);
        assert_eq!(machine.delay_timer(), delay - 1);
        run(&mut machine, window - 1);
        assert_eq!(machine.delay_timer(), delay - 1);
        machine.cycle();
        assert_eq!(machine.delay_timer(), delay - 2);
    }

    #[test]
    fn test_real_time_timers_ignore_cycles() {
        let mut machine = Machine::new(Config {
            timer: TimerSource::RealTime,
            seed: Some(1),
            ..Config::default()
        });
        // LD V0, 0x0A; LD ST, V0; JP 0x204
        machine
            .load_program(&[0x60, 0x0A, 0xF0, 0x18, 0x12, 0x04])
            .unwrap();
        run(&mut machine, 1000);
        assert_eq!(machine.sound_timer(), 0x0A);
        assert!(machine.tone());
        assert_eq!(machine.elapse(Duration::from_millis(100)), 6);
        assert_eq!(machine.sound_timer(), 0x04);
        machine.elapse(Duration::from_secs(1));
        assert!(!machine.tone());
    }

    #[test]
    fn test_await_key_holds_until_latched() {
        // LD V3, K; JP 0x202
        let mut machine = machine(&[0xF3, 0x0A, 0x12, 0x02]);
        run(&mut machine, 5);
        assert_eq!(machine.registers().pc, 0x200);
        assert!(machine.is_waiting_for_key());

        machine.key_press(key(0x7));
        machine.cycle();
        assert_eq!(machine.registers().v[0x3], 0x7);
        assert_eq!(machine.registers().pc, 0x202);
        assert!(!machine.is_waiting_for_key());

        machine.cycle();
        assert_eq!(machine.registers().pc, 0x202);
    }

    #[test]
    fn test_await_key_sees_press_in_same_cycle() {
        let mut machine = machine(&[0xF3, 0x0A]);
        machine.key_press(key(0xC));
        machine.cycle();
        assert_eq!(machine.registers().v[0x3], 0xC);
        assert_eq!(machine.registers().pc, 0x202);
    }

    #[test]
    fn test_divider_keeps_counting_while_awaiting_key() {
        // LD V0, 0x0A; LD DT, V0; LD V1, K
        let mut machine = machine(&[0x60, 0x0A, 0xF0, 0x15, 0xF1, 0x0A]);
        let window = crate::constants::CPU_CYCLES_PER_TIMER_TICK as usize;
        run(&mut machine, 3);
        assert!(machine.is_waiting_for_key());
        assert_eq!(machine.delay_timer(), 0x0A);

        run(&mut machine, window - 3);
        assert_eq!(machine.delay_timer(), 0x09);
        run(&mut machine, 2 * window);
        assert_eq!(machine.delay_timer(), 0x07);
        assert!(machine.is_waiting_for_key());
        assert_eq!(machine.registers().pc, 0x204);
    }

    #[test]
    fn test_latch_only_lives_for_one_cycle() {
        // LD V0, 0x00; LD V3, K
        let mut machine = machine(&[0x60, 0x00, 0xF3, 0x0A]);
        machine.key_press(key(0x5));
        machine.cycle();
        machine.cycle();
        assert!(machine.is_waiting_for_key());
        assert_eq!(machine.registers().pc, 0x202);
    }

    #[test]
    fn test_held_key_skips() {
        // LD V0, 0x09; SKP V0
        let mut machine = machine(&[0x60, 0x09, 0xE0, 0x9E]);
        machine.set_key(key(0x9), true);
        run(&mut machine, 2);
        assert_eq!(machine.registers().pc, 0x206);
    }

    #[test]
    fn test_oversized_program_is_rejected() {
        let mut machine = Machine::default();
        let program = vec![0x12; MAX_PROGRAM_SIZE + 2];
        assert!(matches!(
            machine.load_program(&program),
            Err(LoadError::ProgramTooLarge { .. })
        ));
        assert_eq!(machine.memory().read(0x200), 0x00);
    }

    #[test]
    fn test_reload_resets_machine() {
        // LD V0, 0x01; LD V1, 0x02; RET
        let mut machine = machine(&[0x60, 0x01, 0x61, 0x02, 0x00, 0xEE]);
        run(&mut machine, 3);
        assert_eq!(machine.status(), Status::Halted);

        // LD V0, 0x05
        machine.load_program(&[0x60, 0x05]).unwrap();
        assert_eq!(machine.status(), Status::Running);
        assert_eq!(machine.fault(), None);
        assert_eq!(machine.cycles(), 0);
        assert_eq!(machine.registers().pc, 0x200);
        assert_eq!(machine.registers().v[0x1], 0x00);
        assert_eq!(machine.memory().read(0x202), 0x00);
        machine.cycle();
        assert_eq!(machine.registers().v[0x0], 0x05);
    }

    #[test]
    fn test_failed_reload_keeps_running_program() {
        let mut machine = machine(&[0x60, 0x01]);
        machine.cycle();
        assert!(machine.load_program(&vec![0x00; MAX_PROGRAM_SIZE + 1]).is_err());
        assert_eq!(machine.registers().pc, 0x202);
        assert_eq!(machine.registers().v[0x0], 0x01);
    }

    #[test]
    fn test_halted_machine_ignores_time() {
        let mut machine = machine(&[0x00, 0xEE]);
        machine.cycle();
        assert_eq!(machine.elapse(Duration::from_secs(1)), 0);
    }
}
