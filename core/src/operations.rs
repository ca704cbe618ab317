use log::debug;
use rand::Rng;

use crate::config::{Config, ShiftQuirk};
use crate::constants::{FONT_GLYPH_HEIGHT, FONT_START};
use crate::error::Fault;
use crate::instruction::Flow;
use crate::opcode::Opcode;
use crate::state::State;

/// Addresses are 12 bits wide
const ADDRESS_MASK: u16 = 0x0FFF;

fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Next
    }
}

/// no-op; 0000 and machine code routines (0NNN) aren't supported
pub fn sys(op: Opcode, _state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    debug!("ignoring machine code routine {}", op);
    Ok(Flow::Next)
}

/// clear
pub fn clr(_op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.screen.clear();
    Ok(Flow::Next)
}

/// PC = STACK.pop()
pub fn rts(_op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let addr = state.stack.pop()?;
    Ok(Flow::Jump(addr))
}

/// PC = addr
pub fn jump(op: Opcode, _state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(Flow::Jump(op.nnn()))
}

/// STACK.push(PC + 2); PC = addr
pub fn call(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let ret = state.registers.pc.wrapping_add(0x2) & ADDRESS_MASK;
    state.stack.push(ret)?;
    Ok(Flow::Jump(op.nnn()))
}

/// if Vx == nn then pc += 2
pub fn ske(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(state.registers.v(op.x()) == op.nn()))
}

/// if Vx != nn then pc += 2
pub fn skne(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(state.registers.v(op.x()) != op.nn()))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(state.registers.v(op.x()) == state.registers.v(op.y())))
}

/// Vx = nn
pub fn load(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.registers.set_v(op.x(), op.nn());
    Ok(Flow::Next)
}

/// Vx += nn
/// Wraps around without touching VF
pub fn add(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let res = state.registers.v(op.x()).wrapping_add(op.nn());
    state.registers.set_v(op.x(), res);
    Ok(Flow::Next)
}

/// Vx = Vy
pub fn mv(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.registers.set_v(op.x(), state.registers.v(op.y()));
    Ok(Flow::Next)
}

/// Vx |= Vy
pub fn or(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let res = state.registers.v(op.x()) | state.registers.v(op.y());
    state.registers.set_v(op.x(), res);
    Ok(Flow::Next)
}

/// Vx &= Vy
pub fn and(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let res = state.registers.v(op.x()) & state.registers.v(op.y());
    state.registers.set_v(op.x(), res);
    Ok(Flow::Next)
}

/// Vx ^= Vy
pub fn xor(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let res = state.registers.v(op.x()) ^ state.registers.v(op.y());
    state.registers.set_v(op.x(), res);
    Ok(Flow::Next)
}

// The arithmetic and shift operations below write VF after Vx, so the flag
// survives when Vx is VF itself.

/// Vx += Vy; VF = carry
pub fn addr(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let (res, carry) = state
        .registers
        .v(op.x())
        .overflowing_add(state.registers.v(op.y()));
    state.registers.set_v(op.x(), res);
    state.registers.set_flag(carry);
    Ok(Flow::Next)
}

/// Vx -= Vy; VF = !borrow
pub fn sub(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let (vx, vy) = (state.registers.v(op.x()), state.registers.v(op.y()));
    state.registers.set_v(op.x(), vx.wrapping_sub(vy));
    state.registers.set_flag(vx >= vy);
    Ok(Flow::Next)
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let (vx, vy) = (state.registers.v(op.x()), state.registers.v(op.y()));
    state.registers.set_v(op.x(), vy.wrapping_sub(vx));
    state.registers.set_flag(vy >= vx);
    Ok(Flow::Next)
}

/// The register a shift reads from
fn shift_source(op: Opcode, config: &Config) -> u8 {
    match config.shift {
        ShiftQuirk::Legacy => op.y(),
        ShiftQuirk::Modern => op.x(),
    }
}

/// Vx = src >> 1; VF = lsb(src)
pub fn shr(op: Opcode, state: &mut State, config: &Config) -> Result<Flow, Fault> {
    let value = state.registers.v(shift_source(op, config));
    state.registers.set_v(op.x(), value >> 1);
    state.registers.set_flag(value & 0x01 != 0);
    Ok(Flow::Next)
}

/// Vx = src << 1; VF = msb(src)
pub fn shl(op: Opcode, state: &mut State, config: &Config) -> Result<Flow, Fault> {
    let value = state.registers.v(shift_source(op, config));
    state.registers.set_v(op.x(), value << 1);
    state.registers.set_flag(value & 0x80 != 0);
    Ok(Flow::Next)
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(state.registers.v(op.x()) != state.registers.v(op.y())))
}

/// I = addr
pub fn loadi(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.registers.i = op.nnn();
    Ok(Flow::Next)
}

/// PC = V0 + addr
pub fn jumpi(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let target = (op.nnn() + u16::from(state.registers.v(0x0))) & ADDRESS_MASK;
    Ok(Flow::Jump(target))
}

/// Vx = rand_byte & nn
pub fn rand(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let rand_byte: u8 = state.rng.gen();
    state.registers.set_v(op.x(), rand_byte & op.nn());
    Ok(Flow::Next)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y, clipping at the edges.
/// VF = whether any pixels were erased
pub fn draw(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let x = state.registers.v(op.x()) as usize;
    let y = state.registers.v(op.y()) as usize;
    let sprite = state.memory.fetch(state.registers.i, op.n() as usize);
    let collision = state.screen.draw_sprite(x, y, &sprite);
    state.registers.set_flag(collision);
    Ok(Flow::Next)
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(state.keypad.is_held(state.registers.v(op.x()))))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    Ok(skip_if(!state.keypad.is_held(state.registers.v(op.x()))))
}

/// Vx = DT
pub fn moved(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.registers.set_v(op.x(), state.timers.delay);
    Ok(Flow::Next)
}

/// Vx = key pressed this cycle, otherwise wait for one
pub fn keyd(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    match state.keypad.latched() {
        Some(key) => {
            state.registers.set_v(op.x(), key.index());
            Ok(Flow::Next)
        }
        None => Ok(Flow::Wait(op.x())),
    }
}

/// DT = Vx
pub fn loadd(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.timers.delay = state.registers.v(op.x());
    Ok(Flow::Next)
}

/// ST = Vx
pub fn loads(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    state.timers.sound = state.registers.v(op.x());
    Ok(Flow::Next)
}

/// I += Vx; VF = 1 if I leaves the address space
pub fn addi(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let sum = state.registers.i + u16::from(state.registers.v(op.x()));
    if sum > ADDRESS_MASK {
        state.registers.set_flag(true);
    }
    state.registers.i = sum & ADDRESS_MASK;
    Ok(Flow::Next)
}

/// I = address of the font glyph for the low nibble of Vx
pub fn ldspr(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let digit = u16::from(state.registers.v(op.x()) & 0x0F);
    state.registers.i = FONT_START + digit * FONT_GLYPH_HEIGHT;
    Ok(Flow::Next)
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i, hundreds first.
/// Near the top of memory the digits wrap onto the font.
pub fn bcd(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let value = state.registers.v(op.x());
    let i = state.registers.i;
    state.memory.write(i, value / 100);
    state.memory.write(i.wrapping_add(1), value / 10 % 10);
    state.memory.write(i.wrapping_add(2), value % 10);
    Ok(Flow::Next)
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
/// Like `bcd`, stores past 0xFFF wrap onto the font.
pub fn stor(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let i = state.registers.i;
    for r in 0..=op.x() {
        state
            .memory
            .write(i.wrapping_add(u16::from(r)), state.registers.v(r));
    }
    state.registers.i = (i + u16::from(op.x()) + 1) & ADDRESS_MASK;
    Ok(Flow::Next)
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(op: Opcode, state: &mut State, _config: &Config) -> Result<Flow, Fault> {
    let i = state.registers.i;
    for r in 0..=op.x() {
        let byte = state.memory.read(i.wrapping_add(u16::from(r)));
        state.registers.set_v(r, byte);
    }
    state.registers.i = (i + u16::from(op.x()) + 1) & ADDRESS_MASK;
    Ok(Flow::Next)
}
