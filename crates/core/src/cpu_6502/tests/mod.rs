//! Tests for the MOS 6502 CPU implementation
//!
//! Tests are organized by instruction family:
//! - `tests_decode`: opcode table coverage and bit-field decoding
//! - `tests_load_store`: loads, stores and register transfers
//! - `tests_arithmetic`: ADC/SBC, logical ops, compares, BIT
//! - `tests_shifts`: shifts, rotates, increments and decrements
//! - `tests_jumps`: JMP, JSR/RTS, BRK/RTI, interrupts
//! - `tests_branches`: conditional branches and their cycle costs
//! - `tests_stack`: push/pull primitives and stack instructions

mod tests_arithmetic;
mod tests_decode;
mod tests_shifts;

use super::{ArrayMemory, Cpu6502};

pub(super) const ORIGIN: u16 = 0x8000;

/// CPU with `program` loaded at $8000 and the reset vector pointing at it.
pub(super) fn cpu_with(program: &[u8]) -> Cpu6502<ArrayMemory> {
    let mut mem = ArrayMemory::new();
    mem.load_program(ORIGIN, program);
    let mut cpu = Cpu6502::new(mem);
    cpu.reset();
    cpu
}
