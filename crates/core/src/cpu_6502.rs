//! MOS 6502 CPU core implementation
//!
//! This module provides the NMOS 6502 as used by the NES (decimal mode
//! disabled). Any system can drive it by implementing the `Memory6502` trait;
//! all memory side effects of an instruction go through that trait.
//!
//! Execution is table driven: the fetched opcode indexes [`OPCODE_TABLE`],
//! whose descriptor names the operation and its addressing mode. Illegal
//! opcodes are reported to the caller instead of being skipped.

mod addressing;
mod opcodes;
mod status;

#[cfg(test)]
mod tests;

pub use addressing::{AddressingMode, Location};
pub use opcodes::{decode, disassemble, fields, Instruction, Mnemonic, OPCODE_TABLE};
pub use status::StatusFlags;

use crate::logging::{log, LogCategory, LogConfig, LogLevel};
use crate::Cpu;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
pub const STACK_BASE: u16 = 0x0100;
pub const SP_RESET: u8 = 0xFD;

/// Memory interface trait for the 6502 CPU
///
/// Systems using the 6502 must implement this trait to provide memory access.
pub trait Memory6502 {
    /// Read a byte from memory at the given address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);

    /// Read a little-endian word from `addr` and `addr + 1`
    fn read16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

/// Register snapshot used by save states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: StatusFlags,
    pub cycles: u64,
}

/// MOS 6502 CPU state and execution engine
#[derive(Debug)]
pub struct Cpu6502<M: Memory6502> {
    /// Accumulator register
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Stack pointer (points to 0x0100 + sp)
    pub sp: u8,
    /// Status register (NV-BDIZC)
    pub status: StatusFlags,
    /// Program counter
    pub pc: u16,
    /// Total cycles executed
    pub cycles: u64,
    /// Memory interface
    pub memory: M,
    /// NMI in progress flag
    in_nmi: bool,
    /// Opcode and address of the instruction being executed
    opcode: u8,
    opcode_pc: u16,
    /// Set by indexed addressing when the effective address changes page
    page_crossed: bool,
}

impl<M: Memory6502> Cpu6502<M> {
    /// Create a new 6502 CPU with the given memory interface
    pub fn new(memory: M) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: SP_RESET,
            status: StatusFlags::default(),
            pc: 0x8000,
            cycles: 0,
            memory,
            in_nmi: false,
            opcode: 0,
            opcode_pc: 0,
            page_crossed: false,
        }
    }

    /// Reset the CPU to initial state (preserves memory)
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = SP_RESET;
        self.status = StatusFlags::default();
        self.cycles = 0;
        self.in_nmi = false;
        self.pc = self.memory.read16(RESET_VECTOR);
        log(LogCategory::CPU, LogLevel::Debug, || {
            format!("CPU: reset, PC={:04X}", self.pc)
        });
    }

    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
            cycles: self.cycles,
        }
    }

    pub fn restore(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.sp = state.sp;
        self.pc = state.pc;
        self.status = state.status;
        self.cycles = state.cycles;
        self.in_nmi = false;
    }

    /// Check if currently executing an NMI handler
    pub fn is_in_nmi(&self) -> bool {
        self.in_nmi
    }

    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val);
    }

    #[inline]
    fn fetch_u8(&mut self) -> u8 {
        let v = self.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        v
    }

    #[inline]
    fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch_u8() as u16;
        let hi = self.fetch_u8() as u16;
        (hi << 8) | lo
    }

    fn illegal_opcode(&self) -> CpuError {
        CpuError::IllegalOpcode {
            opcode: self.opcode,
            pc: self.opcode_pc,
        }
    }

    /// Push a byte at `0x0100 + SP`, then decrement SP. Overflow wraps
    /// silently within page one.
    pub fn push_stack(&mut self, v: u8) {
        let addr = STACK_BASE | self.sp as u16;
        self.write(addr, v);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Increment SP, then read `0x0100 + SP`.
    pub fn pull_stack(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = STACK_BASE | self.sp as u16;
        self.read(addr)
    }

    /// Push high byte first so the word sits little-endian in memory.
    pub fn push_u16(&mut self, v: u16) {
        self.push_stack((v >> 8) as u8);
        self.push_stack(v as u8);
    }

    pub fn pull_u16(&mut self) -> u16 {
        let lo = self.pull_stack() as u16;
        let hi = self.pull_stack() as u16;
        (hi << 8) | lo
    }

    fn interrupt(&mut self, vector: u16, brk: bool) {
        self.push_u16(self.pc);
        let p = self.status.to_stack(brk);
        self.push_stack(p);
        self.status.set_interrupt_disable(true);
        self.pc = self.memory.read16(vector);
    }

    /// Trigger a Non-Maskable Interrupt (NMI)
    pub fn trigger_nmi(&mut self) {
        // Avoid nested NMIs in this simplified model.
        if self.in_nmi {
            return;
        }
        self.in_nmi = true;
        let from = self.pc;
        self.interrupt(NMI_VECTOR, false);
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!("CPU: NMI at PC={:04X}, vector {:04X}", from, self.pc)
        });
        self.cycles = self.cycles.wrapping_add(7);
    }

    /// Trigger a maskable IRQ (interrupt request)
    pub fn trigger_irq(&mut self) {
        if self.status.interrupt_disable() {
            return;
        }
        let from = self.pc;
        self.interrupt(IRQ_VECTOR, false);
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!("CPU: IRQ at PC={:04X}, vector {:04X}", from, self.pc)
        });
        self.cycles = self.cycles.wrapping_add(7);
    }

    /// Only the bytes of the instruction itself are read, so tracing never
    /// touches addresses the instruction would not.
    fn trace(&self, pc: u16, instr: Instruction) {
        let mut bytes = [0u8; 3];
        for (offset, byte) in bytes.iter_mut().enumerate().take(instr.size() as usize) {
            *byte = self.read(pc.wrapping_add(offset as u16));
        }
        let bytes = &bytes[..instr.size() as usize];
        log(LogCategory::CPU, LogLevel::Trace, || {
            format!(
                "{:04X}  {:<14} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
                pc,
                disassemble(bytes),
                self.a,
                self.x,
                self.y,
                self.status.bits(),
                self.sp,
                self.cycles
            )
        });
    }

    /// Execute one instruction and return cycles used.
    ///
    /// On an illegal opcode nothing is modified: PC still points at the
    /// offending byte.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let pc = self.pc;
        let opcode = self.read(pc);
        self.opcode = opcode;
        self.opcode_pc = pc;

        let Some(instr) = OPCODE_TABLE[opcode as usize] else {
            let err = self.illegal_opcode();
            log(LogCategory::CPU, LogLevel::Error, || {
                format!(
                    "CPU: {} (A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X})",
                    err,
                    self.a,
                    self.x,
                    self.y,
                    self.sp,
                    self.status.bits()
                )
            });
            return Err(err);
        };

        if LogConfig::global().should_log(LogCategory::CPU, LogLevel::Trace) {
            self.trace(pc, instr);
        }

        self.pc = pc.wrapping_add(1);
        self.page_crossed = false;
        match self.execute(instr) {
            Ok(extra) => {
                let penalty = (instr.mnemonic.is_read() && self.page_crossed) as u32;
                let used = instr.cycles as u32 + extra + penalty;
                self.cycles = self.cycles.wrapping_add(used as u64);
                Ok(used)
            }
            Err(e) => {
                self.pc = pc;
                Err(e)
            }
        }
    }

    fn mode_of(&self, instr: Instruction) -> Result<AddressingMode, CpuError> {
        instr.mode.ok_or_else(|| self.illegal_opcode())
    }

    fn load_operand(&mut self, mode: AddressingMode) -> u8 {
        let loc = self.resolve(mode);
        self.read_location(loc)
    }

    fn store(&mut self, mode: AddressingMode, val: u8) -> Result<(), CpuError> {
        if mode == AddressingMode::Immediate {
            return Err(self.illegal_opcode());
        }
        let loc = self.resolve(mode);
        self.write_location(loc, val)
    }

    /// Shared body of the read-modify-write instructions.
    fn read_modify_write<F>(&mut self, mode: AddressingMode, f: F) -> Result<(), CpuError>
    where
        F: FnOnce(&mut StatusFlags, u8) -> u8,
    {
        if mode == AddressingMode::Immediate {
            return Err(self.illegal_opcode());
        }
        let loc = self.resolve(mode);
        self.modify_location(loc, |cpu, old| {
            let new = f(&mut cpu.status, old);
            cpu.status.set_zn(new);
            new
        })
    }

    fn add_with_carry(&mut self, operand: u8) {
        let carry_in = self.status.carry() as u16;
        let sum = self.a as u16 + operand as u16 + carry_in;
        let result = sum as u8;
        self.status.set_carry(sum > 0xFF);
        // Both inputs share a sign that the result does not.
        self.status
            .set_overflow((!(self.a ^ operand) & (self.a ^ result)) & 0x80 != 0);
        self.a = result;
        self.status.set_zn(result);
    }

    fn compare(&mut self, register: u8, operand: u8) {
        let diff = register.wrapping_sub(operand);
        self.status.set_carry(register >= operand);
        self.status.set_zero(register == operand);
        self.status.set_negative(diff & 0x80 != 0);
    }

    /// Fetch the signed displacement and apply it if `taken`. Returns the
    /// extra cycles: one for a taken branch, two if it lands on another page.
    fn branch(&mut self, taken: bool) -> u32 {
        let offset = self.fetch_u8() as i8;
        if !taken {
            return 0;
        }
        let target = self.pc.wrapping_add_signed(offset as i16);
        let extra = if target & 0xFF00 != self.pc & 0xFF00 { 2 } else { 1 };
        self.pc = target;
        extra
    }

    /// Run the instruction whose opcode byte has already been consumed.
    fn execute(&mut self, instr: Instruction) -> Result<u32, CpuError> {
        use Mnemonic::*;

        let mut extra = 0;
        match instr.mnemonic {
            // Load / store
            Lda | Ldx | Ldy => {
                let v = self.load_operand(self.mode_of(instr)?);
                match instr.mnemonic {
                    Lda => self.a = v,
                    Ldx => self.x = v,
                    _ => self.y = v,
                }
                self.status.set_zn(v);
            }
            Sta => self.store(self.mode_of(instr)?, self.a)?,
            Stx => self.store(self.mode_of(instr)?, self.x)?,
            Sty => self.store(self.mode_of(instr)?, self.y)?,

            // Logical and arithmetic
            Ora | And | Eor | Adc | Sbc => {
                let v = self.load_operand(self.mode_of(instr)?);
                match instr.mnemonic {
                    Ora => self.a |= v,
                    And => self.a &= v,
                    Eor => self.a ^= v,
                    Adc => self.add_with_carry(v),
                    _ => self.add_with_carry(!v),
                }
                self.status.set_zn(self.a);
            }

            // Compare
            Cmp | Cpx | Cpy => {
                let v = self.load_operand(self.mode_of(instr)?);
                let register = match instr.mnemonic {
                    Cmp => self.a,
                    Cpx => self.x,
                    _ => self.y,
                };
                self.compare(register, v);
            }

            Bit => {
                let mode = self.mode_of(instr)?;
                if !matches!(mode, AddressingMode::ZeroPage | AddressingMode::Absolute) {
                    return Err(self.illegal_opcode());
                }
                let v = self.load_operand(mode);
                self.status.set_zero(self.a & v == 0);
                self.status.set_overflow(v & 0x40 != 0);
                self.status.set_negative(v & 0x80 != 0);
            }

            // Shifts and rotates
            Asl => self.read_modify_write(self.mode_of(instr)?, |p, v| {
                p.set_carry(v & 0x80 != 0);
                v << 1
            })?,
            Lsr => self.read_modify_write(self.mode_of(instr)?, |p, v| {
                p.set_carry(v & 0x01 != 0);
                v >> 1
            })?,
            Rol => self.read_modify_write(self.mode_of(instr)?, |p, v| {
                let carry_in = p.carry() as u8;
                p.set_carry(v & 0x80 != 0);
                (v << 1) | carry_in
            })?,
            Ror => self.read_modify_write(self.mode_of(instr)?, |p, v| {
                let carry_in = (p.carry() as u8) << 7;
                p.set_carry(v & 0x01 != 0);
                (v >> 1) | carry_in
            })?,

            // Increment / decrement
            Inc | Dec => {
                let mode = self.mode_of(instr)?;
                if mode == AddressingMode::Accumulator {
                    return Err(self.illegal_opcode());
                }
                let delta = if instr.mnemonic == Inc { 1 } else { 0xFF };
                self.read_modify_write(mode, |_, v| v.wrapping_add(delta))?;
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }

            // Jumps and calls
            Jmp => {
                let Location::Address(addr) = self.resolve(self.mode_of(instr)?) else {
                    return Err(self.illegal_opcode());
                };
                self.pc = addr;
            }
            JmpIndirect => {
                let ptr = self.fetch_u16();
                let lo = self.read(ptr) as u16;
                // Hardware bug: the high byte never carries into the next page.
                let hi_addr = if ptr & 0x00FF == 0x00FF {
                    ptr & 0xFF00
                } else {
                    ptr.wrapping_add(1)
                };
                let hi = self.read(hi_addr) as u16;
                self.pc = (hi << 8) | lo;
            }
            Jsr => {
                let target = self.fetch_u16();
                let ret = self.pc.wrapping_sub(1);
                self.push_u16(ret);
                self.pc = target;
            }
            Rts => {
                self.pc = self.pull_u16().wrapping_add(1);
            }
            Rti => {
                let p = self.pull_stack();
                self.status = StatusFlags::from_stack(p);
                self.pc = self.pull_u16();
                self.in_nmi = false;
            }
            Brk => {
                // The byte after BRK is padding; the return address skips it.
                self.pc = self.pc.wrapping_add(1);
                let brk_pc = self.opcode_pc;
                self.interrupt(IRQ_VECTOR, true);
                log(LogCategory::CPU, LogLevel::Debug, || {
                    format!("CPU: BRK at PC={:04X}, jumping to {:04X}", brk_pc, self.pc)
                });
            }

            // Stack
            Pha => self.push_stack(self.a),
            Php => {
                let p = self.status.to_stack(true);
                self.push_stack(p);
            }
            Pla => {
                self.a = self.pull_stack();
                self.status.set_zn(self.a);
            }
            Plp => {
                let p = self.pull_stack();
                self.status = StatusFlags::from_stack(p);
            }

            // Transfers
            Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Txs => self.sp = self.x,

            // Flags
            Clc => self.status.set_carry(false),
            Sec => self.status.set_carry(true),
            Cli => self.status.set_interrupt_disable(false),
            Sei => self.status.set_interrupt_disable(true),
            Clv => self.status.set_overflow(false),
            Cld => self.status.set_decimal(false),
            Sed => self.status.set_decimal(true),

            // Branches
            Bpl => extra = self.branch(!self.status.negative()),
            Bmi => extra = self.branch(self.status.negative()),
            Bvc => extra = self.branch(!self.status.overflow()),
            Bvs => extra = self.branch(self.status.overflow()),
            Bcc => extra = self.branch(!self.status.carry()),
            Bcs => extra = self.branch(self.status.carry()),
            Bne => extra = self.branch(!self.status.zero()),
            Beq => extra = self.branch(self.status.zero()),

            Nop => {}
        }
        Ok(extra)
    }
}

impl<M: Memory6502> Cpu for Cpu6502<M> {
    type Error = CpuError;

    fn reset(&mut self) {
        Cpu6502::reset(self);
    }

    fn step(&mut self) -> Result<u32, CpuError> {
        Cpu6502::step(self)
    }
}

/// Simple array-based memory implementation for testing
#[derive(Debug)]
pub struct ArrayMemory {
    pub data: [u8; 0x10000],
}

impl ArrayMemory {
    pub fn new() -> Self {
        Self { data: [0; 0x10000] }
    }

    /// Load a program into memory and set reset vector
    pub fn load_program(&mut self, offset: u16, data: &[u8]) {
        let off = offset as usize;
        self.data[off..off + data.len()].copy_from_slice(data);
        let [lo, hi] = offset.to_le_bytes();
        self.data[RESET_VECTOR as usize] = lo;
        self.data[RESET_VECTOR as usize + 1] = hi;
    }
}

impl Default for ArrayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory6502 for ArrayMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.data[addr as usize] = val;
    }
}
