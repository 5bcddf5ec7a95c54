//! Addressing modes and effective-location resolution
//!
//! Every operand-bearing instruction names one of ten modes. Resolving a mode
//! consumes 0-2 program bytes and yields a [`Location`]: the accumulator, an
//! immediate byte, or a bus address.

use super::{Cpu6502, CpuError, Memory6502};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// `#$nn`
    Immediate,
    /// `A`
    Accumulator,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`
    ZeroPageX,
    /// `$nn,Y`
    ZeroPageY,
    /// `($nn,X)`
    IndexedIndirectX,
    /// `($nn),Y`
    IndirectIndexedY,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndexedIndirectX
            | AddressingMode::IndirectIndexedY => 1,
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => 2,
        }
    }

    /// Render the operand in assembler syntax. `operand` holds the raw
    /// little-endian operand bytes (only the first `operand_len` are used).
    pub fn format_operand(self, operand: [u8; 2]) -> String {
        let byte = operand[0];
        let word = u16::from_le_bytes(operand);
        match self {
            AddressingMode::Immediate => format!("#${:02X}", byte),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::ZeroPage => format!("${:02X}", byte),
            AddressingMode::ZeroPageX => format!("${:02X},X", byte),
            AddressingMode::ZeroPageY => format!("${:02X},Y", byte),
            AddressingMode::IndexedIndirectX => format!("(${:02X},X)", byte),
            AddressingMode::IndirectIndexedY => format!("(${:02X}),Y", byte),
            AddressingMode::Absolute => format!("${:04X}", word),
            AddressingMode::AbsoluteX => format!("${:04X},X", word),
            AddressingMode::AbsoluteY => format!("${:04X},Y", word),
        }
    }
}

/// Where an instruction's operand lives once its mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Accumulator,
    Immediate(u8),
    Address(u16),
}

#[inline]
fn crosses_page(base: u16, effective: u16) -> bool {
    base & 0xFF00 != effective & 0xFF00
}

impl<M: Memory6502> Cpu6502<M> {
    /// Consume the operand bytes for `mode` and compute the effective location.
    ///
    /// Sets `page_crossed` when an indexed mode carries into the high byte so
    /// read instructions can charge the extra cycle.
    pub(crate) fn resolve(&mut self, mode: AddressingMode) -> Location {
        match mode {
            AddressingMode::Immediate => Location::Immediate(self.fetch_u8()),
            AddressingMode::Accumulator => Location::Accumulator,
            AddressingMode::ZeroPage => Location::Address(self.fetch_u8() as u16),
            // Zero-page indexing never leaves page zero.
            AddressingMode::ZeroPageX => {
                Location::Address(self.fetch_u8().wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                Location::Address(self.fetch_u8().wrapping_add(self.y) as u16)
            }
            AddressingMode::IndexedIndirectX => {
                let ptr = self.fetch_u8().wrapping_add(self.x);
                Location::Address(self.read_zero_page_u16(ptr))
            }
            AddressingMode::IndirectIndexedY => {
                let ptr = self.fetch_u8();
                let base = self.read_zero_page_u16(ptr);
                let addr = base.wrapping_add(self.y as u16);
                self.page_crossed = crosses_page(base, addr);
                Location::Address(addr)
            }
            AddressingMode::Absolute => Location::Address(self.fetch_u16()),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.x as u16);
                self.page_crossed = crosses_page(base, addr);
                Location::Address(addr)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.y as u16);
                self.page_crossed = crosses_page(base, addr);
                Location::Address(addr)
            }
        }
    }

    /// Pointer fetch for the indirect zero-page modes; the high byte wraps
    /// around to $00 rather than spilling into page one.
    fn read_zero_page_u16(&self, ptr: u8) -> u16 {
        let lo = self.read(ptr as u16) as u16;
        let hi = self.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn read_location(&self, loc: Location) -> u8 {
        match loc {
            Location::Accumulator => self.a,
            Location::Immediate(v) => v,
            Location::Address(addr) => self.read(addr),
        }
    }

    pub(crate) fn write_location(&mut self, loc: Location, val: u8) -> Result<(), CpuError> {
        match loc {
            Location::Accumulator => self.a = val,
            Location::Immediate(_) => return Err(self.illegal_opcode()),
            Location::Address(addr) => self.write(addr, val),
        }
        Ok(())
    }

    /// Read-modify-write through a resolved location.
    pub(crate) fn modify_location<F>(&mut self, loc: Location, f: F) -> Result<(), CpuError>
    where
        F: FnOnce(&mut Self, u8) -> u8,
    {
        if let Location::Immediate(_) = loc {
            return Err(self.illegal_opcode());
        }
        let old = self.read_location(loc);
        let new = f(self, old);
        self.write_location(loc, new)
    }
}
