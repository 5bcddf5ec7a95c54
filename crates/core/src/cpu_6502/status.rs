//! Processor status register (P)
//!
//! The six architectural flags live at fixed bit positions of one byte:
//!
//! ```text
//!  7 6 5 4 3 2 1 0
//!  N V - B D I Z C
//! ```
//!
//! Bits 4 and 5 only exist in the byte image pushed to the stack; they carry
//! no state inside the CPU.

use serde::{Deserialize, Serialize};

/// Packed 6502 status register with named bit accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const CARRY: u8 = 0x01;
    pub const ZERO: u8 = 0x02;
    pub const INTERRUPT_DISABLE: u8 = 0x04;
    pub const DECIMAL: u8 = 0x08;
    pub const BREAK: u8 = 0x10;
    pub const UNUSED: u8 = 0x20;
    pub const OVERFLOW: u8 = 0x40;
    pub const NEGATIVE: u8 = 0x80;

    /// Value after power-on and reset: interrupts disabled, bit 5 set.
    pub const POWER_ON: u8 = Self::INTERRUPT_DISABLE | Self::UNUSED;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    fn get(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    #[inline]
    fn set(&mut self, mask: u8, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn carry(self) -> bool {
        self.get(Self::CARRY)
    }

    pub fn set_carry(&mut self, value: bool) {
        self.set(Self::CARRY, value);
    }

    pub fn zero(self) -> bool {
        self.get(Self::ZERO)
    }

    pub fn set_zero(&mut self, value: bool) {
        self.set(Self::ZERO, value);
    }

    pub fn interrupt_disable(self) -> bool {
        self.get(Self::INTERRUPT_DISABLE)
    }

    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.set(Self::INTERRUPT_DISABLE, value);
    }

    /// Decimal mode is stored and restored but never affects arithmetic on
    /// the NES variant of the chip.
    pub fn decimal(self) -> bool {
        self.get(Self::DECIMAL)
    }

    pub fn set_decimal(&mut self, value: bool) {
        self.set(Self::DECIMAL, value);
    }

    pub fn overflow(self) -> bool {
        self.get(Self::OVERFLOW)
    }

    pub fn set_overflow(&mut self, value: bool) {
        self.set(Self::OVERFLOW, value);
    }

    pub fn negative(self) -> bool {
        self.get(Self::NEGATIVE)
    }

    pub fn set_negative(&mut self, value: bool) {
        self.set(Self::NEGATIVE, value);
    }

    /// Update Zero and Negative from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative(value & 0x80 != 0);
    }

    /// Byte image pushed by PHP/BRK (`brk = true`) or by a hardware interrupt.
    pub fn to_stack(self, brk: bool) -> u8 {
        let mut p = self.0 | Self::UNUSED;
        if brk {
            p |= Self::BREAK;
        } else {
            p &= !Self::BREAK;
        }
        p
    }

    /// Status restored by PLP/RTI.
    pub fn from_stack(byte: u8) -> Self {
        Self((byte | Self::UNUSED) & !Self::BREAK)
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self(Self::POWER_ON)
    }
}
