//! Picture unit register file.
//!
//! No rendering is done; the eight registers at $2000-$2007 simply latch
//! the last value written and read it back.

use crate::bus::BusDevice;
use emu_core::logging::{log, LogCategory, LogLevel};

pub const PPU_REGISTER_COUNT: usize = 8;

#[derive(Debug, Default)]
pub struct PpuRegisters {
    regs: [u8; PPU_REGISTER_COUNT],
}

impl PpuRegisters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BusDevice for PpuRegisters {
    fn name(&self) -> &'static str {
        "ppu-registers"
    }

    fn read(&self, addr: u16) -> u8 {
        let reg = addr as usize % PPU_REGISTER_COUNT;
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("PPU: read ${:04X} (reg {})", addr, reg)
        });
        self.regs[reg]
    }

    fn write(&mut self, addr: u16, val: u8) {
        let reg = addr as usize % PPU_REGISTER_COUNT;
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("PPU: write ${:04X} (reg {}) <- {:02X}", addr, reg, val)
        });
        self.regs[reg] = val;
    }
}
