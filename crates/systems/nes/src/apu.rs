//! Audio and I/O register file ($4000-$401F).

use crate::bus::BusDevice;
use emu_core::logging::{log, LogCategory, LogLevel};

pub const IO_REGISTER_COUNT: usize = 0x20;

#[derive(Debug, Default)]
pub struct IoRegisters {
    regs: [u8; IO_REGISTER_COUNT],
}

impl IoRegisters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BusDevice for IoRegisters {
    fn name(&self) -> &'static str {
        "io-registers"
    }

    fn read(&self, addr: u16) -> u8 {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("IO: read ${:04X}", addr)
        });
        self.regs[addr as usize % IO_REGISTER_COUNT]
    }

    fn write(&mut self, addr: u16, val: u8) {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("IO: write ${:04X} <- {:02X}", addr, val)
        });
        self.regs[addr as usize % IO_REGISTER_COUNT] = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_are_independent() {
        let mut io = IoRegisters::new();
        io.write(0x4000, 0x3F);
        io.write(0x4017, 0x40);
        assert_eq!(io.read(0x4000), 0x3F);
        assert_eq!(io.read(0x4017), 0x40);
        assert_eq!(io.read(0x4001), 0);
    }
}
