//! NES cartridge mappers
//!
//! Only NROM is implemented; other mapper ids are rejected at load time.

mod nrom;

pub use nrom::Nrom;

use crate::bus::BusDevice;
use crate::cartridge::{Cartridge, RomError};
use emu_core::logging::{log, LogCategory, LogLevel};

#[derive(Debug)]
pub enum Mapper {
    Nrom(Nrom),
}

impl Mapper {
    /// Build the mapper named by the cartridge header. `prg_ram_size` is
    /// used unless the header declares a size the board supports.
    pub fn from_cart(cart: Cartridge, prg_ram_size: usize) -> Result<Self, RomError> {
        match cart.mapper {
            0 => {
                let size = match cart.prg_ram_size {
                    size @ (0x800 | 0x1000) => size,
                    _ => prg_ram_size,
                };
                Ok(Mapper::Nrom(Nrom::new(cart, size)?))
            }
            id => {
                log(LogCategory::Cartridge, LogLevel::Error, || {
                    format!("Cartridge: mapper {} is not supported", id)
                });
                Err(RomError::UnsupportedMapper(id))
            }
        }
    }

    /// Read from the CPU-visible cartridge space ($4020-$FFFF)
    pub fn read_prg(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom(m) => m.read_prg(addr),
        }
    }

    pub fn write_prg(&mut self, addr: u16, val: u8) {
        match self {
            Mapper::Nrom(m) => m.write_prg(addr, val),
        }
    }

    pub fn prg_ram_size(&self) -> usize {
        match self {
            Mapper::Nrom(m) => m.prg_ram_size(),
        }
    }

    pub fn read_chr(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom(m) => m.read_chr(addr),
        }
    }

    pub fn write_chr(&mut self, addr: u16, val: u8) {
        match self {
            Mapper::Nrom(m) => m.write_chr(addr, val),
        }
    }
}

impl BusDevice for Mapper {
    fn name(&self) -> &'static str {
        "cartridge"
    }

    fn read(&self, addr: u16) -> u8 {
        self.read_prg(addr)
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.write_prg(addr, val)
    }
}
