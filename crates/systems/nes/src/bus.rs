//! CPU address-space router.
//!
//! Devices are mapped onto inclusive address ranges and consulted in
//! insertion order; the first range containing an address owns it.

use crate::apu::IoRegisters;
use crate::mappers::Mapper;
use crate::ppu::PpuRegisters;
use emu_core::cpu_6502::Memory6502;
use emu_core::logging::{log, LogCategory, LogLevel};
use std::cell::Cell;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const RAM_SIZE: usize = 0x800;
pub const RAM_RANGE: RangeInclusive<u16> = 0x0000..=0x1FFF;
pub const PPU_RANGE: RangeInclusive<u16> = 0x2000..=0x3FFF;
pub const IO_RANGE: RangeInclusive<u16> = 0x4000..=0x401F;
pub const CARTRIDGE_RANGE: RangeInclusive<u16> = 0x4020..=0xFFFF;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("unmapped memory access at ${addr:04X} (write: {write})")]
    UnmappedMemoryAccess { addr: u16, write: bool },
    #[error("range ${start:04X}-${end:04X} overlaps {existing}")]
    Overlap {
        start: u16,
        end: u16,
        existing: &'static str,
    },
}

/// Something that answers reads and writes for part of the address space.
/// Addresses passed in are full CPU addresses, not offsets.
pub trait BusDevice: fmt::Debug {
    fn name(&self) -> &'static str;
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, val: u8);
}

/// 2 KiB internal RAM, mirrored four times across $0000-$1FFF
#[derive(Debug)]
pub struct Ram {
    bytes: [u8; RAM_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        Self {
            bytes: [0; RAM_SIZE],
        }
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl BusDevice for Ram {
    fn name(&self) -> &'static str {
        "ram"
    }

    fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize & (RAM_SIZE - 1)]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.bytes[addr as usize & (RAM_SIZE - 1)] = val;
    }
}

#[derive(Debug)]
struct Mapping {
    range: RangeInclusive<u16>,
    device: Box<dyn BusDevice>,
}

#[derive(Debug)]
pub struct NesBus {
    mappings: Vec<Mapping>,
    strict: bool,
    fault: Cell<Option<BusError>>,
}

impl NesBus {
    /// Bus with RAM, PPU registers and IO registers mapped and an empty
    /// cartridge slot.
    pub fn new(strict: bool) -> Self {
        let mappings = vec![
            Mapping {
                range: RAM_RANGE,
                device: Box::new(Ram::new()),
            },
            Mapping {
                range: PPU_RANGE,
                device: Box::new(PpuRegisters::new()),
            },
            Mapping {
                range: IO_RANGE,
                device: Box::new(IoRegisters::new()),
            },
        ];
        Self {
            mappings,
            strict,
            fault: Cell::new(None),
        }
    }

    /// Map a device. Ranges may not overlap an existing mapping.
    pub fn map(
        &mut self,
        range: RangeInclusive<u16>,
        device: Box<dyn BusDevice>,
    ) -> Result<(), BusError> {
        if let Some(existing) = self
            .mappings
            .iter()
            .find(|m| m.range.start() <= range.end() && range.start() <= m.range.end())
        {
            return Err(BusError::Overlap {
                start: *range.start(),
                end: *range.end(),
                existing: existing.device.name(),
            });
        }
        log(LogCategory::Bus, LogLevel::Debug, || {
            format!(
                "Bus: mapped {} at ${:04X}-${:04X}",
                device.name(),
                range.start(),
                range.end()
            )
        });
        self.mappings.push(Mapping { range, device });
        Ok(())
    }

    /// Remove the device named `name`, returning whether one was mapped.
    pub fn unmap(&mut self, name: &str) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|m| m.device.name() != name);
        before != self.mappings.len()
    }

    /// Insert a cartridge, replacing any cartridge already present.
    pub fn insert_cartridge(&mut self, mapper: Mapper) {
        self.eject_cartridge();
        self.mappings.push(Mapping {
            range: CARTRIDGE_RANGE,
            device: Box::new(mapper),
        });
        log(LogCategory::Cartridge, LogLevel::Info, || {
            "Cartridge: inserted".to_string()
        });
    }

    pub fn eject_cartridge(&mut self) -> bool {
        let ejected = self.unmap("cartridge");
        if ejected {
            log(LogCategory::Cartridge, LogLevel::Info, || {
                "Cartridge: ejected".to_string()
            });
        }
        ejected
    }

    pub fn has_cartridge(&self) -> bool {
        self.mappings.iter().any(|m| m.device.name() == "cartridge")
    }

    /// First unmapped access recorded since the last call, strict mode only.
    pub fn take_fault(&self) -> Option<BusError> {
        self.fault.take()
    }

    fn device_for(&self, addr: u16) -> Option<usize> {
        self.mappings.iter().position(|m| m.range.contains(&addr))
    }

    fn unmapped(&self, addr: u16, write: bool) {
        let err = BusError::UnmappedMemoryAccess { addr, write };
        if self.strict {
            if self.fault.get().is_none() {
                self.fault.set(Some(err));
            }
            log(LogCategory::Bus, LogLevel::Error, || format!("Bus: {}", err));
        } else {
            log(LogCategory::Bus, LogLevel::Debug, || format!("Bus: {}", err));
        }
    }
}

impl Default for NesBus {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Memory6502 for NesBus {
    fn read(&self, addr: u16) -> u8 {
        match self.device_for(addr) {
            Some(i) => self.mappings[i].device.read(addr),
            None => {
                self.unmapped(addr, false);
                0
            }
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match self.device_for(addr) {
            Some(i) => self.mappings[i].device.write(addr, val),
            None => self.unmapped(addr, true),
        }
    }
}
