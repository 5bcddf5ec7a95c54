//! NES system built around the 6502 core.
//!
//! Only the CPU address space is modelled. PPU and I/O registers are plain
//! latches, and the cartridge slot accepts NROM boards.

mod apu;
mod bus;
mod bytes;
mod cartridge;
mod config;
mod cpu;
mod mappers;
mod ppu;

pub use apu::IoRegisters;
pub use bus::{BusDevice, BusError, NesBus, Ram};
pub use bytes::{BoundsError, ExtendedBytes};
pub use cartridge::{Cartridge, Mirroring, RomError};
pub use config::{ConfigError, NesConfig};
pub use cpu::NesCpu;
pub use mappers::{Mapper, Nrom};
pub use ppu::PpuRegisters;

use emu_core::cpu_6502::{CpuError, CpuState, Memory6502};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{MountPointInfo, System};
use serde::de::Error as _;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

const CARTRIDGE_MOUNT: &str = "Cartridge";
const SAVE_STATE_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum NesError {
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    #[error("No cartridge loaded")]
    NoCartridge,
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),
}

#[derive(Debug)]
pub struct NesSystem {
    cpu: NesCpu,
    config: NesConfig,
    /// PRG RAM of the inserted cartridge, `None` with an empty slot
    prg_ram_size: Option<usize>,
}

impl Default for NesSystem {
    fn default() -> Self {
        Self::new(NesConfig::default())
    }
}

impl NesSystem {
    pub fn new(config: NesConfig) -> Self {
        let bus = NesBus::new(config.strict_bus);
        Self {
            cpu: NesCpu::new(bus),
            config,
            prg_ram_size: None,
        }
    }

    pub fn config(&self) -> &NesConfig {
        &self.config
    }

    /// Parse an iNES image, insert it and reset the CPU.
    pub fn load_rom_bytes(&mut self, data: &[u8]) -> Result<(), NesError> {
        let cart = Cartridge::parse(data, self.config.pad_truncated_prg)?;
        let mapper = Mapper::from_cart(cart, self.config.prg_ram_size)?;
        self.prg_ram_size = Some(mapper.prg_ram_size());
        self.cpu.bus_mut().insert_cartridge(mapper);
        self.cpu.reset();
        log(LogCategory::CPU, LogLevel::Info, || {
            format!("NES: ROM loaded, entry point ${:04X}", self.cpu.core().pc)
        });
        Ok(())
    }

    pub fn load_rom_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NesError> {
        let data = std::fs::read(path).map_err(RomError::Io)?;
        self.load_rom_bytes(&data)
    }

    pub fn eject(&mut self) -> bool {
        self.prg_ram_size = None;
        self.cpu.bus_mut().eject_cartridge()
    }

    pub fn cpu(&self) -> &NesCpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut NesCpu {
        &mut self.cpu
    }

    fn ram_snapshot(&self) -> Vec<u8> {
        let bus = self.cpu.bus();
        (0..bus::RAM_SIZE as u16).map(|a| bus.read(a)).collect()
    }

    fn prg_ram_snapshot(&self) -> Option<Vec<u8>> {
        let size = self.prg_ram_size?;
        let bus = self.cpu.bus();
        Some((0x6000..0x6000 + size as u16).map(|a| bus.read(a)).collect())
    }
}

fn bytes_from(v: &Value, len: usize, what: &str) -> Result<Vec<u8>, serde_json::Error> {
    let bytes: Vec<u8> = serde_json::from_value(v.clone())?;
    if bytes.len() != len {
        return Err(serde_json::Error::custom(format!(
            "{} must be {} bytes, got {}",
            what,
            len,
            bytes.len()
        )));
    }
    Ok(bytes)
}

impl System for NesSystem {
    type Error = NesError;

    fn reset(&mut self) {
        self.cpu.reset();
    }

    fn step(&mut self) -> Result<u32, Self::Error> {
        self.cpu.step()
    }

    fn save_state(&self) -> Value {
        serde_json::json!({
            "version": SAVE_STATE_VERSION,
            "system": "nes",
            "cpu": self.cpu.state(),
            "ram": self.ram_snapshot(),
            "prg_ram": self.prg_ram_snapshot(),
        })
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        if v["version"].as_u64() != Some(SAVE_STATE_VERSION) {
            return Err(serde_json::Error::custom("unsupported save state version"));
        }
        if v["system"].as_str() != Some("nes") {
            return Err(serde_json::Error::custom("save state is not for the NES"));
        }

        let state: CpuState = serde_json::from_value(v["cpu"].clone())?;
        let ram = bytes_from(&v["ram"], bus::RAM_SIZE, "ram")?;
        let prg_ram = match (&v["prg_ram"], self.prg_ram_size) {
            (Value::Null, _) | (_, None) => None,
            (p, Some(size)) => Some(bytes_from(p, size, "prg_ram")?),
        };

        self.cpu.restore(&state);
        let bus = self.cpu.bus_mut();
        for (addr, val) in (0u16..).zip(ram) {
            bus.write(addr, val);
        }
        if let Some(prg_ram) = prg_ram {
            for (addr, val) in (0x6000u16..).zip(prg_ram) {
                bus.write(addr, val);
            }
        }
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        true
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: CARTRIDGE_MOUNT.to_string(),
            name: "Cartridge Slot".to_string(),
            extensions: vec!["nes".to_string()],
            required: true,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(NesError::InvalidMountPoint(mount_point_id.to_string()));
        }
        self.load_rom_bytes(data)
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(NesError::InvalidMountPoint(mount_point_id.to_string()));
        }
        if !self.eject() {
            return Err(NesError::NoCartridge);
        }
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == CARTRIDGE_MOUNT && self.cpu.bus().has_cartridge()
    }
}
