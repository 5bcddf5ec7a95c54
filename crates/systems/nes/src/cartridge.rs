use crate::bytes::ExtendedBytes;
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";
pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_BANK_SIZE: usize = 0x4000;
pub const CHR_BANK_SIZE: usize = 0x2000;
const PRG_RAM_UNIT: usize = 0x2000;
const NES2_MARKER: u8 = 0x08;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("not an iNES image (bad magic)")]
    BadMagic,
    #[error("ROM image truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("iNES header declares no PRG ROM")]
    ZeroPrgRom,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    #[error("invalid PRG ROM size {0:#X} for this board")]
    InvalidPrgRomSize(usize),
    #[error("invalid PRG RAM size {0:#X} for this board")]
    InvalidPrgRamSize(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    pub prg_rom: ExtendedBytes,
    /// CHR ROM, or 8 KiB of CHR RAM when the header declares none.
    pub chr_rom: ExtendedBytes,
    pub mapper: u8,
    pub mirroring: Mirroring,
    /// PRG RAM the header declares, 0 when it says nothing. iNES counts
    /// 8 KiB units in byte 8; NES 2.0 stores a `64 << n` shift in byte 10.
    pub prg_ram_size: usize,
    pub has_battery: bool,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(p: P) -> Result<Self, RomError> {
        let data = std::fs::read(p)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, RomError> {
        Self::parse(data, false)
    }

    /// Parse an iNES image. With `pad_truncated`, ROM sections shorter than
    /// the header declares are padded with `0xFF` instead of rejected.
    pub fn parse(data: &[u8], pad_truncated: bool) -> Result<Self, RomError> {
        if data.len() < INES_MAGIC.len() || data[..4] != INES_MAGIC {
            return Err(RomError::BadMagic);
        }
        if data.len() < HEADER_LEN {
            return Err(RomError::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }
        let header = &data[..HEADER_LEN];

        let prg_size = header[4] as usize * PRG_BANK_SIZE;
        if prg_size == 0 {
            return Err(RomError::ZeroPrgRom);
        }
        let chr_size = header[5] as usize * CHR_BANK_SIZE;
        let mapper = (header[6] >> 4) | (header[7] & 0xF0);

        // flags 6: bit 0 vertical, bit 1 battery, bit 2 trainer, bit 3 four-screen
        let mirroring = if header[6] & 0x08 != 0 {
            Mirroring::FourScreen
        } else if header[6] & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_battery = header[6] & 0x02 != 0;
        let has_trainer = header[6] & 0x04 != 0;
        let prg_ram_size = if header[7] & 0x0C == NES2_MARKER {
            match header[10] & 0x0F {
                0 => 0,
                shift => 64 << shift,
            }
        } else {
            header[8] as usize * PRG_RAM_UNIT
        };

        let mut offset = HEADER_LEN;
        if has_trainer {
            offset += TRAINER_LEN;
        }

        let prg_rom = section(data, offset, prg_size, pad_truncated, "PRG")?;
        offset += prg_size;

        let chr_rom = if chr_size == 0 {
            ExtendedBytes::ram(CHR_BANK_SIZE)
        } else {
            section(data, offset, chr_size, pad_truncated, "CHR")?
        };

        log(LogCategory::Cartridge, LogLevel::Info, || {
            format!(
                "Cartridge: mapper {}, PRG {} KiB, PRG RAM {}, CHR {} KiB{}, {:?} mirroring{}",
                mapper,
                prg_size / 1024,
                match prg_ram_size {
                    0 => "unspecified".to_string(),
                    n => format!("{} KiB", n / 1024),
                },
                chr_rom.size() / 1024,
                if chr_size == 0 { " (RAM)" } else { "" },
                mirroring,
                if has_battery { ", battery" } else { "" }
            )
        });

        Ok(Self {
            prg_rom,
            chr_rom,
            mapper,
            mirroring,
            prg_ram_size,
            has_battery,
        })
    }
}

fn section(
    data: &[u8],
    offset: usize,
    size: usize,
    pad: bool,
    what: &str,
) -> Result<ExtendedBytes, RomError> {
    let end = offset + size;
    if data.len() >= end {
        return Ok(ExtendedBytes::new(data[offset..end].to_vec(), size, 0xFF));
    }
    if !pad {
        return Err(RomError::Truncated {
            expected: end,
            actual: data.len(),
        });
    }
    let available = data.get(offset..).unwrap_or(&[]);
    log(LogCategory::Cartridge, LogLevel::Warn, || {
        format!(
            "Cartridge: {} ROM truncated ({} of {} bytes), padding with $FF",
            what,
            available.len(),
            size
        )
    });
    Ok(ExtendedBytes::new(available.to_vec(), size, 0xFF))
}
