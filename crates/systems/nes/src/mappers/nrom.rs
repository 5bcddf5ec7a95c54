use crate::bytes::ExtendedBytes;
use crate::cartridge::{Cartridge, RomError, CHR_BANK_SIZE};

pub const PRG_RAM_START: u16 = 0x6000;
pub const PRG_ROM_START: u16 = 0x8000;

/// NROM (Mapper 0) - Basic mapper with no banking
#[derive(Debug)]
pub struct Nrom {
    prg_rom: ExtendedBytes,
    prg_ram: ExtendedBytes,
    chr: ExtendedBytes,
}

impl Nrom {
    pub fn new(cart: Cartridge, prg_ram_size: usize) -> Result<Self, RomError> {
        let prg_size = cart.prg_rom.size();
        if prg_size != 0x4000 && prg_size != 0x8000 {
            return Err(RomError::InvalidPrgRomSize(prg_size));
        }
        if prg_ram_size != 0x800 && prg_ram_size != 0x1000 {
            return Err(RomError::InvalidPrgRamSize(prg_ram_size));
        }
        Ok(Self {
            prg_rom: cart.prg_rom,
            prg_ram: ExtendedBytes::ram(prg_ram_size),
            chr: cart.chr_rom,
        })
    }

    /// $6000-$7FFF is PRG RAM, $8000-$FFFF is PRG ROM (a 16 KiB image
    /// mirrors into $C000). Everything below reads as 0.
    pub fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            PRG_ROM_START..=0xFFFF => self.prg_rom.get_wrapped(addr as usize),
            PRG_RAM_START..=0x7FFF => self.prg_ram.get_wrapped(addr as usize),
            _ => 0,
        }
    }

    /// Only PRG RAM is writable; writes to ROM or below $6000 are dropped.
    pub fn write_prg(&mut self, addr: u16, val: u8) {
        if (PRG_RAM_START..PRG_ROM_START).contains(&addr) {
            let index = addr as usize % self.prg_ram.size();
            let _ = self.prg_ram.set(index, val);
        }
    }

    pub fn read_chr(&self, addr: u16) -> u8 {
        self.chr.get_wrapped(addr as usize % CHR_BANK_SIZE)
    }

    pub fn write_chr(&mut self, addr: u16, val: u8) {
        let _ = self.chr.set(addr as usize % CHR_BANK_SIZE, val);
    }

    pub fn prg_ram_size(&self) -> usize {
        self.prg_ram.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::tests::ines;

    fn nrom(prg_banks: u8, chr_banks: u8) -> Nrom {
        let cart = Cartridge::from_bytes(&ines(prg_banks, chr_banks, 0, 0)).unwrap();
        Nrom::new(cart, 0x1000).unwrap()
    }

    #[test]
    fn nrom_16kb_mirroring() {
        let nrom = nrom(1, 1);
        assert_eq!(nrom.read_prg(0x8000), 0x01);
        assert_eq!(nrom.read_prg(0xC000), 0x01);
        assert_eq!(nrom.read_prg(0xFFFF), 0x01);
    }

    #[test]
    fn nrom_32kb_no_mirroring() {
        let nrom = nrom(2, 1);
        assert_eq!(nrom.read_prg(0x8000), 0x01);
        assert_eq!(nrom.read_prg(0xBFFF), 0x01);
        assert_eq!(nrom.read_prg(0xC000), 0x02);
    }

    #[test]
    fn prg_ram_mirrors_modulo_size() {
        let mut nrom = nrom(1, 1);
        nrom.write_prg(0x6001, 0x5A);
        assert_eq!(nrom.read_prg(0x6001), 0x5A);
        assert_eq!(nrom.read_prg(0x7001), 0x5A);

        let cart = Cartridge::from_bytes(&ines(1, 1, 0, 0)).unwrap();
        let mut small = Nrom::new(cart, 0x800).unwrap();
        small.write_prg(0x6800, 0x77);
        assert_eq!(small.read_prg(0x6000), 0x77);
    }

    #[test]
    fn rom_and_low_space_ignore_writes() {
        let mut nrom = nrom(1, 1);
        nrom.write_prg(0x8000, 0xFF);
        assert_eq!(nrom.read_prg(0x8000), 0x01);
        nrom.write_prg(0x5000, 0xFF);
        assert_eq!(nrom.read_prg(0x5000), 0);
        assert_eq!(nrom.read_prg(0x4020), 0);
    }

    #[test]
    fn rejects_bad_sizes() {
        let cart = Cartridge::from_bytes(&ines(3, 1, 0, 0)).unwrap();
        assert!(matches!(
            Nrom::new(cart, 0x1000),
            Err(RomError::InvalidPrgRomSize(0xC000))
        ));
        let cart = Cartridge::from_bytes(&ines(1, 1, 0, 0)).unwrap();
        assert!(matches!(
            Nrom::new(cart, 0x2000),
            Err(RomError::InvalidPrgRamSize(0x2000))
        ));
    }

    #[test]
    fn chr_rom_read_only_chr_ram_writable() {
        let mut rom = nrom(1, 1);
        rom.write_chr(0x10, 0x01);
        assert_eq!(rom.read_chr(0x10), 0xC0);

        let mut ram = nrom(1, 0);
        ram.write_chr(0x1FFF, 0x3C);
        assert_eq!(ram.read_chr(0x1FFF), 0x3C);
    }
}
