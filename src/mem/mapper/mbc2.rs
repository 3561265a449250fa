use crate::mem::memptrs::{MemPtrs, RamFlags};
use crate::savestate::MemState;

/// MBC2 carries 512x4 bits of internal RAM, modeled as a single 8 KiB
/// bank. Register decoding keys on address bits 8 and 13 rather than the
/// usual region split.
pub struct Mbc2Mapper {
    rombank: u8,
    enable_ram: bool,
}

impl Mbc2Mapper {
    pub fn new() -> Mbc2Mapper {
        Mbc2Mapper {
            rombank: 1,
            enable_ram: false,
        }
    }

    fn set_rambank(&self, mem: &mut MemPtrs) {
        let flags = if self.enable_ram {
            RamFlags::READ_EN | RamFlags::WRITE_EN
        } else {
            RamFlags::empty()
        };
        mem.set_rambank(flags, 0);
    }

    pub fn rom_write(&mut self, addr: u16, data: u8, mem: &mut MemPtrs) {
        match addr & 0x6100 {
            0x0000 => {
                self.enable_ram = data & 0xF == 0xA;
                self.set_rambank(mem);
            }
            0x2100 => {
                self.rombank = data & 0xF;
                mem.set_rombank(self.rombank as usize & (mem.rombanks() - 1));
            }
            _ => (),
        }
    }

    pub fn save_state(&self, ss: &mut MemState) {
        ss.rombank = self.rombank as u16;
        ss.enable_ram = self.enable_ram;
    }

    pub fn load_state(&mut self, ss: &MemState, mem: &mut MemPtrs) {
        self.rombank = ss.rombank as u8;
        self.enable_ram = ss.enable_ram;
        self.set_rambank(mem);
        mem.set_rombank(self.rombank as usize & (mem.rombanks() - 1));
    }
}
