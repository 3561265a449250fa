use crate::mem::mapper::rtc::Rtc;
use crate::mem::memptrs::{MemPtrs, RamFlags};
use crate::savestate::MemState;

pub struct Mbc3Mapper {
    rombank: u8,
    rambank: u8,
    enable_ram: bool,
    /// Set only when the header declares a timer; without it the latch
    /// register and the 0x08-0x0C bank values are dead.
    has_rtc: bool,
}

impl Mbc3Mapper {
    pub fn new(has_rtc: bool) -> Mbc3Mapper {
        Mbc3Mapper {
            rombank: 1,
            rambank: 0,
            enable_ram: false,
            has_rtc,
        }
    }

    // The bank is adjusted before masking with the ROM size; the MBC has
    // no way to know which high address outputs are left unconnected.
    fn adjusted_rombank(bank: usize) -> usize {
        if bank & 0x7F != 0 {
            bank
        } else {
            bank | 1
        }
    }

    fn set_rambank(&self, mem: &mut MemPtrs, rtc: &mut Rtc) {
        let mut flags = if self.enable_ram {
            RamFlags::READ_EN | RamFlags::WRITE_EN
        } else {
            RamFlags::empty()
        };

        if self.has_rtc {
            rtc.set(self.enable_ram, self.rambank);
            if rtc.active() {
                flags |= RamFlags::RTC_EN;
            }
        }

        mem.set_rambank(flags, self.rambank as usize);
    }

    fn set_rombank(&self, mem: &mut MemPtrs) {
        mem.set_rombank(Self::adjusted_rombank(self.rombank as usize) & (mem.rombanks() - 1));
    }

    pub fn rom_write(&mut self, addr: u16, data: u8, mem: &mut MemPtrs, rtc: &mut Rtc) {
        match (addr >> 13) & 3 {
            0 => {
                self.enable_ram = data & 0xF == 0xA;
                self.set_rambank(mem, rtc);
            }
            1 => {
                self.rombank = data & 0x7F;
                self.set_rombank(mem);
            }
            2 => {
                // Unmasked on purpose: values 0x08-0x0C select RTC
                // registers instead of RAM banks.
                self.rambank = data;
                self.set_rambank(mem, rtc);
            }
            3 => {
                if self.has_rtc {
                    rtc.latch(data);
                }
            }
            _ => unreachable!(),
        }
    }

    pub fn save_state(&self, ss: &mut MemState) {
        ss.rombank = self.rombank as u16;
        ss.rambank = self.rambank;
        ss.enable_ram = self.enable_ram;
    }

    pub fn load_state(&mut self, ss: &MemState, mem: &mut MemPtrs, rtc: &mut Rtc) {
        self.rombank = ss.rombank as u8;
        self.rambank = ss.rambank;
        self.enable_ram = ss.enable_ram;
        self.set_rambank(mem, rtc);
        self.set_rombank(mem);
    }
}
