pub mod huc1;
pub mod mbc1;
pub mod mbc2;
pub mod mbc3;
pub mod mbc5;
pub mod rom;
pub mod rtc;
pub mod tpp1;
pub mod tpp1x;

use crate::mem::memptrs::MemPtrs;
use crate::savestate::MemState;

use self::huc1::HuC1Mapper;
use self::mbc1::{Mbc1Mapper, Mbc1Multi64Mapper};
use self::mbc2::Mbc2Mapper;
use self::mbc3::Mbc3Mapper;
use self::mbc5::Mbc5Mapper;
use self::rom::RomMapper;
use self::rtc::Rtc;
use self::tpp1::Tpp1Mapper;
use self::tpp1x::Tpp1X;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

/// The bank controller soldered into the cartridge. The variant set is
/// closed: it is decoded from a single header byte at load time.
pub enum Mbc {
    /// No cartridge inserted.
    None,
    Rom(RomMapper),
    Mbc1(Mbc1Mapper),
    Mbc1Multi64(Mbc1Multi64Mapper),
    Mbc2(Mbc2Mapper),
    Mbc3(Mbc3Mapper),
    Mbc5(Mbc5Mapper),
    HuC1(HuC1Mapper),
    Tpp1(Tpp1Mapper),
}

impl Mbc {
    /// Control write in the 0x0000-0x7FFF region. Side effects on the
    /// window mapping are visible before this returns.
    pub fn rom_write(
        &mut self,
        addr: u16,
        data: u8,
        mem: &mut MemPtrs,
        rtc: &mut Rtc,
        tx: &mut Tpp1X,
    ) {
        match self {
            Mbc::None => (),
            Mbc::Rom(m) => m.rom_write(addr, data, mem),
            Mbc::Mbc1(m) => m.rom_write(addr, data, mem),
            Mbc::Mbc1Multi64(m) => m.rom_write(addr, data, mem),
            Mbc::Mbc2(m) => m.rom_write(addr, data, mem),
            Mbc::Mbc3(m) => m.rom_write(addr, data, mem, rtc),
            Mbc::Mbc5(m) => m.rom_write(addr, data, mem),
            Mbc::HuC1(m) => m.rom_write(addr, data, mem),
            Mbc::Tpp1(m) => m.rom_write(addr, data, mem, tx),
        }
    }

    /// Whether ROM bank `bank` can appear in the window containing `addr`.
    /// Debugger/tester predicate for view consistency.
    pub fn can_map_bank_at(&self, addr: u16, bank: usize) -> bool {
        match self {
            Mbc::Mbc1Multi64(m) => m.can_map_bank_at(addr, bank),
            _ => (addr < 0x4000) == (bank == 0),
        }
    }

    pub fn save_state(&self, ss: &mut MemState) {
        match self {
            Mbc::None => (),
            Mbc::Rom(m) => m.save_state(ss),
            Mbc::Mbc1(m) => m.save_state(ss),
            Mbc::Mbc1Multi64(m) => m.save_state(ss),
            Mbc::Mbc2(m) => m.save_state(ss),
            Mbc::Mbc3(m) => m.save_state(ss),
            Mbc::Mbc5(m) => m.save_state(ss),
            Mbc::HuC1(m) => m.save_state(ss),
            Mbc::Tpp1(m) => m.save_state(ss),
        }
    }

    /// Bidirectional snapshot hook: `load == false` captures the registers
    /// into `ss`, `load == true` restores and re-aims the windows.
    pub fn sync_state(
        &mut self,
        ss: &mut MemState,
        mem: &mut MemPtrs,
        rtc: &mut Rtc,
        tx: &mut Tpp1X,
        load: bool,
    ) {
        if load {
            self.load_state(ss, mem, rtc, tx);
        } else {
            self.save_state(ss);
        }
    }

    /// Restores registers and re-aims every window from the restored state.
    pub fn load_state(
        &mut self,
        ss: &MemState,
        mem: &mut MemPtrs,
        rtc: &mut Rtc,
        tx: &mut Tpp1X,
    ) {
        match self {
            Mbc::None => (),
            Mbc::Rom(m) => m.load_state(ss, mem),
            Mbc::Mbc1(m) => m.load_state(ss, mem),
            Mbc::Mbc1Multi64(m) => m.load_state(ss, mem),
            Mbc::Mbc2(m) => m.load_state(ss, mem),
            Mbc::Mbc3(m) => m.load_state(ss, mem, rtc),
            Mbc::Mbc5(m) => m.load_state(ss, mem),
            Mbc::HuC1(m) => m.load_state(ss, mem),
            Mbc::Tpp1(m) => m.load_state(ss, mem, tx),
        }
    }
}
