use bitflags::bitflags;

use crate::mem::mapper::{RAM_BANK_SIZE, ROM_BANK_SIZE};
use crate::mem::{VRAM_BANKS, VRAM_BANK_SIZE, WRAM_BANK_SIZE};

bitflags! {
    /// Access control for the external-RAM window at 0xA000-0xBFFF.
    ///
    /// `RTC_EN` shadows the window: reads and writes go to the clock
    /// registers of the active cartridge instead of RAM.
    pub struct RamFlags: u8 {
        const READ_EN  = 1 << 0;
        const WRITE_EN = 1 << 1;
        const RTC_EN   = 1 << 2;
    }
}

/// Owns the cartridge byte arrays and the currently mapped bank windows.
///
/// The mappers re-aim the windows on control writes; the CPU fast path
/// reads through [`rombank0_slice`](MemPtrs::rombank0_slice) /
/// [`rombank_slice`](MemPtrs::rombank_slice) without calling back into the
/// mapper. Mapping changes are visible to the next read.
pub struct MemPtrs {
    /// The ROM image. `rombanks * 16 KiB`, immutable after load.
    rom: Box<[u8]>,
    /// Cartridge RAM. `rambanks * 8 KiB`, may be empty.
    ram: Box<[u8]>,
    vram: Box<[u8]>,
    wram: Box<[u8]>,

    rombank0_off: usize,
    rombank_off: usize,
    rambank_off: usize,
    ram_flags: RamFlags,
}

impl Default for MemPtrs {
    fn default() -> MemPtrs {
        let mut memptrs = MemPtrs {
            rom: vec![].into_boxed_slice(),
            ram: vec![].into_boxed_slice(),
            vram: vec![].into_boxed_slice(),
            wram: vec![].into_boxed_slice(),
            rombank0_off: 0,
            rombank_off: 0,
            rambank_off: 0,
            ram_flags: RamFlags::empty(),
        };
        memptrs.reset(2, 0, 2);
        memptrs
    }
}

impl MemPtrs {
    /// Reallocates all arrays for a new cartridge. ROM is zeroed here; the
    /// loader copies the image and pads the tail itself.
    pub fn reset(&mut self, rombanks: usize, rambanks: usize, wrambanks: usize) {
        self.rom = vec![0; rombanks * ROM_BANK_SIZE].into_boxed_slice();
        self.ram = vec![0; rambanks * RAM_BANK_SIZE].into_boxed_slice();
        self.vram = vec![0; VRAM_BANKS * VRAM_BANK_SIZE].into_boxed_slice();
        self.wram = vec![0; wrambanks * WRAM_BANK_SIZE].into_boxed_slice();
        self.rombank0_off = 0;
        self.rombank_off = ROM_BANK_SIZE; // mappers come up with bank 1 selected
        self.rambank_off = 0;
        self.ram_flags = RamFlags::empty();
    }

    pub fn rombanks(&self) -> usize {
        self.rom.len() / ROM_BANK_SIZE
    }

    pub fn rambanks(&self) -> usize {
        self.ram.len() / RAM_BANK_SIZE
    }

    /// Aims the 0x4000-0x7FFF window at ROM bank `bank`.
    pub fn set_rombank(&mut self, bank: usize) {
        self.rombank_off = (bank & (self.rombanks() - 1)) * ROM_BANK_SIZE;
    }

    /// Aims the 0x0000-0x3FFF window at ROM bank `bank`. Only the MBC1
    /// multicart ever moves this away from bank 0.
    pub fn set_rombank0(&mut self, bank: usize) {
        self.rombank0_off = (bank & (self.rombanks() - 1)) * ROM_BANK_SIZE;
    }

    /// Aims the 0xA000-0xBFFF window at RAM bank `bank` with the given
    /// access flags. With no cartridge RAM the window keeps `RTC_EN` (the
    /// clock path does not touch RAM) but can never read or write RAM.
    pub fn set_rambank(&mut self, flags: RamFlags, bank: usize) {
        if self.ram.is_empty() {
            self.ram_flags = flags & RamFlags::RTC_EN;
            self.rambank_off = 0;
        } else {
            self.ram_flags = flags;
            self.rambank_off = (bank & (self.rambanks() - 1)) * RAM_BANK_SIZE;
        }
    }

    pub fn ram_flags(&self) -> RamFlags {
        self.ram_flags
    }

    /// The 16 KiB slice currently mapped at 0x0000-0x3FFF.
    pub fn rombank0_slice(&self) -> &[u8] {
        &self.rom[self.rombank0_off..self.rombank0_off + ROM_BANK_SIZE]
    }

    /// The 16 KiB slice currently mapped at 0x4000-0x7FFF.
    pub fn rombank_slice(&self) -> &[u8] {
        &self.rom[self.rombank_off..self.rombank_off + ROM_BANK_SIZE]
    }

    pub fn read_rombank0(&self, addr: u16) -> u8 {
        self.rom[self.rombank0_off + (addr & 0x3FFF) as usize]
    }

    pub fn read_rombank(&self, addr: u16) -> u8 {
        self.rom[self.rombank_off + (addr & 0x3FFF) as usize]
    }

    pub fn rambank_byte(&self, addr: u16) -> u8 {
        self.ram[self.rambank_off + (addr & 0x1FFF) as usize]
    }

    pub fn set_rambank_byte(&mut self, addr: u16, data: u8) {
        self.ram[self.rambank_off + (addr & 0x1FFF) as usize] = data;
    }

    pub fn romdata(&self) -> &[u8] {
        &self.rom
    }

    pub fn romdata_mut(&mut self) -> &mut [u8] {
        &mut self.rom
    }

    pub fn ramdata(&self) -> &[u8] {
        &self.ram
    }

    pub fn ramdata_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    pub fn vramdata(&self) -> &[u8] {
        &self.vram
    }

    pub fn vramdata_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    pub fn wramdata(&self) -> &[u8] {
        &self.wram
    }

    pub fn wramdata_mut(&mut self) -> &mut [u8] {
        &mut self.wram
    }
}
