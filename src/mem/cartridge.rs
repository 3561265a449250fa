use std::cmp;

use log::{info, warn};
use thiserror::Error;

use crate::mem::mapper::huc1::HuC1Mapper;
use crate::mem::mapper::mbc1::{Mbc1Mapper, Mbc1Multi64Mapper};
use crate::mem::mapper::mbc2::Mbc2Mapper;
use crate::mem::mapper::mbc3::Mbc3Mapper;
use crate::mem::mapper::mbc5::Mbc5Mapper;
use crate::mem::mapper::rom::RomMapper;
use crate::mem::mapper::rtc::{Rtc, TimeCallback};
use crate::mem::mapper::tpp1::Tpp1Mapper;
use crate::mem::mapper::tpp1x::Tpp1X;
use crate::mem::mapper::{Mbc, ROM_BANK_SIZE};
use crate::mem::memptrs::{MemPtrs, RamFlags};
use crate::savestate::SaveState;

const HEADER_SIZE: usize = 0x154;

const CGB_FLAG_ADDR: usize = 0x0143;
const TYPE_ADDR: usize = 0x0147;
const RAM_SIZE_ADDR: usize = 0x0149;
const TPP1_RAM_SIZE_ADDR: usize = 0x0152;
const TPP1_FEATURES_ADDR: usize = 0x0153;

const TITLE_ADDR_START: usize = 0x0134;
const TITLE_ADDR_END: usize = 0x0144;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeError {
    /// File shorter than the header, an unknown type byte, or a broken
    /// TPP1 signature.
    #[error("wrong data-format, corrupt or unsupported ROM")]
    MalformedHeader,
    /// A recognized mapper this crate does not emulate.
    #[error("unsupported cartridge type {0:#04X}")]
    UnsupportedMapper(u8),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CartridgeType {
    Plain,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
    HuC1,
    Tpp1,
}

fn check_tpp1(header: &[u8]) -> bool {
    header[TYPE_ADDR] == 0xBC && header[RAM_SIZE_ADDR] == 0xC1 && header[0x014A] == 0x65
}

fn has_rtc(header: &[u8]) -> bool {
    if check_tpp1(header) {
        return header[TPP1_FEATURES_ADDR] & 4 != 0;
    }
    matches!(header[TYPE_ADDR], 0x0F | 0x10)
}

fn has_battery(header: &[u8]) -> bool {
    if check_tpp1(header) {
        return header[TPP1_FEATURES_ADDR] & 8 != 0;
    }
    matches!(
        header[TYPE_ADDR],
        0x03 | 0x06 | 0x09 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E | 0xFF
    )
}

/// Classifies the type byte, logging one line per load naming the detected
/// cartridge or the failure.
fn classify(header: &[u8]) -> Result<CartridgeType, CartridgeError> {
    let type_byte = header[TYPE_ADDR];
    let kind = match type_byte {
        0x00 => {
            info!("Plain ROM loaded.");
            CartridgeType::Plain
        }
        0x01 => {
            info!("MBC1 ROM loaded.");
            CartridgeType::Mbc1
        }
        0x02 => {
            info!("MBC1 ROM+RAM loaded.");
            CartridgeType::Mbc1
        }
        0x03 => {
            info!("MBC1 ROM+RAM+BATTERY loaded.");
            CartridgeType::Mbc1
        }
        0x05 => {
            info!("MBC2 ROM loaded.");
            CartridgeType::Mbc2
        }
        0x06 => {
            info!("MBC2 ROM+BATTERY loaded.");
            CartridgeType::Mbc2
        }
        0x08 => {
            info!("Plain ROM with additional RAM loaded.");
            CartridgeType::Plain
        }
        0x09 => {
            info!("Plain ROM with additional RAM and Battery loaded.");
            CartridgeType::Plain
        }
        0x0B..=0x0D => {
            warn!("MM01 ROM not supported.");
            return Err(CartridgeError::UnsupportedMapper(type_byte));
        }
        0x0F => {
            info!("MBC3 ROM+TIMER+BATTERY loaded.");
            CartridgeType::Mbc3
        }
        0x10 => {
            info!("MBC3 ROM+TIMER+RAM+BATTERY loaded.");
            CartridgeType::Mbc3
        }
        0x11 => {
            info!("MBC3 ROM loaded.");
            CartridgeType::Mbc3
        }
        0x12 => {
            info!("MBC3 ROM+RAM loaded.");
            CartridgeType::Mbc3
        }
        0x13 => {
            info!("MBC3 ROM+RAM+BATTERY loaded.");
            CartridgeType::Mbc3
        }
        0x15..=0x17 => {
            warn!("MBC4 ROM not supported.");
            return Err(CartridgeError::UnsupportedMapper(type_byte));
        }
        0x19 => {
            info!("MBC5 ROM loaded.");
            CartridgeType::Mbc5
        }
        0x1A => {
            info!("MBC5 ROM+RAM loaded.");
            CartridgeType::Mbc5
        }
        0x1B => {
            info!("MBC5 ROM+RAM+BATTERY loaded.");
            CartridgeType::Mbc5
        }
        0x1C..=0x1E => {
            // Accepted as plain MBC5; the rumble motor is not modeled.
            warn!("MBC5+RUMBLE ROM mapped as MBC5, rumble not modeled.");
            CartridgeType::Mbc5
        }
        0xBC => {
            if check_tpp1(header) {
                info!("TPP1 ROM loaded.");
                CartridgeType::Tpp1
            } else {
                warn!("Wrong data-format, corrupt or unsupported ROM.");
                return Err(CartridgeError::MalformedHeader);
            }
        }
        0xFC => {
            warn!("Pocket Camera ROM not supported.");
            return Err(CartridgeError::UnsupportedMapper(type_byte));
        }
        0xFD => {
            warn!("Bandai TAMA5 ROM not supported.");
            return Err(CartridgeError::UnsupportedMapper(type_byte));
        }
        0xFE => {
            warn!("HuC3 ROM not supported.");
            return Err(CartridgeError::UnsupportedMapper(type_byte));
        }
        0xFF => {
            info!("HuC1 ROM+RAM+BATTERY loaded.");
            CartridgeType::HuC1
        }
        _ => {
            warn!("Wrong data-format, corrupt or unsupported ROM.");
            return Err(CartridgeError::MalformedHeader);
        }
    };
    Ok(kind)
}

fn rambank_count(kind: CartridgeType, header: &[u8]) -> usize {
    if kind == CartridgeType::Tpp1 {
        return match header[TPP1_RAM_SIZE_ADDR] {
            0 => 0,
            code => 1 << cmp::min(code - 1, 8),
        };
    }
    match header[RAM_SIZE_ADDR] {
        0x00 => (kind == CartridgeType::Mbc2) as usize,
        0x01 | 0x02 => 1,
        0x03 => 4,
        // 0x05 is undocumented; anything unknown gets the largest size.
        _ => 16,
    }
}

/// The cartridge as seen from the address bus: ROM/RAM banks behind a
/// memory bank controller, plus the battery and clock periphery.
pub struct Cartridge {
    memptrs: MemPtrs,
    rtc: Rtc,
    tpp1x: Tpp1X,
    mbc: Mbc,
    cgb: bool,
}

impl Default for Cartridge {
    fn default() -> Cartridge {
        Cartridge::new()
    }
}

impl Cartridge {
    /// A cartridge slot with no host clock; the RTC stands still until a
    /// callback is injected via [`Cartridge::with_time_callback`].
    pub fn new() -> Cartridge {
        Cartridge {
            memptrs: MemPtrs::default(),
            rtc: Rtc::new(None),
            tpp1x: Tpp1X::new(None),
            mbc: Mbc::None,
            cgb: false,
        }
    }

    pub fn with_time_callback(time_cb: TimeCallback) -> Cartridge {
        Cartridge {
            memptrs: MemPtrs::default(),
            rtc: Rtc::new(Some(time_cb)),
            tpp1x: Tpp1X::new(Some(time_cb)),
            mbc: Mbc::None,
            cgb: false,
        }
    }

    /// Convenience constructor wiring the system wall clock.
    pub fn with_host_clock() -> Cartridge {
        Cartridge::with_time_callback(crate::mem::mapper::rtc::unix_time_now)
    }

    /// Parses the header, sizes ROM/RAM, and constructs the mapper.
    /// On failure nothing is mutated and the previous cartridge remains
    /// loaded.
    pub fn load_rom(
        &mut self,
        romfile: &[u8],
        force_dmg: bool,
        multicart_compat: bool,
    ) -> Result<(), CartridgeError> {
        if romfile.len() < HEADER_SIZE {
            warn!("ROM file shorter than the cartridge header.");
            return Err(CartridgeError::MalformedHeader);
        }
        let header = &romfile[..HEADER_SIZE];
        let kind = classify(header)?;

        let rambanks = rambank_count(kind, header);
        let rombanks = cmp::max((romfile.len() / ROM_BANK_SIZE).next_power_of_two(), 2);
        let cgb = header[CGB_FLAG_ADDR] >> 7 != 0 && !force_dmg;

        self.mbc = Mbc::None;
        self.memptrs
            .reset(rombanks, rambanks, if cgb { 8 } else { 2 });
        self.rtc.reset();
        self.tpp1x.reset();
        self.cgb = cgb;

        // Whole banks only; a trailing partial bank is dropped and the
        // tail reads back 0xFF like unconnected address lines.
        let loaded = romfile.len() / ROM_BANK_SIZE * ROM_BANK_SIZE;
        let rom = self.memptrs.romdata_mut();
        rom[..loaded].copy_from_slice(&romfile[..loaded]);
        rom[loaded..].fill(0xFF);

        self.mbc = match kind {
            CartridgeType::Plain => Mbc::Rom(RomMapper::new()),
            CartridgeType::Mbc1 => {
                if rambanks == 0 && rombanks == 64 && multicart_compat {
                    info!("Multi-ROM \"MBC1\" presumed");
                    Mbc::Mbc1Multi64(Mbc1Multi64Mapper::new())
                } else {
                    Mbc::Mbc1(Mbc1Mapper::new())
                }
            }
            CartridgeType::Mbc2 => Mbc::Mbc2(Mbc2Mapper::new()),
            CartridgeType::Mbc3 => Mbc::Mbc3(Mbc3Mapper::new(has_rtc(header))),
            CartridgeType::Mbc5 => Mbc::Mbc5(Mbc5Mapper::new()),
            CartridgeType::HuC1 => Mbc::HuC1(HuC1Mapper::new()),
            CartridgeType::Tpp1 => {
                self.tpp1x.set(true, header[TPP1_FEATURES_ADDR]);
                Mbc::Tpp1(Tpp1Mapper::new())
            }
        };

        Ok(())
    }

    /// Control-register write in the 0x0000-0x7FFF region.
    pub fn rom_write(&mut self, addr: u16, data: u8) {
        self.mbc
            .rom_write(addr, data, &mut self.memptrs, &mut self.rtc, &mut self.tpp1x);
    }

    /// CPU read through the ROM windows. The fast path should use the
    /// [`MemPtrs`] slices directly; this is the convenience form.
    pub fn rom_read(&self, addr: u16) -> u8 {
        if addr & 0x4000 == 0 {
            self.memptrs.read_rombank0(addr)
        } else {
            self.memptrs.read_rombank(addr)
        }
    }

    /// External-RAM window read at 0xA000-0xBFFF. A clock register shadows
    /// RAM while `RTC_EN` is up; a disabled window reads 0xFF.
    pub fn ram_read(&self, addr: u16) -> u8 {
        let flags = self.memptrs.ram_flags();
        if flags.contains(RamFlags::RTC_EN) {
            if self.tpp1x.is_tpp1() {
                self.tpp1x.read(addr)
            } else {
                self.rtc.read()
            }
        } else if flags.contains(RamFlags::READ_EN) {
            self.memptrs.rambank_byte(addr)
        } else {
            0xFF
        }
    }

    /// External-RAM window write. Never fails; disabled windows swallow
    /// the byte.
    pub fn ram_write(&mut self, addr: u16, data: u8) {
        let flags = self.memptrs.ram_flags();
        if flags.contains(RamFlags::RTC_EN) {
            if self.tpp1x.is_tpp1() {
                self.tpp1x.write(addr, data);
            } else {
                self.rtc.write(data);
            }
        } else if flags.contains(RamFlags::WRITE_EN) {
            self.memptrs.set_rambank_byte(addr, data);
        }
    }

    pub fn can_map_bank_at(&self, addr: u16, bank: usize) -> bool {
        self.mbc.can_map_bank_at(addr, bank)
    }

    pub fn is_cgb(&self) -> bool {
        self.cgb
    }

    /// The ASCII title from the header, for display.
    pub fn game_title(&self) -> String {
        let rom = self.memptrs.romdata();
        let title = &rom[TITLE_ADDR_START..TITLE_ADDR_END];
        let len = title.iter().position(|&b| b == 0).unwrap_or(title.len());
        String::from_utf8_lossy(&title[..len]).into_owned()
    }

    fn header_has_battery(&self) -> bool {
        has_battery(self.memptrs.romdata())
    }

    fn header_has_rtc(&self) -> bool {
        has_rtc(self.memptrs.romdata())
    }

    /// Expected savedata blob size: battery-backed RAM plus 4 bytes of
    /// clock base-time when present.
    pub fn savedata_length(&self) -> usize {
        let mut len = 0;
        if self.header_has_battery() {
            len = self.memptrs.ramdata().len();
        }
        if self.header_has_rtc() {
            len += 4;
        }
        len
    }

    /// Imports a savedata blob: cartridge RAM first, then the little-endian
    /// base-time. A short blob restores whatever prefix it covers.
    pub fn load_savedata(&mut self, data: &[u8]) {
        let mut data = data;
        if self.header_has_battery() {
            let ram = self.memptrs.ramdata_mut();
            let n = cmp::min(ram.len(), data.len());
            ram[..n].copy_from_slice(&data[..n]);
            data = &data[n..];
        }

        if self.header_has_rtc() && data.len() >= 4 {
            let base_time = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            if self.tpp1x.is_tpp1() {
                self.tpp1x.set_base_time(base_time);
            } else {
                self.rtc.set_base_time(base_time);
            }
        }
    }

    pub fn save_savedata(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.savedata_length());
        if self.header_has_battery() {
            out.extend_from_slice(self.memptrs.ramdata());
        }
        if self.header_has_rtc() {
            let base_time = if self.tpp1x.is_tpp1() {
                self.tpp1x.base_time()
            } else {
                self.rtc.base_time()
            };
            out.extend_from_slice(&base_time.to_le_bytes());
        }
        out
    }

    pub fn save_state(&self) -> SaveState {
        let mut state = SaveState::default();
        state.mem.vram = self.memptrs.vramdata().to_vec();
        state.mem.sram = self.memptrs.ramdata().to_vec();
        state.mem.wram = self.memptrs.wramdata().to_vec();
        self.mbc.save_state(&mut state.mem);
        self.rtc.save_state(&mut state.rtc);
        self.tpp1x.save_state(&mut state.tpp1);
        state
    }

    pub fn load_state(&mut self, state: &SaveState) {
        copy_prefix(self.memptrs.vramdata_mut(), &state.mem.vram);
        copy_prefix(self.memptrs.ramdata_mut(), &state.mem.sram);
        copy_prefix(self.memptrs.wramdata_mut(), &state.mem.wram);

        if self.tpp1x.is_tpp1() {
            self.tpp1x.load_state(&state.tpp1);
        } else {
            self.rtc.load_state(&state.rtc);
        }
        self.mbc.load_state(
            &state.mem,
            &mut self.memptrs,
            &mut self.rtc,
            &mut self.tpp1x,
        );
    }

    /// Bidirectional snapshot hook: captures into `state` when `load` is
    /// false, restores from it when true.
    pub fn sync_state(&mut self, state: &mut SaveState, load: bool) {
        if load {
            self.load_state(state);
        } else {
            *state = self.save_state();
        }
    }

    /// Debugger lookup: 0 = VRAM, 1 = ROM, 2 = WRAM, 3 = cartridge RAM.
    pub fn memory_area(&self, which: usize) -> Option<&[u8]> {
        match which {
            0 => Some(self.memptrs.vramdata()),
            1 => Some(self.memptrs.romdata()),
            2 => Some(self.memptrs.wramdata()),
            3 => Some(self.memptrs.ramdata()),
            _ => None,
        }
    }

    pub fn memptrs(&self) -> &MemPtrs {
        &self.memptrs
    }

    pub fn memptrs_mut(&mut self) -> &mut MemPtrs {
        &mut self.memptrs
    }
}

fn copy_prefix(dst: &mut [u8], src: &[u8]) {
    let n = cmp::min(dst.len(), src.len());
    dst[..n].copy_from_slice(&src[..n]);
}
