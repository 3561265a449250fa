//! Typed save-state blocks. This is the emulator's internal snapshot
//! format, not the battery savedata ABI.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SaveState {
    pub mem: MemState,
    pub rtc: RtcState,
    pub tpp1: Tpp1State,
}

/// Mapper registers plus the mutable memory contents.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemState {
    pub vram: Vec<u8>,
    pub sram: Vec<u8>,
    pub wram: Vec<u8>,
    pub rombank: u16,
    pub rambank: u8,
    pub enable_ram: bool,
    pub ram_bank_mode: bool,
    pub mapmode: u8,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RtcState {
    pub base_time: u32,
    pub halt_time: u32,
    pub data_dh: u8,
    pub data_dl: u8,
    pub data_h: u8,
    pub data_m: u8,
    pub data_s: u8,
    pub last_latch_data: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tpp1State {
    pub base_time: u32,
    pub halt_time: u32,
    pub rombank: u16,
    pub rambank: u8,
    pub data_w: u8,
    pub data_h: u8,
    pub data_m: u8,
    pub data_s: u8,
    pub rumble: u8,
    pub curmap: u8,
    pub running: bool,
    pub overflow: bool,
}
