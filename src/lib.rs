//! Game Boy / Game Boy Color cartridge emulation.
//!
//! Models the physical cartridge as seen from the 16-bit address bus: the
//! memory bank controller (Plain, MBC1, MBC1-Multi64, MBC2, MBC3, MBC5,
//! HuC1, TPP1), the MBC3 real-time clock, the TPP1 clock/rumble extension,
//! battery-backed save RAM, and save-state snapshots.
//!
//! The CPU core is expected to read ROM/RAM through the window slices
//! published by [`MemPtrs`] and to route control writes (0x0000-0x7FFF) and
//! external-RAM traffic (0xA000-0xBFFF) through [`Cartridge`].

pub mod mem;
pub mod savestate;

pub use mem::cartridge::{Cartridge, CartridgeError};
pub use mem::mapper::rtc::{unix_time_now, TimeCallback};
pub use mem::memptrs::{MemPtrs, RamFlags};
pub use savestate::SaveState;

#[cfg(test)]
mod test;
