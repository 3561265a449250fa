pub mod cartridge;
pub mod mapper;
pub mod memptrs;

pub(crate) const VRAM_BANK_SIZE: usize = 0x2000;
pub(crate) const VRAM_BANKS: usize = 2;

pub(crate) const WRAM_BANK_SIZE: usize = 0x1000;
