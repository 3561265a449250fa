mod test_rtc;

use crate::mem::mapper::ROM_BANK_SIZE;
use crate::Cartridge;

pub const FROZEN_TIME: u32 = 1_600_000_000;

pub fn frozen_clock() -> u32 {
    FROZEN_TIME
}

/// Builds a ROM image of `rombanks` banks where every byte of bank `b`
/// reads back `b`, so window reads identify the mapped bank. The header
/// region in bank 0 is patched afterwards.
pub fn bank_stamped_rom(type_byte: u8, ram_size_code: u8, rombanks: usize) -> Vec<u8> {
    let mut rom = vec![0; rombanks * ROM_BANK_SIZE];
    for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
        chunk.fill(bank as u8);
    }
    rom[0x0134..0x0144].fill(0);
    rom[0x0134..0x013C].copy_from_slice(b"TESTCART");
    rom[0x0147] = type_byte;
    rom[0x0149] = ram_size_code;
    rom
}

pub fn tpp1_rom(ram_size_code: u8, features: u8, rombanks: usize) -> Vec<u8> {
    let mut rom = bank_stamped_rom(0xBC, 0xC1, rombanks);
    rom[0x014A] = 0x65;
    rom[0x0152] = ram_size_code;
    rom[0x0153] = features;
    rom
}

pub fn load_cart(rom: &[u8]) -> Cartridge {
    let mut cart = Cartridge::with_time_callback(frozen_clock);
    cart.load_rom(rom, false, false).unwrap();
    cart
}

pub fn load_multicart(rom: &[u8]) -> Cartridge {
    let mut cart = Cartridge::with_time_callback(frozen_clock);
    cart.load_rom(rom, false, true).unwrap();
    cart
}
