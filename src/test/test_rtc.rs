use std::sync::atomic::{AtomicU32, Ordering};

use super::{bank_stamped_rom, load_cart, FROZEN_TIME};
use crate::Cartridge;

/// Points the cartridge clock back `span` seconds by importing a savedata
/// blob carrying the base time.
fn rewind_clock(cart: &mut Cartridge, span: u32) {
    let blob = (FROZEN_TIME - span).to_le_bytes();
    cart.load_savedata(&blob);
}

fn select_register(cart: &mut Cartridge, reg: u8) {
    cart.rom_write(0x4000, reg);
}

fn latch(cart: &mut Cartridge) {
    cart.rom_write(0x6000, 0x00);
    cart.rom_write(0x6000, 0x01);
}

#[test]
fn latched_registers_decompose_elapsed_time() {
    // MBC3+TIMER+BATTERY, no RAM: the savedata blob is just the base time.
    let mut cart = load_cart(&bank_stamped_rom(0x0F, 0, 8));
    let span = 2 * 86400 + 3 * 3600 + 4 * 60 + 5;
    rewind_clock(&mut cart, span);

    cart.rom_write(0x0000, 0x0A);
    latch(&mut cart);

    select_register(&mut cart, 0x08);
    assert_eq!(cart.ram_read(0xA000), 5);
    select_register(&mut cart, 0x09);
    assert_eq!(cart.ram_read(0xA000), 4);
    select_register(&mut cart, 0x0A);
    assert_eq!(cart.ram_read(0xA000), 3);
    select_register(&mut cart, 0x0B);
    assert_eq!(cart.ram_read(0xA000), 2);
    select_register(&mut cart, 0x0C);
    assert_eq!(cart.ram_read(0xA000), 0);
}

#[test]
fn seconds_register_reads_elapsed_mod_60() {
    let mut cart = load_cart(&bank_stamped_rom(0x0F, 0, 8));
    rewind_clock(&mut cart, 42);

    cart.rom_write(0x0000, 0x0A);
    select_register(&mut cart, 0x08);
    latch(&mut cart);
    assert_eq!(cart.ram_read(0xA000), 42);
}

#[test]
fn latch_needs_a_rising_edge() {
    let mut cart = load_cart(&bank_stamped_rom(0x0F, 0, 8));
    rewind_clock(&mut cart, 10);

    cart.rom_write(0x0000, 0x0A);
    select_register(&mut cart, 0x08);
    latch(&mut cart);
    assert_eq!(cart.ram_read(0xA000), 10);

    // Clock moves, but 1 -> 1 does not re-latch.
    rewind_clock(&mut cart, 25);
    cart.rom_write(0x6000, 0x01);
    assert_eq!(cart.ram_read(0xA000), 10);

    // 0 -> 1 does.
    cart.rom_write(0x6000, 0x00);
    cart.rom_write(0x6000, 0x01);
    assert_eq!(cart.ram_read(0xA000), 25);
}

#[test]
fn day_counter_carries_at_512_days() {
    let mut cart = load_cart(&bank_stamped_rom(0x0F, 0, 8));
    rewind_clock(&mut cart, 513 * 86400 + 7);

    cart.rom_write(0x0000, 0x0A);
    latch(&mut cart);

    select_register(&mut cart, 0x0B);
    assert_eq!(cart.ram_read(0xA000), 1);
    select_register(&mut cart, 0x0C);
    let dh = cart.ram_read(0xA000);
    assert_eq!(dh & 0x80, 0x80, "carry flag should be sticky");
    assert_eq!(dh & 0x01, 0, "day MSB");
    select_register(&mut cart, 0x08);
    assert_eq!(cart.ram_read(0xA000), 7);

    // The wrap rolled base_time forward by 512 days.
    let saved = cart.save_savedata();
    let base = u32::from_le_bytes([saved[0], saved[1], saved[2], saved[3]]);
    assert_eq!(base, FROZEN_TIME - (513 * 86400 + 7) + 512 * 86400);
}

#[test]
fn register_writes_store_directly() {
    let mut cart = load_cart(&bank_stamped_rom(0x0F, 0, 8));

    cart.rom_write(0x0000, 0x0A);
    select_register(&mut cart, 0x08);
    cart.ram_write(0xA000, 33);
    assert_eq!(cart.ram_read(0xA000), 33);
}

#[test]
fn halt_bit_freezes_latched_time() {
    static NOW: AtomicU32 = AtomicU32::new(FROZEN_TIME);
    fn ticking_clock() -> u32 {
        NOW.load(Ordering::Relaxed)
    }

    NOW.store(FROZEN_TIME, Ordering::Relaxed);
    let mut cart = Cartridge::with_time_callback(ticking_clock);
    cart.load_rom(&bank_stamped_rom(0x0F, 0, 8), false, false)
        .unwrap();

    cart.rom_write(0x0000, 0x0A);
    select_register(&mut cart, 0x0C);
    cart.ram_write(0xA000, 0x40); // halt

    NOW.store(FROZEN_TIME + 1000, Ordering::Relaxed);
    select_register(&mut cart, 0x08);
    latch(&mut cart);
    assert_eq!(cart.ram_read(0xA000), 0, "halted clock must not advance");

    // Clearing the halt bit swallows the halt span.
    select_register(&mut cart, 0x0C);
    cart.ram_write(0xA000, 0x00);
    NOW.store(FROZEN_TIME + 1030, Ordering::Relaxed);
    select_register(&mut cart, 0x08);
    latch(&mut cart);
    assert_eq!(cart.ram_read(0xA000), 30);
}

#[test]
fn mbc3_without_timer_maps_ram_not_clock() {
    // Type 0x13 has RAM+battery but no timer.
    let mut cart = load_cart(&bank_stamped_rom(0x13, 2, 8));

    cart.rom_write(0x0000, 0x0A);
    cart.rom_write(0x4000, 0x08);
    cart.ram_write(0xA000, 0x21);
    // Bank 8 masks down onto the single RAM bank; no clock register here.
    assert_eq!(cart.ram_read(0xA000), 0x21);
    cart.rom_write(0x6000, 0x00);
    cart.rom_write(0x6000, 0x01);
    assert_eq!(cart.ram_read(0xA000), 0x21);
}

#[test]
fn rtc_survives_savedata_round_trip() {
    let mut cart = load_cart(&bank_stamped_rom(0x10, 3, 8));
    rewind_clock(&mut cart, 98765);

    cart.rom_write(0x0000, 0x0A);
    cart.rom_write(0x4000, 0x02);
    cart.ram_write(0xA000, 0xAB);
    cart.ram_write(0xBFFF, 0xCD);

    let blob = cart.save_savedata();
    assert_eq!(blob.len(), 4 * 0x2000 + 4);

    let mut fresh = load_cart(&bank_stamped_rom(0x10, 3, 8));
    fresh.load_savedata(&blob);
    assert_eq!(fresh.save_savedata(), blob);

    fresh.rom_write(0x0000, 0x0A);
    fresh.rom_write(0x4000, 0x02);
    assert_eq!(fresh.ram_read(0xA000), 0xAB);
    assert_eq!(fresh.ram_read(0xBFFF), 0xCD);

    fresh.rom_write(0x4000, 0x08);
    fresh.rom_write(0x6000, 0x00);
    fresh.rom_write(0x6000, 0x01);
    assert_eq!(fresh.ram_read(0xA000), (98765 % 60) as u8);
}

#[test]
fn clockless_cartridge_stays_at_base_time() {
    // No injected host clock: latching always yields zero elapsed time.
    let mut cart = Cartridge::new();
    cart.load_rom(&bank_stamped_rom(0x0F, 0, 8), false, false)
        .unwrap();

    cart.rom_write(0x0000, 0x0A);
    select_register(&mut cart, 0x08);
    latch(&mut cart);
    assert_eq!(cart.ram_read(0xA000), 0);
}
