// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the bridge.

use rp2040_hal as hal;
use rp2040_hal::fugit::HertzU32;
use rp2040_hal::usb::UsbBus;
use rp2040_hal::Clock;
use usb_device::class_prelude::UsbBusAllocator;

use crate::config::XOSC_HZ;

/// Bus pins as they come out of reset; the transport driver picks their
/// function.
pub type SckPin = hal::gpio::Pin<hal::gpio::bank0::Gpio2, hal::gpio::FunctionNull, hal::gpio::PullDown>;
pub type MosiPin = hal::gpio::Pin<hal::gpio::bank0::Gpio3, hal::gpio::FunctionNull, hal::gpio::PullDown>;
pub type MisoPin = hal::gpio::Pin<hal::gpio::bank0::Gpio4, hal::gpio::FunctionNull, hal::gpio::PullDown>;
pub type CsPin = hal::gpio::Pin<hal::gpio::bank0::Gpio5, hal::gpio::FunctionNull, hal::gpio::PullDown>;

/// Static storage for UsbBusAllocator (required by usb-device for 'static lifetime).
static mut USB_BUS: Option<UsbBusAllocator<UsbBus>> = None;

pub fn usb_bus_ref() -> &'static UsbBusAllocator<UsbBus> {
    unsafe { (*core::ptr::addr_of!(USB_BUS)).as_ref().unwrap() }
}

fn store_usb_bus(bus: UsbBusAllocator<UsbBus>) {
    unsafe {
        USB_BUS = Some(bus);
    }
}

pub struct BusPins {
    pub sck: SckPin,
    pub mosi: MosiPin,
    pub miso: MisoPin,
    pub cs: CsPin,
}

pub struct Peripherals {
    pub timer: hal::Timer,
    pub spi0: hal::pac::SPI0,
    pub resets: hal::pac::RESETS,
    pub peri_freq: HertzU32,
    pub bus_pins: BusPins,
}

/// Bring up clocks, GPIO and the USB bus allocator.
///
/// Clock bring-up failing means the board cannot run at all, so it panics.
pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        XOSC_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let peri_freq = clocks.peripheral_clock.freq();

    store_usb_bus(UsbBusAllocator::new(UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    )));

    Peripherals {
        timer,
        spi0: pac.SPI0,
        resets: pac.RESETS,
        peri_freq,
        bus_pins: BusPins {
            sck: pins.gpio2,
            mosi: pins.gpio3,
            miso: pins.gpio4,
            cs: pins.gpio5,
        },
    }
}
