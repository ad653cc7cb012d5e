// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB CDC host link exposed as a blocking `embedded-io` byte stream.
//!
//! The USB device is polled for as long as a call is blocked, so the
//! dispatcher can treat the link like a plain serial port.

use embedded_io::{ErrorKind, ErrorType, Read, Write};
use rp2040_hal::usb::UsbBus;
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use crate::config::{USB_MANUFACTURER, USB_PID, USB_PRODUCT, USB_SERIAL, USB_VID};

pub struct UsbLink {
    serial: SerialPort<'static, UsbBus>,
    usb_dev: UsbDevice<'static, UsbBus>,
}

/// USB stack failure other than "try again".
#[derive(Debug)]
pub struct UsbLinkError(pub UsbError);

impl embedded_io::Error for UsbLinkError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl defmt::Format for UsbLinkError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", defmt::Debug2Format(&self.0))
    }
}

impl UsbLink {
    pub fn new(usb_bus: &'static UsbBusAllocator<UsbBus>) -> Self {
        let serial = SerialPort::new(usb_bus);
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(USB_VID, USB_PID))
            .strings(&[StringDescriptors::default()
                .manufacturer(USB_MANUFACTURER)
                .product(USB_PRODUCT)
                .serial_number(USB_SERIAL)])
            .unwrap()
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();

        Self { serial, usb_dev }
    }

    /// Poll USB device. Must be called frequently.
    pub fn poll(&mut self) -> bool {
        self.usb_dev.poll(&mut [&mut self.serial])
    }
}

impl ErrorType for UsbLink {
    type Error = UsbLinkError;
}

impl Read for UsbLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            self.poll();
            match self.serial.read(buf) {
                Ok(0) | Err(UsbError::WouldBlock) => {}
                Ok(count) => return Ok(count),
                Err(e) => return Err(UsbLinkError(e)),
            }
        }
    }
}

impl Write for UsbLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.serial.write(buf) {
                Ok(0) | Err(UsbError::WouldBlock) => {
                    self.poll();
                }
                Ok(count) => return Ok(count),
                Err(e) => return Err(UsbLinkError(e)),
            }
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        loop {
            match self.serial.flush() {
                Ok(()) => return Ok(()),
                Err(UsbError::WouldBlock) => {
                    self.poll();
                }
                Err(e) => return Err(UsbLinkError(e)),
            }
        }
    }
}
