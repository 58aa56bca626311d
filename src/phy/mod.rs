//! Transceiver register access
//!
//! The transceiver is not memory-mapped. Its registers are reached through the controller's GMII
//! address/data register pair: a request word naming the transceiver, the register and the
//! direction is written to the address register with the busy bit set, and the controller clears
//! the busy bit once the management frame has been shifted out (and, for reads, the result has
//! landed in the data register).

use crate::{
    registers::{gmii_address, Csr, Register as CsrRegister},
    Error, Result, Timing,
};
use hal::blocking::delay::DelayUs;

pub mod bmcr; // Basic Mode Control Register
pub use bmcr::{Reader as ControlReader, Writer as ControlWriter};

pub mod bmsr; // Basic Mode Status Register
pub use bmsr::Reader as StatusReader;

/// Standard transceiver registers used by the driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Bmcr = 0x00,
    Bmsr = 0x01,
}

pub trait Phy {
    fn read_register(&mut self, register: Register) -> Result<u16>;
    fn write_register(&mut self, register: Register, new_value: u16) -> Result<()>;

    /// Sleeps for one poll interval.
    fn pause(&mut self);

    fn control(&mut self) -> Result<ControlReader> {
        Ok(ControlReader::new(self.read_register(Register::Bmcr)?))
    }

    fn modify<F: FnOnce(ControlWriter) -> ControlWriter>(&mut self, f: F) -> Result<()> {
        let w = ControlWriter::new(self.read_register(Register::Bmcr)?);
        let new_value = f(w);
        self.write_register(Register::Bmcr, new_value.0)
    }

    fn status(&mut self) -> Result<StatusReader> {
        Ok(StatusReader::new(self.read_register(Register::Bmsr)?))
    }
}

/// The GMII management interface of one controller, talking to the transceiver at `address`
///
/// A single caller is assumed; nothing here locks the register pair.
pub struct Mii<'a, C, D> {
    csr: &'a mut C,
    delay: &'a mut D,
    timing: Timing,
    address: u8,
}

impl<'a, C: Csr, D: DelayUs<u32>> Mii<'a, C, D> {
    pub fn new(csr: &'a mut C, delay: &'a mut D, timing: Timing, address: u8) -> Self {
        Mii {
            csr,
            delay,
            timing,
            address,
        }
    }

    fn is_busy(&self) -> bool {
        self.csr.read(CsrRegister::GmiiAddress) & gmii_address::BUSY != 0
    }

    // The interface is expected to be idle before a transaction is issued, so this has no bound.
    fn wait_for_idle(&self) {
        while self.is_busy() {}
    }

    fn request(&self, register: Register, write: bool) -> u32 {
        let mut request = ((self.address as u32) << gmii_address::PHY_ADDRESS_SHIFT)
            & gmii_address::PHY_ADDRESS_MASK
            | ((register as u32) << gmii_address::REGISTER_SHIFT) & gmii_address::REGISTER_MASK
            | gmii_address::CLOCK_RANGE_100_150_MHZ
            | gmii_address::BUSY;
        if write {
            request |= gmii_address::WRITE;
        }
        request
    }

    fn wait_for_completion(&mut self) -> Result<()> {
        let mut retries = 0;
        while self.is_busy() {
            self.delay.delay_us(self.timing.poll_delay.ticks());
            retries += 1;
            if retries > self.timing.max_retries {
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }
}

impl<'a, C: Csr, D: DelayUs<u32>> Phy for Mii<'a, C, D> {
    fn read_register(&mut self, register: Register) -> Result<u16> {
        self.wait_for_idle();

        let request = self.request(register, false);
        self.csr.write(CsrRegister::GmiiAddress, request);

        self.wait_for_completion()?;

        Ok(self.csr.read(CsrRegister::GmiiData) as u16)
    }

    fn write_register(&mut self, register: Register, new_value: u16) -> Result<()> {
        self.wait_for_idle();

        // The data register must hold the value before the request starts the transaction
        self.csr.write(CsrRegister::GmiiData, new_value as u32);
        let request = self.request(register, true);
        self.csr.write(CsrRegister::GmiiAddress, request);

        self.wait_for_completion()
    }

    fn pause(&mut self) {
        self.delay.delay_us(self.timing.poll_delay.ticks());
    }
}
