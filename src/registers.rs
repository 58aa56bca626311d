//! Controller register block
//!
//! The GMAC exposes its MAC and DMA control/status registers in a single memory-mapped window.
//! [`Register`] names the registers the driver touches by their byte offset in that window, the
//! submodules hold their bit definitions, and [`Csr`] is the access seam: [`RegisterBlock`]
//! implements it over the real window with volatile accesses.

use core::ptr::NonNull;

/// Registers used by the driver, by byte offset from the start of the CSR window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Register {
    /// MAC configuration (MACCR)
    MacConfiguration = 0x0000,
    /// GMII address (GMIIAR), the request half of the transceiver access pair
    GmiiAddress = 0x0010,
    /// GMII data (GMIIDR), the data half of the transceiver access pair
    GmiiData = 0x0014,
    /// MAC address 0, bytes 4 and 5 plus the address-enable flag
    MacAddress0High = 0x0040,
    /// MAC address 0, bytes 0 to 3
    MacAddress0Low = 0x0044,
    /// MMC (statistics counters) control
    MmcControl = 0x0100,
    /// DMA bus mode (BMR)
    BusMode = 0x1000,
    /// DMA transmit poll demand
    TransmitPollDemand = 0x1004,
    /// DMA receive poll demand
    ReceivePollDemand = 0x1008,
    /// Receive descriptor list address (RDLA)
    ReceiveDescriptorList = 0x100C,
    /// Transmit descriptor list address (TDLA)
    TransmitDescriptorList = 0x1010,
    /// DMA status
    Status = 0x1014,
    /// DMA operation mode (OMR)
    OperationMode = 0x1018,
    /// DMA interrupt enable (IER)
    InterruptEnable = 0x101C,
}

impl Register {
    /// Byte offset of the register in the CSR window.
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// DMA bus mode register bits
pub mod bus_mode {
    /// Software reset of the MAC and DMA; self-clearing
    pub const SOFTWARE_RESET: u32 = 1 << 0;
    /// Fixed burst transfers
    pub const FIXED_BURST: u32 = 1 << 16;
}

/// DMA operation mode register bits
pub mod operation_mode {
    /// Start/stop the receive process
    pub const START_RECEIVE: u32 = 1 << 1;
    /// Start/stop the transmit process
    pub const START_TRANSMIT: u32 = 1 << 13;
    /// Transmit store and forward
    pub const TRANSMIT_STORE_FORWARD: u32 = 1 << 21;
}

/// GMII address register fields
pub mod gmii_address {
    /// Transaction in progress; set to start a transaction
    pub const BUSY: u32 = 1 << 0;
    /// Write transaction when set, read when clear
    pub const WRITE: u32 = 1 << 1;
    /// MDC clock range for a 100-150 MHz CSR clock (CSR clock / 62)
    pub const CLOCK_RANGE_100_150_MHZ: u32 = 0b0001 << 2;
    pub const REGISTER_SHIFT: u32 = 6;
    pub const REGISTER_MASK: u32 = 0x1F << REGISTER_SHIFT;
    pub const PHY_ADDRESS_SHIFT: u32 = 11;
    pub const PHY_ADDRESS_MASK: u32 = 0x1F << PHY_ADDRESS_SHIFT;
}

/// MAC configuration register bits
pub mod mac_configuration {
    /// Receiver enable
    pub const RECEIVER_ENABLE: u32 = 1 << 2;
    /// Transmitter enable
    pub const TRANSMITTER_ENABLE: u32 = 1 << 3;
    /// Full duplex
    pub const DUPLEX_MODE: u32 = 1 << 11;
    /// 100 Mb/s on the RMII interface
    pub const SPEED_100: u32 = 1 << 14;
    /// Vendor bit pattern set during bring-up. Carried verbatim; its meaning is not documented.
    pub const VENDOR_BITS: u32 = 0x3000_0000;
}

/// MMC control register bits
pub mod mmc_control {
    /// Reset all statistics counters; self-clearing
    pub const COUNTER_RESET: u32 = 1 << 0;
    /// Freeze the statistics counters
    pub const COUNTER_FREEZE: u32 = 1 << 3;
}

/// MAC address high register bits
pub mod mac_address_high {
    /// The address in this register pair is valid
    pub const ADDRESS_ENABLE: u32 = 1 << 31;
}

/// DMA interrupt enable register bits
pub mod interrupt_enable {
    /// Transmit interrupt
    pub const TRANSMIT: u32 = 1 << 0;
    /// Receive interrupt
    pub const RECEIVE: u32 = 1 << 6;
    /// Normal interrupt summary
    pub const NORMAL_SUMMARY: u32 = 1 << 16;
}

/// Access to the controller's control/status registers
pub trait Csr {
    fn read(&self, register: Register) -> u32;
    fn write(&mut self, register: Register, value: u32);

    fn modify<F: FnOnce(u32) -> u32>(&mut self, register: Register, f: F) {
        let value = self.read(register);
        self.write(register, f(value));
    }

    fn set_bits(&mut self, register: Register, bits: u32) {
        self.modify(register, |value| value | bits);
    }
}

impl<C: Csr + ?Sized> Csr for &mut C {
    fn read(&self, register: Register) -> u32 {
        (**self).read(register)
    }

    fn write(&mut self, register: Register, value: u32) {
        (**self).write(register, value)
    }
}

/// The controller's memory-mapped CSR window
///
/// Every access is a single volatile 32-bit load or store, so accesses are neither cached in
/// registers nor merged or reordered with respect to each other.
pub struct RegisterBlock {
    base: NonNull<u32>,
}

// The window is owned exclusively by whoever holds the `RegisterBlock`.
unsafe impl Send for RegisterBlock {}

impl RegisterBlock {
    /// Wraps the CSR window starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to the controller's mapped, uncached register window, which must stay
    /// mapped for as long as the returned value exists, and nothing else may access the window
    /// concurrently.
    pub const unsafe fn new(base: NonNull<u32>) -> Self {
        RegisterBlock { base }
    }

    fn pointer(&self, register: Register) -> *mut u32 {
        // Offsets are all multiples of four
        unsafe { self.base.as_ptr().add(register.offset() / 4) }
    }
}

impl Csr for RegisterBlock {
    fn read(&self, register: Register) -> u32 {
        unsafe { core::ptr::read_volatile(self.pointer(register)) }
    }

    fn write(&mut self, register: Register, value: u32) {
        unsafe { core::ptr::write_volatile(self.pointer(register), value) }
    }
}
