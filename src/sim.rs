//! Host-side stand-ins for the controller, its transceiver and the platform

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;

use core::alloc::Layout;

use crate::registers::{bus_mode, gmii_address, Csr, Register};
use crate::{
    Allocation, Allocator, BusConfiguration, ConfigStore, Error, InterruptController, Result,
};

/// Byte pattern of fresh arena memory
pub(crate) const ARENA_FILL: u8 = 0xA5;

/// A leaked, 8-byte aligned region filled with [`ARENA_FILL`].
pub(crate) fn arena(size: usize) -> &'static mut [u8] {
    let words = vec![u64::from_ne_bytes([ARENA_FILL; 8]); (size + 7) / 8].leak();
    unsafe { core::slice::from_raw_parts_mut(words.as_mut_ptr().cast::<u8>(), size) }
}

const BMCR_RESET: u16 = 1 << 15;
const BMCR_DEFAULT: u16 = (1 << 13) | (1 << 12) | (1 << 8);
const BMSR_ABILITIES: u16 = 0x7800 | 1;
const BMSR_AUTO_NEGOTIATION_CAPABLE: u16 = 1 << 3;
const BMSR_AUTO_NEGOTIATION_COMPLETE: u16 = 1 << 5;
const BMSR_LINK: u16 = 1 << 2;

/// A transceiver on the management bus
pub(crate) struct SimulatedTransceiver {
    address: u8,
    auto_negotiation_capable: bool,
    reset_polls: u32,
    auto_negotiation_after: Option<u32>,
    link_after: Option<u32>,
    status: Option<u16>,
    bmcr: u16,
    reset_remaining: u32,
    status_reads: u32,
    pub bmcr_writes: Vec<u16>,
}

impl SimulatedTransceiver {
    pub fn new() -> Self {
        SimulatedTransceiver {
            address: 1,
            auto_negotiation_capable: true,
            reset_polls: 1,
            auto_negotiation_after: Some(2),
            link_after: Some(3),
            status: None,
            bmcr: BMCR_DEFAULT,
            reset_remaining: 0,
            status_reads: 0,
            bmcr_writes: Vec::new(),
        }
    }

    /// Status register reads return `status` unconditionally.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_auto_negotiation_capable(mut self, capable: bool) -> Self {
        self.auto_negotiation_capable = capable;
        self
    }

    /// The link comes up once more than `reads` status reads followed the last reset.
    pub fn with_link_after(mut self, reads: Option<u32>) -> Self {
        self.link_after = reads;
        self
    }

    pub fn bmcr(&self) -> u16 {
        self.bmcr
    }

    pub fn drop_link(&mut self) {
        self.link_after = None;
    }

    fn read(&mut self, register: u32) -> u16 {
        match register {
            0 => {
                if self.bmcr & BMCR_RESET != 0 {
                    if self.reset_remaining > 0 {
                        self.reset_remaining -= 1;
                    } else {
                        self.bmcr = BMCR_DEFAULT | (self.bmcr & !BMCR_RESET);
                    }
                }
                self.bmcr
            }
            1 => {
                if let Some(status) = self.status {
                    return status;
                }

                self.status_reads += 1;
                let reads = self.status_reads;
                let reached = |after: Option<u32>| after.map_or(false, |n| reads > n);

                let mut status = BMSR_ABILITIES;
                if self.auto_negotiation_capable {
                    status |= BMSR_AUTO_NEGOTIATION_CAPABLE;
                    if reached(self.auto_negotiation_after) {
                        status |= BMSR_AUTO_NEGOTIATION_COMPLETE;
                    }
                }
                if reached(self.link_after) {
                    status |= BMSR_LINK;
                }
                status
            }
            _ => 0,
        }
    }

    fn write(&mut self, register: u32, value: u16) {
        if register != 0 {
            return;
        }

        self.bmcr_writes.push(value);
        self.bmcr = value;
        if value & BMCR_RESET != 0 {
            self.reset_remaining = self.reset_polls;
            self.status_reads = 0;
        }
    }
}

#[derive(Clone, Copy)]
struct Transaction {
    busy_remaining: u32,
    address: u32,
    register: u32,
    write: bool,
}

/// A controller register window with self-clearing reset and GMII busy bits
///
/// The MAC reset bit reads back set for a configured number of polls after it is written. Each
/// GMII transaction reads back busy for a configured number of polls, then completes against the
/// attached transceiver.
pub(crate) struct SimulatedCsr {
    registers: RefCell<HashMap<Register, u32>>,
    writes: Vec<(Register, u32)>,
    mac_reset_polls: u32,
    mac_reset_remaining: Cell<u32>,
    gmii_busy_polls: u32,
    transaction: Cell<Option<Transaction>>,
    gmii_polls: Cell<u32>,
    transceiver: RefCell<SimulatedTransceiver>,
}

impl SimulatedCsr {
    pub fn new() -> Self {
        SimulatedCsr {
            registers: RefCell::new(HashMap::new()),
            writes: Vec::new(),
            mac_reset_polls: 0,
            mac_reset_remaining: Cell::new(0),
            gmii_busy_polls: 0,
            transaction: Cell::new(None),
            gmii_polls: Cell::new(0),
            transceiver: RefCell::new(SimulatedTransceiver::new()),
        }
    }

    pub fn with_mac_reset_polls(mut self, polls: u32) -> Self {
        self.mac_reset_polls = polls;
        self
    }

    pub fn with_gmii_busy_polls(mut self, polls: u32) -> Self {
        self.gmii_busy_polls = polls;
        self
    }

    pub fn with_transceiver(mut self, transceiver: SimulatedTransceiver) -> Self {
        self.transceiver = RefCell::new(transceiver);
        self
    }

    /// Busy-bit polls seen by the most recent GMII transaction.
    pub fn gmii_polls(&self) -> u32 {
        self.gmii_polls.get()
    }

    pub fn writes(&self) -> &[(Register, u32)] {
        &self.writes
    }

    pub fn writes_to(&self, register: Register) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == register)
            .map(|(_, value)| *value)
            .collect()
    }

    /// Stored register contents, without read side effects.
    pub fn value(&self, register: Register) -> u32 {
        self.stored(register)
    }

    pub fn transceiver(&self) -> Ref<'_, SimulatedTransceiver> {
        self.transceiver.borrow()
    }

    pub fn transceiver_mut(&mut self) -> RefMut<'_, SimulatedTransceiver> {
        self.transceiver.borrow_mut()
    }

    fn stored(&self, register: Register) -> u32 {
        self.registers.borrow().get(&register).copied().unwrap_or(0)
    }

    fn store(&self, register: Register, value: u32) {
        self.registers.borrow_mut().insert(register, value);
    }

    fn complete(&self, transaction: Transaction) {
        let mut transceiver = self.transceiver.borrow_mut();
        let present = transaction.address == transceiver.address as u32;

        if transaction.write {
            if present {
                let value = self.stored(Register::GmiiData) as u16;
                transceiver.write(transaction.register, value);
            }
        } else {
            let value = if present {
                transceiver.read(transaction.register)
            } else {
                0xFFFF
            };
            self.store(Register::GmiiData, value as u32);
        }
    }
}

impl Csr for SimulatedCsr {
    fn read(&self, register: Register) -> u32 {
        let value = self.stored(register);
        match register {
            Register::BusMode if value & bus_mode::SOFTWARE_RESET != 0 => {
                let remaining = self.mac_reset_remaining.get();
                if remaining > 0 {
                    self.mac_reset_remaining.set(remaining - 1);
                    value
                } else {
                    self.store(register, value & !bus_mode::SOFTWARE_RESET);
                    value & !bus_mode::SOFTWARE_RESET
                }
            }
            Register::GmiiAddress => match self.transaction.get() {
                Some(mut transaction) => {
                    self.gmii_polls.set(self.gmii_polls.get() + 1);
                    if transaction.busy_remaining > 0 {
                        transaction.busy_remaining -= 1;
                        self.transaction.set(Some(transaction));
                        value | gmii_address::BUSY
                    } else {
                        self.transaction.set(None);
                        self.complete(transaction);
                        self.store(register, value & !gmii_address::BUSY);
                        value & !gmii_address::BUSY
                    }
                }
                None => value & !gmii_address::BUSY,
            },
            _ => value,
        }
    }

    fn write(&mut self, register: Register, value: u32) {
        self.writes.push((register, value));
        self.store(register, value);

        match register {
            Register::BusMode if value & bus_mode::SOFTWARE_RESET != 0 => {
                self.mac_reset_remaining.set(self.mac_reset_polls);
            }
            Register::GmiiAddress if value & gmii_address::BUSY != 0 => {
                self.gmii_polls.set(0);
                self.transaction.set(Some(Transaction {
                    busy_remaining: self.gmii_busy_polls,
                    address: (value & gmii_address::PHY_ADDRESS_MASK)
                        >> gmii_address::PHY_ADDRESS_SHIFT,
                    register: (value & gmii_address::REGISTER_MASK)
                        >> gmii_address::REGISTER_SHIFT,
                    write: value & gmii_address::WRITE != 0,
                }));
            }
            _ => {}
        }
    }
}

/// Records every platform call; the configuration store always holds one hardware address.
pub(crate) struct RecordingPlatform {
    address: [u8; 6],
    pub config_writes: Vec<(u8, u16)>,
    pub handler_lines: Vec<u8>,
    pub fetches: Vec<(u16, usize)>,
}

impl RecordingPlatform {
    pub fn new(address: [u8; 6]) -> Self {
        RecordingPlatform {
            address,
            config_writes: Vec::new(),
            handler_lines: Vec::new(),
            fetches: Vec::new(),
        }
    }
}

impl BusConfiguration for RecordingPlatform {
    fn write_config_word(&mut self, offset: u8, value: u16) {
        self.config_writes.push((offset, value));
    }
}

impl InterruptController for RecordingPlatform {
    fn register_handler(&mut self, line: u8, _handler: fn()) {
        self.handler_lines.push(line);
    }
}

impl ConfigStore for RecordingPlatform {
    fn fetch(&mut self, identifier: u16, bytes: &mut [u8]) {
        self.fetches.push((identifier, bytes.len()));
        let length = bytes.len().min(self.address.len());
        bytes[..length].copy_from_slice(&self.address[..length]);
    }
}

/// Passes requests through to `inner` except the `fail_at`-th (counting from 1)
pub(crate) struct FailingAllocator<A> {
    inner: A,
    fail_at: usize,
    requests: usize,
}

impl<A> FailingAllocator<A> {
    pub fn new(inner: A, fail_at: usize) -> Self {
        FailingAllocator {
            inner,
            fail_at,
            requests: 0,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests
    }
}

unsafe impl<A: Allocator> Allocator for FailingAllocator<A> {
    fn allocate(&mut self, layout: Layout) -> Result<Allocation> {
        self.requests += 1;
        if self.requests == self.fail_at {
            return Err(Error::ResourceExhausted);
        }
        self.inner.allocate(layout)
    }
}

/// Counts delays instead of sleeping
#[derive(Default)]
pub(crate) struct CountingDelay {
    pub calls: u32,
    pub total_us: u32,
}

impl hal::blocking::delay::DelayUs<u32> for CountingDelay {
    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_us = self.total_us.saturating_add(us);
    }
}
