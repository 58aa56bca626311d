use fugit::MicrosDurationU32;
use hal::blocking::delay::DelayUs;

use crate::{
    Allocator, Controller, Csr, Device, Platform, Result, MAX_BUFFER_SIZE, PACKET_BUFFER_SIZE,
};

/// Platform data identifier of the first MAC address
pub const MAC1_ID: u16 = 4;

/// Poll timing for every bounded busy-wait in bring-up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Sleep between two polls of a busy or reset bit.
    pub poll_delay: MicrosDurationU32,
    /// Polls allowed for GMII transactions, the MAC reset and the transceiver reset.
    pub max_retries: u32,
    /// Polls allowed while waiting for auto-negotiation and for the link.
    pub link_retries: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            poll_delay: MicrosDurationU32::from_ticks(500_000),
            max_retries: 3,
            link_retries: 3_000,
        }
    }
}

pub struct Builder {
    tx_ring_size: usize,
    rx_ring_size: usize,
    buffer_size: usize,
    timing: Timing,
    phy_address: u8,
    address_identifier: u16,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            tx_ring_size: 128,
            rx_ring_size: 128,
            buffer_size: PACKET_BUFFER_SIZE,
            timing: Timing::default(),
            phy_address: 1,
            address_identifier: MAC1_ID,
        }
    }

    pub fn set_tx_ring_size(mut self, size: usize) -> Self {
        if size == 0 {
            panic!("Transmit ring must have at least one descriptor");
        }
        self.tx_ring_size = size;
        self
    }

    pub fn tx_ring_size(&self) -> usize {
        self.tx_ring_size
    }

    pub fn set_rx_ring_size(mut self, size: usize) -> Self {
        if size == 0 {
            panic!("Receive ring must have at least one descriptor");
        }
        self.rx_ring_size = size;
        self
    }

    pub fn rx_ring_size(&self) -> usize {
        self.rx_ring_size
    }

    pub fn set_buffer_size(mut self, size: usize) -> Self {
        if size == 0 || size > MAX_BUFFER_SIZE {
            panic!("Packet buffer size must be between 1 and {} bytes", MAX_BUFFER_SIZE);
        }
        self.buffer_size = size;
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn set_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn set_phy_address(mut self, address: u8) -> Self {
        if address > 31 {
            panic!("Transceiver address must fit in five bits");
        }
        self.phy_address = address;
        self
    }

    pub fn phy_address(&self) -> u8 {
        self.phy_address
    }

    /// Selects the platform data entry holding the hardware address.
    pub fn set_address_identifier(mut self, identifier: u16) -> Self {
        self.address_identifier = identifier;
        self
    }

    pub fn address_identifier(&self) -> u16 {
        self.address_identifier
    }

    /// Brings the controller up and starts its DMA engine.
    ///
    /// On failure the device is left stopped. Memory already taken from `allocator` is not
    /// returned.
    pub fn freeze<C: Csr, P: Platform, A: Allocator, D: DelayUs<u32>>(
        self,
        device: Device<C>,
        platform: &mut P,
        allocator: &mut A,
        delay: &mut D,
    ) -> Result<Controller<C>> {
        let result = Controller::new(device, platform, allocator, delay, self);

        #[cfg(feature = "defmt")]
        if let Err(e) = &result {
            defmt::warn!("Ethernet bring-up failed: {}", e);
        }

        result
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
