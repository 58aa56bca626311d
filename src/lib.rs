//! Driver core for the Ethernet controller found on Intel Quark SoCs
//!
//! The controller is a Synopsys DesignWare GMAC with an external transceiver reached through the
//! GMII management interface. This crate covers bring-up and the steady-state descriptor ring
//! layout:
//!
//! - [`Mii`]: indirect transceiver register access through the GMII address/data pair
//! - [`link`]: transceiver reset and link establishment
//! - [`Builder`] / [`Controller`]: MAC/DMA reset, configuration, hardware address programming and
//!   interrupt wiring
//! - [`DescriptorRings`]: transmit and receive descriptor rings, their packet buffers and the two
//!   semaphores shared with the interrupt handler
//!
//! The surrounding kernel is reached through narrow traits: [`Csr`] for the register window,
//! [`Platform`] for bus configuration, interrupt registration and the persisted configuration
//! store, [`Allocator`] for ring memory, and [`embedded_hal`]'s `DelayUs` for poll delays.
//!
//! # Example
//!
//! ```ignore
//! let device = Device {
//!     csr: unsafe { RegisterBlock::new(csr_base) },
//!     interrupt_line: 41,
//!     handler: eth_interrupt,
//! };
//!
//! let controller = Builder::new()
//!     .set_tx_ring_size(128)
//!     .set_rx_ring_size(128)
//!     .freeze(device, &mut platform, &mut dma_pool, &mut delay)?;
//!
//! // The transmit path takes a slot before touching the ring
//! controller.output_semaphore().wait();
//! ```

#![cfg_attr(not(test), no_std)]

extern crate embedded_hal as hal;

mod allocator;
pub use allocator::{Allocation, Allocator, BumpAllocator};

mod builder;
pub use builder::{Builder, Timing, MAC1_ID};

mod buffers;
pub use buffers::PacketPool;

mod controller;
pub use controller::Controller;

mod descriptor;

mod eui48;
pub use eui48::Identifier as EthernetAddress;

pub mod link;
pub use link::LinkType;

pub mod phy;
pub use phy::{Mii, Phy, Register as PhyRegister};

mod platform;
pub use platform::{BusConfiguration, ConfigStore, Device, InterruptController, Platform};

pub mod registers;
pub use registers::{Csr, Register, RegisterBlock};

mod rings;
pub use rings::DescriptorRings;

pub mod rx;
pub mod tx;

mod semaphore;
pub use semaphore::Semaphore;

mod volatile_read_write;
use volatile_read_write::VolatileReadWrite;

#[cfg(test)]
mod sim;

/// Default capacity of a single packet buffer, in bytes.
pub const PACKET_BUFFER_SIZE: usize = 2048;

/// Largest buffer the 13-bit descriptor size field can describe.
pub const MAX_BUFFER_SIZE: usize = 0x1FFF;

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A busy or reset bit did not clear within its retry budget.
    Timeout,
    /// The allocator could not satisfy a ring, buffer or semaphore request.
    ResourceExhausted,
}

/// Result type used throughout the driver
pub type Result<T> = core::result::Result<T, Error>;
