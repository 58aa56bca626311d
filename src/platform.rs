//! Services the surrounding kernel provides during bring-up

/// Writes to the controller's PCI configuration space
pub trait BusConfiguration {
    fn write_config_word(&mut self, offset: u8, value: u16);
}

/// Interrupt vector registration
pub trait InterruptController {
    fn register_handler(&mut self, line: u8, handler: fn());
}

/// Persisted platform configuration (e.g. the SPI flash platform data block)
pub trait ConfigStore {
    /// Copies the entry `identifier` into `bytes`, filling exactly `bytes.len()` bytes.
    fn fetch(&mut self, identifier: u16, bytes: &mut [u8]);
}

/// Everything bring-up needs from the kernel besides memory and delays
pub trait Platform: BusConfiguration + InterruptController + ConfigStore {}

impl<T: BusConfiguration + InterruptController + ConfigStore> Platform for T {}

/// An Ethernet device as described by the kernel's device table
pub struct Device<C> {
    /// The controller's register window.
    pub csr: C,
    /// Interrupt line assigned to the controller.
    pub interrupt_line: u8,
    /// The driver's interrupt service routine, which recycles descriptors and signals the
    /// controller's semaphores.
    pub handler: fn(),
}
