/// Volatile access to a descriptor word shared with the DMA engine.
///
/// Every read goes to memory and every write is emitted in program order relative to other
/// volatile accesses, so the device observes descriptor updates in the order they are written.
pub trait VolatileReadWrite<T: Copy> {
    fn read_volatile(&self) -> T;
    fn write_volatile(&mut self, new_value: T);
}

impl VolatileReadWrite<u32> for u32 {
    fn read_volatile(&self) -> u32 {
        unsafe { core::ptr::read_volatile(self) }
    }

    fn write_volatile(&mut self, new_value: u32) {
        unsafe { core::ptr::write_volatile(self, new_value) }
    }
}
