use super::TxDescriptor;
use crate::descriptor::{allocate_slots, DMA_ALIGNMENT};
use crate::{Allocator, PacketPool, Result};

/// The transmit ring and its buffers
///
/// Every descriptor starts out free (host owned, zero status) with its buffer attached.
pub struct TxDescriptorTable {
    descriptors: &'static mut [TxDescriptor],
    bus_address: u32,
    buffers: PacketPool,
}

impl TxDescriptorTable {
    pub(crate) fn allocate<A: Allocator + ?Sized>(
        allocator: &mut A,
        count: usize,
        buffer_size: usize,
    ) -> Result<Self> {
        let (slots, bus_address) = allocate_slots::<TxDescriptor, A>(allocator, count)?;
        let buffers = PacketPool::allocate(allocator, count, buffer_size)?;

        // Each used slot is written whole, so the allocation is not cleared first. The guard
        // slot is never touched.
        for i in 0..count {
            let descriptor = TxDescriptor::new(buffers.bus_address(i));
            unsafe { slots.as_ptr().add(i).write_volatile(descriptor) };
        }
        let descriptors = unsafe { core::slice::from_raw_parts_mut(slots.as_ptr(), count) };

        Ok(TxDescriptorTable {
            descriptors,
            bus_address,
            buffers,
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Bus address of descriptor 0, as programmed into the transmit list register.
    pub fn base_address(&self) -> u32 {
        debug_assert_eq!(self.bus_address as usize % DMA_ALIGNMENT, 0);
        self.bus_address
    }

    pub fn descriptors(&self) -> &[TxDescriptor] {
        &*self.descriptors
    }

    pub fn descriptors_mut(&mut self) -> &mut [TxDescriptor] {
        &mut *self.descriptors
    }

    pub fn descriptor(&self, index: usize) -> &TxDescriptor {
        &self.descriptors[index]
    }

    pub fn buffers(&self) -> &PacketPool {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut PacketPool {
        &mut self.buffers
    }
}
