use super::RxDescriptor;
use crate::descriptor::{allocate_slots, DMA_ALIGNMENT};
use crate::{Allocator, PacketPool, Result};

/// The receive ring and its buffers
///
/// Every descriptor starts out owned by the DMA engine with its buffer attached. Only the last
/// descriptor carries the end-of-ring flag.
pub struct RxDescriptorTable {
    descriptors: &'static mut [RxDescriptor],
    bus_address: u32,
    buffers: PacketPool,
}

impl RxDescriptorTable {
    pub(crate) fn allocate<A: Allocator + ?Sized>(
        allocator: &mut A,
        count: usize,
        buffer_size: usize,
    ) -> Result<Self> {
        let (slots, bus_address) = allocate_slots::<RxDescriptor, A>(allocator, count)?;

        // Status bits must start clear; the guard slot is cleared too
        let descriptors = unsafe {
            slots.as_ptr().write_bytes(0, count + 1);
            core::slice::from_raw_parts_mut(slots.as_ptr(), count)
        };

        let buffers = PacketPool::allocate(allocator, count, buffer_size)?;

        let mut table = RxDescriptorTable {
            descriptors,
            bus_address,
            buffers,
        };
        table.initialize();
        Ok(table)
    }

    fn initialize(&mut self) {
        let size = self.buffers.capacity();
        for (i, descriptor) in self.descriptors.iter_mut().enumerate() {
            let address = self.buffers.bus_address(i);
            descriptor.modify(|w| w.set_buffer_size(size).set_buffer_address(address).set_owned());
        }

        if let Some(last) = self.descriptors.last_mut() {
            last.modify(|w| w.set_end_of_ring());
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Bus address of descriptor 0, as programmed into the receive list register.
    pub fn base_address(&self) -> u32 {
        debug_assert_eq!(self.bus_address as usize % DMA_ALIGNMENT, 0);
        self.bus_address
    }

    pub fn descriptors(&self) -> &[RxDescriptor] {
        &*self.descriptors
    }

    /// Used by the interrupt handler to hand completed descriptors back to the DMA engine.
    pub fn descriptors_mut(&mut self) -> &mut [RxDescriptor] {
        &mut *self.descriptors
    }

    pub fn descriptor(&self, index: usize) -> &RxDescriptor {
        &self.descriptors[index]
    }

    pub fn buffers(&self) -> &PacketPool {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut PacketPool {
        &mut self.buffers
    }
}
