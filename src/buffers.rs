use core::alloc::Layout;
use core::ptr::NonNull;

use crate::descriptor::DMA_ALIGNMENT;
use crate::{Allocator, Error, Result};

/// Packet buffers backing one descriptor ring, paired with descriptors by index
///
/// The pool has one slot more than the ring, matching the ring's guard slot. Slots are laid out
/// back to back at a fixed stride: the buffer capacity rounded up to the DMA alignment.
pub struct PacketPool {
    base: NonNull<u8>,
    bus_address: u32,
    stride: usize,
    capacity: usize,
    count: usize,
}

// The pool owns its memory; the DMA engine is the only other party touching it.
unsafe impl Send for PacketPool {}

impl PacketPool {
    pub(crate) fn allocate<A: Allocator + ?Sized>(
        allocator: &mut A,
        count: usize,
        capacity: usize,
    ) -> Result<Self> {
        let slot = Layout::from_size_align(capacity, DMA_ALIGNMENT)
            .map_err(|_| Error::ResourceExhausted)?
            .pad_to_align();
        let layout = slot
            .size()
            .checked_mul(count + 1)
            .and_then(|size| Layout::from_size_align(size, DMA_ALIGNMENT).ok())
            .ok_or(Error::ResourceExhausted)?;
        let allocation = allocator.allocate(layout)?;

        Ok(PacketPool {
            base: allocation.ptr,
            bus_address: allocation.bus_address,
            stride: slot.size(),
            capacity,
            count,
        })
    }

    /// Number of buffers paired with ring slots (the guard buffer is not counted).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Usable bytes per buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Distance between the starts of two consecutive buffers.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bus address of buffer 0.
    pub fn base_address(&self) -> u32 {
        self.bus_address
    }

    pub fn bus_address(&self, index: usize) -> u32 {
        self.check_index(index);
        self.bus_address + (index * self.stride) as u32
    }

    pub fn as_mut_ptr(&self, index: usize) -> *mut u8 {
        self.check_index(index);
        unsafe { self.base.as_ptr().add(index * self.stride) }
    }

    /// Buffer `index` as a byte slice.
    ///
    /// # Safety
    ///
    /// The descriptor paired with the buffer must be owned by the host for as long as the slice
    /// is alive.
    pub unsafe fn buffer_mut(&mut self, index: usize) -> &mut [u8] {
        core::slice::from_raw_parts_mut(self.as_mut_ptr(index), self.capacity)
    }

    fn check_index(&self, index: usize) {
        if index >= self.count {
            panic!("Attempted to access invalid packet buffer");
        }
    }
}
