//! Memory for descriptor rings, packet buffers and semaphores
//!
//! All driver memory is requested once during bring-up and lives for the rest of the device's
//! life, so the interface only allocates. Requests carry a [`Layout`]; an allocator hands back
//! memory whose CPU address and bus address both satisfy the layout's alignment, which is how the
//! 4-byte descriptor and buffer alignment required by the DMA engine is guaranteed.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::{Error, Result};

/// A block of memory handed out by an [`Allocator`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Where the CPU sees the block.
    pub ptr: NonNull<u8>,
    /// Where the DMA engine sees the block.
    pub bus_address: u32,
}

/// Source of driver memory
///
/// # Safety
///
/// A successful `allocate` must return a block of at least `layout.size()` bytes that
///
/// - starts at a CPU address and a bus address that are both multiples of `layout.align()`,
/// - stays valid, and visible to the device at `bus_address`, for the rest of the program,
/// - is not handed out again.
///
/// Failure must be reported as [`Error::ResourceExhausted`].
pub unsafe trait Allocator {
    fn allocate(&mut self, layout: Layout) -> Result<Allocation>;
}

unsafe impl<A: Allocator + ?Sized> Allocator for &mut A {
    fn allocate(&mut self, layout: Layout) -> Result<Allocation> {
        (**self).allocate(layout)
    }
}

/// Bump allocator over a static DMA region
///
/// The region's bus address is supplied by the caller (equal to the CPU address on identity
/// mapped targets). Padding is computed from the bus address; a request whose CPU pointer would
/// then be misaligned, or whose bus range would pass 4 GiB, fails with `ResourceExhausted`.
pub struct BumpAllocator {
    region: NonNull<u8>,
    size: usize,
    bus_address: u32,
    next: usize,
}

// The region is owned exclusively by the allocator.
unsafe impl Send for BumpAllocator {}

impl BumpAllocator {
    pub fn new(region: &'static mut [u8], bus_address: u32) -> Self {
        let size = region.len();
        BumpAllocator {
            region: NonNull::from(region).cast::<u8>(),
            size,
            bus_address,
            next: 0,
        }
    }

    /// Bytes not yet handed out, ignoring any padding a future request may need.
    pub fn remaining(&self) -> usize {
        self.size - self.next
    }
}

unsafe impl Allocator for BumpAllocator {
    fn allocate(&mut self, layout: Layout) -> Result<Allocation> {
        let base = self.bus_address as usize;
        let start = base
            .checked_add(self.next)
            .and_then(|address| address.checked_next_multiple_of(layout.align()))
            .ok_or(Error::ResourceExhausted)?
            - base;
        let end = start
            .checked_add(layout.size())
            .filter(|end| *end <= self.size)
            .ok_or(Error::ResourceExhausted)?;

        // The whole allocation must lie below 4 GiB of bus space
        u32::try_from(end)
            .ok()
            .and_then(|end| self.bus_address.checked_add(end))
            .ok_or(Error::ResourceExhausted)?;
        let bus_address = self.bus_address + start as u32;

        // start <= end <= size
        let ptr = unsafe { self.region.as_ptr().add(start) };
        if ptr as usize % layout.align() != 0 {
            return Err(Error::ResourceExhausted);
        }

        self.next = end;
        Ok(Allocation {
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            bus_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena;

    #[test]
    fn allocations_honor_alignment_and_do_not_overlap() {
        let mut allocator = BumpAllocator::new(arena(256), 0x2000_0000);

        let a = allocator.allocate(Layout::from_size_align(3, 1).unwrap()).unwrap();
        let b = allocator.allocate(Layout::from_size_align(16, 4).unwrap()).unwrap();
        let c = allocator.allocate(Layout::from_size_align(8, 8).unwrap()).unwrap();

        assert_eq!(a.bus_address, 0x2000_0000);
        assert_eq!(b.bus_address, 0x2000_0004);
        assert_eq!(b.ptr.as_ptr() as usize % 4, 0);
        assert_eq!(c.bus_address, 0x2000_0018);
        assert_eq!(c.ptr.as_ptr() as usize % 8, 0);
        assert_eq!(
            c.ptr.as_ptr() as usize - a.ptr.as_ptr() as usize,
            (c.bus_address - a.bus_address) as usize
        );
    }

    #[test]
    fn exhaustion_is_reported_and_leaves_state_untouched() {
        let mut allocator = BumpAllocator::new(arena(64), 0x1000);

        allocator.allocate(Layout::from_size_align(60, 4).unwrap()).unwrap();
        assert_eq!(
            allocator.allocate(Layout::from_size_align(8, 4).unwrap()),
            Err(Error::ResourceExhausted)
        );
        assert_eq!(allocator.remaining(), 4);
        assert!(allocator.allocate(Layout::from_size_align(4, 4).unwrap()).is_ok());
    }

    #[test]
    fn misaligned_bus_base_never_yields_a_misaligned_address() {
        let mut allocator = BumpAllocator::new(arena(256), 0x2000_0002);

        assert_eq!(
            allocator.allocate(Layout::from_size_align(16, 4).unwrap()),
            Err(Error::ResourceExhausted)
        );
        assert_eq!(allocator.remaining(), 256);

        let byte = allocator.allocate(Layout::from_size_align(3, 1).unwrap()).unwrap();
        assert_eq!(byte.bus_address, 0x2000_0002);
    }

    #[test]
    fn allocation_past_the_top_of_bus_space_is_refused() {
        let mut allocator = BumpAllocator::new(arena(0x2000), 0xFFFF_F000);

        assert_eq!(
            allocator.allocate(Layout::from_size_align(0x1800, 4).unwrap()),
            Err(Error::ResourceExhausted)
        );
        assert_eq!(allocator.remaining(), 0x2000);

        let below = allocator.allocate(Layout::from_size_align(0x800, 4).unwrap()).unwrap();
        assert_eq!(below.bus_address, 0xFFFF_F000);
    }
}
