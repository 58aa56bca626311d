//! Pieces shared by the receive and transmit descriptor formats

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::{Allocator, Error, Result};

/// Alignment the DMA engine requires of descriptors and packet buffers
pub(crate) const DMA_ALIGNMENT: usize = 4;

/// First buffer size field in the second word of both descriptor formats
pub(crate) const BUFFER1_SIZE_MASK: u32 = 0x1FFF;

/// Generates `is_*` on a reader and `set_*`/`clear_*` on a writer for single-bit flags.
macro_rules! descriptor_flags {
    (
        $reader:ident,
        $writer:ident,
        $($(#[$meta:meta])* $flag:ident: $word:ident[$bit:expr]),* $(,)?
    ) => {
        paste::paste! {
            impl $reader {
                $(
                    $(#[$meta])*
                    pub fn [<is_ $flag>](&self) -> bool {
                        self.$word & (1 << $bit) != 0
                    }
                )*
            }

            impl $writer {
                $(
                    pub fn [<set_ $flag>](mut self) -> Self {
                        self.$word |= 1 << $bit;
                        self
                    }

                    pub fn [<clear_ $flag>](mut self) -> Self {
                        self.$word &= !(1 << $bit);
                        self
                    }
                )*
            }
        }
    };
}
pub(crate) use descriptor_flags;

/// Allocates `count` descriptors plus one guard slot past the end of the ring.
///
/// Returns the first slot and its bus address. The memory is not initialized.
pub(crate) fn allocate_slots<D, A: Allocator + ?Sized>(
    allocator: &mut A,
    count: usize,
) -> Result<(NonNull<D>, u32)> {
    let layout = count
        .checked_add(1)
        .and_then(|slots| Layout::array::<D>(slots).ok())
        .and_then(|layout| layout.align_to(DMA_ALIGNMENT).ok())
        .ok_or(Error::ResourceExhausted)?;
    let allocation = allocator.allocate(layout)?;
    Ok((allocation.ptr.cast::<D>(), allocation.bus_address))
}

/// Checks a buffer bus address before it is handed to the DMA engine.
pub(crate) fn checked_buffer_address(address: u32) -> u32 {
    if address as usize % DMA_ALIGNMENT != 0 {
        panic!("Specified address is not 32 bit aligned");
    }
    address
}
