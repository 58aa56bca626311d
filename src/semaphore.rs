use core::alloc::Layout;
use core::sync::atomic::{AtomicUsize, Ordering};

use void::{ResultVoidExt, Void};

use crate::{Allocator, Result};

/// Counting semaphore shared between the interrupt handler and the transmit/receive paths
///
/// The output semaphore counts free transmit slots: senders `wait` before claiming a slot and the
/// interrupt handler `signal`s when the device hands one back. The input semaphore counts received
/// frames: the interrupt handler `signal`s when a frame lands and the consumer `wait`s for it.
///
/// `signal` and `try_wait` never block, so both are safe to call from the interrupt handler.
/// `wait` spins; it cannot be cancelled.
pub struct Semaphore {
    count: AtomicUsize,
}

impl Semaphore {
    pub const fn new(count: usize) -> Self {
        Semaphore {
            count: AtomicUsize::new(count),
        }
    }

    /// Creates a semaphore in memory obtained from `allocator`. It is never freed.
    pub(crate) fn allocate<A: Allocator + ?Sized>(
        allocator: &mut A,
        count: usize,
    ) -> Result<&'static Semaphore> {
        let allocation = allocator.allocate(Layout::new::<Semaphore>())?;
        let semaphore = allocation.ptr.cast::<Semaphore>();
        unsafe {
            semaphore.as_ptr().write(Semaphore::new(count));
            Ok(&*semaphore.as_ptr())
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn signal(&self) {
        self.count.fetch_add(1, Ordering::Release);
    }

    /// Takes one unit if any is available.
    pub fn try_wait(&self) -> nb::Result<(), Void> {
        let mut current = self.count.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return Err(nb::Error::WouldBlock);
            }

            match self.count.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    /// Takes one unit, spinning until one is available.
    pub fn wait(&self) {
        nb::block!(self.try_wait()).void_unwrap()
    }
}
