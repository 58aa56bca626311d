use super::VolatileReadWrite;
use crate::descriptor::{checked_buffer_address, descriptor_flags, BUFFER1_SIZE_MASK};

/// Transmit descriptor in the controller's enhanced (four word) format
#[repr(C)]
#[derive(Default)]
pub struct TxDescriptor {
    // NOTE: Only read or write these fields using volatile operations
    status: u32,
    control: u32,
    buffer1: u32,
    buffer2: u32,
}

impl TxDescriptor {
    /// A free, host-owned descriptor pointing at `buffer_address`.
    pub(crate) const fn new(buffer_address: u32) -> Self {
        TxDescriptor {
            status: 0,
            control: 0,
            buffer1: buffer_address,
            buffer2: 0,
        }
    }

    pub fn read(&self) -> Reader {
        Reader {
            status: self.status.read_volatile(),
            control: self.control.read_volatile(),
            buffer1: self.buffer1.read_volatile(),
        }
    }

    pub fn modify<F: FnOnce(Writer) -> Writer>(&mut self, f: F) {
        let w = Writer {
            status: self.status.read_volatile(),
            control: self.control.read_volatile(),
            buffer1: self.buffer1.read_volatile(),
        };
        let result = f(w);

        // Ownership is in the status word, so it goes out last
        self.buffer1.write_volatile(result.buffer1);
        self.control.write_volatile(result.control);
        self.status.write_volatile(result.status);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reader {
    status: u32,
    control: u32,
    buffer1: u32,
}

impl Reader {
    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn buffer_size(&self) -> usize {
        (self.control & BUFFER1_SIZE_MASK) as usize
    }

    pub fn buffer_address(&self) -> u32 {
        self.buffer1
    }
}

pub struct Writer {
    status: u32,
    control: u32,
    buffer1: u32,
}

impl Writer {
    pub fn set_buffer_size(mut self, size: usize) -> Self {
        if size > BUFFER1_SIZE_MASK as usize {
            panic!("Buffer size does not fit the descriptor");
        }
        self.control = (self.control & !BUFFER1_SIZE_MASK) | size as u32;
        self
    }

    pub fn set_buffer_address(mut self, address: u32) -> Self {
        self.buffer1 = checked_buffer_address(address);
        self
    }
}

descriptor_flags!(Reader, Writer,
    /// The DMA engine has not finished with the frame yet.
    owned: status[31],
    interrupt_on_completion: status[30],
    last_segment: status[29],
    first_segment: status[28],
    end_of_ring: status[21],
    second_address_chained: status[20],
    /// Set by the DMA engine when transmission failed.
    error_summary: status[15],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_descriptor_is_free() {
        let descriptor = TxDescriptor::new(0x2000_0800);
        let r = descriptor.read();
        assert_eq!(r.status(), 0);
        assert!(!r.is_owned());
        assert_eq!(r.buffer_size(), 0);
        assert_eq!(r.buffer_address(), 0x2000_0800);
        assert_eq!(descriptor.buffer2, 0);
    }

    #[test]
    fn handing_a_frame_to_the_device() {
        let mut descriptor = TxDescriptor::new(0x2000_0800);
        descriptor.modify(|w| {
            w.set_buffer_size(60)
                .set_first_segment()
                .set_last_segment()
                .set_interrupt_on_completion()
                .set_owned()
        });

        let r = descriptor.read();
        assert!(r.is_owned());
        assert!(r.is_first_segment() && r.is_last_segment());
        assert_eq!(r.status(), (1 << 31) | (1 << 30) | (1 << 29) | (1 << 28));
        assert_eq!(r.buffer_size(), 60);

        // Completion: the interrupt handler takes the slot back
        descriptor.modify(|w| w.clear_owned().clear_first_segment().clear_last_segment());
        assert!(!descriptor.read().is_owned());
    }
}
