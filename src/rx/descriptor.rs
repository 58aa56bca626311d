use super::VolatileReadWrite;
use crate::descriptor::{checked_buffer_address, descriptor_flags, BUFFER1_SIZE_MASK};

const FRAME_LENGTH_SHIFT: u32 = 16;
const FRAME_LENGTH_MASK: u32 = 0x3FFF << FRAME_LENGTH_SHIFT;

/// Receive descriptor in the controller's enhanced (four word) format
#[repr(C)]
#[derive(Default)]
pub struct RxDescriptor {
    // NOTE: Only read or write these fields using volatile operations
    status: u32,
    control: u32,
    buffer1: u32,
    buffer2: u32,
}

impl RxDescriptor {
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
    pub fn buffer_size(&self) -> usize {
        (self.control & BUFFER1_SIZE_MASK) as usize
    }

    pub fn buffer_address(&self) -> u32 {
        self.buffer1
    }

    /// Length of the received frame, including the CRC. Valid once the device has handed the
    /// descriptor back with the last-descriptor flag set.
    pub fn frame_length(&self) -> usize {
        ((self.status & FRAME_LENGTH_MASK) >> FRAME_LENGTH_SHIFT) as usize
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
    /// The DMA engine may write into the buffer.
    owned: status[31],
    error_summary: status[15],
    first_descriptor: status[9],
    last_descriptor: status[8],
    /// The DMA engine returns to the start of the ring after this descriptor.
    end_of_ring: control[15],
    second_address_chained: control[14],
);
