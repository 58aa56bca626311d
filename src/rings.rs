use crate::{
    registers::{Csr, Register},
    rx::RxDescriptorTable,
    tx::TxDescriptorTable,
    Allocator, Result, Semaphore,
};

/// Both descriptor rings and the semaphores the interrupt handler signals
///
/// Allocated once during bring-up, in this order: transmit ring, transmit buffers, output
/// semaphore, receive ring, receive buffers, input semaphore. A failure stops the sequence;
/// whatever was already allocated stays allocated.
pub struct DescriptorRings {
    tx: TxDescriptorTable,
    rx: RxDescriptorTable,
    output: &'static Semaphore,
    input: &'static Semaphore,
}

impl DescriptorRings {
    pub(crate) fn allocate<A: Allocator + ?Sized>(
        allocator: &mut A,
        tx_count: usize,
        rx_count: usize,
        buffer_size: usize,
    ) -> Result<Self> {
        let tx = TxDescriptorTable::allocate(allocator, tx_count, buffer_size)?;
        let output = Semaphore::allocate(allocator, tx_count)?;

        let rx = RxDescriptorTable::allocate(allocator, rx_count, buffer_size)?;
        let input = Semaphore::allocate(allocator, 0)?;

        Ok(DescriptorRings {
            tx,
            rx,
            output,
            input,
        })
    }

    /// Points the DMA engine at both rings.
    pub(crate) fn setup_dma<C: Csr + ?Sized>(&self, csr: &mut C) {
        csr.write(Register::TransmitDescriptorList, self.tx.base_address());
        csr.write(Register::ReceiveDescriptorList, self.rx.base_address());
    }

    pub fn tx(&self) -> &TxDescriptorTable {
        &self.tx
    }

    pub fn tx_mut(&mut self) -> &mut TxDescriptorTable {
        &mut self.tx
    }

    pub fn rx(&self) -> &RxDescriptorTable {
        &self.rx
    }

    pub fn rx_mut(&mut self) -> &mut RxDescriptorTable {
        &mut self.rx
    }

    /// Free transmit slots. Starts at the transmit ring size.
    pub fn output_semaphore(&self) -> &'static Semaphore {
        self.output
    }

    /// Received frames not yet consumed. Starts at zero.
    pub fn input_semaphore(&self) -> &'static Semaphore {
        self.input
    }
}
