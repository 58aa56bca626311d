use core::sync::atomic::{compiler_fence, Ordering};

use hal::blocking::delay::DelayUs;

use crate::{
    link,
    phy::Mii,
    registers::{
        bus_mode, interrupt_enable, mac_address_high, mac_configuration, mmc_control,
        operation_mode, Csr, Register,
    },
    Allocator, Builder, DescriptorRings, Device, EthernetAddress, Error, LinkType, Platform,
    Result, Semaphore, Timing,
};

/// PCI command register offset in configuration space
const PCI_COMMAND: u8 = 0x04;
/// Memory space enable and bus master enable
const PCI_COMMAND_MEMORY_BUS_MASTER: u16 = 0x0006;

/// A running Ethernet controller
///
/// Only a successful [`Builder::freeze`] produces one, so holding a `Controller` means the MAC
/// is configured, the link was up at bring-up and both DMA processes are running against fully
/// initialized rings.
pub struct Controller<C> {
    csr: C,
    ethernet_address: EthernetAddress,
    link_type: LinkType,
    rings: DescriptorRings,
    timing: Timing,
    phy_address: u8,
}

impl<C: Csr> Controller<C> {
    pub(crate) fn new<P: Platform, A: Allocator, D: DelayUs<u32>>(
        device: Device<C>,
        platform: &mut P,
        allocator: &mut A,
        delay: &mut D,
        builder: Builder,
    ) -> Result<Self> {
        let Device {
            mut csr,
            interrupt_line,
            handler,
        } = device;
        let timing = builder.timing();

        platform.write_config_word(PCI_COMMAND, PCI_COMMAND_MEMORY_BUS_MASTER);

        reset_mac(&mut csr, delay, &timing)?;

        csr.set_bits(Register::BusMode, bus_mode::FIXED_BURST);
        csr.set_bits(Register::OperationMode, operation_mode::TRANSMIT_STORE_FORWARD);

        let link_type = {
            let mut mii = Mii::new(&mut csr, delay, timing, builder.phy_address());
            link::reset(&mut mii, &timing)?
        };

        platform.register_handler(interrupt_line, handler);

        csr.set_bits(
            Register::MacConfiguration,
            mac_configuration::SPEED_100 | mac_configuration::DUPLEX_MODE,
        );
        csr.set_bits(Register::MacConfiguration, mac_configuration::VENDOR_BITS);

        csr.set_bits(
            Register::MmcControl,
            mmc_control::COUNTER_FREEZE | mmc_control::COUNTER_RESET,
        );

        let mut bytes = [0u8; EthernetAddress::LENGTH];
        platform.fetch(builder.address_identifier(), &mut bytes);
        let ethernet_address = EthernetAddress::from(bytes);

        #[cfg(feature = "defmt")]
        defmt::info!("MAC address is {}", ethernet_address);

        set_ethernet_address0(&mut csr, &ethernet_address);

        let rings = DescriptorRings::allocate(
            allocator,
            builder.tx_ring_size(),
            builder.rx_ring_size(),
            builder.buffer_size(),
        )?;

        csr.write(
            Register::InterruptEnable,
            interrupt_enable::NORMAL_SUMMARY
                | interrupt_enable::TRANSMIT
                | interrupt_enable::RECEIVE,
        );
        rings.setup_dma(&mut csr);

        csr.set_bits(
            Register::MacConfiguration,
            mac_configuration::TRANSMITTER_ENABLE | mac_configuration::RECEIVER_ENABLE,
        );

        // Rings, buffers and semaphores must all be in memory before the DMA engine looks at them
        compiler_fence(Ordering::SeqCst);
        csr.set_bits(
            Register::OperationMode,
            operation_mode::START_TRANSMIT | operation_mode::START_RECEIVE,
        );

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Ethernet DMA started ({=usize} tx, {=usize} rx descriptors)",
            rings.tx().len(),
            rings.rx().len()
        );

        Ok(Controller {
            csr,
            ethernet_address,
            link_type,
            rings,
            timing,
            phy_address: builder.phy_address(),
        })
    }

    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_address
    }

    /// How the link was established during bring-up.
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Asks the transceiver for the current link state.
    pub fn link_state<D: DelayUs<u32>>(&mut self, delay: &mut D) -> Result<Option<LinkType>> {
        let mut mii = Mii::new(&mut self.csr, delay, self.timing, self.phy_address);
        link::state(&mut mii)
    }

    pub fn rings(&self) -> &DescriptorRings {
        &self.rings
    }

    pub fn rings_mut(&mut self) -> &mut DescriptorRings {
        &mut self.rings
    }

    pub fn output_semaphore(&self) -> &'static Semaphore {
        self.rings.output_semaphore()
    }

    pub fn input_semaphore(&self) -> &'static Semaphore {
        self.rings.input_semaphore()
    }

    pub fn csr(&self) -> &C {
        &self.csr
    }

    pub fn csr_mut(&mut self) -> &mut C {
        &mut self.csr
    }
}

/// Software reset of the MAC and DMA, waiting for the self-clearing reset bit.
fn reset_mac<C: Csr, D: DelayUs<u32>>(csr: &mut C, delay: &mut D, timing: &Timing) -> Result<()> {
    csr.set_bits(Register::BusMode, bus_mode::SOFTWARE_RESET);

    let mut retries = 0;
    while csr.read(Register::BusMode) & bus_mode::SOFTWARE_RESET != 0 {
        delay.delay_us(timing.poll_delay.ticks());
        retries += 1;
        if retries > timing.max_retries {
            return Err(Error::Timeout);
        }
    }

    #[cfg(feature = "defmt")]
    defmt::trace!("MAC reset complete");

    Ok(())
}

fn set_ethernet_address0<C: Csr>(csr: &mut C, ethernet_address: &EthernetAddress) {
    csr.write(Register::MacAddress0Low, ethernet_address.low_word());
    csr.write(
        Register::MacAddress0High,
        ethernet_address.high_half() as u32 | mac_address_high::ADDRESS_ENABLE,
    );
}
