const FULL_DUPLEX: u16 = 1 << 8;
const ENABLE_AUTO_NEGOTIATION: u16 = 1 << 12;
const SPEED_100: u16 = 1 << 13;
const RESET: u16 = 1 << 15;

/// Basic Mode Control Register contents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reader(u16);
impl Reader {
    pub fn new(value: u16) -> Self {
        Reader(value)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Reset in progress. Self-clearing.
    pub fn is_reset(&self) -> bool {
        self.0 & RESET != 0
    }

    pub fn is_auto_negotiation_enabled(&self) -> bool {
        self.0 & ENABLE_AUTO_NEGOTIATION != 0
    }

    /// Forced speed; ignored while auto-negotiation is enabled.
    pub fn is_speed_100(&self) -> bool {
        self.0 & SPEED_100 != 0
    }

    pub fn is_full_duplex(&self) -> bool {
        self.0 & FULL_DUPLEX != 0
    }
}

/// Basic Mode Control Register update, built on the value read back from the transceiver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Writer(pub(super) u16);
impl Writer {
    pub fn new(initial_value: u16) -> Self {
        Writer(initial_value)
    }

    pub fn set_reset(self) -> Self {
        Self(self.0 | RESET)
    }

    pub fn set_full_duplex(self) -> Self {
        Self(self.0 | FULL_DUPLEX)
    }

    pub fn set_speed_100(self) -> Self {
        Self(self.0 | SPEED_100)
    }

    pub fn clear_enable_auto_negotiation(self) -> Self {
        Self(self.0 & !ENABLE_AUTO_NEGOTIATION)
    }
}
