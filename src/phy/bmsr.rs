const LINK_STATUS: u16 = 1 << 2;
const AUTO_NEGOTIATION_ABILITY: u16 = 1 << 3;
const AUTO_NEGOTIATION_COMPLETE: u16 = 1 << 5;

/// Basic Mode Status Register contents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reader(u16);
impl Reader {
    pub fn new(value: u16) -> Self {
        Reader(value)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Link status. Latches low: a link loss stays visible until the register is read.
    pub fn link_detected(&self) -> bool {
        self.0 & LINK_STATUS != 0
    }

    pub fn auto_negotiation_capable(&self) -> bool {
        self.0 & AUTO_NEGOTIATION_ABILITY != 0
    }

    pub fn auto_negotiation_complete(&self) -> bool {
        self.0 & AUTO_NEGOTIATION_COMPLETE != 0
    }
}
