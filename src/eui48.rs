use core::fmt;

/// An EUI-48 hardware (MAC) address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Identifier([u8; 6]);

impl Identifier {
    /// Length of an address in bytes.
    pub const LENGTH: usize = 6;

    pub const fn new(bytes: [u8; 6]) -> Self {
        Identifier(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Bytes 0 to 3 as the controller expects them in the address-low register.
    pub(crate) fn low_word(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Bytes 4 and 5 as the controller expects them in the address-high register.
    pub(crate) fn high_half(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }
}

impl From<[u8; 6]> for Identifier {
    fn from(bytes: [u8; 6]) -> Self {
        Identifier(bytes)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Identifier {
    fn format(&self, f: defmt::Formatter) {
        let b = &self.0;
        defmt::write!(
            f,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5]
        )
    }
}
