//! Transceiver reset and link establishment

use crate::{phy::Phy, Error, Result, Timing};

/// How the link came up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkType {
    /// The transceiver negotiated speed and duplex with its partner.
    AutoNegotiated,
    /// The transceiver cannot negotiate and was forced to 100 Mb/s full duplex.
    Forced100FullDuplex,
}

/// Polls `condition` until it holds, pausing between polls. Fails after `max_retries` pauses.
fn poll_until<P: Phy + ?Sized, F: FnMut(&mut P) -> Result<bool>>(
    phy: &mut P,
    max_retries: u32,
    mut condition: F,
) -> Result<()> {
    let mut retries = 0;
    while !condition(&mut *phy)? {
        phy.pause();
        retries += 1;
        if retries > max_retries {
            return Err(Error::Timeout);
        }
    }
    Ok(())
}

/// Resets the transceiver and waits for a link.
///
/// A transceiver that can auto-negotiate is waited on until negotiation completes and then until
/// the link is up. One that cannot is forced to 100 Mb/s full duplex and then waited on for the
/// link. Every wait is bounded: the reset by `timing.max_retries`, the negotiation and link waits
/// by `timing.link_retries`.
pub fn reset<P: Phy + ?Sized>(phy: &mut P, timing: &Timing) -> Result<LinkType> {
    phy.modify(|w| w.set_reset())?;
    poll_until(phy, timing.max_retries, |phy| Ok(!phy.control()?.is_reset()))?;

    let link_type = if phy.status()?.auto_negotiation_capable() {
        poll_until(phy, timing.link_retries, |phy| {
            Ok(phy.status()?.auto_negotiation_complete())
        })?;
        LinkType::AutoNegotiated
    } else {
        phy.modify(|w| {
            w.clear_enable_auto_negotiation()
                .set_speed_100()
                .set_full_duplex()
        })?;
        LinkType::Forced100FullDuplex
    };

    poll_until(phy, timing.link_retries, |phy| Ok(phy.status()?.link_detected()))?;

    #[cfg(feature = "defmt")]
    defmt::info!("Ethernet link is up ({})", link_type);

    Ok(link_type)
}

/// Current link state as reported by the transceiver, without waiting.
pub fn state<P: Phy + ?Sized>(phy: &mut P) -> Result<Option<LinkType>> {
    // The link bit latches low; read twice for the current state
    phy.status()?;
    let status = phy.status()?;
    if !status.link_detected() {
        return Ok(None);
    }

    if phy.control()?.is_auto_negotiation_enabled() {
        Ok(Some(LinkType::AutoNegotiated))
    } else {
        Ok(Some(LinkType::Forced100FullDuplex))
    }
}
