//! Reachability confirmation driver (§4.5).
//!
//! RFC 4861 §7.3.1's state machine needs a timer loop we don't own
//! (the integrator's own scheduler), so this module is the pure
//! decision function a periodic tick calls per stale/probe/delay
//! entry: given how many probes have gone out, what to send next and
//! whether the entry should flip to FAILED. Grounded on the teacher's
//! `NeighborEntry` aging loop in `netstack/icmpv6.rs`, generalized from
//! "always multicast-probe" to the three-tier unicast/app/multicast
//! probe counts §3 requires.

use crate::addr::Ipv6Addr;
use crate::collab::NeighborState;
use crate::params::NeighborParams;

/// What the driver wants done for one neighbor this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAction {
    /// Move to DELAY and wait; no probe sent yet.
    EnterDelay,
    /// Send a unicast Neighbor Solicitation to `target`'s own address.
    UnicastProbe,
    /// Ask the integrator's upper layer to confirm reachability itself
    /// (an app-layer probe, e.g. a TCP ACK) before falling back to
    /// multicast.
    AppProbe,
    /// Send a multicast Neighbor Solicitation to the solicited-node
    /// address.
    MulticastProbe,
    /// Probe budget exhausted: transition to FAILED.
    MarkFailed,
    /// Nothing to do this tick (already REACHABLE/PERMANENT/NOARP, or
    /// not yet due).
    None,
}

/// Decides the next action for a cache entry currently in `state` with
/// `probes_sent` already issued since entering PROBE, given the
/// interface's configured probe-count knobs (§3, §4.5).
///
/// `app_probes` precede `ucast_probes`, which precede `mcast_probes`,
/// matching the teacher's "try the cheap thing before multicast"
/// escalation order.
pub fn next_action(state: NeighborState, probes_sent: u8, params: &NeighborParams) -> ProbeAction {
    match state {
        NeighborState::Stale => ProbeAction::EnterDelay,
        NeighborState::Delay => {
            if params.app_probes > 0 {
                ProbeAction::AppProbe
            } else {
                ProbeAction::UnicastProbe
            }
        }
        NeighborState::Probe => {
            let app = params.app_probes as u32;
            let ucast = params.ucast_probes as u32;
            let mcast = params.mcast_probes as u32;
            let n = probes_sent as u32;

            if n < app {
                ProbeAction::AppProbe
            } else if n < app + ucast {
                ProbeAction::UnicastProbe
            } else if n < app + ucast + mcast {
                ProbeAction::MulticastProbe
            } else {
                ProbeAction::MarkFailed
            }
        }
        NeighborState::Incomplete => {
            let mcast = params.mcast_probes as u32;
            if (probes_sent as u32) < mcast {
                ProbeAction::MulticastProbe
            } else {
                ProbeAction::MarkFailed
            }
        }
        NeighborState::Reachable
        | NeighborState::Failed
        | NeighborState::NoArp
        | NeighborState::Permanent => ProbeAction::None,
    }
}

/// Destination address a given [`ProbeAction`] should be sent to, for
/// `target`.
pub fn probe_destination(action: ProbeAction, target: Ipv6Addr) -> Option<Ipv6Addr> {
    match action {
        ProbeAction::UnicastProbe => Some(target),
        ProbeAction::MulticastProbe => Some(target.solicited_node_multicast()),
        _ => None,
    }
}
