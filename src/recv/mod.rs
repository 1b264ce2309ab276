//! Receive pipeline (§4.4).
//!
//! Grounded on the teacher's `icmpv6_recv` dispatcher in
//! `netstack/icmpv6.rs`, which already does "check type, branch to a
//! handler" — generalized here into the full shared preamble (hop
//! limit and code validation) plus one handler module per NDP message
//! type, each implementing the validation/response rules of its own
//! spec subsection.

pub mod na;
pub mod ns;
pub mod ra;
pub mod redirect;
pub mod rs;

use crate::addr::Ipv6Addr;
use crate::collab::{Collaborators, IfaceId};
use crate::error::DropReason;
use crate::logger::{ndp_log, Level, Logger};
use crate::message::icmp_type;
use crate::proxy::DelayQueue;
use crate::wrand::WeakRng;

/// Runs the shared preamble (§4.4 "Shared preamble") and dispatches to
/// the per-message-type handler.
///
/// `hop_limit` and the ICMPv6 code are validated here since every
/// handler shares the same rule (invariant 1, §8); `icmp` is the
/// ICMPv6 message starting at its type byte, with a checksum the
/// caller's ICMPv6 layer has already verified (§6). Every drop path,
/// here and in the per-type handlers, is logged through `logger` at
/// debug level (§7) so the integrator can trace misbehaving peers
/// without this crate ever propagating the drop as an error.
pub fn receive_checked<C: Collaborators>(
    collab: &C,
    proxy_queue: &DelayQueue,
    rng: &mut WeakRng,
    logger: &dyn Logger,
    iface: IfaceId,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    hop_limit: u8,
    icmp: &[u8],
) -> Result<(), DropReason> {
    if hop_limit != 255 {
        ndp_log!(logger, Level::Debug, "ndp::recv", "dropped iface={iface} bad hop_limit={hop_limit}");
        return Err(DropReason::BadHopLimit);
    }
    if icmp.len() < 4 {
        ndp_log!(logger, Level::Debug, "ndp::recv", "dropped iface={iface} too short ({} bytes)", icmp.len());
        return Err(DropReason::TooShort);
    }
    let kind = icmp[0];
    let code = icmp[1];
    if code != 0 {
        ndp_log!(logger, Level::Debug, "ndp::recv", "dropped iface={iface} kind={kind} bad code={code}");
        return Err(DropReason::BadCode);
    }

    // Each per-type parser indexes from the message's type byte (it
    // includes the 4-byte type/code/checksum header in its fixed-part
    // length), so the full `icmp` slice is passed through unsliced.
    let result = match kind {
        icmp_type::NEIGHBOR_SOLICITATION => ns::recv_ns(collab, proxy_queue, rng, logger, iface, src, dst, icmp),
        icmp_type::NEIGHBOR_ADVERTISEMENT => na::recv_na(collab, logger, iface, src, dst, icmp),
        icmp_type::ROUTER_SOLICITATION => rs::recv_rs(collab, logger, iface, src, icmp),
        icmp_type::ROUTER_ADVERTISEMENT => ra::recv_ra(collab, rng, logger, iface, src, icmp),
        icmp_type::REDIRECT => redirect::recv_redirect(collab, logger, iface, src, icmp),
        // Not an NDP message type; nothing in this engine handles it.
        _ => Ok(()),
    };

    if let Err(reason) = &result {
        ndp_log!(logger, Level::Debug, "ndp::recv", "dropped iface={iface} src={src} dst={dst} kind={kind} reason={reason:?}");
    }

    result
}
