//! RecvNS (§4.4.1).

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::collab::{Collaborators, IfaceId, LocalAddrState, NeighborState, UpdateFlags};
use crate::emit;
use crate::error::DropReason;
use crate::logger::Logger;
use crate::message::NeighborSolicitation;
use crate::options;
use crate::params::LinkType;
use crate::proxy::DelayQueue;
use crate::wrand::WeakRng;

pub fn recv_ns<C: Collaborators>(
    collab: &C,
    proxy_queue: &DelayQueue,
    rng: &mut WeakRng,
    logger: &dyn Logger,
    iface: IfaceId,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    body: &[u8],
) -> Result<(), DropReason> {
    let ns = NeighborSolicitation::parse(body).ok_or(DropReason::TooShort)?;
    if ns.target.is_multicast() {
        return Err(DropReason::TargetIsMulticast);
    }
    let opts = options::parse(NeighborSolicitation::options(body), false, logger).map_err(DropReason::BadOptions)?;

    let is_dad = src.is_unspecified();
    let arrived_multicast = dst.is_multicast();
    let source_ll = opts.source_ll_addr();

    if is_dad && (ns.target.solicited_node_multicast() != dst || source_ll.is_some()) {
        return Err(DropReason::BadDad);
    }

    let proxy_flag = collab.proxy_target(iface, ns.target);
    let local_state = collab.local_address_state(iface, ns.target);

    match local_state {
        Some(LocalAddrState::Tentative) | Some(LocalAddrState::Optimistic) => {
            if is_dad {
                collab.dad_fail(iface, ns.target);
                return Ok(());
            }
            if local_state != Some(LocalAddrState::Optimistic) {
                return Err(DropReason::BadDad);
            }
            // Optimistic and not a DAD probe: fall through and respond.
        }
        Some(LocalAddrState::Ready) => {}
        None => {
            let eligible = collab.owns_anycast(iface, ns.target) || proxy_flag.is_some();
            if !eligible {
                return Err(DropReason::NotProxiedOrEligible);
            }
            let looped_back = collab.is_loopback(iface);
            let proxy_delay = collab.params(iface).proxy_delay_ms;
            if arrived_multicast && !looped_back && proxy_delay != 0 {
                let is_router = proxy_flag.unwrap_or(false);
                if proxy_queue.try_enqueue(rng, iface, ns.target, src, is_router, source_ll, proxy_delay) {
                    return Ok(());
                }
                return Err(DropReason::ProxyQueueFull);
            }
            return Err(DropReason::NotProxiedOrEligible);
        }
    }

    let is_router = proxy_flag.unwrap_or_else(|| collab.params(iface).forwarding);

    if is_dad {
        emit::send_neighbor_advertisement(collab, iface, ns.target, Ipv6Addr::ALL_NODES, is_router, false, true);
        return Ok(());
    }

    respond(collab, iface, ns.target, src, is_router, source_ll);
    Ok(())
}

/// Updates the cache entry for the soliciting node (if it gave us a
/// source-link-layer-address option) and emits the solicited NA. Used
/// both by [`recv_ns`]'s immediate path and by the proxy delay queue's
/// replay (§4.6) — replay skips straight to this function since
/// eligibility was already resolved at enqueue time.
pub fn respond<C: Collaborators>(
    collab: &C,
    iface: IfaceId,
    target: Ipv6Addr,
    reply_dst: Ipv6Addr,
    is_router: bool,
    source_ll: Option<LinkAddr>,
) {
    if let Some(lladdr) = source_ll {
        let flags = UpdateFlags {
            r#override: true,
            weak_override: true,
            ..Default::default()
        };
        collab.update(iface, reply_dst, Some(lladdr), NeighborState::Stale, flags);
    }
    emit::send_neighbor_advertisement(collab, iface, target, reply_dst, is_router, true, true);
}
