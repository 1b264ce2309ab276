//! RecvNA (§4.4.2).

use crate::addr::Ipv6Addr;
use crate::collab::{lookup_ref, Collaborators, IfaceId, LocalAddrState, NeighborState, UpdateFlags};
use crate::error::DropReason;
use crate::logger::Logger;
use crate::message::NeighborAdvertisement;
use crate::options;

pub fn recv_na<C: Collaborators>(
    collab: &C,
    logger: &dyn Logger,
    iface: IfaceId,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    body: &[u8],
) -> Result<(), DropReason> {
    let na = NeighborAdvertisement::parse(body).ok_or(DropReason::TooShort)?;
    if na.target.is_multicast() {
        return Err(DropReason::TargetIsMulticast);
    }
    if na.solicited && dst.is_multicast() {
        return Err(DropReason::SolicitedToMulticast);
    }
    let opts = options::parse(NeighborAdvertisement::options(body), false, logger).map_err(DropReason::BadOptions)?;
    if opts.target_ll.is_some() && opts.target_ll_addr().is_none() {
        return Err(DropReason::BadTargetLinkAddrLength);
    }
    let target_ll = opts.target_ll_addr();

    let local_state = collab.local_address_state(iface, na.target);
    if matches!(local_state, Some(LocalAddrState::Tentative) | Some(LocalAddrState::Optimistic)) {
        if !collab.is_loopback(iface) {
            collab.dad_fail(iface, na.target);
        }
        return Ok(());
    }

    {
        let found = match lookup_ref(collab, iface, na.target) {
            Some(r) => r,
            None => return Ok(()),
        };
        if found.entry.state == NeighborState::Failed {
            return Err(DropReason::NeighborFailed);
        }
        let params = collab.params(iface);
        if found.entry.lladdr == Some(collab.link_addr(iface)) && params.forwarding && params.proxy_ndp {
            return Err(DropReason::OwnProxyEcho);
        }
        // `found` drops here, releasing the reference before we mutate
        // through `update` below.
    }

    let new_state = if na.solicited {
        NeighborState::Reachable
    } else {
        NeighborState::Stale
    };
    let flags = UpdateFlags {
        r#override: na.override_flag,
        weak_override: false,
        set_router: na.router,
        force_router: true,
    };
    let previous = collab.update(iface, na.target, target_ll, new_state, flags);
    if previous.flags.router && !na.router {
        collab.remove(src, iface);
    }
    Ok(())
}
