//! RecvRA (§4.4.4).
//!
//! The busiest of the five handlers: beyond the default-router
//! lifetime bookkeeping, it fans out every option kind to its own
//! collaborator (prefix, route, MTU, user option) exactly once per
//! advertisement, following the teacher's style of "one branch per
//! concern" rather than a single monolithic state update.

use crate::addr::Ipv6Addr;
use crate::collab::{Collaborators, IfaceId, NeighborState, UpdateFlags};
use crate::error::DropReason;
use crate::logger::Logger;
use crate::message::{RouterAdvertisement, RouterPreference};
use crate::options;
use crate::wrand::WeakRng;

pub fn recv_ra<C: Collaborators>(
    collab: &C,
    rng: &mut WeakRng,
    logger: &dyn Logger,
    iface: IfaceId,
    src: Ipv6Addr,
    body: &[u8],
) -> Result<(), DropReason> {
    if !src.is_link_local() {
        return Err(DropReason::SourceNotLinkLocal);
    }
    let mut params = collab.params(iface);
    if !params.accept_ra {
        return Err(DropReason::RaNotAccepted);
    }

    let ra = RouterAdvertisement::parse(body).ok_or(DropReason::TooShort)?;
    let opts = options::parse(RouterAdvertisement::options(body), true, logger).map_err(DropReason::BadOptions)?;
    let have_sllao = opts.source_ll.is_some();

    if params.accept_ra_defrtr {
        let lifetime = ra.router_lifetime_s as u32;
        let existing = collab.get(src, iface);
        let preference = if params.accept_ra_rtr_pref {
            ra.preference
        } else {
            RouterPreference::Medium
        };
        match (existing, lifetime) {
            (Some(_), 0) => collab.remove(src, iface),
            (None, l) if l > 0 => collab.add(src, iface, preference, l),
            (Some(_), l) if l > 0 => collab.refresh(src, iface, preference, l),
            _ => {}
        }
    }

    let mut params_changed = false;

    if ra.cur_hop_limit != 0 && ra.cur_hop_limit != params.hop_limit && params.set_hop_limit(ra.cur_hop_limit).is_ok() {
        params_changed = true;
    }

    if ra.reachable_time_ms != 0 && params.set_base_reachable_time(ra.reachable_time_ms, rng) {
        params_changed = true;
    }

    if ra.retrans_timer_ms != 0 && ra.retrans_timer_ms != params.retrans_time_ms {
        params.retrans_time_ms = ra.retrans_timer_ms;
        params_changed = true;
    }

    if let Some(mtu_bytes) = opts.mtu {
        if mtu_bytes.len() >= 6 {
            let mtu = u32::from_be_bytes([mtu_bytes[2], mtu_bytes[3], mtu_bytes[4], mtu_bytes[5]]);
            let interface_mtu = collab.mtu(iface);
            if let Ok(true) = params.try_set_mtu(mtu, interface_mtu) {
                params_changed = true;
                collab.mtu_changed(iface, mtu);
            }
        }
    }

    if params_changed {
        collab.set_params(iface, params);
        collab.link_info_changed(iface);
    }

    if let Some(lladdr) = opts.source_ll_addr() {
        let flags = UpdateFlags {
            r#override: true,
            weak_override: true,
            set_router: true,
            force_router: true,
        };
        collab.update(iface, src, Some(lladdr), NeighborState::Stale, flags);
    }

    if params.accept_ra_pinfo {
        for prefix in &opts.prefix_info {
            collab.prefix_recv(iface, prefix, have_sllao);
        }
    }

    if params.accept_ra_rtr_pref {
        for route in &opts.route_info {
            if let Some(&plen) = route.first() {
                if plen <= params.accept_ra_rt_info_max_plen {
                    collab.route_info_recv(iface, route, src);
                }
            }
        }
    }

    for user_opt in &opts.user_opts {
        collab.user_opt_notify(iface, src, user_opt.kind, user_opt.body);
    }

    Ok(())
}
