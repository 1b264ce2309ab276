//! RecvRS (§4.4.3).

use crate::addr::Ipv6Addr;
use crate::collab::{Collaborators, IfaceId, NeighborState, UpdateFlags};
use crate::error::DropReason;
use crate::logger::Logger;
use crate::message::RouterSolicitation;
use crate::options;

pub fn recv_rs<C: Collaborators>(collab: &C, logger: &dyn Logger, iface: IfaceId, src: Ipv6Addr, body: &[u8]) -> Result<(), DropReason> {
    if !collab.params(iface).forwarding {
        return Err(DropReason::NotARouter);
    }
    if src.is_unspecified() {
        return Err(DropReason::SourceUnspecified);
    }
    RouterSolicitation::parse(body).ok_or(DropReason::TooShort)?;
    let opts = options::parse(RouterSolicitation::options(body), false, logger).map_err(DropReason::BadOptions)?;

    if let Some(lladdr) = opts.source_ll_addr() {
        let flags = UpdateFlags {
            r#override: true,
            weak_override: true,
            ..Default::default()
        };
        collab.update(iface, src, Some(lladdr), NeighborState::Stale, flags);
    }
    Ok(())
}
