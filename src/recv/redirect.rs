//! RecvRedirect (§4.4.5).

use crate::collab::{Collaborators, IfaceId};
use crate::error::DropReason;
use crate::logger::Logger;
use crate::message::{icmp_type, Redirect};
use crate::addr::Ipv6Addr;
use crate::options;

pub fn recv_redirect<C: Collaborators>(collab: &C, logger: &dyn Logger, iface: IfaceId, src: Ipv6Addr, body: &[u8]) -> Result<(), DropReason> {
    if !src.is_link_local() {
        return Err(DropReason::SourceNotLinkLocal);
    }
    // A Redirect only makes sense coming from a router we've actually
    // designated as our default; anything else is either a plain host
    // or a router we never authorized (§4.4.5).
    if collab.get(src, iface).is_none() {
        return Err(DropReason::RedirectFromNonDefaultRouter);
    }

    let redirect = Redirect::parse(body).ok_or(DropReason::TooShort)?;
    let opts = options::parse(Redirect::options(body), false, logger).map_err(DropReason::BadOptions)?;

    let Some(rh) = opts.redirect_header else {
        return Ok(());
    };
    // `opts.redirect_header` already has the 2-byte type/length pair
    // stripped by the option codec; 6 reserved bytes remain before the
    // truncated triggering packet (8 bytes of option header on the wire).
    if rh.len() < 6 {
        return Err(DropReason::TooShort);
    }
    let truncated_packet = &rh[6..];
    collab.icmpv6_notify(iface, icmp_type::REDIRECT, redirect.target, truncated_packet);
    Ok(())
}
