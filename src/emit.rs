//! Outbound NDP message construction (§4.2).
//!
//! Grounded on the teacher netstack's `send_router_solicitation`/
//! `send_neighbor_advertisement`/`send_neighbor_solicitation`, which
//! each build a fixed header, append options, compute
//! `icmpv6_checksum` and hand the buffer to the device layer. Here the
//! buffer sizing, source-address selection and output dispatch are
//! pulled out into collaborator calls instead of being hardwired to one
//! global device.

use alloc::vec::Vec;

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::afpolicy::{multicast_map, Direction, MulticastMap};
use crate::collab::{AddrSelect, IfaceId, Interfaces, Output, RouteLookup};
use crate::message::{icmp_type, icmpv6_checksum, NA_FLAG_OVERRIDE, NA_FLAG_ROUTER, NA_FLAG_SOLICITED};
use crate::options;
use crate::params::LinkType;

/// IPv6 header length this crate always emits: no extension headers.
const IPV6_HDR_LEN: usize = 40;

/// Every NDP message the integrator's router config marks us as
/// sending uses this hop limit (§4.2 "Hop limit is always 255").
pub const NDP_HOP_LIMIT: u8 = 255;

fn write_ipv6_header(buf: &mut Vec<u8>, src: &Ipv6Addr, dst: &Ipv6Addr, payload_len: u16) {
    buf.push(0x60); // version 6, traffic class high nibble 0, flow label 0
    buf.push(0);
    buf.push(0);
    buf.push(0);
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.push(crate::message::IPPROTO_ICMPV6);
    buf.push(NDP_HOP_LIMIT);
    buf.extend_from_slice(src.as_bytes());
    buf.extend_from_slice(dst.as_bytes());
}

/// Resolves the link-layer destination for `dst` and hands `packet` to
/// the integrator's [`Output`]. Per §4.2/§7, any failure along this
/// path (no route, no source address, no link mapping) is a silent
/// drop: emission never propagates an error to the caller.
fn dispatch<C>(collab: &C, iface: IfaceId, dst: &Ipv6Addr, link: LinkType, packet: &[u8])
where
    C: Interfaces + RouteLookup + Output,
{
    let link_dst = if dst.is_multicast() {
        let broadcast = collab.broadcast_addr(iface);
        match multicast_map(dst, link, Direction::Tx, broadcast) {
            MulticastMap::Resolved(mac) => Some(mac),
            MulticastMap::Unsupported => None,
        }
    } else {
        collab.resolve_destination(iface, *dst)
    };

    if let Some(link_dst) = link_dst {
        collab.send(iface, link_dst, packet);
    }
}

fn finish_and_send<C>(
    collab: &C,
    iface: IfaceId,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    link: LinkType,
    mut icmp: Vec<u8>,
) where
    C: Interfaces + RouteLookup + Output,
{
    let csum = icmpv6_checksum(&src, &dst, &icmp);
    icmp[2..4].copy_from_slice(&csum.to_be_bytes());

    let mut packet = Vec::with_capacity(IPV6_HDR_LEN + icmp.len());
    write_ipv6_header(&mut packet, &src, &dst, icmp.len() as u16);
    packet.extend_from_slice(&icmp);

    dispatch(collab, iface, &dst, link, &packet);
}

/// Builds and sends a Router Solicitation to `ff02::2` (or a supplied
/// `dst` for targeted retransmission), optionally carrying a
/// source-link-layer-address option when we already have a usable
/// source address (§4.2, §8.1).
pub fn send_router_solicitation<C>(collab: &C, iface: IfaceId)
where
    C: AddrSelect + Interfaces + RouteLookup + Output,
{
    let link = collab.link_type(iface);
    let dst = Ipv6Addr::ALL_ROUTERS;
    let src = collab.select_source(iface, dst, false).unwrap_or(Ipv6Addr::UNSPECIFIED);

    let mut icmp = Vec::with_capacity(8);
    icmp.push(icmp_type::ROUTER_SOLICITATION);
    icmp.push(0);
    icmp.extend_from_slice(&[0, 0]); // checksum placeholder
    icmp.extend_from_slice(&[0, 0, 0, 0]); // reserved

    if !src.is_unspecified() {
        options::fill_address_option(&mut icmp, options::OPT_SOURCE_LL, &collab.link_addr(iface), link);
    }

    finish_and_send(collab, iface, src, dst, link, icmp);
}

/// Builds and sends a Neighbor Solicitation for `target`, to `dst`
/// (the target's solicited-node multicast address for multicast
/// probes, or the target's own unicast address for unicast probes per
/// §4.5). `source_for_dad` forces an unspecified source, per RFC 4861
/// §7.2.4 DAD probes.
pub fn send_neighbor_solicitation<C>(
    collab: &C,
    iface: IfaceId,
    target: Ipv6Addr,
    dst: Ipv6Addr,
    source_for_dad: bool,
)
where
    C: AddrSelect + Interfaces + RouteLookup + Output,
{
    let link = collab.link_type(iface);
    let src = if source_for_dad {
        Ipv6Addr::UNSPECIFIED
    } else {
        collab.select_source(iface, dst, false).unwrap_or(Ipv6Addr::UNSPECIFIED)
    };

    let mut icmp = Vec::with_capacity(24);
    icmp.push(icmp_type::NEIGHBOR_SOLICITATION);
    icmp.push(0);
    icmp.extend_from_slice(&[0, 0]);
    icmp.extend_from_slice(&[0, 0, 0, 0]); // reserved
    icmp.extend_from_slice(target.as_bytes());

    if !src.is_unspecified() {
        options::fill_address_option(&mut icmp, options::OPT_SOURCE_LL, &collab.link_addr(iface), link);
    }

    finish_and_send(collab, iface, src, dst, link, icmp);
}

/// Builds and sends a Neighbor Advertisement for `target` (§4.4.1).
pub fn send_neighbor_advertisement<C>(
    collab: &C,
    iface: IfaceId,
    target: Ipv6Addr,
    dst: Ipv6Addr,
    is_router: bool,
    solicited: bool,
    override_flag: bool,
)
where
    C: AddrSelect + Interfaces + RouteLookup + Output,
{
    let link = collab.link_type(iface);
    let src = collab.select_source(iface, dst, false).unwrap_or(target);

    let mut flags: u32 = 0;
    if is_router {
        flags |= NA_FLAG_ROUTER;
    }
    if solicited {
        flags |= NA_FLAG_SOLICITED;
    }
    if override_flag {
        flags |= NA_FLAG_OVERRIDE;
    }

    let mut icmp = Vec::with_capacity(24);
    icmp.push(icmp_type::NEIGHBOR_ADVERTISEMENT);
    icmp.push(0);
    icmp.extend_from_slice(&[0, 0]);
    icmp.extend_from_slice(&flags.to_be_bytes());
    icmp.extend_from_slice(target.as_bytes());

    // A solicited, unicast reply normally omits the target-LL option
    // (RFC 4861 §4.4 makes it a SHOULD there, since the solicitor's own
    // unicast destination already implies it knows how to reach us);
    // `force_tllao` (§6) overrides that omission.
    let omit_by_default = solicited && !dst.is_multicast();
    if !omit_by_default || collab.params(iface).force_tllao {
        options::fill_address_option(&mut icmp, options::OPT_TARGET_LL, &collab.link_addr(iface), link);
    }

    finish_and_send(collab, iface, src, dst, link, icmp);
}

/// Sends a Redirect suggesting `target` as the better next hop for
/// `destination`, back to `dst` (§4.4.5). `target_lladdr` is included as
/// a target-LL option only when the target's neighbor entry is already
/// resolved; `truncated_packet` (already capped to the minimum IPv6 MTU
/// by [`truncate_to_min_mtu`]) becomes the redirect-header option.
pub fn send_redirect<C>(
    collab: &C,
    iface: IfaceId,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    target: Ipv6Addr,
    destination: Ipv6Addr,
    target_lladdr: Option<LinkAddr>,
    truncated_packet: &[u8],
) where
    C: Interfaces + RouteLookup + Output,
{
    let link = collab.link_type(iface);

    let mut icmp = Vec::with_capacity(48);
    icmp.push(icmp_type::REDIRECT);
    icmp.push(0);
    icmp.extend_from_slice(&[0, 0]);
    icmp.extend_from_slice(&[0, 0, 0, 0]); // reserved
    icmp.extend_from_slice(target.as_bytes());
    icmp.extend_from_slice(destination.as_bytes());
    if let Some(lladdr) = target_lladdr {
        options::fill_address_option(&mut icmp, options::OPT_TARGET_LL, &lladdr, link);
    }
    if !truncated_packet.is_empty() {
        options::fill_redirect_header_option(&mut icmp, truncated_packet);
    }

    finish_and_send(collab, iface, src, dst, link, icmp);
}

/// Wraps [`LinkAddr`] up for callers that only have an option byte
/// slice (used by the redirect-header truncation logic in `recv`).
pub fn truncate_to_min_mtu(original_packet: &[u8]) -> &[u8] {
    let max = crate::message::IPV6_MIN_MTU - IPV6_HDR_LEN - 8;
    if original_packet.len() > max {
        &original_packet[..max]
    } else {
        original_packet
    }
}
