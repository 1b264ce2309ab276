//! NDP option TLV codec (§4.1).
//!
//! Options are attacker-controlled input: parsing advances a single
//! forward cursor, bounds-checks every step, rejects zero-length
//! options and requires the option area to be consumed exactly (§9
//! "Option parsing safety"). The returned [`OptionSet`] borrows the
//! input buffer — no option bytes are copied.

use alloc::vec::Vec;

use crate::addr::LinkAddr;
use crate::error::OptionError;
use crate::logger::{ndp_log, Level, Logger};
use crate::params::LinkType;

pub const OPT_SOURCE_LL: u8 = 1;
pub const OPT_TARGET_LL: u8 = 2;
pub const OPT_PREFIX_INFO: u8 = 3;
pub const OPT_REDIRECT_HEADER: u8 = 4;
pub const OPT_MTU: u8 = 5;
pub const OPT_ROUTE_INFO: u8 = 24;
pub const OPT_RDNSS: u8 = 25;
pub const OPT_DNSSL: u8 = 31;

/// A user option carried in an RA (RDNSS/DNSSL, §4.4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserOption<'a> {
    pub kind: u8,
    pub body: &'a [u8],
}

/// The result of parsing an option area: singleton slots hold only the
/// first occurrence (duplicates are dropped per §4.1); repeatable kinds
/// are collected in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OptionSet<'a> {
    pub source_ll: Option<&'a [u8]>,
    pub target_ll: Option<&'a [u8]>,
    pub mtu: Option<&'a [u8]>,
    pub redirect_header: Option<&'a [u8]>,
    pub prefix_info: Vec<&'a [u8]>,
    pub route_info: Vec<&'a [u8]>,
    pub user_opts: Vec<UserOption<'a>>,
    /// Set when a target-LL or redirect-header option is seen while
    /// parsing an RA: those are forbidden there but don't cause a drop
    /// (§4.4.4 "Forbidden options" — logged as invalid only).
    pub saw_forbidden_in_ra: bool,
}

impl<'a> OptionSet<'a> {
    pub fn source_ll_addr(&self) -> Option<LinkAddr> {
        self.source_ll.and_then(LinkAddr::new)
    }

    pub fn target_ll_addr(&self) -> Option<LinkAddr> {
        self.target_ll.and_then(LinkAddr::new)
    }
}

/// Parse a contiguous option area. `in_ra` marks target-LL/redirect-header
/// as forbidden-but-non-fatal instead of a normal singleton (§4.4.4).
/// Duplicate singletons and forbidden-in-RA options are logged through
/// `logger` rather than silently swallowed (§4.1, §4.4.4).
pub fn parse<'a>(buf: &'a [u8], in_ra: bool, logger: &dyn Logger) -> Result<OptionSet<'a>, OptionError> {
    let mut set = OptionSet::default();
    let mut i = 0usize;
    while i < buf.len() {
        if buf.len() - i < 2 {
            return Err(OptionError::Truncated);
        }
        let kind = buf[i];
        let len_units = buf[i + 1];
        if len_units == 0 {
            return Err(OptionError::ZeroLength);
        }
        let total = len_units as usize * 8;
        if i + total > buf.len() {
            return Err(OptionError::Truncated);
        }
        let body = &buf[i + 2..i + total];

        match kind {
            OPT_SOURCE_LL => {
                if set.source_ll.is_none() {
                    set.source_ll = Some(body);
                } else {
                    ndp_log!(logger, Level::Debug, "ndp::options", "duplicate source-LL option ignored");
                }
            }
            OPT_TARGET_LL if in_ra => {
                set.saw_forbidden_in_ra = true;
                ndp_log!(logger, Level::Warn, "ndp::options", "target-LL option forbidden in RA");
            }
            OPT_TARGET_LL => {
                if set.target_ll.is_none() {
                    set.target_ll = Some(body);
                } else {
                    ndp_log!(logger, Level::Debug, "ndp::options", "duplicate target-LL option ignored");
                }
            }
            OPT_REDIRECT_HEADER if in_ra => {
                set.saw_forbidden_in_ra = true;
                ndp_log!(logger, Level::Warn, "ndp::options", "redirect-header option forbidden in RA");
            }
            OPT_REDIRECT_HEADER => {
                if set.redirect_header.is_none() {
                    set.redirect_header = Some(body);
                } else {
                    ndp_log!(logger, Level::Debug, "ndp::options", "duplicate redirect-header option ignored");
                }
            }
            OPT_MTU => {
                if set.mtu.is_none() {
                    set.mtu = Some(body);
                } else {
                    ndp_log!(logger, Level::Debug, "ndp::options", "duplicate MTU option ignored");
                }
            }
            OPT_PREFIX_INFO => set.prefix_info.push(body),
            OPT_ROUTE_INFO => set.route_info.push(body),
            OPT_RDNSS | OPT_DNSSL => set.user_opts.push(UserOption { kind, body }),
            _ => {
                // Unknown option type: forward-compatibility invariant,
                // silently skipped.
            }
        }

        i += total;
    }
    // The loop only advances by bounds-checked `total`, so on normal
    // exit `i == buf.len()` exactly; anything else already returned.
    debug_assert_eq!(i, buf.len());
    Ok(set)
}

/// Builds a redirect-header option carrying a truncated copy of the
/// triggering packet, per RFC 4861 §4.6 (8-byte header: type, length,
/// 6 reserved bytes, then the packet data).
pub fn fill_redirect_header_option(out: &mut Vec<u8>, truncated_packet: &[u8]) {
    let content_len = 8 + truncated_packet.len();
    let space_units = content_len.div_ceil(8);
    let total = space_units * 8;

    out.push(OPT_REDIRECT_HEADER);
    out.push(space_units as u8);
    out.extend_from_slice(&[0; 6]);
    out.extend_from_slice(truncated_packet);
    for _ in content_len..total {
        out.push(0);
    }
}

fn link_pad(link: LinkType) -> usize {
    match link {
        LinkType::Infiniband => 6,
        _ => 0,
    }
}

/// Build a source-LL or target-LL option into `out`, matching the
/// teacher's zero-fill-trailing-bytes discipline so no uninitialized
/// memory is ever exposed on the wire.
pub fn fill_address_option(out: &mut Vec<u8>, kind: u8, lladdr: &LinkAddr, link: LinkType) {
    let pad = link_pad(link);
    let content_len = 2 + pad + lladdr.len();
    let space_units = content_len.div_ceil(8);
    let total = space_units * 8;

    out.push(kind);
    out.push(space_units as u8);
    for _ in 0..pad {
        out.push(0);
    }
    out.extend_from_slice(lladdr.as_bytes());
    for _ in content_len..total {
        out.push(0);
    }
}
