//! Collaborator traits (§6).
//!
//! The NDP core owns none of the neighbor cache storage, the routing
//! table, address selection or the output path — those belong to a
//! generic cache, a routing subsystem and a device layer that sit
//! outside this crate (§1 "Out of scope"). Each collaborator the
//! teacher's kernel calls directly (`crate::drivers::net::...`,
//! `crate::network::...`) becomes a trait here instead, so the engine
//! can be driven by an in-memory mock in tests and by a real kernel
//! netstack in production without the core knowing the difference.

use alloc::vec::Vec;

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::message::RouterPreference;
use crate::params::{LinkType, NeighborParams};

pub type IfaceId = u32;

/// Reachability state of a neighbor cache entry (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborState {
    Incomplete,
    Reachable,
    Stale,
    Delay,
    Probe,
    Failed,
    /// No address resolution needed (multicast/loopback/p2p/raw targets).
    NoArp,
    Permanent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborFlags {
    pub router: bool,
    pub proxy: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    pub lladdr: Option<LinkAddr>,
    pub state: NeighborState,
    pub flags: NeighborFlags,
    pub probes: u32,
}

impl CacheEntry {
    pub fn new(state: NeighborState) -> Self {
        Self {
            lladdr: None,
            state,
            flags: NeighborFlags::default(),
            probes: 0,
        }
    }
}

/// What kind of flag update an inbound NA/RS/RA asks the cache to apply
/// (§4.4.2, §4.4.3, §4.4.4). Mirrors the teacher's boolean-knob style
/// rather than a bitmask, since every caller constructs one inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateFlags {
    /// NA's Override bit, or "always override" for RS/RA-sourced upserts.
    pub r#override: bool,
    /// Downgrade-only override: apply a link-layer address change even
    /// without the override bit if the entry had none yet.
    pub weak_override: bool,
    /// Value to force the ROUTER flag to, if `force_router` is set.
    pub set_router: bool,
    pub force_router: bool,
}

/// Generic neighbor cache, owned by the integrator (§6).
///
/// Every successful `lookup`/`create` must be paired with exactly one
/// `release` on every exit path (§8 property 6); use [`lookup_ref`] /
/// [`create_ref`] to get an RAII guard that releases on drop instead of
/// tracking this by hand.
pub trait NeighborCache {
    fn lookup(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<CacheEntry>;
    fn create(&self, iface: IfaceId, addr: Ipv6Addr, initial: CacheEntry) -> CacheEntry;
    /// Applies an update, creating the entry (upsert) if it doesn't
    /// exist yet, and returns the entry as it was *before* the update
    /// (a freshly-defaulted entry if just created), so the caller can
    /// detect transitions (e.g. ROUTER flag going from set to clear,
    /// §4.4.2).
    fn update(
        &self,
        iface: IfaceId,
        addr: Ipv6Addr,
        lladdr: Option<LinkAddr>,
        new_state: NeighborState,
        flags: UpdateFlags,
    ) -> CacheEntry;
    fn release(&self, iface: IfaceId, addr: Ipv6Addr);
    fn changeaddr(&self, iface: IfaceId);
    fn ifdown(&self, iface: IfaceId);
    fn run_gc(&self);
}

/// RAII reference returned by [`lookup_ref`]/[`create_ref`]: releases
/// the held cache reference when dropped, on every branch, matching
/// the teacher's "acquire paired with release on all exits" discipline
/// without requiring every handler to remember to call `release`.
pub struct NeighborRef<'a, C: NeighborCache + ?Sized> {
    cache: &'a C,
    iface: IfaceId,
    addr: Ipv6Addr,
    pub entry: CacheEntry,
}

impl<'a, C: NeighborCache + ?Sized> Drop for NeighborRef<'a, C> {
    fn drop(&mut self) {
        self.cache.release(self.iface, self.addr);
    }
}

pub fn lookup_ref<'a, C: NeighborCache + ?Sized>(
    cache: &'a C,
    iface: IfaceId,
    addr: Ipv6Addr,
) -> Option<NeighborRef<'a, C>> {
    cache.lookup(iface, addr).map(|entry| NeighborRef {
        cache,
        iface,
        addr,
        entry,
    })
}

pub fn create_ref<'a, C: NeighborCache + ?Sized>(
    cache: &'a C,
    iface: IfaceId,
    addr: Ipv6Addr,
    initial: CacheEntry,
) -> NeighborRef<'a, C> {
    let entry = cache.create(iface, addr, initial);
    NeighborRef {
        cache,
        iface,
        addr,
        entry,
    }
}

/// Tentative-address bookkeeping the address-autoconfiguration engine
/// owns (§1 "Out of scope").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAddrState {
    /// Address undergoing classic DAD: not usable for outbound traffic yet.
    Tentative,
    /// Address undergoing RFC 4429 optimistic DAD: usable already.
    Optimistic,
    Ready,
}

/// Interface/device facts the engine needs but does not own (§1, §3).
pub trait Interfaces {
    fn link_type(&self, iface: IfaceId) -> LinkType;
    fn link_addr(&self, iface: IfaceId) -> LinkAddr;
    fn mtu(&self, iface: IfaceId) -> u32;
    fn is_loopback(&self, iface: IfaceId) -> bool;
    fn is_point_to_point(&self, iface: IfaceId) -> bool;
    fn broadcast_addr(&self, iface: IfaceId) -> Option<LinkAddr>;
    fn params(&self, iface: IfaceId) -> NeighborParams;
    fn set_params(&self, iface: IfaceId, params: NeighborParams);
    /// Local-address bookkeeping state for `addr` on `iface`, if it is
    /// one of ours.
    fn local_address_state(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<LocalAddrState>;
    /// Any configured link-local address usable as a source, if we have one.
    fn link_local_source(&self, iface: IfaceId) -> Option<Ipv6Addr>;
    /// Whether `iface`/`addr` is a configured anycast address we own.
    fn owns_anycast(&self, iface: IfaceId, addr: Ipv6Addr) -> bool;
    /// Whether `iface`/`addr` is a configured proxy-NDP target, and if
    /// so, whether the proxied entry is flagged ROUTER.
    fn proxy_target(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<bool>;
}

pub trait AddrSelect {
    /// Picks a source address on `iface` for `dst`; `allow_tentative`
    /// widens the pool to include RFC 4429 optimistic addresses.
    fn select_source(&self, iface: IfaceId, dst: Ipv6Addr, allow_tentative: bool) -> Option<Ipv6Addr>;
}

pub trait RouteLookup {
    /// Resolves a next-hop link-layer address for `dst` on `iface`, or
    /// `None` on route-lookup failure (§4.2 "Local transient" error,
    /// silently dropped on emit).
    fn resolve_destination(&self, iface: IfaceId, dst: Ipv6Addr) -> Option<LinkAddr>;
}

pub trait Output {
    fn send(&self, iface: IfaceId, dst_link: LinkAddr, packet: &[u8]);
}

#[derive(Debug, Clone, Copy)]
pub struct RouterEntry {
    pub preference: RouterPreference,
    pub expires_in_s: u32,
}

pub trait DefaultRouterOps {
    fn get(&self, src: Ipv6Addr, iface: IfaceId) -> Option<RouterEntry>;
    fn add(&self, src: Ipv6Addr, iface: IfaceId, pref: RouterPreference, expires_in_s: u32);
    fn refresh(&self, src: Ipv6Addr, iface: IfaceId, pref: RouterPreference, expires_in_s: u32);
    fn remove(&self, src: Ipv6Addr, iface: IfaceId);
}

pub trait PrefixRecv {
    fn prefix_recv(&self, iface: IfaceId, option_bytes: &[u8], have_sllao: bool);
}

pub trait RouteInfoRecv {
    fn route_info_recv(&self, iface: IfaceId, option_bytes: &[u8], src: Ipv6Addr);
}

pub trait DadFail {
    fn dad_fail(&self, iface: IfaceId, addr: Ipv6Addr);
}

pub trait UserOptNotify {
    fn user_opt_notify(&self, iface: IfaceId, src: Ipv6Addr, kind: u8, option_bytes: &[u8]);
}

pub trait MtuChange {
    fn mtu_changed(&self, iface: IfaceId, mtu: u32);
}

pub trait LinkInfoNotify {
    fn link_info_changed(&self, iface: IfaceId);
}

pub trait IcmpNotify {
    /// Generic ICMPv6 notifier a redirect hands the truncated triggering
    /// packet to, so upper layers can update their routing caches (§4.4.5).
    fn icmpv6_notify(&self, iface: IfaceId, kind: u8, new_nexthop: Ipv6Addr, truncated_packet: &[u8]);
}

/// Everything the engine needs from the integrator, bundled so
/// [`crate::engine::NdpEngine`] takes a single generic parameter
/// instead of one per collaborator.
pub trait Collaborators:
    NeighborCache
    + Interfaces
    + AddrSelect
    + RouteLookup
    + Output
    + DefaultRouterOps
    + PrefixRecv
    + RouteInfoRecv
    + DadFail
    + UserOptNotify
    + MtuChange
    + LinkInfoNotify
    + IcmpNotify
{
}

impl<T> Collaborators for T where
    T: NeighborCache
        + Interfaces
        + AddrSelect
        + RouteLookup
        + Output
        + DefaultRouterOps
        + PrefixRecv
        + RouteInfoRecv
        + DadFail
        + UserOptNotify
        + MtuChange
        + LinkInfoNotify
        + IcmpNotify
{
}

#[allow(dead_code)]
fn _assert_object_safety_not_required() -> Vec<u8> {
    Vec::new()
}
