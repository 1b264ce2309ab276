//! In-memory mock of every collaborator trait, shared by this crate's
//! own unit tests and by `tests/` integration tests.
//!
//! Grounded on the teacher's `spin::Mutex<BTreeMap<...>>` neighbor
//! cache in `netstack/icmpv6.rs`: the same storage shape, but now
//! backing every trait in [`crate::collab`] instead of being baked
//! into the receive handlers directly.

#![cfg(test)]

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::collab::{
    CacheEntry, DefaultRouterOps, IfaceId, Interfaces, LocalAddrState, NeighborCache, NeighborFlags,
    NeighborState, RouterEntry, UpdateFlags,
};
use crate::collab::{AddrSelect, DadFail, IcmpNotify, LinkInfoNotify, MtuChange, Output, PrefixRecv, RouteInfoRecv, RouteLookup, UserOptNotify};
use crate::message::RouterPreference;
use crate::params::{LinkType, NeighborParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CacheKey(IfaceId, Ipv6Addr);

pub struct MockCollaborators {
    pub link_type: LinkType,
    pub link_addr: LinkAddr,
    pub mtu: RefCell<u32>,
    pub source: Option<Ipv6Addr>,
    pub broadcast: RefCell<Option<LinkAddr>>,

    cache: RefCell<BTreeMap<CacheKey, CacheEntry>>,
    refs_outstanding: RefCell<BTreeMap<CacheKey, u32>>,
    local_addrs: RefCell<BTreeMap<(IfaceId, Ipv6Addr), LocalAddrState>>,
    anycast: RefCell<alloc::collections::BTreeSet<(IfaceId, Ipv6Addr)>>,
    proxy: RefCell<BTreeMap<(IfaceId, Ipv6Addr), bool>>,
    routers: RefCell<BTreeMap<(Ipv6Addr, IfaceId), RouterEntry>>,
    routes: RefCell<BTreeMap<Ipv6Addr, LinkAddr>>,
    params: RefCell<NeighborParams>,

    pub sent: RefCell<Vec<(IfaceId, LinkAddr, Vec<u8>)>>,
    pub dad_failures: RefCell<Vec<(IfaceId, Ipv6Addr)>>,
    pub prefix_recv_calls: RefCell<u32>,
    pub route_info_recv_calls: RefCell<u32>,
    pub user_opt_calls: RefCell<u32>,
    pub mtu_change_calls: RefCell<u32>,
    pub link_info_calls: RefCell<u32>,
    pub icmp_notify_calls: RefCell<Vec<(IfaceId, u8, Ipv6Addr, Vec<u8>)>>,
}

impl Default for MockCollaborators {
    fn default() -> Self {
        Self {
            link_type: LinkType::Ethernet,
            link_addr: LinkAddr::from_mac([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            mtu: RefCell::new(1500),
            source: Some(Ipv6Addr::new([0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 9])),
            broadcast: RefCell::new(None),
            cache: RefCell::new(BTreeMap::new()),
            refs_outstanding: RefCell::new(BTreeMap::new()),
            local_addrs: RefCell::new(BTreeMap::new()),
            anycast: RefCell::new(alloc::collections::BTreeSet::new()),
            proxy: RefCell::new(BTreeMap::new()),
            routers: RefCell::new(BTreeMap::new()),
            routes: RefCell::new(BTreeMap::new()),
            params: RefCell::new(NeighborParams::default()),
            sent: RefCell::new(Vec::new()),
            dad_failures: RefCell::new(Vec::new()),
            prefix_recv_calls: RefCell::new(0),
            route_info_recv_calls: RefCell::new(0),
            user_opt_calls: RefCell::new(0),
            mtu_change_calls: RefCell::new(0),
            link_info_calls: RefCell::new(0),
            icmp_notify_calls: RefCell::new(Vec::new()),
        }
    }
}

impl MockCollaborators {
    pub fn set_local_address(&self, iface: IfaceId, addr: Ipv6Addr, state: LocalAddrState) {
        self.local_addrs.borrow_mut().insert((iface, addr), state);
    }

    pub fn set_anycast(&self, iface: IfaceId, addr: Ipv6Addr) {
        self.anycast.borrow_mut().insert((iface, addr));
    }

    pub fn set_proxy(&self, iface: IfaceId, addr: Ipv6Addr, is_router: bool) {
        self.proxy.borrow_mut().insert((iface, addr), is_router);
    }

    pub fn set_route(&self, dst: Ipv6Addr, link: LinkAddr) {
        self.routes.borrow_mut().insert(dst, link);
    }

    pub fn set_broadcast(&self, addr: LinkAddr) {
        *self.broadcast.borrow_mut() = Some(addr);
    }

    pub fn with_params(&self, f: impl FnOnce(&mut NeighborParams)) {
        f(&mut self.params.borrow_mut());
    }

    pub fn cache_get(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<CacheEntry> {
        self.cache.borrow().get(&CacheKey(iface, addr)).copied()
    }

    /// Panics if any lookup/create was never matched by a release —
    /// the check backing §8 property 6.
    pub fn assert_refs_balanced(&self) {
        for (key, count) in self.refs_outstanding.borrow().iter() {
            assert_eq!(*count, 0, "unreleased cache reference for {:?}", key.1);
        }
    }
}

impl NeighborCache for MockCollaborators {
    fn lookup(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<CacheEntry> {
        let key = CacheKey(iface, addr);
        let entry = self.cache.borrow().get(&key).copied();
        if entry.is_some() {
            *self.refs_outstanding.borrow_mut().entry(key).or_insert(0) += 1;
        }
        entry
    }

    fn create(&self, iface: IfaceId, addr: Ipv6Addr, initial: CacheEntry) -> CacheEntry {
        let key = CacheKey(iface, addr);
        self.cache.borrow_mut().insert(key, initial);
        *self.refs_outstanding.borrow_mut().entry(key).or_insert(0) += 1;
        initial
    }

    fn update(
        &self,
        iface: IfaceId,
        addr: Ipv6Addr,
        lladdr: Option<LinkAddr>,
        new_state: NeighborState,
        flags: UpdateFlags,
    ) -> CacheEntry {
        let key = CacheKey(iface, addr);
        let mut cache = self.cache.borrow_mut();
        let previous = cache.get(&key).copied().unwrap_or(CacheEntry::new(NeighborState::Incomplete));

        let mut next = previous;
        if let Some(l) = lladdr {
            if flags.r#override || flags.weak_override && previous.lladdr.is_none() {
                next.lladdr = Some(l);
            }
        }
        next.state = new_state;
        if flags.force_router {
            next.flags.router = flags.set_router;
        }
        cache.insert(key, next);
        previous
    }

    fn release(&self, iface: IfaceId, addr: Ipv6Addr) {
        let key = CacheKey(iface, addr);
        let mut refs = self.refs_outstanding.borrow_mut();
        let count = refs.entry(key).or_insert(0);
        *count = count.saturating_sub(1);
    }

    fn changeaddr(&self, _iface: IfaceId) {}
    fn ifdown(&self, iface: IfaceId) {
        self.cache.borrow_mut().retain(|k, _| k.0 != iface);
    }
    fn run_gc(&self) {}
}

impl Interfaces for MockCollaborators {
    fn link_type(&self, _iface: IfaceId) -> LinkType {
        self.link_type
    }
    fn link_addr(&self, _iface: IfaceId) -> LinkAddr {
        self.link_addr
    }
    fn mtu(&self, _iface: IfaceId) -> u32 {
        *self.mtu.borrow()
    }
    fn is_loopback(&self, _iface: IfaceId) -> bool {
        matches!(self.link_type, LinkType::Loopback)
    }
    fn is_point_to_point(&self, _iface: IfaceId) -> bool {
        matches!(self.link_type, LinkType::PointToPoint)
    }
    fn broadcast_addr(&self, _iface: IfaceId) -> Option<LinkAddr> {
        *self.broadcast.borrow()
    }
    fn params(&self, _iface: IfaceId) -> NeighborParams {
        *self.params.borrow()
    }
    fn set_params(&self, _iface: IfaceId, params: NeighborParams) {
        *self.params.borrow_mut() = params;
    }
    fn local_address_state(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<LocalAddrState> {
        self.local_addrs.borrow().get(&(iface, addr)).copied()
    }
    fn link_local_source(&self, _iface: IfaceId) -> Option<Ipv6Addr> {
        self.source
    }
    fn owns_anycast(&self, iface: IfaceId, addr: Ipv6Addr) -> bool {
        self.anycast.borrow().contains(&(iface, addr))
    }
    fn proxy_target(&self, iface: IfaceId, addr: Ipv6Addr) -> Option<bool> {
        self.proxy.borrow().get(&(iface, addr)).copied()
    }
}

impl AddrSelect for MockCollaborators {
    fn select_source(&self, _iface: IfaceId, _dst: Ipv6Addr, _allow_tentative: bool) -> Option<Ipv6Addr> {
        self.source
    }
}

impl RouteLookup for MockCollaborators {
    fn resolve_destination(&self, _iface: IfaceId, dst: Ipv6Addr) -> Option<LinkAddr> {
        self.routes.borrow().get(&dst).copied()
    }
}

impl Output for MockCollaborators {
    fn send(&self, iface: IfaceId, dst_link: LinkAddr, packet: &[u8]) {
        self.sent.borrow_mut().push((iface, dst_link, packet.to_vec()));
    }
}

impl DefaultRouterOps for MockCollaborators {
    fn get(&self, src: Ipv6Addr, iface: IfaceId) -> Option<RouterEntry> {
        self.routers.borrow().get(&(src, iface)).copied()
    }
    fn add(&self, src: Ipv6Addr, iface: IfaceId, pref: RouterPreference, expires_in_s: u32) {
        self.routers.borrow_mut().insert((src, iface), RouterEntry { preference: pref, expires_in_s });
    }
    fn refresh(&self, src: Ipv6Addr, iface: IfaceId, pref: RouterPreference, expires_in_s: u32) {
        self.routers.borrow_mut().insert((src, iface), RouterEntry { preference: pref, expires_in_s });
    }
    fn remove(&self, src: Ipv6Addr, iface: IfaceId) {
        self.routers.borrow_mut().remove(&(src, iface));
    }
}

impl PrefixRecv for MockCollaborators {
    fn prefix_recv(&self, _iface: IfaceId, _option_bytes: &[u8], _have_sllao: bool) {
        *self.prefix_recv_calls.borrow_mut() += 1;
    }
}

impl RouteInfoRecv for MockCollaborators {
    fn route_info_recv(&self, _iface: IfaceId, _option_bytes: &[u8], _src: Ipv6Addr) {
        *self.route_info_recv_calls.borrow_mut() += 1;
    }
}

impl DadFail for MockCollaborators {
    fn dad_fail(&self, iface: IfaceId, addr: Ipv6Addr) {
        self.dad_failures.borrow_mut().push((iface, addr));
    }
}

impl UserOptNotify for MockCollaborators {
    fn user_opt_notify(&self, _iface: IfaceId, _src: Ipv6Addr, _kind: u8, _option_bytes: &[u8]) {
        *self.user_opt_calls.borrow_mut() += 1;
    }
}

impl MtuChange for MockCollaborators {
    fn mtu_changed(&self, _iface: IfaceId, mtu: u32) {
        *self.mtu.borrow_mut() = mtu;
        *self.mtu_change_calls.borrow_mut() += 1;
    }
}

impl LinkInfoNotify for MockCollaborators {
    fn link_info_changed(&self, _iface: IfaceId) {
        *self.link_info_calls.borrow_mut() += 1;
    }
}

impl IcmpNotify for MockCollaborators {
    fn icmpv6_notify(&self, iface: IfaceId, kind: u8, new_nexthop: Ipv6Addr, truncated_packet: &[u8]) {
        self.icmp_notify_calls.borrow_mut().push((iface, kind, new_nexthop, truncated_packet.to_vec()));
    }
}
