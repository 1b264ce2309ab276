//! The top-level NDP engine (§5, §6).
//!
//! Grounded on the teacher's `Icmpv6Stack` in `netstack/icmpv6.rs`,
//! which bundles the neighbor cache, a device handle and the receive
//! entry point behind one struct. Here the device handle becomes a
//! generic `C: Collaborators`, and the struct additionally owns the two
//! pieces of state the teacher keeps as free functions with module
//! statics: the proxy delay queue and the weak jitter RNG, plus a small
//! per-destination redirect rate limiter the teacher's kernel source
//! keeps in the routing `dst_entry` (out of scope here, so it lives on
//! the engine instead).

use alloc::boxed::Box;
use alloc::collections::BTreeMap;

use spin::Mutex;

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::collab::{lookup_ref, Collaborators, IfaceId};
use crate::emit;
use crate::error::DropReason;
use crate::logger::{Logger, NullLogger, RateLimited};
use crate::proxy::DelayQueue;
use crate::recv::{self, ns};
use crate::wrand::WeakRng;

/// Minimum spacing between two Redirects sent for the same destination
/// (§4.4.5 "rate-limited per destination via the peer table (1 Hz)").
const REDIRECT_RATE_LIMIT_MS: u64 = 1_000;

/// Every `DROP_LOG_EVERY`th drop on this engine reaches the wired
/// [`Logger`]; the rest are counted and discarded (§7).
const DROP_LOG_EVERY: u32 = 8;

pub struct NdpEngine<C: Collaborators> {
    collab: C,
    proxy_queue: DelayQueue,
    rng: Mutex<WeakRng>,
    redirect_last_sent_ms: Mutex<BTreeMap<Ipv6Addr, u64>>,
    logger: RateLimited,
}

impl<C: Collaborators> NdpEngine<C> {
    /// `proxy_qlen` sizes the delay queue (§3); `rng_seed` comes from
    /// whatever per-boot entropy the integrator has (§9 "Randomized
    /// timers") since this crate never reads a clock or hardware RNG
    /// itself. Logging defaults to [`NullLogger`]; use
    /// [`Self::with_logger`] to wire a real sink.
    pub fn new(collab: C, proxy_qlen: usize, rng_seed: u64) -> Self {
        Self::with_logger(collab, proxy_qlen, rng_seed, Box::new(NullLogger))
    }

    /// Same as [`Self::new`], but wires `logger` behind a rate limiter
    /// (§2a, §7) for every log call this engine and its receive
    /// pipeline make.
    pub fn with_logger(collab: C, proxy_qlen: usize, rng_seed: u64, logger: Box<dyn Logger>) -> Self {
        Self {
            collab,
            proxy_queue: DelayQueue::new(proxy_qlen),
            rng: Mutex::new(WeakRng::new(rng_seed)),
            redirect_last_sent_ms: Mutex::new(BTreeMap::new()),
            logger: RateLimited::new(logger, DROP_LOG_EVERY),
        }
    }

    pub fn collab(&self) -> &C {
        &self.collab
    }

    /// The public receive entry point (§7): never propagates a failure
    /// to the caller. Use [`Self::receive_checked`] when a drop reason
    /// is needed for tests or metrics.
    pub fn receive(&self, iface: IfaceId, src: Ipv6Addr, dst: Ipv6Addr, hop_limit: u8, icmp: &[u8]) {
        let _ = self.receive_checked(iface, src, dst, hop_limit, icmp);
    }

    pub fn receive_checked(&self, iface: IfaceId, src: Ipv6Addr, dst: Ipv6Addr, hop_limit: u8, icmp: &[u8]) -> Result<(), DropReason> {
        let mut rng = self.rng.lock();
        recv::receive_checked(&self.collab, &self.proxy_queue, &mut rng, &self.logger, iface, src, dst, hop_limit, icmp)
    }

    /// Advances the proxy/anycast delay queue by `elapsed_ms` and
    /// replays every entry whose delay has elapsed (§4.6).
    pub fn tick_proxy_queue(&self, elapsed_ms: u32) {
        for pending in self.proxy_queue.tick(elapsed_ms) {
            ns::respond(&self.collab, pending.iface, pending.target, pending.reply_dst, pending.is_router, pending.source_ll);
        }
    }

    pub fn send_router_solicitation(&self, iface: IfaceId) {
        emit::send_router_solicitation(&self.collab, iface);
    }

    pub fn send_neighbor_solicitation(&self, iface: IfaceId, target: Ipv6Addr, dst: Ipv6Addr, source_for_dad: bool) {
        emit::send_neighbor_solicitation(&self.collab, iface, target, dst, source_for_dad);
    }

    pub fn send_neighbor_advertisement(&self, iface: IfaceId, target: Ipv6Addr, dst: Ipv6Addr, is_router: bool, solicited: bool, override_flag: bool) {
        emit::send_neighbor_advertisement(&self.collab, iface, target, dst, is_router, solicited, override_flag);
    }

    /// Validates and sends a Redirect (§4.4.5 "SendRedirect"): requires
    /// a link-local source on `iface`, a target that is on-link
    /// (link-local unicast, or equal to the original destination), and
    /// at most one Redirect per `destination` per second.
    pub fn send_redirect(&self, iface: IfaceId, dst: Ipv6Addr, target: Ipv6Addr, destination: Ipv6Addr, triggering_packet: &[u8], now_ms: u64) -> Result<(), DropReason> {
        let src = self.collab.link_local_source(iface).ok_or(DropReason::NoLinkLocalSource)?;

        if target != destination && !target.is_link_local() {
            return Err(DropReason::RedirectTargetNotOnLink);
        }

        {
            let mut last_sent = self.redirect_last_sent_ms.lock();
            if let Some(&last) = last_sent.get(&destination) {
                if now_ms.saturating_sub(last) < REDIRECT_RATE_LIMIT_MS {
                    return Err(DropReason::RedirectRateLimited);
                }
            }
            last_sent.insert(destination, now_ms);
        }

        let target_lladdr = lookup_ref(&self.collab, iface, target).and_then(|r| r.entry.lladdr);
        let truncated = emit::truncate_to_min_mtu(triggering_packet);
        emit::send_redirect(&self.collab, iface, src, dst, target, destination, target_lladdr, truncated);
        Ok(())
    }

    /// `NETDEV_DOWN` (§5 "Cancellation"): invalidates every entry on
    /// `iface` and drops any pending proxy replies for it.
    pub fn ifdown(&self, iface: IfaceId) {
        self.collab.ifdown(iface);
        self.proxy_queue.ifdown(iface);
        self.collab.run_gc();
    }

    /// `NETDEV_CHANGEADDR`: rewrites cache entries for `iface`, runs GC,
    /// and (if `ndisc_notify` is set) announces `addr` with an
    /// unsolicited NA.
    pub fn changeaddr(&self, iface: IfaceId, addr: Ipv6Addr) {
        self.collab.changeaddr(iface);
        self.collab.run_gc();
        if self.collab.params(iface).ndisc_notify {
            self.notify_peers(iface, addr);
        }
    }

    /// `NETDEV_NOTIFY_PEERS`: announces `addr` with an unsolicited NA,
    /// without touching cache state.
    pub fn notify_peers(&self, iface: IfaceId, addr: Ipv6Addr) {
        let forwarding = self.collab.params(iface).forwarding;
        emit::send_neighbor_advertisement(&self.collab, iface, addr, Ipv6Addr::ALL_NODES, forwarding, false, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::icmp_type;
    use crate::test_support::MockCollaborators;

    fn ns_body(target: Ipv6Addr) -> alloc::vec::Vec<u8> {
        let mut body = alloc::vec::Vec::new();
        body.extend_from_slice(&[135, 0, 0, 0]);
        body.extend_from_slice(&[0, 0, 0, 0]);
        body.extend_from_slice(target.as_bytes());
        body
    }

    #[test]
    fn receive_never_propagates_an_error() {
        let engine = NdpEngine::new(MockCollaborators::default(), 8, 42);
        // Bad hop limit would normally be a drop; `receive` just swallows it.
        let icmp = [icmp_type::ROUTER_SOLICITATION, 0, 0, 0, 0, 0, 0, 0];
        engine.receive(1, Ipv6Addr::UNSPECIFIED, Ipv6Addr::ALL_ROUTERS, 1, &icmp);
    }

    #[test]
    fn proxy_reply_is_sent_once_its_delay_elapses() {
        let mock = MockCollaborators::default();
        let target = Ipv6Addr::new([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 7]);
        mock.set_proxy(1, target, true);
        mock.with_params(|p| p.proxy_delay_ms = 500);
        let src = Ipv6Addr::new([0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        mock.set_route(src, LinkAddr::from_mac([4; 6]));
        let engine = NdpEngine::new(mock, 8, 7);

        let dst = target.solicited_node_multicast();
        let res = engine.receive_checked(1, src, dst, 255, &ns_body(target));
        assert!(res.is_ok());
        assert!(engine.collab().sent.borrow().is_empty());

        engine.tick_proxy_queue(10_000);
        assert_eq!(engine.collab().sent.borrow().len(), 1);
    }

    #[test]
    fn redirect_rate_limit_blocks_second_send_within_one_second() {
        let mock = MockCollaborators::default();
        let engine = NdpEngine::new(mock, 8, 1);
        let iface = 1;
        let dst = Ipv6Addr::new([0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        let target = Ipv6Addr::new([0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
        let destination = Ipv6Addr::new([0x20, 0x01, 0x0d, 0xb8, 0xa, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5]);

        let first = engine.send_redirect(iface, dst, target, destination, &[0xaa; 16], 1_000);
        assert!(first.is_ok());
        let second = engine.send_redirect(iface, dst, target, destination, &[0xaa; 16], 1_500);
        assert_eq!(second, Err(DropReason::RedirectRateLimited));
        let third = engine.send_redirect(iface, dst, target, destination, &[0xaa; 16], 2_100);
        assert!(third.is_ok());
    }

    #[test]
    fn redirect_requires_on_link_target() {
        let mock = MockCollaborators::default();
        let engine = NdpEngine::new(mock, 8, 1);
        let iface = 1;
        let dst = Ipv6Addr::new([0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        let target = Ipv6Addr::new([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 9]);
        let destination = Ipv6Addr::new([0x20, 0x01, 0x0d, 0xb8, 0xa, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        let res = engine.send_redirect(iface, dst, target, destination, &[], 0);
        assert_eq!(res, Err(DropReason::RedirectTargetNotOnLink));
    }
}
