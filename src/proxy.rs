//! Proxy-NDP and anycast delay queue (§4.6).
//!
//! RFC 4861 requires a random delay before answering on behalf of a
//! proxied or anycast target, to avoid a thundering herd of identical
//! advertisements. The teacher has no proxy support at all (its
//! `netstack/icmpv6.rs` answers every NS immediately), so this module
//! is grounded on the teacher's `spin::Mutex`-guarded queue style (as
//! used for its neighbor cache) generalized into a bounded delay
//! queue, sized per `proxy_qlen` (§3).
//!
//! Eligibility (is the target proxied/anycast, what ROUTER flag and
//! source-link-layer-address to answer with) is resolved once, at
//! enqueue time, by [`crate::recv::ns::recv_ns`]. The queued entry
//! already carries everything [`crate::recv::ns::respond`] needs, so
//! draining it on timer expiry never re-validates or re-derives
//! eligibility — which is what makes replay idempotent (§4.6).

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use spin::Mutex;

use crate::addr::{Ipv6Addr, LinkAddr};
use crate::collab::IfaceId;
use crate::wrand::WeakRng;

/// A deferred advertisement, ready to hand straight to
/// [`crate::recv::ns::respond`] once its delay elapses.
#[derive(Debug, Clone, Copy)]
pub struct PendingReply {
    pub iface: IfaceId,
    pub target: Ipv6Addr,
    pub reply_dst: Ipv6Addr,
    pub is_router: bool,
    pub source_ll: Option<LinkAddr>,
    pub remaining_ms: u32,
}

/// Bounded, per-interface-set delay queue (§3 `proxy_qlen`).
///
/// Entries are replayed in arrival order once their delay elapses;
/// duplicate solicitations for an already-queued target are dropped
/// (§4.6 "idempotent replay" — a second NS for the same target while
/// one is already pending must not produce two advertisements).
pub struct DelayQueue {
    capacity: usize,
    items: Mutex<VecDeque<PendingReply>>,
}

impl DelayQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Attempts to enqueue a deferred reply with a uniform-random delay
    /// in `[0, max_delay_ms]`. Returns `false` if the queue is full or
    /// a pending entry for the same `(iface, target, reply_dst)`
    /// already exists.
    #[allow(clippy::too_many_arguments)]
    pub fn try_enqueue(
        &self,
        rng: &mut WeakRng,
        iface: IfaceId,
        target: Ipv6Addr,
        reply_dst: Ipv6Addr,
        is_router: bool,
        source_ll: Option<LinkAddr>,
        max_delay_ms: u32,
    ) -> bool {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return false;
        }
        if items
            .iter()
            .any(|p| p.iface == iface && p.target == target && p.reply_dst == reply_dst)
        {
            return false;
        }
        let delay = if max_delay_ms == 0 {
            0
        } else {
            rng.uniform_range(0, max_delay_ms)
        };
        items.push_back(PendingReply {
            iface,
            target,
            reply_dst,
            is_router,
            source_ll,
            remaining_ms: delay,
        });
        true
    }

    /// Advances every pending entry's timer by `elapsed_ms` and drains
    /// (removing from the queue) any entry whose delay has elapsed,
    /// returning them in arrival order for the caller to replay.
    pub fn tick(&self, elapsed_ms: u32) -> Vec<PendingReply> {
        let mut items = self.items.lock();
        let mut due = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if items[i].remaining_ms <= elapsed_ms {
                due.push(items.remove(i).expect("index within bounds"));
            } else {
                items[i].remaining_ms -= elapsed_ms;
                i += 1;
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every pending entry for `iface` (§4.4 "ifdown" cleanup).
    pub fn ifdown(&self, iface: IfaceId) {
        self.items.lock().retain(|p| p.iface != iface);
    }
}
