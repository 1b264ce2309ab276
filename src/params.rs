//! Per-interface NDP parameters and the link-type enum the
//! address-family policy dispatches on (§3, §6 "Configuration surface").

use crate::error::ConfigError;

/// Link types the address-family policy (§4.3) knows how to map
/// multicast addresses for. `Other` falls back to the interface's
/// broadcast address on transmit, or `Unsupported` on receive-side
/// lookups, matching the teacher's default-case handling in its link
/// dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    Fddi,
    Ieee802,
    Infiniband,
    ArcNet,
    IpGre,
    Loopback,
    PointToPoint,
    /// Raw/no-header-ops device: NOARP, direct output.
    Raw,
    Other,
}

/// Per-interface NDP timers and feature toggles (§3, §6).
///
/// All times are stored in milliseconds, matching the teacher's sysctl
/// convention of suffixing knobs with `_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborParams {
    pub base_reachable_time_ms: u32,
    pub reachable_time_ms: u32,
    pub retrans_time_ms: u32,
    pub delay_probe_time_ms: u32,
    pub gc_staletime_ms: u32,

    pub ucast_probes: u8,
    pub app_probes: u8,
    pub mcast_probes: u8,

    pub anycast_delay_ms: u32,
    pub proxy_delay_ms: u32,
    pub proxy_qlen: u16,

    pub accept_ra: bool,
    pub accept_ra_defrtr: bool,
    pub accept_ra_pinfo: bool,
    pub accept_ra_rtr_pref: bool,
    pub accept_ra_rt_info_max_plen: u8,

    pub forwarding: bool,
    pub proxy_ndp: bool,
    pub force_tllao: bool,
    pub ndisc_notify: bool,

    pub hop_limit: u8,
    pub mtu6: u32,
}

impl Default for NeighborParams {
    fn default() -> Self {
        // Mirrors the conventional Linux/BSD NDP defaults.
        Self {
            base_reachable_time_ms: 30_000,
            reachable_time_ms: 30_000,
            retrans_time_ms: 1_000,
            delay_probe_time_ms: 5_000,
            gc_staletime_ms: 60_000,
            ucast_probes: 3,
            app_probes: 0,
            mcast_probes: 3,
            anycast_delay_ms: 1_000,
            proxy_delay_ms: 800,
            proxy_qlen: 64,
            accept_ra: true,
            accept_ra_defrtr: true,
            accept_ra_pinfo: true,
            accept_ra_rtr_pref: true,
            accept_ra_rt_info_max_plen: 128,
            forwarding: false,
            proxy_ndp: false,
            force_tllao: false,
            ndisc_notify: false,
            hop_limit: 64,
            mtu6: 1500,
        }
    }
}

impl NeighborParams {
    /// Re-derive `reachable_time_ms` uniformly from
    /// `[0.5*base, 1.5*base]`, clamped to `>= 100ms` (§4.4.4, §8.8).
    pub fn randomize_reachable_time(&mut self, rng: &mut crate::wrand::WeakRng) {
        let base = self.base_reachable_time_ms.max(1);
        let lo = (base / 2).max(100);
        let hi = (base + base / 2).max(lo);
        self.reachable_time_ms = rng.uniform_range(lo, hi);
    }

    /// Apply an advertised `reachable_time` (ms) from an RA, per §4.4.4:
    /// only takes effect (and re-randomizes) if it actually differs from
    /// the stored base.
    pub fn set_base_reachable_time(&mut self, ms: u32, rng: &mut crate::wrand::WeakRng) -> bool {
        if ms == 0 || ms == self.base_reachable_time_ms {
            return false;
        }
        self.base_reachable_time_ms = ms.max(100);
        self.randomize_reachable_time(rng);
        true
    }

    /// Validates and applies an MTU option value (§4.4.4): must lie in
    /// `[1280, interface_mtu]` and differ from the stored value.
    pub fn try_set_mtu(&mut self, advertised: u32, interface_mtu: u32) -> Result<bool, ConfigError> {
        if advertised < 1280 || advertised > interface_mtu {
            return Err(ConfigError::InvalidMtu);
        }
        if advertised == self.mtu6 {
            return Ok(false);
        }
        self.mtu6 = advertised;
        Ok(true)
    }

    pub fn set_hop_limit(&mut self, hop_limit: u8) -> Result<(), ConfigError> {
        if hop_limit == 0 {
            return Err(ConfigError::OutOfRange);
        }
        self.hop_limit = hop_limit;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrand::WeakRng;

    #[test]
    fn randomize_reachable_time_stays_in_bounds() {
        let mut p = NeighborParams {
            base_reachable_time_ms: 30_000,
            ..Default::default()
        };
        let mut rng = WeakRng::new(42);
        for _ in 0..50 {
            p.randomize_reachable_time(&mut rng);
            assert!(p.reachable_time_ms >= 15_000 && p.reachable_time_ms <= 45_000);
        }
    }

    #[test]
    fn set_base_reachable_time_noop_when_unchanged() {
        let mut p = NeighborParams::default();
        let mut rng = WeakRng::new(1);
        let before = p.reachable_time_ms;
        assert!(!p.set_base_reachable_time(p.base_reachable_time_ms, &mut rng));
        assert_eq!(p.reachable_time_ms, before);
    }

    #[test]
    fn mtu_rejects_below_ipv6_minimum() {
        let mut p = NeighborParams::default();
        assert_eq!(p.try_set_mtu(1279, 1500), Err(ConfigError::InvalidMtu));
        assert_eq!(p.try_set_mtu(1600, 1500), Err(ConfigError::InvalidMtu));
    }

    #[test]
    fn mtu_accepts_in_range_change() {
        let mut p = NeighborParams::default();
        assert_eq!(p.try_set_mtu(1400, 1500), Ok(true));
        assert_eq!(p.mtu6, 1400);
        assert_eq!(p.try_set_mtu(1400, 1500), Ok(false));
    }
}
