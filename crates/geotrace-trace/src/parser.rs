//! Hop extraction from tracer output.

use std::net::IpAddr;

/// Collects hop addresses from `traceroute -n` / `tracepath -n` output lines.
///
/// The second whitespace-separated token of a line is taken as a hop when it
/// is an IP address and differs from the previous hop. Timeouts (`*`),
/// headers and `[LOCALHOST]` lines fall out naturally.
#[derive(Debug, Default)]
pub struct HopParser {
    hops: Vec<IpAddr>,
}

impl HopParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one output line; returns the hop it contributed, if any.
    pub fn accept_line(&mut self, line: &str) -> Option<IpAddr> {
        let candidate = line.split_whitespace().nth(1)?;
        let hop: IpAddr = candidate.parse().ok()?;
        if self.hops.last() == Some(&hop) {
            return None;
        }
        self.hops.push(hop);
        Some(hop)
    }

    #[must_use]
    pub fn hops(&self) -> &[IpAddr] {
        &self.hops
    }

    /// Final hop list, ending with `destination` unless it already does.
    #[must_use]
    pub fn finish(mut self, destination: Option<IpAddr>) -> Vec<IpAddr> {
        if let Some(destination) = destination {
            if self.hops.last() != Some(&destination) {
                self.hops.push(destination);
            }
        }
        self.hops
    }
}

/// Whether `addr` lies in a private IPv4 block (10/8, 172.16/12, 192.168/16).
#[must_use]
pub fn is_unroutable(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(_) => false,
    }
}

/// [`is_unroutable`] for textual input; anything that is not an IP address is routable.
#[must_use]
pub fn is_unroutable_address(s: &str) -> bool {
    s.trim().parse().is_ok_and(is_unroutable)
}
