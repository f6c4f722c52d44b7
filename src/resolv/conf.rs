//! Resolver configuration.
//!
//! This module provides [`ResolvConf`], the knobs of the resolver, and
//! the compiled-in root server list used to bootstrap iteration.
//!
//! All duration and count settings are silently clamped into a sane
//! range by their setters, so a configuration is always usable no matter
//! what values it was given.

use core::cmp;
use core::time::Duration;
use std::net::Ipv4Addr;

//------------ RootServer ----------------------------------------------------

/// A root name server known at compile time.
///
/// The root servers bootstrap iteration: since every other name server
/// is found by asking a server we already know, somewhere a fixed list
/// has to break the cycle. The names and addresses below are the
/// well-known published root hints.
#[derive(Clone, Copy, Debug)]
pub struct RootServer {
    /// The host name of the server.
    pub name: &'static str,

    /// The IPv4 address of the server.
    pub addr: Ipv4Addr,
}

impl RootServer {
    const fn new(name: &'static str, addr: [u8; 4]) -> Self {
        RootServer {
            name,
            addr: Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]),
        }
    }
}

/// The thirteen root name servers.
pub const ROOT_SERVERS: &[RootServer] = &[
    RootServer::new("a.root-servers.net", [198, 41, 0, 4]),
    RootServer::new("b.root-servers.net", [199, 9, 14, 201]),
    RootServer::new("c.root-servers.net", [192, 33, 4, 12]),
    RootServer::new("d.root-servers.net", [199, 7, 91, 13]),
    RootServer::new("e.root-servers.net", [192, 203, 230, 10]),
    RootServer::new("f.root-servers.net", [192, 5, 5, 241]),
    RootServer::new("g.root-servers.net", [192, 112, 36, 4]),
    RootServer::new("h.root-servers.net", [198, 97, 190, 53]),
    RootServer::new("i.root-servers.net", [192, 36, 148, 17]),
    RootServer::new("j.root-servers.net", [192, 58, 128, 30]),
    RootServer::new("k.root-servers.net", [193, 0, 14, 129]),
    RootServer::new("l.root-servers.net", [199, 7, 83, 42]),
    RootServer::new("m.root-servers.net", [202, 12, 27, 33]),
];

/// The TTL the bootstrap records are seeded with, matching the root
/// hints file.
pub const ROOT_TTL: u32 = 518_400;

//------------ Limits --------------------------------------------------------

/// The time to wait for a response before retransmitting.
const READ_TIMEOUT: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(5),
    Duration::from_millis(1),
    Duration::from_secs(60),
);

/// The total number of transmission attempts per query.
const ATTEMPTS: DefMinMax<usize> = DefMinMax::new(3, 1, 10);

/// How deep resolving the address of a glueless name server may nest.
const NS_INDIRECTION: DefMinMax<usize> = DefMinMax::new(10, 0, 64);

//------------ ResolvConf ----------------------------------------------------

/// The configuration of a resolver.
#[derive(Clone, Debug)]
pub struct ResolvConf {
    /// How long to wait for a response before retransmitting.
    read_timeout: Duration,

    /// The total number of transmission attempts per query.
    attempts: usize,

    /// How deep resolving name server addresses may nest.
    ns_indirection: usize,

    /// The port queries are sent to.
    port: u16,
}

impl ResolvConf {
    /// Creates a configuration with all values at their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sets the read timeout, clamped between 1 ms and 60 s.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = READ_TIMEOUT.limit(timeout)
    }

    /// Returns the total number of transmission attempts per query.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Sets the number of transmission attempts, clamped between 1
    /// and 10.
    pub fn set_attempts(&mut self, attempts: usize) {
        self.attempts = ATTEMPTS.limit(attempts)
    }

    /// Returns the name server indirection depth.
    pub fn ns_indirection(&self) -> usize {
        self.ns_indirection
    }

    /// Sets the name server indirection depth, clamped to at most 64.
    pub fn set_ns_indirection(&mut self, depth: usize) {
        self.ns_indirection = NS_INDIRECTION.limit(depth)
    }

    /// Returns the server port queries are sent to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sets the server port queries are sent to.
    ///
    /// This is 53 by default and really only needs changing when
    /// talking to servers on unprivileged ports, e.g., in tests.
    pub fn set_port(&mut self, port: u16) {
        self.port = port
    }
}

//--- Default

impl Default for ResolvConf {
    fn default() -> Self {
        ResolvConf {
            read_timeout: READ_TIMEOUT.default(),
            attempts: ATTEMPTS.default(),
            ns_indirection: NS_INDIRECTION.default(),
            port: 53,
        }
    }
}

//------------ DefMinMax -----------------------------------------------------

/// The default, minimum, and maximum values for a config variable.
#[derive(Clone, Copy)]
struct DefMinMax<T> {
    def: T,
    min: T,
    max: T,
}

impl<T> DefMinMax<T> {
    const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    fn default(self) -> T {
        self.def
    }

    fn limit(self, value: T) -> T
    where
        T: Ord,
    {
        cmp::max(self.min, cmp::min(self.max, value))
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let conf = ResolvConf::default();
        assert_eq!(conf.read_timeout(), Duration::from_secs(5));
        assert_eq!(conf.attempts(), 3);
        assert_eq!(conf.ns_indirection(), 10);
        assert_eq!(conf.port(), 53);
    }

    #[test]
    fn limits() {
        let mut conf = ResolvConf::default();
        conf.set_attempts(0);
        assert_eq!(conf.attempts(), 1);
        conf.set_attempts(100);
        assert_eq!(conf.attempts(), 10);
        conf.set_read_timeout(Duration::ZERO);
        assert_eq!(conf.read_timeout(), Duration::from_millis(1));
        conf.set_ns_indirection(1000);
        assert_eq!(conf.ns_indirection(), 64);
    }

    #[test]
    fn thirteen_roots() {
        assert_eq!(ROOT_SERVERS.len(), 13);
    }
}
