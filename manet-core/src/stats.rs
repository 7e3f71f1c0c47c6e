//! Network statistics.
//!
//! [`NetworkStats`] is a snapshot of the datagrams the network carried so
//! far. Obtain one via [`Network::stats`](crate::network::Network::stats).

use std::fmt;

/// Why a datagram never reached its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// the destination address is not assigned to any node
    UnknownDestination,
    /// the routing table has no entry for the destination
    NoRoute,
    /// the next hop moved out of range
    OutOfRange,
    /// the datagram was forwarded too many times
    TtlExpired,
    /// nothing is bound on the destination port
    NoEndpoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropStats {
    pub unknown_destination: u64,
    pub no_route: u64,
    pub out_of_range: u64,
    pub ttl_expired: u64,
    pub no_endpoint: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Datagrams handed to the network by the applications.
    pub transmitted: u64,
    /// Individual hops over the wireless medium.
    pub hops: u64,
    /// Datagrams queued on a receive endpoint.
    pub delivered: u64,
    /// Payload bytes queued on a receive endpoint.
    pub delivered_bytes: u64,
    pub dropped: DropStats,
}

impl DropStats {
    pub(crate) fn record(&mut self, reason: DropReason) {
        let counter = match reason {
            DropReason::UnknownDestination => &mut self.unknown_destination,
            DropReason::NoRoute => &mut self.no_route,
            DropReason::OutOfRange => &mut self.out_of_range,
            DropReason::TtlExpired => &mut self.ttl_expired,
            DropReason::NoEndpoint => &mut self.no_endpoint,
        };
        *counter += 1;
    }

    pub fn total(&self) -> u64 {
        self.unknown_destination + self.no_route + self.out_of_range + self.ttl_expired + self.no_endpoint
    }
}

impl NetworkStats {
    /// fraction of the transmitted datagrams that were delivered
    pub fn delivery_ratio(&self) -> f64 {
        if self.transmitted == 0 {
            return 0.0;
        }
        self.delivered as f64 / self.transmitted as f64
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownDestination => "unknown destination",
            Self::NoRoute => "no route",
            Self::OutOfRange => "next hop out of range",
            Self::TtlExpired => "ttl expired",
            Self::NoEndpoint => "no endpoint",
        };
        f.write_str(reason)
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            transmitted,
            hops,
            delivered,
            delivered_bytes,
            dropped,
        } = self;

        write!(
            f,
            "transmitted: {transmitted}, delivered: {delivered} ({delivered_bytes} bytes), hops: {hops}, dropped: {total} (no route: {no_route}, out of range: {out_of_range}, ttl: {ttl}, no endpoint: {no_endpoint}, unknown destination: {unknown})",
            total = dropped.total(),
            no_route = dropped.no_route,
            out_of_range = dropped.out_of_range,
            ttl = dropped.ttl_expired,
            no_endpoint = dropped.no_endpoint,
            unknown = dropped.unknown_destination,
        )
    }
}
