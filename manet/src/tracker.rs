//! Reception accounting at the sinks.

use crate::output::Console;
use manet_core::{
    NodeId, SimTime,
    address::Address,
    network::Network,
    socket::{BindError, EndpointId, ReceiveEndpoint},
};
use std::{
    cell::{Cell, RefCell},
    fmt,
    net::Ipv4Addr,
    rc::Rc,
};

/// Cumulative delivered traffic, over every sink.
///
/// Only written by the receive callbacks and read by the stats reporter,
/// never concurrently: the simulation runs one handler at a time.
#[derive(Debug, Default)]
pub struct Counters {
    bytes: Cell<u64>,
    packets: Cell<u64>,
}

/// One datagram counted at a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    pub time: SimTime,
    /// the sink
    pub node: NodeId,
    pub source: Address,
    pub bytes: u64,
}

/// The per-datagram line.
///
/// The sender is only printed when it is an IPv4 socket address.
///
/// ```
/// # use manet::tracker::ReceptionLine;
/// # use manet_core::{NodeId, SimTime, address::Address};
/// # use std::{net::{Ipv4Addr, SocketAddrV4}, time::Duration};
/// let time = SimTime::from_secs(100) + Duration::from_millis(250);
/// let source = Address::from(SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 11), 49153));
///
/// assert_eq!(
///     ReceptionLine::new(time, NodeId::new(0), &source).to_string(),
///     "100.25 0 received one packet from 10.0.0.11",
/// );
/// assert_eq!(
///     ReceptionLine::new(time, NodeId::new(0), &Address::Opaque(vec![1])).to_string(),
///     "100.25 0 received one packet",
/// );
/// ```
pub struct ReceptionLine {
    time: SimTime,
    node: NodeId,
    sender: Option<Ipv4Addr>,
}

/// Counts every datagram reaching the sinks.
#[derive(Debug, Clone)]
pub struct ReceiveTracker {
    counters: Rc<Counters>,
    receptions: Rc<RefCell<Vec<Reception>>>,
    console: Console,
}

impl Counters {
    pub fn bytes(&self) -> u64 {
        self.bytes.get()
    }

    pub fn packets(&self) -> u64 {
        self.packets.get()
    }

    fn record(&self, bytes: u64) {
        self.bytes.set(self.bytes.get() + bytes);
        self.packets.set(self.packets.get() + 1);
    }
}

impl ReceptionLine {
    pub fn new(time: SimTime, node: NodeId, source: &Address) -> Self {
        let sender = match source.as_inet() {
            Ok(address) => Some(*address.ip()),
            Err(error) => {
                log::trace!("{error}");
                None
            }
        };

        Self { time, node, sender }
    }
}

impl fmt::Display for ReceptionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.node)?;
        match self.sender {
            Some(sender) => write!(f, " received one packet from {sender}"),
            None => f.write_str(" received one packet"),
        }
    }
}

impl ReceiveTracker {
    pub fn new(counters: Rc<Counters>, console: Console) -> Self {
        Self {
            counters,
            receptions: Rc::default(),
            console,
        }
    }

    pub fn counters(&self) -> &Rc<Counters> {
        &self.counters
    }

    /// every datagram counted so far
    pub fn receptions(&self) -> Vec<Reception> {
        self.receptions.borrow().clone()
    }

    /// Bind the endpoint of a sink on `(address, port)` and count what it
    /// receives.
    pub fn bind(&self, network: &mut Network, address: Ipv4Addr, port: u16) -> Result<EndpointId, BindError> {
        let tracker = self.clone();
        network.bind_receive_endpoint(address, port, move |endpoint, now| tracker.on_receive(endpoint, now))
    }

    /// Drain the endpoint, counting and printing every datagram.
    fn on_receive(&self, endpoint: &mut ReceiveEndpoint, now: SimTime) -> anyhow::Result<()> {
        let node = endpoint.node();

        while let Some(datagram) = endpoint.drain_next() {
            self.counters.record(datagram.len());
            self.console
                .line(format_args!("{}", ReceptionLine::new(now, node, datagram.source())))?;

            self.receptions.borrow_mut().push(Reception {
                time: now,
                node,
                source: datagram.source().clone(),
                bytes: datagram.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manet_core::{
        medium::WirelessMedium,
        mobility::ConstantPosition,
        network,
        position::Position,
        routing::{self, RoutingKind},
        scheduler::Simulator,
        socket::Datagram,
    };
    use std::net::SocketAddrV4;

    fn pair() -> Simulator<Network> {
        let mut network = Network::new();
        let nodes = network.create_nodes(2);
        network.set_mobility(nodes[1], Box::new(ConstantPosition(Position::new(10.0, 0.0))));
        network.configure_wireless_medium(WirelessMedium::builder().build());
        network
            .assign_addresses(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 0))
            .unwrap();
        let mut sim = Simulator::new(network);
        routing::install(&mut sim, RoutingKind::Olsr.protocol(), 100);
        sim
    }

    #[test]
    fn counts_and_prints() {
        let mut sim = pair();
        let (console, captured) = Console::captured();
        let tracker = ReceiveTracker::new(Rc::default(), console);
        tracker
            .bind(sim.world_mut(), Ipv4Addr::new(10, 0, 0, 1), 9)
            .unwrap();

        let sink = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 9);
        let inet = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 49153);
        sim.schedule_at(SimTime::from_secs(1), move |sim| {
            network::send(sim, NodeId::new(1), Datagram::new(inet, sink, vec![0; 64]))?;
            network::send(sim, NodeId::new(1), Datagram::new(Address::Opaque(vec![7]), sink, vec![0; 64]))
        })
        .unwrap();
        sim.stop_at(SimTime::from_secs(2));
        sim.run().unwrap();

        assert_eq!(tracker.counters().packets(), 2);
        assert_eq!(tracker.counters().bytes(), 128);

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" 0 received one packet from 10.0.0.2"), "{}", lines[0]);
        assert!(lines[1].ends_with(" 0 received one packet"), "{}", lines[1]);

        let receptions = tracker.receptions();
        assert_eq!(receptions.len(), 2);
        assert!(receptions.iter().all(|r| r.node == NodeId::new(0) && r.bytes == 64));
    }
}
