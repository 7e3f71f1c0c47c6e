//! The simulated mobile ad-hoc network.
//!
//! The [`Network`] is the world of the [`Simulator`]: it owns the nodes,
//! the wireless medium, the installed routing protocols, the receive
//! endpoints and the on/off applications. Datagrams travel hop by hop, each
//! hop being a scheduled event:
//!
//! ```text
//! send()
//!   │
//!   ▼
//! [ route lookup ] ── no route ──► dropped
//!   │
//!   ▼
//! [ medium: next hop in range? ] ── out of range ──► dropped
//!   │
//!   │   hop duration later
//!   ▼
//! next hop == destination ? ── no ──► route lookup again
//!   │
//!   ▼
//! [ receive endpoint queue ] ──► receive callback
//! ```
//!
//! [`Simulator`]: crate::scheduler::Simulator

use crate::{
    address::{AddressError, Ipv4AddressAllocator},
    application::OnOffApplication,
    defaults::DEFAULT_TTL,
    medium::WirelessMedium,
    mobility::MobilityModel,
    node::{Node, NodeId},
    position::Position,
    routing::{Connectivity, RoutingList},
    scheduler::Simulator,
    socket::{BindError, Datagram, EndpointId, ReceiveCallback, ReceiveEndpoint},
    stats::{DropReason, NetworkStats},
    time::SimTime,
};
use std::{
    collections::HashMap,
    fmt,
    net::{Ipv4Addr, SocketAddrV4},
};

/// This is the entry point for all activities with [`manet_core`].
///
/// See the [module](self) documentation for how datagrams are carried.
///
/// ```
/// use manet_core::{network::Network, position::Position};
/// use manet_core::mobility::ConstantPosition;
/// use std::net::Ipv4Addr;
///
/// let mut network = Network::new();
/// let nodes = network.create_nodes(2);
/// network.set_mobility(nodes[1], Box::new(ConstantPosition(Position::new(100.0, 0.0))));
/// network
///     .assign_addresses(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 0))
///     .unwrap();
///
/// assert_eq!(network.address_of(nodes[1]), Some(Ipv4Addr::new(10, 0, 0, 2)));
/// ```
///
/// [`manet_core`]: crate
pub struct Network {
    nodes: Vec<Node>,

    medium: Option<WirelessMedium>,

    routing: RoutingList,

    /// reverse lookup of the node addresses
    addresses: HashMap<Ipv4Addr, NodeId>,

    endpoints: Vec<EndpointSlot>,
    bindings: HashMap<SocketAddrV4, EndpointId>,

    pub(crate) applications: Vec<OnOffApplication>,

    stats: NetworkStats,
}

struct EndpointSlot {
    endpoint: ReceiveEndpoint,
    /// `None` only while the callback is running
    callback: Option<ReceiveCallback>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            medium: None,
            routing: RoutingList::new(),
            addresses: HashMap::new(),
            endpoints: Vec::new(),
            bindings: HashMap::new(),
            applications: Vec::new(),
            stats: NetworkStats::default(),
        }
    }

    /// Create `count` new nodes and return their identifiers.
    ///
    /// Node identifiers are allocated in order, following the nodes that
    /// already exist.
    pub fn create_nodes(&mut self, count: usize) -> Vec<NodeId> {
        let mut next = NodeId::new(self.nodes.len() as u32);
        let mut created = Vec::with_capacity(count);

        for _ in 0..count {
            self.nodes.push(Node::new(next));
            created.push(next);
            next = next.next();
        }

        created
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(Node::id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Replace the mobility model of `node`. Unknown nodes are ignored.
    pub fn set_mobility(&mut self, node: NodeId, mobility: Box<dyn MobilityModel>) {
        if let Some(node) = self.nodes.get_mut(node.index()) {
            node.set_mobility(mobility);
        }
    }

    pub fn position_of(&mut self, node: NodeId, now: SimTime) -> Option<Position> {
        self.nodes
            .get_mut(node.index())
            .map(|node| node.position_at(now))
    }

    /// Snapshot of the position of every node at `now`.
    pub fn positions(&mut self, now: SimTime) -> Vec<(NodeId, Position)> {
        self.nodes
            .iter_mut()
            .map(|node| (node.id(), node.position_at(now)))
            .collect()
    }

    pub fn configure_wireless_medium(&mut self, medium: WirelessMedium) {
        self.medium = Some(medium);
    }

    pub fn medium(&self) -> Option<&WirelessMedium> {
        self.medium.as_ref()
    }

    pub fn routing(&self) -> &RoutingList {
        &self.routing
    }

    pub(crate) fn routing_mut(&mut self) -> &mut RoutingList {
        &mut self.routing
    }

    /// Give every node without an address the next host address of the
    /// `base`/`mask` subnet, in [`NodeId`] order.
    ///
    /// # Errors
    ///
    /// Fails if the subnet is invalid or too small. Nodes addressed before
    /// the pool ran out keep their address.
    pub fn assign_addresses(&mut self, base: Ipv4Addr, mask: Ipv4Addr) -> Result<(), AddressError> {
        let mut allocator = Ipv4AddressAllocator::new(base, mask)?;

        for node in self.nodes.iter_mut().filter(|node| node.address().is_none()) {
            let address = allocator.allocate()?;
            node.set_address(address);
            self.addresses.insert(address, node.id());
        }

        Ok(())
    }

    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.node(node).and_then(Node::address)
    }

    pub fn node_by_address(&self, address: Ipv4Addr) -> Option<NodeId> {
        self.addresses.get(&address).copied()
    }

    /// Bind a receive endpoint on `(address, port)`.
    ///
    /// The endpoint belongs to the node `address` is assigned to. The
    /// `callback` is called every time a datagram is queued on it.
    pub fn bind_receive_endpoint<F>(
        &mut self,
        address: Ipv4Addr,
        port: u16,
        callback: F,
    ) -> Result<EndpointId, BindError>
    where
        F: FnMut(&mut ReceiveEndpoint, SimTime) -> anyhow::Result<()> + 'static,
    {
        let local = SocketAddrV4::new(address, port);
        let node = self
            .node_by_address(address)
            .ok_or(BindError::AddressNotAssigned { address })?;
        if self.bindings.contains_key(&local) {
            return Err(BindError::AlreadyBound { local });
        }

        let id = EndpointId::new(self.endpoints.len());
        self.endpoints.push(EndpointSlot {
            endpoint: ReceiveEndpoint::new(id, node, local),
            callback: Some(Box::new(callback)),
        });
        self.bindings.insert(local, id);

        Ok(id)
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&ReceiveEndpoint> {
        self.endpoints.get(id.index()).map(|slot| &slot.endpoint)
    }

    /// The links currently up between the nodes.
    ///
    /// Without a wireless medium no node can hear any other.
    pub fn connectivity(&mut self, now: SimTime) -> Connectivity {
        let positions = self.positions(now);
        let mut connectivity = Connectivity::new(positions.len());
        let Some(medium) = self.medium.as_ref() else {
            return connectivity;
        };

        for (i, (a, position_a)) in positions.iter().enumerate() {
            for (b, position_b) in &positions[i + 1..] {
                if medium.in_range(position_a, position_b) && medium.in_range(position_b, position_a)
                {
                    connectivity.add_link(*a, *b);
                }
            }
        }

        connectivity
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats
    }

    fn drop_datagram(&mut self, now: SimTime, at: NodeId, datagram: &Datagram, reason: DropReason) {
        log::debug!(
            "{now}s: datagram from {source} to {destination} dropped at node {at}: {reason}",
            source = datagram.source(),
            destination = datagram.destination()
        );
        self.stats.dropped.record(reason);
    }
}

/// Hand `datagram` to the network, from `source`.
///
/// The datagram is routed toward the node its destination address is
/// assigned to. Datagrams that cannot be delivered are dropped and
/// accounted for in the [`NetworkStats`], this is not an error.
pub fn send(sim: &mut Simulator<Network>, source: NodeId, datagram: Datagram) -> anyhow::Result<()> {
    let now = sim.now();
    let network = sim.world_mut();
    network.stats.transmitted += 1;

    let Some(destination) = network.node_by_address(*datagram.destination().ip()) else {
        network.drop_datagram(now, source, &datagram, DropReason::UnknownDestination);
        return Ok(());
    };

    forward(sim, source, destination, datagram, DEFAULT_TTL)
}

fn forward(
    sim: &mut Simulator<Network>,
    current: NodeId,
    destination: NodeId,
    datagram: Datagram,
    ttl: u8,
) -> anyhow::Result<()> {
    if current == destination {
        return deliver(sim, datagram);
    }

    let now = sim.now();
    let network = sim.world_mut();
    if ttl == 0 {
        network.drop_datagram(now, current, &datagram, DropReason::TtlExpired);
        return Ok(());
    }

    let Some(next) = network.routing.next_hop(current, destination) else {
        network.drop_datagram(now, current, &datagram, DropReason::NoRoute);
        return Ok(());
    };

    let from = network.position_of(current, now);
    let to = network.position_of(next, now);
    let hop = match (network.medium.as_ref(), from, to) {
        (Some(medium), Some(from), Some(to)) => medium.hop_duration(&from, &to, datagram.len()),
        _ => None,
    };
    let Some(hop) = hop else {
        network.drop_datagram(now, current, &datagram, DropReason::OutOfRange);
        return Ok(());
    };

    network.stats.hops += 1;
    sim.schedule_in(hop, move |sim| forward(sim, next, destination, datagram, ttl - 1));
    Ok(())
}

fn deliver(sim: &mut Simulator<Network>, datagram: Datagram) -> anyhow::Result<()> {
    let now = sim.now();
    let network = sim.world_mut();

    let Some(id) = network.bindings.get(&datagram.destination()).copied() else {
        let at = network
            .node_by_address(*datagram.destination().ip())
            .unwrap_or(NodeId::ZERO);
        network.drop_datagram(now, at, &datagram, DropReason::NoEndpoint);
        return Ok(());
    };

    network.stats.delivered += 1;
    network.stats.delivered_bytes += datagram.len();

    let slot = &mut network.endpoints[id.index()];
    slot.endpoint.enqueue(datagram);

    if let Some(mut callback) = slot.callback.take() {
        let result = callback(&mut slot.endpoint, now);
        slot.callback = Some(callback);
        result?;
    }

    Ok(())
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("nodes", &self.nodes)
            .field("medium", &self.medium)
            .field("routing", &self.routing)
            .field("endpoints", &self.endpoints.len())
            .field("applications", &self.applications.len())
            .field("stats", &self.stats)
            .finish()
    }
}
