//! Proactive ad-hoc routing.
//!
//! Routing protocols are installed on the [`Network`] with a priority, the
//! way an IPv4 list routing works: when forwarding, the protocols are asked
//! for a route in decreasing priority order and the first one that knows the
//! destination wins.
//!
//! Proactive protocols keep their tables up to date on their own: once
//! [installed](install) they are refreshed from the current connectivity of
//! the network at a fixed interval, starting immediately.

use crate::{
    defaults::DEFAULT_ROUTING_REFRESH, network::Network, node::NodeId, scheduler::Simulator,
};
use std::{collections::VecDeque, fmt, str::FromStr, time::Duration};
use thiserror::Error;

/// The routing protocols that can be installed on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingKind {
    /// Optimized Link State Routing: proactive shortest path routing.
    Olsr,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown routing protocol `{0}'")]
pub struct UnknownRoutingKind(String);

pub trait RoutingProtocol {
    fn kind(&self) -> RoutingKind;

    /// How often the protocol wants to see the connectivity of the network.
    fn refresh_interval(&self) -> Duration;

    /// Recompute the routing table from the links currently up.
    fn update(&mut self, connectivity: &Connectivity);

    /// The neighbour of `from` to forward to in order to reach `to`.
    fn next_hop(&self, from: NodeId, to: NodeId) -> Option<NodeId>;
}

/// The links currently up, as an adjacency list indexed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connectivity {
    neighbours: Vec<Vec<NodeId>>,
}

/// Shortest-hop routing tables computed from the whole connectivity graph.
///
/// Ties between equally short paths are broken toward the neighbour with
/// the lowest [`NodeId`], so the tables are deterministic.
#[derive(Debug, Clone)]
pub struct ProactiveRouting {
    kind: RoutingKind,
    refresh_interval: Duration,
    /// `next_hops[from][to]`
    next_hops: Vec<Vec<Option<NodeId>>>,
}

/// The routing protocols installed on the network, by decreasing priority.
#[derive(Default)]
pub struct RoutingList {
    entries: Vec<RoutingEntry>,
    next_handle: u32,
}

/// Identifies an installed protocol in the [`RoutingList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutingHandle(u32);

struct RoutingEntry {
    handle: RoutingHandle,
    priority: i16,
    protocol: Box<dyn RoutingProtocol>,
}

impl RoutingKind {
    /// Create a new instance of the protocol, with an empty table.
    pub fn protocol(self) -> Box<dyn RoutingProtocol> {
        match self {
            Self::Olsr => Box::new(ProactiveRouting::new(self, DEFAULT_ROUTING_REFRESH)),
        }
    }
}

impl fmt::Display for RoutingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Olsr => f.write_str("olsr"),
        }
    }
}

impl FromStr for RoutingKind {
    type Err = UnknownRoutingKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("olsr") {
            Ok(Self::Olsr)
        } else {
            Err(UnknownRoutingKind(s.to_owned()))
        }
    }
}

impl Connectivity {
    /// `nodes` nodes and no links
    pub fn new(nodes: usize) -> Self {
        Self {
            neighbours: vec![Vec::new(); nodes],
        }
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// Add a symmetric link between `a` and `b`.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) {
        if a == b || a.index() >= self.len() || b.index() >= self.len() {
            return;
        }

        for (from, to) in [(a, b), (b, a)] {
            let neighbours = &mut self.neighbours[from.index()];
            if let Err(position) = neighbours.binary_search(&to) {
                neighbours.insert(position, to);
            }
        }
    }

    /// the neighbours of `node`, sorted by [`NodeId`]
    pub fn neighbours(&self, node: NodeId) -> &[NodeId] {
        self.neighbours
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn links(&self) -> usize {
        self.neighbours.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl ProactiveRouting {
    pub fn new(kind: RoutingKind, refresh_interval: Duration) -> Self {
        Self {
            kind,
            refresh_interval,
            next_hops: Vec::new(),
        }
    }

    /// Breadth first search from `source`, remembering through which
    /// neighbour of `source` every node was first reached.
    fn first_hops(connectivity: &Connectivity, source: NodeId) -> Vec<Option<NodeId>> {
        let mut first_hops = vec![None; connectivity.len()];
        let mut visited = vec![false; connectivity.len()];
        let mut queue = VecDeque::new();

        visited[source.index()] = true;
        for &neighbour in connectivity.neighbours(source) {
            visited[neighbour.index()] = true;
            first_hops[neighbour.index()] = Some(neighbour);
            queue.push_back(neighbour);
        }

        while let Some(node) = queue.pop_front() {
            let via = first_hops[node.index()];
            for &neighbour in connectivity.neighbours(node) {
                if !visited[neighbour.index()] {
                    visited[neighbour.index()] = true;
                    first_hops[neighbour.index()] = via;
                    queue.push_back(neighbour);
                }
            }
        }

        first_hops
    }

    /// number of destinations `from` currently has a route to
    pub fn routes(&self, from: NodeId) -> usize {
        self.next_hops
            .get(from.index())
            .map(|table| table.iter().flatten().count())
            .unwrap_or_default()
    }
}

impl RoutingProtocol for ProactiveRouting {
    fn kind(&self) -> RoutingKind {
        self.kind
    }

    fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    fn update(&mut self, connectivity: &Connectivity) {
        self.next_hops = (0..connectivity.len())
            .map(|index| Self::first_hops(connectivity, NodeId::new(index as u32)))
            .collect();
    }

    fn next_hop(&self, from: NodeId, to: NodeId) -> Option<NodeId> {
        self.next_hops.get(from.index())?.get(to.index()).copied().flatten()
    }
}

impl RoutingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a protocol. Protocols of equal priority are consulted in the
    /// order they were added.
    pub fn add(&mut self, priority: i16, protocol: Box<dyn RoutingProtocol>) -> RoutingHandle {
        let handle = RoutingHandle(self.next_handle);
        self.next_handle += 1;

        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            RoutingEntry {
                handle,
                priority,
                protocol,
            },
        );

        handle
    }

    pub fn get_mut(&mut self, handle: RoutingHandle) -> Option<&mut dyn RoutingProtocol> {
        self.entries
            .iter_mut()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.protocol.as_mut() as &mut dyn RoutingProtocol)
    }

    /// the installed protocols with their priority, highest priority first
    pub fn protocols(&self) -> impl Iterator<Item = (i16, RoutingKind)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.priority, entry.protocol.kind()))
    }

    /// Ask every protocol, highest priority first.
    pub fn next_hop(&self, from: NodeId, to: NodeId) -> Option<NodeId> {
        self.entries
            .iter()
            .find_map(|entry| entry.protocol.next_hop(from, to))
    }
}

impl fmt::Debug for RoutingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.protocols()).finish()
    }
}

/// Install `protocol` on the network and start refreshing its tables.
///
/// The first refresh happens at the current simulated time.
pub fn install(
    sim: &mut Simulator<Network>,
    protocol: Box<dyn RoutingProtocol>,
    priority: i16,
) -> RoutingHandle {
    let kind = protocol.kind();
    let handle = sim.world_mut().routing_mut().add(priority, protocol);
    log::debug!("installed {kind} routing with priority {priority}");

    sim.schedule_now(move |sim| refresh(sim, handle));
    handle
}

fn refresh(sim: &mut Simulator<Network>, handle: RoutingHandle) -> anyhow::Result<()> {
    let now = sim.now();
    let network = sim.world_mut();
    let connectivity = network.connectivity(now);

    let Some(protocol) = network.routing_mut().get_mut(handle) else {
        return Ok(());
    };
    protocol.update(&connectivity);
    let interval = protocol.refresh_interval();

    log::trace!(
        "{kind} tables refreshed at {now}s: {links} links",
        kind = protocol.kind(),
        links = connectivity.links()
    );

    sim.schedule_in(interval, move |sim| refresh(sim, handle));
    Ok(())
}
