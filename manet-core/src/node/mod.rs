mod id;

pub use self::id::NodeId;
use crate::{
    mobility::{ConstantPosition, MobilityModel},
    position::Position,
    time::SimTime,
};
use std::{fmt, net::Ipv4Addr};

/// A mobile host of the [`Network`].
///
/// `Node` owns its [`MobilityModel`] and the IPv4 address of its single
/// wireless interface. You never construct a `Node` directly: use
/// [`Network::create_nodes`] which registers the nodes and returns their
/// [`NodeId`].
///
/// A freshly created node sits at the origin until a mobility model is set
/// and has no address until [`Network::assign_addresses`] is called.
///
/// [`Network`]: crate::network::Network
/// [`Network::create_nodes`]: crate::network::Network::create_nodes
/// [`Network::assign_addresses`]: crate::network::Network::assign_addresses
pub struct Node {
    id: NodeId,

    mobility: Box<dyn MobilityModel>,

    /// set once, when the addresses are assigned
    address: Option<Ipv4Addr>,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            mobility: Box::new(ConstantPosition(Position::default())),
            address: None,
        }
    }

    /// Returns the unique identifier of this node.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    /// Where the node is at `now`.
    ///
    /// Mobility models are evaluated lazily, `now` must never go backward
    /// between two calls.
    pub fn position_at(&mut self, now: SimTime) -> Position {
        self.mobility.position_at(now)
    }

    pub(crate) fn set_mobility(&mut self, mobility: Box<dyn MobilityModel>) {
        self.mobility = mobility;
    }

    pub(crate) fn set_address(&mut self, address: Ipv4Addr) {
        self.address = Some(address);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
