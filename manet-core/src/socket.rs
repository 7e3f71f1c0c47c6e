use crate::{address::Address, node::NodeId, time::SimTime};
use std::{
    collections::VecDeque,
    fmt,
    net::{Ipv4Addr, SocketAddrV4},
};
use thiserror::Error;

/// Called every time a datagram is queued on a [`ReceiveEndpoint`].
///
/// The callback is expected to [drain](ReceiveEndpoint::drain_next) the
/// endpoint. Returning an error aborts the simulation.
pub type ReceiveCallback = Box<dyn FnMut(&mut ReceiveEndpoint, SimTime) -> anyhow::Result<()>>;

/// A UDP-like datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    source: Address,
    destination: SocketAddrV4,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId(u32);

/// A socket bound to a local address and port, receiving datagrams.
pub struct ReceiveEndpoint {
    id: EndpointId,
    node: NodeId,
    local: SocketAddrV4,
    queue: VecDeque<Datagram>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{address} is not assigned to any node")]
    AddressNotAssigned { address: Ipv4Addr },
    #[error("{local} is already bound")]
    AlreadyBound { local: SocketAddrV4 },
}

impl Datagram {
    pub fn new(source: impl Into<Address>, destination: SocketAddrV4, payload: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            destination,
            payload,
        }
    }

    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn destination(&self) -> SocketAddrV4 {
        self.destination
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// payload size, in bytes
    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl EndpointId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl ReceiveEndpoint {
    pub(crate) fn new(id: EndpointId, node: NodeId, local: SocketAddrV4) -> Self {
        Self {
            id,
            node,
            local,
            queue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// the node the endpoint is bound on
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn local_address(&self) -> SocketAddrV4 {
        self.local
    }

    /// number of datagrams waiting to be drained
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the oldest queued datagram, if any.
    pub fn drain_next(&mut self) -> Option<Datagram> {
        self.queue.pop_front()
    }

    pub(crate) fn enqueue(&mut self, datagram: Datagram) {
        self.queue.push_back(datagram);
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for ReceiveEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiveEndpoint")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("local", &self.local)
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_in_order() {
        let local = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 9);
        let source = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 11), 49153);
        let mut endpoint = ReceiveEndpoint::new(EndpointId::new(0), NodeId::ZERO, local);

        endpoint.enqueue(Datagram::new(source, local, vec![0; 64]));
        endpoint.enqueue(Datagram::new(source, local, vec![1; 32]));
        assert_eq!(endpoint.pending(), 2);

        assert_eq!(endpoint.drain_next().map(|d| d.len()), Some(64));
        assert_eq!(endpoint.drain_next().map(|d| d.len()), Some(32));
        assert_eq!(endpoint.drain_next(), None);
    }
}
