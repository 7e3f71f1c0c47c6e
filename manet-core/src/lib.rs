//! Deterministic primitives to simulate a mobile ad-hoc network.
//!
//! Everything runs on a single thread, driven by the discrete-event
//! [`Simulator`]: its world is the [`Network`] of mobile nodes sharing a
//! [`WirelessMedium`]. Nodes move following a [`MobilityModel`], route
//! datagrams with a proactive [`RoutingProtocol`] and exchange them through
//! on/off [applications](application) and receive endpoints.
//!
//! ```
//! use manet_core::{
//!     application::{self, OnOffConfig},
//!     measure::DataRate,
//!     medium::WirelessMedium,
//!     mobility::ConstantPosition,
//!     network::Network,
//!     position::Position,
//!     routing::{self, RoutingKind},
//!     scheduler::Simulator,
//!     time::SimTime,
//! };
//! use std::{cell::Cell, net::{Ipv4Addr, SocketAddrV4}, rc::Rc};
//!
//! let mut network = Network::new();
//! let nodes = network.create_nodes(2);
//! network.set_mobility(nodes[1], Box::new(ConstantPosition(Position::new(100.0, 0.0))));
//! network.configure_wireless_medium(WirelessMedium::builder().build());
//! network
//!     .assign_addresses(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 0))
//!     .unwrap();
//!
//! let received = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&received);
//! network
//!     .bind_receive_endpoint(Ipv4Addr::new(10, 0, 0, 1), 9, move |endpoint, _now| {
//!         while endpoint.drain_next().is_some() {
//!             counter.set(counter.get() + 1);
//!         }
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let mut sim = Simulator::new(network);
//! routing::install(&mut sim, RoutingKind::Olsr.protocol(), 100);
//!
//! let sink = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 9);
//! let config = OnOffConfig::always_on(sink, 64, DataRate::from_bps(2_048));
//! application::install(&mut sim, nodes[1], config, SimTime::from_secs(1), SimTime::from_secs(2))
//!     .unwrap();
//!
//! sim.stop_at(SimTime::from_secs(5));
//! sim.run().unwrap();
//!
//! // one datagram every 250ms, none at the stop time
//! assert_eq!(received.get(), 3);
//! ```
//!
//! [`Simulator`]: scheduler::Simulator
//! [`Network`]: network::Network
//! [`WirelessMedium`]: medium::WirelessMedium
//! [`MobilityModel`]: mobility::MobilityModel
//! [`RoutingProtocol`]: routing::RoutingProtocol

pub mod address;
pub mod application;
pub mod defaults;
pub mod measure;
pub mod medium;
pub mod mobility;
pub mod network;
pub mod node;
pub mod position;
pub mod random;
pub mod routing;
pub mod scheduler;
pub mod socket;
pub mod stats;
pub mod time;

pub use self::{
    node::NodeId,
    scheduler::{EngineError, Simulator},
    time::SimTime,
};
