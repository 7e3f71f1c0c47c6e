//! On/off traffic generation.
//!
//! An [`OnOffApplication`] alternates between an "on" period, during which
//! it sends fixed size datagrams at a constant [`DataRate`], and an "off"
//! period of silence. With an off time of zero it is always on.

use crate::{
    measure::DataRate,
    network::{self, Network},
    node::NodeId,
    scheduler::Simulator,
    socket::Datagram,
    time::SimTime,
};
use std::{
    net::{Ipv4Addr, SocketAddrV4},
    time::Duration,
};
use thiserror::Error;

/// First local port given to the applications, one per application.
const EPHEMERAL_PORT: u16 = 49153;

/// Smallest gap between two datagrams of one application.
const MINIMUM_PACKET_INTERVAL: Duration = Duration::from_nanos(1);

/// The traffic an [`OnOffApplication`] generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnOffConfig {
    pub destination: SocketAddrV4,
    /// payload size of every datagram, in bytes
    pub packet_size: u64,
    /// rate while on
    pub data_rate: DataRate,
    pub on_time: Duration,
    pub off_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApplicationId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("Node ({node}) Not Found")]
    NodeNotFound { node: NodeId },
    #[error("node {node} has no address to send from")]
    NoAddress { node: NodeId },
    #[error("cannot send empty datagrams")]
    EmptyPacket,
    #[error("cannot send at a null data rate")]
    NullDataRate,
    #[error("the on time must not be null")]
    NullOnTime,
    #[error("invalid activity window: starts at {start}s, stops at {stop}s")]
    InvalidWindow { start: SimTime, stop: SimTime },
    #[error("cannot start an application at {start}s, the simulation is already at {now}s")]
    InThePast { now: SimTime, start: SimTime },
}

/// State of an installed application.
#[derive(Debug, Clone)]
pub struct OnOffApplication {
    id: ApplicationId,
    node: NodeId,
    source: SocketAddrV4,
    config: OnOffConfig,
    stop: SimTime,

    /// Incremented every time the application stops so that the send
    /// events scheduled before are ignored.
    generation: u64,
    running: bool,
    sent: u64,
}

impl OnOffConfig {
    /// Always on traffic toward `destination`.
    pub fn always_on(destination: SocketAddrV4, packet_size: u64, data_rate: DataRate) -> Self {
        Self {
            destination,
            packet_size,
            data_rate,
            on_time: Duration::from_secs(1),
            off_time: Duration::ZERO,
        }
    }

    /// Time between two datagrams while on.
    pub fn packet_interval(&self) -> Duration {
        self.data_rate
            .transmission_time(self.packet_size)
            .max(MINIMUM_PACKET_INTERVAL)
    }
}

impl OnOffApplication {
    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn config(&self) -> &OnOffConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// number of datagrams sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl ApplicationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Network {
    pub fn application(&self, id: ApplicationId) -> Option<&OnOffApplication> {
        self.applications.get(id.index())
    }

    pub fn applications(&self) -> impl Iterator<Item = &OnOffApplication> + '_ {
        self.applications.iter()
    }
}

/// Install an on/off application on `node`, active from `start` until
/// `stop`.
///
/// Both the start and the stop are scheduled immediately. The first
/// datagram is sent one packet interval after `start`, no datagram is sent
/// at or after `stop`.
pub fn install(
    sim: &mut Simulator<Network>,
    node: NodeId,
    config: OnOffConfig,
    start: SimTime,
    stop: SimTime,
) -> Result<ApplicationId, InstallError> {
    if config.packet_size == 0 {
        return Err(InstallError::EmptyPacket);
    }
    if config.data_rate.is_zero() {
        return Err(InstallError::NullDataRate);
    }
    if config.on_time.is_zero() {
        return Err(InstallError::NullOnTime);
    }
    if stop < start {
        return Err(InstallError::InvalidWindow { start, stop });
    }
    if start < sim.now() {
        return Err(InstallError::InThePast {
            now: sim.now(),
            start,
        });
    }

    let network = sim.world_mut();
    if network.node(node).is_none() {
        return Err(InstallError::NodeNotFound { node });
    }
    let address: Ipv4Addr = network
        .address_of(node)
        .ok_or(InstallError::NoAddress { node })?;

    let id = ApplicationId(network.applications.len() as u32);
    let port = EPHEMERAL_PORT.wrapping_add(id.0 as u16);
    network.applications.push(OnOffApplication {
        id,
        node,
        source: SocketAddrV4::new(address, port),
        config,
        stop,
        generation: 0,
        running: false,
        sent: 0,
    });

    // both are in the future or present, checked above
    sim.schedule_in(start.saturating_since(sim.now()), move |sim| {
        start_application(sim, id)
    });
    sim.schedule_in(stop.saturating_since(sim.now()), move |sim| {
        stop_application(sim, id)
    });

    Ok(id)
}

fn application_mut(sim: &mut Simulator<Network>, id: ApplicationId) -> anyhow::Result<&mut OnOffApplication> {
    sim.world_mut()
        .applications
        .get_mut(id.index())
        .ok_or_else(|| anyhow::anyhow!("application {} not installed", id.0))
}

fn start_application(sim: &mut Simulator<Network>, id: ApplicationId) -> anyhow::Result<()> {
    let now = sim.now();
    let app = application_mut(sim, id)?;
    if now >= app.stop {
        return Ok(());
    }

    app.running = true;
    log::debug!(
        "{now}s: application {app_id} started on node {node}, sending to {destination}",
        app_id = id.0,
        node = app.node,
        destination = app.config.destination
    );

    start_on_period(sim, id)
}

fn stop_application(sim: &mut Simulator<Network>, id: ApplicationId) -> anyhow::Result<()> {
    let now = sim.now();
    let app = application_mut(sim, id)?;

    app.generation += 1;
    app.running = false;
    log::debug!(
        "{now}s: application {app_id} stopped on node {node} after {sent} datagrams",
        app_id = id.0,
        node = app.node,
        sent = app.sent
    );
    Ok(())
}

fn start_on_period(sim: &mut Simulator<Network>, id: ApplicationId) -> anyhow::Result<()> {
    let now = sim.now();
    let app = application_mut(sim, id)?;
    let generation = app.generation;
    let period_end = now + app.config.on_time;
    let interval = app.config.packet_interval();

    sim.schedule_in(interval, move |sim| {
        send_packet(sim, id, generation, period_end)
    });
    Ok(())
}

fn send_packet(
    sim: &mut Simulator<Network>,
    id: ApplicationId,
    generation: u64,
    period_end: SimTime,
) -> anyhow::Result<()> {
    let now = sim.now();
    let app = application_mut(sim, id)?;
    if app.generation != generation || !app.running || now >= app.stop {
        return Ok(());
    }

    app.sent += 1;
    let node = app.node;
    let datagram = Datagram::new(
        app.source,
        app.config.destination,
        vec![0; app.config.packet_size as usize],
    );
    let next = now + app.config.packet_interval();
    let off_time = app.config.off_time;

    if next <= period_end {
        sim.schedule_in(next.saturating_since(now), move |sim| {
            send_packet(sim, id, generation, period_end)
        });
    } else {
        let resume = period_end + off_time;
        sim.schedule_in(resume.saturating_since(now), move |sim| {
            resume_on_period(sim, id, generation)
        });
    }

    network::send(sim, node, datagram)
}

fn resume_on_period(sim: &mut Simulator<Network>, id: ApplicationId, generation: u64) -> anyhow::Result<()> {
    let app = application_mut(sim, id)?;
    if app.generation != generation || !app.running {
        return Ok(());
    }
    start_on_period(sim, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        medium::WirelessMedium,
        mobility::ConstantPosition,
        position::Position,
        routing::{self, RoutingKind},
    };
    use std::{cell::RefCell, rc::Rc};

    const SINK: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 9);

    fn pair() -> Simulator<Network> {
        let mut network = Network::new();
        let nodes = network.create_nodes(2);
        network.set_mobility(nodes[1], Box::new(ConstantPosition(Position::new(50.0, 0.0))));
        network.configure_wireless_medium(WirelessMedium::builder().build());
        network
            .assign_addresses(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 0))
            .unwrap();

        let mut sim = Simulator::new(network);
        routing::install(&mut sim, RoutingKind::Olsr.protocol(), 100);
        sim
    }

    fn record(sim: &mut Simulator<Network>) -> Rc<RefCell<Vec<SimTime>>> {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        sim.world_mut()
            .bind_receive_endpoint(*SINK.ip(), SINK.port(), move |endpoint, now| {
                while endpoint.drain_next().is_some() {
                    sink.borrow_mut().push(now);
                }
                Ok(())
            })
            .unwrap();
        received
    }

    fn config() -> OnOffConfig {
        OnOffConfig::always_on(SINK, 64, DataRate::from_bps(2_048))
    }

    #[test]
    fn packet_interval() {
        assert_eq!(config().packet_interval(), Duration::from_millis(250));
    }

    #[test]
    fn always_on() {
        let mut sim = pair();
        let received = record(&mut sim);

        let id = install(
            &mut sim,
            NodeId::new(1),
            config(),
            SimTime::from_secs(10),
            SimTime::from_secs(20),
        )
        .unwrap();
        sim.stop_at(SimTime::from_secs(30));
        sim.run().unwrap();

        // 4 datagrams per second, the one due at 20s is not sent
        let app = sim.world().application(id).unwrap();
        assert_eq!(app.sent(), 39);
        assert!(!app.is_running());

        let received = received.borrow();
        assert_eq!(received.len(), 39);
        assert!(received[0] > SimTime::from_millis(10_250));
        assert!(received[0] < SimTime::from_millis(10_251));
        assert!(received.iter().all(|t| *t < SimTime::from_secs(20)));
    }

    #[test]
    fn on_off() {
        let mut sim = pair();
        let received = record(&mut sim);

        let config = OnOffConfig {
            off_time: Duration::from_secs(1),
            ..config()
        };
        install(
            &mut sim,
            NodeId::new(1),
            config,
            SimTime::from_secs(10),
            SimTime::from_secs(14),
        )
        .unwrap();
        sim.stop_at(SimTime::from_secs(30));
        sim.run().unwrap();

        // on [10, 11], off [11, 12], on [12, 13], off [13, 14]
        let received = received.borrow();
        assert_eq!(received.len(), 8);
        assert!(
            received
                .iter()
                .all(|t| !(SimTime::from_millis(11_001)..SimTime::from_millis(12_250)).contains(t))
        );
    }

    #[test]
    fn invalid_install() {
        let mut sim = pair();
        let node = NodeId::new(1);
        let start = SimTime::from_secs(10);
        let stop = SimTime::from_secs(20);

        let empty = OnOffConfig {
            packet_size: 0,
            ..config()
        };
        assert_eq!(
            install(&mut sim, node, empty, start, stop),
            Err(InstallError::EmptyPacket)
        );

        let silent = OnOffConfig {
            data_rate: DataRate::from_bps(0),
            ..config()
        };
        assert_eq!(
            install(&mut sim, node, silent, start, stop),
            Err(InstallError::NullDataRate)
        );

        assert_eq!(
            install(&mut sim, node, config(), stop, start),
            Err(InstallError::InvalidWindow {
                start: stop,
                stop: start
            })
        );
        assert_eq!(
            install(&mut sim, NodeId::new(5), config(), start, stop),
            Err(InstallError::NodeNotFound {
                node: NodeId::new(5)
            })
        );
        assert_eq!(sim.world().applications().count(), 0);
    }
}
