use manet_core::{
    defaults::DEFAULT_TX_POWER, measure::DataRate, measure::Dbm, routing::RoutingKind,
    time::SimTime,
};
use std::{net::Ipv4Addr, time::Duration};

/// Number of sink nodes, hence of flows.
pub const DEFAULT_SINKS: usize = 10;

/// Default number of nodes
///
/// ```
/// # use manet::config::*;
/// // one sink and one source per flow
/// assert_eq!(DEFAULT_NODES, 2 * DEFAULT_SINKS);
/// ```
pub const DEFAULT_NODES: usize = 20;

/// Port the sinks listen on: the discard service.
pub const DEFAULT_PORT: u16 = 9;

/// Default seed of the mobility streams.
pub const DEFAULT_SEED: u64 = 1;

/// Size of the node icons in the animation trace.
pub const DEFAULT_NODE_SIZE: f64 = 15.0;

/// Every parameter of the experiment.
///
/// The [`Default`] value is the reference experiment: 20 nodes moving in a
/// 500m by 500m square, 10 flows of 2048bps from 100s to 200s.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub n_nodes: usize,
    pub n_sinks: usize,
    pub seed: u64,

    /// width and height of the area the nodes move within, in metres
    pub area_width: f64,
    pub area_height: f64,
    /// metres per second
    pub min_speed: f64,
    pub max_speed: f64,
    pub pause: Duration,

    pub tx_power: Dbm,
    pub routing: RoutingKind,
    pub routing_priority: i16,
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,

    pub port: u16,
    pub packet_size: u64,
    pub data_rate: DataRate,
    pub on_time: Duration,
    pub off_time: Duration,
    pub flow_start: SimTime,
    pub flow_stop: SimTime,

    pub horizon: SimTime,
    pub report_interval: Duration,
    /// print the position of every node at this instant
    pub position_report: Option<SimTime>,
    pub node_size: f64,
}

impl ExperimentConfig {
    /// The reference experiment with `n_nodes` nodes.
    pub fn with_nodes(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            ..Self::default()
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_nodes: DEFAULT_NODES,
            n_sinks: DEFAULT_SINKS,
            seed: DEFAULT_SEED,
            area_width: 500.0,
            area_height: 500.0,
            min_speed: 0.0,
            max_speed: 20.0,
            pause: Duration::ZERO,
            tx_power: DEFAULT_TX_POWER,
            routing: RoutingKind::Olsr,
            routing_priority: 100,
            network: Ipv4Addr::new(10, 0, 0, 0),
            mask: Ipv4Addr::new(255, 255, 255, 0),
            port: DEFAULT_PORT,
            packet_size: 64,
            data_rate: DataRate::from_bps(2_048),
            on_time: Duration::from_secs(1),
            off_time: Duration::ZERO,
            flow_start: SimTime::from_secs(100),
            flow_stop: SimTime::from_secs(200),
            horizon: SimTime::from_secs(200),
            report_interval: Duration::from_secs(1),
            position_report: None,
            node_size: DEFAULT_NODE_SIZE,
        }
    }
}
