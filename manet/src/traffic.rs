use crate::{config::ExperimentConfig, error::ConfigurationError, topology::NodeSet};
use manet_core::{
    NodeId, SimTime,
    application::{self, ApplicationId, OnOffConfig},
    network::Network,
    scheduler::Simulator,
};
use std::net::SocketAddrV4;

/// One unidirectional flow, from a source to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    pub source: NodeId,
    pub sink: NodeId,
    pub traffic: OnOffConfig,
    pub start: SimTime,
    pub stop: SimTime,
}

impl Flow {
    pub fn destination(&self) -> SocketAddrV4 {
        self.traffic.destination
    }
}

/// One flow per sink: source `i + n_sinks` sends to the address of sink
/// `i`.
pub fn plan(network: &Network, nodes: &NodeSet, config: &ExperimentConfig) -> Result<Vec<Flow>, ConfigurationError> {
    nodes
        .pairs()
        .map(|(source, sink)| -> Result<Flow, ConfigurationError> {
            let address = network
                .address_of(sink)
                .ok_or(ConfigurationError::Unaddressed { node: sink })?;

            Ok(Flow {
                source,
                sink,
                traffic: OnOffConfig {
                    destination: SocketAddrV4::new(address, config.port),
                    packet_size: config.packet_size,
                    data_rate: config.data_rate,
                    on_time: config.on_time,
                    off_time: config.off_time,
                },
                start: config.flow_start,
                stop: config.flow_stop,
            })
        })
        .collect()
}

/// Install the on/off application of every flow on its source.
pub fn install(sim: &mut Simulator<Network>, flows: &[Flow]) -> Result<Vec<ApplicationId>, ConfigurationError> {
    flows
        .iter()
        .map(|flow| -> Result<ApplicationId, ConfigurationError> {
            let id = application::install(sim, flow.source, flow.traffic, flow.start, flow.stop)?;
            log::debug!(
                "flow from node {source} to node {sink} ({destination}) active from {start}s to {stop}s",
                source = flow.source,
                sink = flow.sink,
                destination = flow.destination(),
                start = flow.start,
                stop = flow.stop,
            );
            Ok(id)
        })
        .collect()
}
