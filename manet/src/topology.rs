use crate::{config::ExperimentConfig, error::ConfigurationError};
use manet_core::{
    NodeId, mobility::RandomWaypointConfig, network::Network, position::Rectangle,
    random::Uniform,
};

/// The nodes of the experiment and their role.
///
/// The first `n_sinks` nodes are the sinks, the next `n_sinks` the sources.
/// The remaining nodes only relay traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<NodeId>,
    n_sinks: usize,
}

impl NodeSet {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn all(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn sinks(&self) -> &[NodeId] {
        &self.nodes[..self.n_sinks]
    }

    pub fn sources(&self) -> &[NodeId] {
        &self.nodes[self.n_sinks..2 * self.n_sinks]
    }

    pub fn idle(&self) -> &[NodeId] {
        &self.nodes[2 * self.n_sinks..]
    }

    /// `(source, sink)`: source `i + n_sinks` sends to sink `i`
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.sources().iter().copied().zip(self.sinks().iter().copied())
    }
}

/// Check that the node count can host the sinks and the sources.
pub fn validate(config: &ExperimentConfig) -> Result<(), ConfigurationError> {
    if config.n_sinks == 0 {
        return Err(ConfigurationError::NoSink);
    }
    if config.n_nodes < 2 * config.n_sinks {
        return Err(ConfigurationError::TooFewNodes {
            n_nodes: config.n_nodes,
            n_sinks: config.n_sinks,
        });
    }
    Ok(())
}

/// Create the nodes, each at a random position of the area and moving
/// along random waypoints.
pub fn build(network: &mut Network, config: &ExperimentConfig) -> Result<NodeSet, ConfigurationError> {
    validate(config)?;

    let mobility = RandomWaypointConfig {
        area: Rectangle::new(0.0, config.area_width, 0.0, config.area_height)?,
        speed: Uniform::new(config.min_speed, config.max_speed)?,
        pause: config.pause,
    };

    let nodes = network.create_nodes(config.n_nodes);
    mobility.install(network, config.seed);

    Ok(NodeSet {
        nodes,
        n_sinks: config.n_sinks,
    })
}
