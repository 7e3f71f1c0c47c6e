use manet_core::{
    EngineError, NodeId, address::AddressError, application::InstallError, random::UniformError,
    socket::BindError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("invalid experiment configuration")]
    Configuration(#[from] ConfigurationError),
    #[error("simulation aborted")]
    Engine(#[from] EngineError),
    #[error("cannot write the animation trace")]
    Trace(#[source] std::io::Error),
    #[error("cannot print the report")]
    Output(#[source] std::io::Error),
}

/// The experiment cannot be set up. Nothing was scheduled.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{n_nodes} nodes cannot host {n_sinks} sinks and as many sources")]
    TooFewNodes { n_nodes: usize, n_sinks: usize },
    #[error("an experiment needs at least one sink")]
    NoSink,
    #[error("invalid area or speed range")]
    Range(#[from] UniformError),
    #[error("cannot assign the node addresses")]
    Address(#[from] AddressError),
    #[error("node {node} has no address")]
    Unaddressed { node: NodeId },
    #[error("cannot bind the receive endpoint")]
    Bind(#[from] BindError),
    #[error("cannot install the traffic")]
    Install(#[from] InstallError),
}
