//! Throughput of a mobile ad-hoc network.
//!
//! Ten sinks each receive one constant bit rate flow from a dedicated
//! source while every node moves along random waypoints. The cumulative
//! number of packets and bytes delivered is printed every simulated second.
//!
//! ```
//! use manet::{config::ExperimentConfig, experiment::Experiment, output::Console};
//! use manet_core::SimTime;
//!
//! let config = ExperimentConfig {
//!     horizon: SimTime::from_secs(3),
//!     ..ExperimentConfig::default()
//! };
//! let (console, captured) = Console::captured();
//! let report = Experiment::with_config(config, console)?.run()?;
//!
//! assert_eq!(report.ticks.len(), 3);
//! assert_eq!(captured.lines()[0], "Time [1] Packets: 0 Bytes: 0");
//! # Ok::<(), manet::error::ExperimentError>(())
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod output;
pub mod reporter;
pub mod stack;
pub mod topology;
pub mod trace;
pub mod tracker;
pub mod traffic;

pub use self::{
    config::ExperimentConfig,
    error::{ConfigurationError, ExperimentError},
    experiment::{Experiment, RunReport},
};
