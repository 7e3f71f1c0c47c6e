use crate::{config::ExperimentConfig, error::ConfigurationError};
use manet_core::{
    medium::{ConstantSpeedPropagationDelay, FriisPropagationLoss, WirelessMedium},
    network::Network,
    routing,
    scheduler::Simulator,
};

/// Install the wireless ad-hoc interfaces and give every node its address.
pub fn configure(network: &mut Network, config: &ExperimentConfig) -> Result<(), ConfigurationError> {
    let medium = WirelessMedium::builder()
        .set_delay_model(ConstantSpeedPropagationDelay::default())
        .set_loss_model(FriisPropagationLoss::default())
        .set_tx_power(config.tx_power)
        .build();
    log::debug!("wireless medium: {medium:?}");
    network.configure_wireless_medium(medium);

    network.assign_addresses(config.network, config.mask)?;
    Ok(())
}

/// Install the routing protocol on the network. Its tables are refreshed
/// as soon as the simulation runs.
pub fn install_routing(sim: &mut Simulator<Network>, config: &ExperimentConfig) {
    routing::install(sim, config.routing.protocol(), config.routing_priority);
}

#[cfg(test)]
mod tests {
    use super::*;
    use manet_core::{NodeId, address::AddressError};
    use std::net::Ipv4Addr;

    #[test]
    fn addresses_and_medium() {
        let mut network = Network::new();
        network.create_nodes(20);
        configure(&mut network, &ExperimentConfig::default()).unwrap();

        assert!(network.medium().is_some());
        assert_eq!(
            network.address_of(NodeId::new(0)),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(
            network.address_of(NodeId::new(19)),
            Some(Ipv4Addr::new(10, 0, 0, 20))
        );
    }

    #[test]
    fn subnet_too_small() {
        let config = ExperimentConfig {
            mask: Ipv4Addr::new(255, 255, 255, 248),
            ..ExperimentConfig::default()
        };
        let mut network = Network::new();
        network.create_nodes(20);

        assert!(matches!(
            configure(&mut network, &config),
            Err(ConfigurationError::Address(AddressError::Exhausted { .. }))
        ));
    }
}
