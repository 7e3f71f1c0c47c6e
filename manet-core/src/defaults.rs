use crate::measure::{DataRate, Dbm};
use std::time::Duration;

/// Speed of light in vacuum, in metres per second.
///
/// Used by the default propagation delay model.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Default carrier frequency, in hertz
///
/// This is channel 1 of the 2.4GHz band.
pub const DEFAULT_FREQUENCY: f64 = 2.412e9;

/// Default transmit power of the wireless interfaces
///
/// ```
/// # use manet_core::defaults::*;
/// assert_eq!(
///     DEFAULT_TX_POWER.to_string(),
///     "0.75dBm"
/// );
/// ```
pub const DEFAULT_TX_POWER: Dbm = Dbm::new(0.75);

/// Default reception threshold
///
/// Frames received with less power than this are lost. With the default
/// transmit power and free space propagation this gives a range of about
/// 270 metres.
pub const DEFAULT_RX_THRESHOLD: Dbm = Dbm::new(-88.0);

/// Default data rate of the wireless link layer
///
/// ```
/// # use manet_core::defaults::*;
/// assert_eq!(
///     DEFAULT_LINK_DATA_RATE.to_string(),
///     "11mbps"
/// );
/// ```
pub const DEFAULT_LINK_DATA_RATE: DataRate = DataRate::from_mbps(11);

/// Default physical layer preamble and header duration
///
/// The long DSSS preamble and PLCP header, always sent at 1mbps.
pub const DEFAULT_PREAMBLE: Duration = Duration::from_micros(192);

/// Default per datagram overhead on the medium, in bytes
///
/// UDP (8), IPv4 (20), LLC/SNAP (8), the MAC header (24) and its frame
/// check sequence (4).
pub const DEFAULT_FRAME_OVERHEAD: u64 = 64;

/// Default number of hops a datagram may take before being dropped
pub const DEFAULT_TTL: u8 = 64;

/// Default refresh interval of the proactive routing tables
///
/// ```
/// # use manet_core::defaults::*;
/// # use std::time::Duration;
/// assert_eq!(DEFAULT_ROUTING_REFRESH, Duration::from_secs(2));
/// ```
pub const DEFAULT_ROUTING_REFRESH: Duration = Duration::from_secs(2);
