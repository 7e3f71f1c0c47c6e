//! The shared wireless channel.
//!
//! The [`WirelessMedium`] decides whether a frame sent from one position
//! reaches another one and, if it does, how long the hop takes. It does not
//! model interference, collisions or the MAC contention: every node in range
//! hears every frame.

use crate::{
    defaults::{
        DEFAULT_FRAME_OVERHEAD, DEFAULT_FREQUENCY, DEFAULT_LINK_DATA_RATE, DEFAULT_PREAMBLE,
        DEFAULT_RX_THRESHOLD, DEFAULT_TX_POWER, SPEED_OF_LIGHT,
    },
    measure::{DataRate, Dbm},
    position::Position,
};
use std::{f64::consts::PI, fmt, time::Duration};

/// How long a signal takes to travel between two positions.
pub trait PropagationDelayModel {
    fn delay(&self, from: &Position, to: &Position) -> Duration;
}

/// How much a signal is attenuated between two positions.
pub trait PropagationLossModel {
    /// the power received at `to` when transmitting at `tx_power` from `from`
    fn rx_power(&self, tx_power: Dbm, from: &Position, to: &Position) -> Dbm;
}

/// The signal travels in a straight line at a constant speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSpeedPropagationDelay {
    /// metres per second
    speed: f64,
}

/// Free space path loss.
///
/// `Pr = Pt + 20 * log10(λ / (4 * π * d))`, where `λ` is the wavelength.
/// The loss is never less than the configured minimum loss, which also
/// applies to co-located nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FriisPropagationLoss {
    wavelength: f64,
    min_loss: f64,
}

/// Wireless ad-hoc MAC/PHY shared by every node of the network.
///
/// ```
/// # use manet_core::{medium::WirelessMedium, position::Position};
/// let medium = WirelessMedium::builder().build();
///
/// let a = Position::new(0.0, 0.0);
/// assert!(medium.in_range(&a, &Position::new(100.0, 0.0)));
/// assert!(!medium.in_range(&a, &Position::new(400.0, 0.0)));
/// ```
pub struct WirelessMedium {
    delay: Box<dyn PropagationDelayModel>,
    loss: Box<dyn PropagationLossModel>,
    tx_power: Dbm,
    rx_threshold: Dbm,
    data_rate: DataRate,
    preamble: Duration,
    frame_overhead: u64,
}

/// Builder for the [`WirelessMedium`].
///
/// Obtained via [`WirelessMedium::builder`].
///
/// ## Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | Delay model | [`ConstantSpeedPropagationDelay`] at the speed of light |
/// | Loss model | [`FriisPropagationLoss`] at 2.412GHz |
/// | Transmit power | [`DEFAULT_TX_POWER`] |
/// | Reception threshold | [`DEFAULT_RX_THRESHOLD`] |
/// | Data rate | [`DEFAULT_LINK_DATA_RATE`] |
pub struct WirelessMediumBuilder {
    delay: Box<dyn PropagationDelayModel>,
    loss: Box<dyn PropagationLossModel>,
    tx_power: Dbm,
    rx_threshold: Dbm,
    data_rate: DataRate,
}

impl ConstantSpeedPropagationDelay {
    pub const fn new(speed: f64) -> Self {
        Self { speed }
    }
}

impl Default for ConstantSpeedPropagationDelay {
    fn default() -> Self {
        Self::new(SPEED_OF_LIGHT)
    }
}

impl PropagationDelayModel for ConstantSpeedPropagationDelay {
    fn delay(&self, from: &Position, to: &Position) -> Duration {
        Duration::try_from_secs_f64(from.distance(to) / self.speed).unwrap_or(Duration::MAX)
    }
}

impl FriisPropagationLoss {
    /// `frequency` in hertz
    pub fn new(frequency: f64) -> Self {
        Self {
            wavelength: SPEED_OF_LIGHT / frequency,
            min_loss: 0.0,
        }
    }

    /// Set the minimum loss, in decibels.
    pub fn with_min_loss(mut self, min_loss: f64) -> Self {
        self.min_loss = min_loss;
        self
    }

    /// attenuation over `distance` metres, in decibels
    pub fn loss(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return self.min_loss;
        }

        let ratio = self.wavelength / (4.0 * PI * distance);
        (-20.0 * ratio.log10()).max(self.min_loss)
    }
}

impl Default for FriisPropagationLoss {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY)
    }
}

impl PropagationLossModel for FriisPropagationLoss {
    fn rx_power(&self, tx_power: Dbm, from: &Position, to: &Position) -> Dbm {
        tx_power - self.loss(from.distance(to))
    }
}

impl WirelessMedium {
    pub fn builder() -> WirelessMediumBuilder {
        WirelessMediumBuilder {
            delay: Box::new(ConstantSpeedPropagationDelay::default()),
            loss: Box::new(FriisPropagationLoss::default()),
            tx_power: DEFAULT_TX_POWER,
            rx_threshold: DEFAULT_RX_THRESHOLD,
            data_rate: DEFAULT_LINK_DATA_RATE,
        }
    }

    pub fn tx_power(&self) -> Dbm {
        self.tx_power
    }

    pub fn data_rate(&self) -> DataRate {
        self.data_rate
    }

    pub fn rx_power(&self, from: &Position, to: &Position) -> Dbm {
        self.loss.rx_power(self.tx_power, from, to)
    }

    /// `true` if a frame sent at `from` is received at `to`
    pub fn in_range(&self, from: &Position, to: &Position) -> bool {
        self.rx_power(from, to) >= self.rx_threshold
    }

    /// Time on air for a `payload` bytes datagram: the preamble, then the
    /// frame (payload and headers) at the link data rate.
    pub fn airtime(&self, payload: u64) -> Duration {
        self.preamble
            .saturating_add(self.data_rate.transmission_time(payload + self.frame_overhead))
    }

    /// Returns how long it takes to carry `payload` bytes from `from` to
    /// `to` in one hop, or `None` if `to` is out of range.
    pub fn hop_duration(&self, from: &Position, to: &Position, payload: u64) -> Option<Duration> {
        if !self.in_range(from, to) {
            return None;
        }

        Some(
            self.airtime(payload)
                .saturating_add(self.delay.delay(from, to)),
        )
    }
}

impl WirelessMediumBuilder {
    pub fn set_delay_model<M>(mut self, model: M) -> Self
    where
        M: PropagationDelayModel + 'static,
    {
        self.delay = Box::new(model);
        self
    }

    pub fn set_loss_model<M>(mut self, model: M) -> Self
    where
        M: PropagationLossModel + 'static,
    {
        self.loss = Box::new(model);
        self
    }

    pub fn set_tx_power(mut self, tx_power: Dbm) -> Self {
        self.tx_power = tx_power;
        self
    }

    /// Frames received below this power are lost.
    pub fn set_rx_threshold(mut self, rx_threshold: Dbm) -> Self {
        self.rx_threshold = rx_threshold;
        self
    }

    /// Constant data rate of the link layer.
    pub fn set_data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;
        self
    }

    pub fn build(self) -> WirelessMedium {
        let Self {
            delay,
            loss,
            tx_power,
            rx_threshold,
            data_rate,
        } = self;

        WirelessMedium {
            delay,
            loss,
            tx_power,
            rx_threshold,
            data_rate,
            preamble: DEFAULT_PREAMBLE,
            frame_overhead: DEFAULT_FRAME_OVERHEAD,
        }
    }
}

impl fmt::Debug for WirelessMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WirelessMedium")
            .field("tx_power", &self.tx_power)
            .field("rx_threshold", &self.rx_threshold)
            .field("data_rate", &self.data_rate)
            .field("preamble", &self.preamble)
            .field("frame_overhead", &self.frame_overhead)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_of_light() {
        let model = ConstantSpeedPropagationDelay::default();
        let delay = model.delay(&Position::new(0.0, 0.0), &Position::new(299_792_458.0, 0.0));
        assert_eq!(delay, Duration::from_secs(1));
    }

    #[test]
    fn friis_loss_grows_with_distance() {
        let model = FriisPropagationLoss::default();

        // doubling the distance costs ~6dB in free space
        let delta = model.loss(200.0) - model.loss(100.0);
        assert!((delta - 6.0206).abs() < 1e-3, "{delta}");

        // ~80dB at 100m on 2.412GHz
        assert!((model.loss(100.0) - 80.09).abs() < 0.01, "{}", model.loss(100.0));
    }

    #[test]
    fn friis_min_loss() {
        let model = FriisPropagationLoss::default().with_min_loss(3.0);
        assert_eq!(model.loss(0.0), 3.0);
        assert_eq!(model.loss(0.001), 3.0);
    }

    #[test]
    fn default_range() {
        let medium = WirelessMedium::builder().build();
        let origin = Position::new(0.0, 0.0);

        assert!(medium.in_range(&origin, &origin));
        assert!(medium.in_range(&origin, &Position::new(250.0, 0.0)));
        assert!(!medium.in_range(&origin, &Position::new(300.0, 0.0)));
    }

    #[test]
    fn more_power_more_range() {
        let medium = WirelessMedium::builder()
            .set_tx_power(Dbm::new(20.0))
            .build();

        let origin = Position::new(0.0, 0.0);
        assert!(medium.in_range(&origin, &Position::new(1_000.0, 0.0)));
    }

    #[test]
    fn hop_duration() {
        let medium = WirelessMedium::builder()
            .set_delay_model(ConstantSpeedPropagationDelay::new(f64::INFINITY))
            .build();
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 0.0);

        // 192µs of preamble, then 128 bytes at 11mbps
        let expected = Duration::from_micros(192) + Duration::from_nanos(93_090);
        assert_eq!(medium.hop_duration(&a, &b, 64), Some(expected));
        assert_eq!(medium.hop_duration(&a, &Position::new(1_000.0, 0.0), 64), None);
    }
}
