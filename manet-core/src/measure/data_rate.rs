use logos::{Lexer, Logos};
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;

/// A data rate, in bits per second.
///
/// Used both for the constant rate of the wireless link layer and for
/// the rate at which a traffic generator emits its packets.
///
/// Units are decimal, as is customary for link rates: `1kbps` is
/// `1_000` bits per second.
///
/// # Example
///
/// ```
/// # use manet_core::measure::DataRate;
/// # use std::time::Duration;
/// let rate: DataRate = "2048bps".parse().unwrap();
///
/// // a 64 bytes packet takes a quarter of a second to emit at 2048bps
/// assert_eq!(rate.transmission_time(64), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataRate(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataRateParseError {
    #[error("expecting to parse a number")]
    ExpectingNumber,
    #[error("expecting to parse a unit (bps, kbps, mbps, gbps)")]
    ExpectingUnit,
    #[error("not expecting any other tokens to parse a data rate")]
    TrailingTokens,
    #[error("data rate out of range")]
    OutOfRange,
}

impl DataRate {
    pub const fn from_bps(bits_per_second: u64) -> Self {
        Self(bits_per_second)
    }

    pub const fn from_kbps(kilobits_per_second: u64) -> Self {
        Self(kilobits_per_second * K)
    }

    pub const fn from_mbps(megabits_per_second: u64) -> Self {
        Self(megabits_per_second * M)
    }

    #[inline]
    pub const fn bits_per_second(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns how long it takes to push `bytes` on the medium at this
    /// rate.
    ///
    /// A zero data rate never finishes transmitting: [`Duration::MAX`].
    pub fn transmission_time(&self, bytes: u64) -> Duration {
        if self.0 == 0 {
            return Duration::MAX;
        }

        let bits = bytes as u128 * 8;
        let nanos = bits * 1_000_000_000 / self.0 as u128;
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }
}

const K: u64 = 1_000;
const M: u64 = 1_000 * 1_000;
const G: u64 = 1_000 * 1_000 * 1_000;

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.0;

        if v < K || v % K != 0 {
            write!(f, "{v}bps")
        } else if v < M || v % M != 0 {
            write!(f, "{k}kbps", k = v / K)
        } else if v < G || v % G != 0 {
            write!(f, "{m}mbps", m = v / M)
        } else {
            write!(f, "{g}gbps", g = v / G)
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum DataRateToken {
    #[regex("bps")]
    Bps,
    #[regex("kbps")]
    Kbps,
    #[regex("mbps|Mbps")]
    Mbps,
    #[regex("gbps|Gbps")]
    Gbps,

    #[regex("[0-9]+")]
    Value,
}

impl FromStr for DataRate {
    type Err = DataRateParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, DataRateToken>::new(s);

        let Some(Ok(DataRateToken::Value)) = lex.next() else {
            return Err(DataRateParseError::ExpectingNumber);
        };
        let number: u64 = lex
            .slice()
            .parse()
            .map_err(|_| DataRateParseError::OutOfRange)?;
        let Some(Ok(token)) = lex.next() else {
            return Err(DataRateParseError::ExpectingUnit);
        };
        let multiplier = match token {
            DataRateToken::Bps => 1,
            DataRateToken::Kbps => K,
            DataRateToken::Mbps => M,
            DataRateToken::Gbps => G,
            DataRateToken::Value => return Err(DataRateParseError::ExpectingUnit),
        };

        if lex.next().is_some() {
            return Err(DataRateParseError::TrailingTokens);
        }

        number
            .checked_mul(multiplier)
            .map(Self)
            .ok_or(DataRateParseError::OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_rate() {
        macro_rules! assert_data_rate {
            ($string:literal == $value:expr) => {
                assert_eq!(
                    $string.parse::<DataRate>().unwrap(),
                    DataRate::from_bps($value)
                );
            };
        }

        assert_data_rate!("0bps" == 0);
        assert_data_rate!("2048bps" == 2_048);
        assert_data_rate!("42kbps" == 42_000);
        assert_data_rate!("11mbps" == 11_000_000);
        assert_data_rate!("11Mbps" == 11_000_000);
        assert_data_rate!("1gbps" == 1_000_000_000);
    }

    #[test]
    fn print_data_rate() {
        assert_eq!(DataRate::from_bps(2_048).to_string(), "2048bps");
        assert_eq!(DataRate::from_bps(512).to_string(), "512bps");
        assert_eq!(DataRate::from_kbps(64).to_string(), "64kbps");
        assert_eq!(DataRate::from_mbps(11).to_string(), "11mbps");
        assert_eq!(DataRate::from_mbps(1_000).to_string(), "1gbps");
    }

    #[test]
    fn parse_invalid_strings() {
        assert_eq!(
            "42".parse::<DataRate>(),
            Err(DataRateParseError::ExpectingUnit)
        );
        assert_eq!(
            "mbps".parse::<DataRate>(),
            Err(DataRateParseError::ExpectingNumber)
        );
        assert_eq!(
            "".parse::<DataRate>(),
            Err(DataRateParseError::ExpectingNumber)
        );
        assert_eq!(
            "42mbps extra".parse::<DataRate>(),
            Err(DataRateParseError::TrailingTokens)
        );
        assert_eq!(
            "99999999999999999999gbps".parse::<DataRate>(),
            Err(DataRateParseError::OutOfRange)
        );
    }

    #[test]
    fn transmission_time() {
        let rate = DataRate::from_bps(2_048);
        assert_eq!(rate.transmission_time(64), Duration::from_millis(250));
        assert_eq!(rate.transmission_time(0), Duration::ZERO);

        let link = DataRate::from_mbps(11);
        assert_eq!(link.transmission_time(1_375), Duration::from_millis(1));
        // truncated to the nanosecond
        assert_eq!(link.transmission_time(1), Duration::from_nanos(727));
    }

    #[test]
    fn zero_rate_never_transmits() {
        assert_eq!(DataRate::from_bps(0).transmission_time(1), Duration::MAX);
    }
}
