use logos::{Lexer, Logos};
use std::{
    fmt,
    ops::{Add, AddAssign},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

/// An instant on the simulated clock, measured from the start of the
/// simulation.
///
/// Simulated time has nanosecond precision and only ever moves forward
/// inside the [`Simulator`]. It is displayed in seconds using the shortest
/// decimal representation, the same way the experiment reports are printed:
///
/// ```
/// # use manet_core::time::SimTime;
/// # use std::time::Duration;
/// assert_eq!(SimTime::from_secs(1).to_string(), "1");
/// assert_eq!(
///     (SimTime::from_secs(100) + Duration::from_millis(250)).to_string(),
///     "100.25"
/// );
/// ```
///
/// [`Simulator`]: crate::scheduler::Simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(Duration);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("failed to parse `{input}': unexpected token")]
    UnexpectedToken { input: String },
    #[error("failed to parse `{input}': expecting a number")]
    ExpectingNumber { input: String },
    #[error("failed to parse `{input}': expecting a unit (ns, us, ms, s, m)")]
    ExpectingUnit { input: String },
    #[error("failed to parse `{input}': number out of range")]
    OutOfRange { input: String },
    #[error("cannot parse an empty duration")]
    Empty,
}

impl SimTime {
    /// The start of the simulation.
    pub const ZERO: Self = Self(Duration::ZERO);

    #[inline]
    pub const fn from_duration(since_start: Duration) -> Self {
        Self(since_start)
    }

    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// the elapsed simulated time since the start of the simulation
    #[inline]
    pub const fn since_start(self) -> Duration {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns the duration elapsed since `earlier`, or [`Duration::ZERO`]
    /// if `earlier` is actually later than `self`.
    #[inline]
    pub fn saturating_since(self, earlier: SimTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration).map(Self)
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl From<Duration> for SimTime {
    fn from(value: Duration) -> Self {
        Self::from_duration(value)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_secs_f64(), f)
    }
}

impl FromStr for SimTime {
    type Err = DurationParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

/// Parse a human readable duration such as `"100s"` or `"1s 250ms"`.
///
/// Every number must be followed by its unit. The parts are summed.
///
/// ```
/// # use manet_core::time::parse_duration;
/// # use std::time::Duration;
/// assert_eq!(parse_duration("1s 250ms").unwrap(), Duration::from_millis(1_250));
/// assert!(parse_duration("42").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let mut lex = Lexer::<'_, Token>::new(s);
    let mut total = Duration::ZERO;
    let mut parsed_any = false;

    while let Some(next) = lex.next() {
        let Ok(Token::Value) = next else {
            return Err(DurationParseError::ExpectingNumber {
                input: s.to_owned(),
            });
        };
        let number: u64 = lex
            .slice()
            .parse()
            .map_err(|_| DurationParseError::OutOfRange {
                input: s.to_owned(),
            })?;

        let unit = match lex.next() {
            Some(Ok(unit)) => unit,
            Some(Err(())) => {
                return Err(DurationParseError::UnexpectedToken {
                    input: s.to_owned(),
                });
            }
            None => {
                return Err(DurationParseError::ExpectingUnit {
                    input: s.to_owned(),
                });
            }
        };
        let duration = match unit {
            Token::NanoSeconds => Duration::from_nanos(number),
            Token::MicroSeconds => Duration::from_micros(number),
            Token::MilliSeconds => Duration::from_millis(number),
            Token::Seconds => Duration::from_secs(number),
            Token::Minutes => Duration::from_secs(number.saturating_mul(60)),
            Token::Value => {
                return Err(DurationParseError::ExpectingUnit {
                    input: s.to_owned(),
                });
            }
        };
        total = total
            .checked_add(duration)
            .ok_or_else(|| DurationParseError::OutOfRange {
                input: s.to_owned(),
            })?;
        parsed_any = true;
    }

    if parsed_any {
        Ok(total)
    } else {
        Err(DurationParseError::Empty)
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum Token {
    #[token("ns")]
    NanoSeconds,
    #[regex("us|µs|μs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,

    #[regex("[0-9]+")]
    Value,
}
