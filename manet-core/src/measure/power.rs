use std::{
    fmt,
    ops::{Add, Sub},
};

/// A power level, in decibel-milliwatts.
///
/// ```
/// # use manet_core::measure::Dbm;
/// let tx = Dbm::new(0.75);
/// assert_eq!(tx.to_string(), "0.75dBm");
///
/// // 30dBm is one watt
/// assert!((Dbm::new(30.0).to_milliwatts() - 1_000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Dbm(f64);

impl Dbm {
    #[inline]
    pub const fn new(dbm: f64) -> Self {
        Self(dbm)
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn from_milliwatts(mw: f64) -> Self {
        Self(10.0 * mw.log10())
    }

    pub fn to_milliwatts(self) -> f64 {
        10f64.powf(self.0 / 10.0)
    }
}

/// Apply a gain, in decibels
impl Add<f64> for Dbm {
    type Output = Dbm;

    fn add(self, db: f64) -> Self::Output {
        Self(self.0 + db)
    }
}

/// Apply a loss, in decibels
impl Sub<f64> for Dbm {
    type Output = Dbm;

    fn sub(self, db: f64) -> Self::Output {
        Self(self.0 - db)
    }
}

impl fmt::Display for Dbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)?;
        f.write_str("dBm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliwatts() {
        assert_eq!(Dbm::new(0.0).to_milliwatts(), 1.0);
        assert_eq!(Dbm::from_milliwatts(100.0), Dbm::new(20.0));
    }

    #[test]
    fn loss_and_gain() {
        let tx = Dbm::new(0.75);
        assert_eq!(tx - 10.0, Dbm::new(-9.25));
        assert_eq!(tx + 0.25, Dbm::new(1.0));
        assert!(tx - 90.0 < Dbm::new(-88.0));
    }
}
