use crate::random::{RandomStream, Uniform, UniformError};
use std::fmt;

/// A point on the simulation plane, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// An axis aligned rectangle the nodes move within.
///
/// ```
/// # use manet_core::position::{Position, Rectangle};
/// let area = Rectangle::new(0.0, 500.0, 0.0, 500.0).unwrap();
/// assert!(area.contains(Position::new(250.0, 499.0)));
/// assert!(!area.contains(Position::new(-1.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x: Uniform,
    y: Uniform,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// the point at `fraction` of the segment from `self` to `to`
    pub fn lerp(&self, to: &Position, fraction: f64) -> Position {
        Position {
            x: self.x + (to.x - self.x) * fraction,
            y: self.y + (to.y - self.y) * fraction,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}:{:.3}", self.x, self.y)
    }
}

impl Rectangle {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, UniformError> {
        Ok(Self {
            x: Uniform::new(x_min, x_max)?,
            y: Uniform::new(y_min, y_max)?,
        })
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.x.min()..=self.x.max()).contains(&position.x)
            && (self.y.min()..=self.y.max()).contains(&position.y)
    }

    /// draw a position uniformly within the rectangle
    pub fn sample(&self, rng: &mut RandomStream) -> Position {
        let x = rng.sample(self.x);
        let y = rng.sample(self.y);
        Position { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn lerp() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 20.0);
        assert_eq!(a.lerp(&b, 0.5), Position::new(5.0, 10.0));
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn sample_stays_inside() {
        let area = Rectangle::new(0.0, 500.0, 100.0, 200.0).unwrap();
        let mut rng = RandomStream::new(7, 0);
        for _ in 0..1_000 {
            assert!(area.contains(area.sample(&mut rng)));
        }
    }

    #[test]
    fn display() {
        assert_eq!(Position::new(1.5, 2.0).to_string(), "1.500:2.000");
    }
}
