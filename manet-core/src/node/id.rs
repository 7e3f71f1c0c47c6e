use anyhow::anyhow;
use std::{fmt, str};

/// The identifier of a node in the simulated [`Network`]
///
/// Node identifiers are the ordinal index of the node: the first node
/// created is node `0`, the next one node `1` and so on.
///
/// [`Network`]: crate::network::Network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ZERO: Self = NodeId::new(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// the position of the node in the network's node list
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use = "function does not modify the current value"]
    pub(crate) fn next(self) -> Self {
        Self::new(self.0 + 1)
    }
}

impl str::FromStr for NodeId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print() {
        assert_eq!(format!("{}", NodeId(42)), "42")
    }

    #[test]
    fn parse() {
        assert_eq!("42".parse::<NodeId>().unwrap(), NodeId(42));
        assert!("-1".parse::<NodeId>().is_err());
    }

    #[test]
    fn next_is_the_following_index() {
        assert_eq!(NodeId::ZERO.next().index(), 1);
    }
}
