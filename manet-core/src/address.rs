use std::{
    fmt,
    net::{Ipv4Addr, SocketAddrV4},
};
use thiserror::Error;

/// Hands out the host addresses of an IPv4 subnet, in order.
///
/// The network address and the broadcast address are never given out.
///
/// ```
/// # use manet_core::address::Ipv4AddressAllocator;
/// # use std::net::Ipv4Addr;
/// let mut allocator = Ipv4AddressAllocator::new(
///     Ipv4Addr::new(10, 0, 0, 0),
///     Ipv4Addr::new(255, 255, 255, 0),
/// ).unwrap();
///
/// assert_eq!(allocator.allocate().unwrap(), Ipv4Addr::new(10, 0, 0, 1));
/// assert_eq!(allocator.allocate().unwrap(), Ipv4Addr::new(10, 0, 0, 2));
/// ```
#[derive(Debug, Clone)]
pub struct Ipv4AddressAllocator {
    network: u32,
    mask: u32,
    /// next host part to give out
    next: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid network mask {mask}: the mask bits must be contiguous")]
    InvalidMask { mask: Ipv4Addr },
    #[error("{base} is not the network address of a {mask} subnet")]
    NotANetworkAddress { base: Ipv4Addr, mask: Ipv4Addr },
    #[error("no more addresses available in {network}/{mask}")]
    Exhausted { network: Ipv4Addr, mask: Ipv4Addr },
}

/// The address a datagram was sent from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Inet(SocketAddrV4),
    /// an address of a family we do not know how to classify
    Opaque(Vec<u8>),
}

/// The [`Address`] is not an IPv4 socket address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("address {address} is not an IPv4 socket address")]
pub struct AddressDecodeError {
    address: String,
}

impl Ipv4AddressAllocator {
    pub fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self, AddressError> {
        let network = u32::from(base);
        let mask_bits = u32::from(mask);

        // a valid mask is a run of ones followed by a run of zeroes
        if mask_bits.leading_ones() + mask_bits.trailing_zeros() != 32 {
            return Err(AddressError::InvalidMask { mask });
        }
        if network & !mask_bits != 0 {
            return Err(AddressError::NotANetworkAddress { base, mask });
        }

        Ok(Self {
            network,
            mask: mask_bits,
            next: 1,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask)
    }

    /// number of host addresses still available
    pub fn remaining(&self) -> u64 {
        let broadcast = u64::from(!self.mask);
        broadcast.saturating_sub(u64::from(self.next))
    }

    pub fn allocate(&mut self) -> Result<Ipv4Addr, AddressError> {
        if self.remaining() == 0 {
            return Err(AddressError::Exhausted {
                network: self.network(),
                mask: self.mask(),
            });
        }

        let address = Ipv4Addr::from(self.network | self.next);
        self.next += 1;
        Ok(address)
    }
}

impl Address {
    /// Classify the address as an IPv4 socket address.
    pub fn as_inet(&self) -> Result<SocketAddrV4, AddressDecodeError> {
        match self {
            Self::Inet(address) => Ok(*address),
            Self::Opaque(_) => Err(AddressDecodeError {
                address: self.to_string(),
            }),
        }
    }
}

impl From<SocketAddrV4> for Address {
    fn from(value: SocketAddrV4) -> Self {
        Self::Inet(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inet(address) => fmt::Display::fmt(address, f),
            Self::Opaque(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASK_24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

    #[test]
    fn sequential() {
        let mut allocator = Ipv4AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 0), MASK_24).unwrap();

        for host in 1..=20 {
            assert_eq!(allocator.allocate().unwrap(), Ipv4Addr::new(10, 0, 0, host));
        }
        assert_eq!(allocator.remaining(), 234);
    }

    #[test]
    fn exhausted() {
        let mask = Ipv4Addr::new(255, 255, 255, 252);
        let mut allocator = Ipv4AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 4), mask).unwrap();

        assert_eq!(allocator.allocate().unwrap(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(allocator.allocate().unwrap(), Ipv4Addr::new(10, 0, 0, 6));
        assert_eq!(
            allocator.allocate(),
            Err(AddressError::Exhausted {
                network: Ipv4Addr::new(10, 0, 0, 4),
                mask
            })
        );
    }

    #[test]
    fn invalid_subnet() {
        assert!(matches!(
            Ipv4AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 0, 255, 0)),
            Err(AddressError::InvalidMask { .. })
        ));
        assert!(matches!(
            Ipv4AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 1), MASK_24),
            Err(AddressError::NotANetworkAddress { .. })
        ));
    }

    #[test]
    fn classify() {
        let inet = Address::from(SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 11), 49153));
        assert_eq!(inet.as_inet().unwrap().ip(), &Ipv4Addr::new(10, 0, 0, 11));

        let opaque = Address::Opaque(vec![0xde, 0xad]);
        let error = opaque.as_inet().unwrap_err();
        assert_eq!(
            error.to_string(),
            "address 0xdead is not an IPv4 socket address"
        );
    }
}
