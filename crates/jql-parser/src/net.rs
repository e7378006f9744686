use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 prefix in CIDR form. A bare address parses as a /32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Net {
    addr: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Net {
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        if prefix_len > 32 {
            return None;
        }
        Some(Self { addr, prefix_len })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    fn mask(&self) -> u32 {
        if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix_len))
        }
    }

    /// The network address: the prefix's first address.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    /// Whether `ip` falls inside this prefix.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.network())
    }

    /// Whether the two prefixes share any address.
    pub fn overlaps(&self, other: &Ipv4Net) -> bool {
        self.contains(other.network()) || other.contains(self.network())
    }
}

impl FromStr for Ipv4Net {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_part, len_part) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };
        let addr = Ipv4Addr::from_str(addr_part)
            .map_err(|_| format!("invalid IPv4 address: {addr_part}"))?;
        let prefix_len = match len_part {
            Some(len) => len
                .parse::<u8>()
                .ok()
                .filter(|&l| l <= 32)
                .ok_or_else(|| format!("invalid prefix length: /{len}"))?,
            None => 32,
        };
        Ok(Self { addr, prefix_len })
    }
}

impl fmt::Display for Ipv4Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        let net: Ipv4Net = "192.168.1.0/24".parse().unwrap();
        assert_eq!(net.prefix_len(), 24);
        let host: Ipv4Net = "10.0.0.1".parse().unwrap();
        assert_eq!(host.prefix_len(), 32);
    }

    #[test]
    fn parse_failures() {
        assert!("500.500.500.500/32".parse::<Ipv4Net>().is_err());
        assert!("192.168.0.0/99".parse::<Ipv4Net>().is_err());
        assert!("not-an-ip".parse::<Ipv4Net>().is_err());
    }

    #[test]
    fn containment() {
        let net: Ipv4Net = "192.168.1.0/24".parse().unwrap();
        assert!(net.contains("192.168.1.0".parse().unwrap()));
        assert!(net.contains("192.168.1.255".parse().unwrap()));
        assert!(!net.contains("192.168.2.1".parse().unwrap()));
    }

    #[test]
    fn overlap() {
        let wide: Ipv4Net = "10.0.0.0/8".parse().unwrap();
        let narrow: Ipv4Net = "10.1.2.0/24".parse().unwrap();
        let other: Ipv4Net = "172.16.0.0/12".parse().unwrap();
        assert!(wide.overlaps(&narrow));
        assert!(narrow.overlaps(&wide));
        assert!(!wide.overlaps(&other));
    }

    #[test]
    fn zero_prefix_contains_everything() {
        let all: Ipv4Net = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains("255.255.255.255".parse().unwrap()));
    }
}
