//! Ethernet II addresses.

use std::fmt;
use std::str::FromStr;

use crate::errors::AddressError;

/// Length of a MAC address.
pub const MAC_LEN: usize = 6;

const DST_MAC_OFFSET: usize = 0;
const SRC_MAC_OFFSET: usize = 6;


/// 6 bytes link-layer address.
///
/// Renders as `FF:01:02:03:04:05`: uppercase hex pairs separated by `:`, always 17 characters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MacAddr(pub [u8; MAC_LEN]);

impl MacAddr {
    /// The broadcast address `FF:FF:FF:FF:FF:FF`.
    pub const BROADCAST: MacAddr = MacAddr([0xFF; MAC_LEN]);

    /// Creates an address from a slice of exactly 6 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<MacAddr, AddressError> {
        let bytes: [u8; MAC_LEN] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength { expected: MAC_LEN, actual: slice.len() })?;

        Ok(MacAddr(bytes))
    }

    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddr {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidMac(s.to_owned());

        let mut bytes = [0_u8; MAC_LEN];
        let mut parts = s.split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(MacAddr(bytes))
    }
}

impl From<[u8; MAC_LEN]> for MacAddr {
    fn from(bytes: [u8; MAC_LEN]) -> Self {
        MacAddr(bytes)
    }
}

/// Formats 6 raw bytes as a MAC address string.
pub fn format_mac(bytes: &[u8]) -> Result<String, AddressError> {
    MacAddr::from_slice(bytes).map(|mac| mac.to_string())
}

/// Destination address, the first 6 bytes of the frame.
pub fn dst_mac(frame: &[u8]) -> Result<MacAddr, AddressError> {
    mac_at(frame, DST_MAC_OFFSET)
}

/// Source address, following the destination.
pub fn src_mac(frame: &[u8]) -> Result<MacAddr, AddressError> {
    mac_at(frame, SRC_MAC_OFFSET)
}

fn mac_at(frame: &[u8], offset: usize) -> Result<MacAddr, AddressError> {
    let end = offset + MAC_LEN;
    let slice = frame.get(offset..end).ok_or(AddressError::InvalidLength {
        expected: MAC_LEN,
        actual: frame.len().saturating_sub(offset),
    })?;

    MacAddr::from_slice(slice)
}
