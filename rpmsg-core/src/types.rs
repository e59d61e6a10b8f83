//! Endpoint addressing and link-wide constants.

use std::fmt;

/// Maximum size of a ring slot, header included, in the reference system.
pub const RPMSG_BUF_SIZE: usize = 512;

/// Width of the name and description fields of a name-service message.
pub const RPMSG_NAME_SIZE: usize = 32;

/// Logical endpoint address.
///
/// Addresses are plain 32-bit integers agreed on out of band; the transport
/// keeps no registry. The only address with a fixed meaning is
/// [`Address::NAME_SERVICE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Address(pub u32);

impl Address {
    /// Endpoint of the host's name-service handler.
    pub const NAME_SERVICE: Self = Self(53);

    /// Wildcard address. Carried on the wire, never interpreted here.
    pub const ANY: Self = Self(u32::MAX);

    /// Creates an address from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the reserved name-service address.
    #[must_use]
    pub const fn is_name_service(self) -> bool {
        self.0 == Self::NAME_SERVICE.0
    }
}

impl From<u32> for Address {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            f.write_str("any")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
