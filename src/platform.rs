//! Platform and magic identities as they appear in a FastFile header.

use serde::Serialize;
use std::fmt;

/// Header magic for the signed variant (`TAff0100`).
pub const MAGIC_SIGNED:   u64 = 0x5441_6666_3031_3030;
/// Header magic for the unsigned variant (`TAffu100`).
pub const MAGIC_UNSIGNED: u64 = 0x5441_6666_7531_3030;

/// Target platform, stored in the header as its 32-bit version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Platform {
    Pc,
    #[value(name = "wiiu")]
    WiiU,
}

impl Platform {
    /// The version number written at offset 0x08 of the container.
    #[inline]
    pub fn version(self) -> u32 {
        match self {
            Platform::Pc   => 0x93,
            Platform::WiiU => 0x94,
        }
    }

    pub fn from_version(version: u32) -> Option<Self> {
        match version {
            0x93 => Some(Platform::Pc),
            0x94 => Some(Platform::WiiU),
            _    => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Pc   => "pc",
            Platform::WiiU => "wiiu",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.version())
    }
}

/// Which of the two recognised header magics was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Magic {
    Signed,
    Unsigned,
}

impl Magic {
    pub fn from_u64(raw: u64) -> Option<Self> {
        match raw {
            MAGIC_SIGNED   => Some(Magic::Signed),
            MAGIC_UNSIGNED => Some(Magic::Unsigned),
            _              => None,
        }
    }

    #[inline]
    pub fn value(self) -> u64 {
        match self {
            Magic::Signed   => MAGIC_SIGNED,
            Magic::Unsigned => MAGIC_UNSIGNED,
        }
    }
}
