//! 16-bit flag vector
//!
//! Bits 0-7 carry named connection state, bits 8-15 are left to callers.
//! On the wire the vector is always exactly 16 `0`/`1` characters, MSB first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{McbError, McbResult};

/// Width of the binary rendering
pub const FLAG_WIDTH: usize = 16;

/// Named bit positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    Connected,
    Authenticated,
    Encrypted,
    Compressed,
    Streaming,
    Bidirectional,
    Persistent,
    Priority,
}

impl Flag {
    pub const ALL: [Flag; 8] = [
        Flag::Connected,
        Flag::Authenticated,
        Flag::Encrypted,
        Flag::Compressed,
        Flag::Streaming,
        Flag::Bidirectional,
        Flag::Persistent,
        Flag::Priority,
    ];

    /// Bit position of this flag
    pub fn position(self) -> u32 {
        match self {
            Flag::Connected => 0,
            Flag::Authenticated => 1,
            Flag::Encrypted => 2,
            Flag::Compressed => 3,
            Flag::Streaming => 4,
            Flag::Bidirectional => 5,
            Flag::Persistent => 6,
            Flag::Priority => 7,
        }
    }

    pub fn mask(self) -> u16 {
        1 << self.position()
    }

    pub fn name(self) -> &'static str {
        match self {
            Flag::Connected => "CONNECTED",
            Flag::Authenticated => "AUTHENTICATED",
            Flag::Encrypted => "ENCRYPTED",
            Flag::Compressed => "COMPRESSED",
            Flag::Streaming => "STREAMING",
            Flag::Bidirectional => "BIDIRECTIONAL",
            Flag::Persistent => "PERSISTENT",
            Flag::Priority => "PRIORITY",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-width 16-bit flag vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagVector(u16);

impl FlagVector {
    pub const EMPTY: FlagVector = FlagVector(0);

    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Return a copy with `flag` set
    pub fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.mask())
    }

    /// Return a copy with `flag` cleared
    pub fn without(self, flag: Flag) -> Self {
        Self(self.0 & !flag.mask())
    }

    /// Test a reserved (caller-defined) bit, 8..=15
    pub fn reserved_bit(self, position: u32) -> bool {
        (8..16).contains(&position) && self.0 & (1 << position) != 0
    }

    /// Names of the named flags that are set, in bit order
    pub fn active(self) -> Vec<Flag> {
        Flag::ALL.into_iter().filter(|f| self.contains(*f)).collect()
    }

    /// Exactly 16 binary characters, most significant bit first
    pub fn to_binary(self) -> String {
        format!("{:016b}", self.0)
    }

    /// Parse the wire form: exactly 16 characters of `0`/`1`
    pub fn from_binary(s: &str) -> McbResult<Self> {
        if s.len() != FLAG_WIDTH {
            return Err(McbError::malformed(format!(
                "flag field must be {} characters, got {}",
                FLAG_WIDTH,
                s.chars().count()
            )));
        }
        if !s.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(McbError::malformed(format!("flag field is not binary: {}", s)));
        }
        // 16 binary digits always fit
        u16::from_str_radix(s, 2)
            .map(Self)
            .map_err(|e| McbError::malformed(format!("flag field: {}", e)))
    }

    /// Lossy display mapping of a coherence level onto the 16-bit range.
    ///
    /// `round(level * 65535)`, clamped. This is not invertible in general and
    /// carries none of the named flag semantics.
    pub fn from_coherence(level: f64) -> Self {
        if level.is_nan() {
            return Self::EMPTY;
        }
        let scaled = (level * f64::from(u16::MAX)).round();
        Self(scaled.clamp(0.0, f64::from(u16::MAX)) as u16)
    }
}

impl From<u16> for FlagVector {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl fmt::Display for FlagVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

/// Parses user-facing text: `0b1011`, `0x00ff`, a bare 16-char binary string,
/// or a decimal number.
impl FromStr for FlagVector {
    type Err = McbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().replace('_', "");
        let (digits, radix) = if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
            (rest, 2)
        } else if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            (rest, 16)
        } else if s.len() == FLAG_WIDTH && s.bytes().all(|b| b == b'0' || b == b'1') {
            (s.as_str(), 2)
        } else {
            (s.as_str(), 10)
        };

        if digits.is_empty() {
            return Err(McbError::malformed(format!("flags value has no digits: {:?}", s)));
        }
        let value = match u64::from_str_radix(digits, radix) {
            Ok(value) => value,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                return Err(McbError::OutOfRangeValue {
                    name: "flags",
                    value: s.clone(),
                });
            }
            Err(_) => return Err(McbError::malformed(format!("flags value is not a number: {:?}", s))),
        };

        u16::try_from(value)
            .map(Self)
            .map_err(|_| McbError::OutOfRangeValue {
                name: "flags",
                value: value.to_string(),
            })
    }
}
