use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FeatureError, FeatureResult};

/// Base types, indexed by the low six bits of the tag.
pub const BASE_TYPES: [&str; 12] = [
    "WAVEFORM",
    "LPC",
    "LPREFC",
    "LPCEPSTRA",
    "LPDELCEP",
    "IREFC",
    "MFCC",
    "FBANK",
    "MELSPEC",
    "USER",
    "DISCRETE",
    "PLP",
];

/// Qualifier suffixes and their bit masks, in formatting order.
pub const QUALIFIERS: [(&str, u16); 8] = [
    ("_E", ParmKind::E),
    ("_N", ParmKind::N),
    ("_D", ParmKind::D),
    ("_A", ParmKind::A),
    ("_C", ParmKind::C),
    ("_Z", ParmKind::Z),
    ("_K", ParmKind::K),
    ("_0", ParmKind::ZEROTH),
];

const BASE_MASK: u16 = 0o77;

/// Bit-encoded feature kind: base type index plus qualifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParmKind(pub u16);

impl ParmKind {
    /// Has energy.
    pub const E: u16 = 0o000100;
    /// Absolute energy suppressed.
    pub const N: u16 = 0o000200;
    /// Has delta coefficients.
    pub const D: u16 = 0o000400;
    /// Has acceleration coefficients.
    pub const A: u16 = 0o001000;
    /// Compressed.
    pub const C: u16 = 0o002000;
    /// Zero mean.
    pub const Z: u16 = 0o004000;
    /// Has CRC checksum.
    pub const K: u16 = 0o010000;
    /// Has 0th cepstral coefficient.
    pub const ZEROTH: u16 = 0o020000;

    pub const USER: ParmKind = ParmKind(9);

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Index into [`BASE_TYPES`]; may be out of range for garbage input.
    pub fn base_index(self) -> usize {
        usize::from(self.0 & BASE_MASK)
    }

    pub fn has(self, qualifier: u16) -> bool {
        self.0 & qualifier != 0
    }

    /// Fails for `_C` and `_K`, which need a decompression path this codec
    /// does not have.
    pub fn ensure_supported(self) -> FeatureResult<()> {
        if self.has(Self::C) || self.has(Self::K) {
            return Err(FeatureError::Format(format!(
                "parm kind 0o{:o} carries _C or _K, which are not supported (convert with HCopy or re-tag the output)",
                self.0
            )));
        }
        Ok(())
    }

    /// Parses `BASETYPE[_QUALIFIER]*`, e.g. `MFCC_D_Z`.
    pub fn parse(name: &str) -> FeatureResult<Self> {
        let mut tokens = name.split('_');
        let base = tokens.next().unwrap_or_default();
        let index = BASE_TYPES
            .iter()
            .position(|t| *t == base)
            .ok_or_else(|| FeatureError::UnknownType(base.to_owned()))?;

        let mut bits = index as u16;
        for token in tokens {
            let suffix = format!("_{token}");
            let (_, mask) = QUALIFIERS
                .iter()
                .find(|(q, _)| *q == suffix)
                .ok_or(FeatureError::UnknownType(suffix))?;
            bits |= mask;
        }
        Ok(ParmKind(bits))
    }

    /// Formats the tag back to its textual name; qualifiers follow
    /// [`QUALIFIERS`] order.
    pub fn name(self) -> FeatureResult<String> {
        let base = BASE_TYPES.get(self.base_index()).ok_or_else(|| {
            FeatureError::Format(format!("base type index {} out of range", self.base_index()))
        })?;
        let mut name = (*base).to_owned();
        for (suffix, mask) in QUALIFIERS {
            if self.has(mask) {
                name.push_str(suffix);
            }
        }
        Ok(name)
    }
}

impl FromStr for ParmKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParmKind::parse(s)
    }
}

impl fmt::Display for ParmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => f.write_str(&name),
            Err(_) => write!(f, "<0o{:o}>", self.0),
        }
    }
}
