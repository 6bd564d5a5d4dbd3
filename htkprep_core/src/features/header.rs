use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::ParmKind;

/// Size of the fixed header preceding the sample data.
pub const HEADER_SIZE: usize = 12;

/// Frames x dimensions, row-major in time order.
pub type FeatureMatrix = Array2<f32>;

/// Byte order of every header field and sample value in a feature file.
///
/// There is no auto-detection: the caller always says which one to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    pub(crate) fn read_u32(self, b: &[u8]) -> u32 {
        let raw = [b[0], b[1], b[2], b[3]];
        match self {
            ByteOrder::Big => u32::from_be_bytes(raw),
            ByteOrder::Little => u32::from_le_bytes(raw),
        }
    }

    pub(crate) fn read_u16(self, b: &[u8]) -> u16 {
        let raw = [b[0], b[1]];
        match self {
            ByteOrder::Big => u16::from_be_bytes(raw),
            ByteOrder::Little => u16::from_le_bytes(raw),
        }
    }

    pub(crate) fn read_f32(self, b: &[u8]) -> f32 {
        f32::from_bits(self.read_u32(b))
    }

    pub(crate) fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }

    pub(crate) fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }

    pub(crate) fn f32_bytes(self, value: f32) -> [u8; 4] {
        self.u32_bytes(value.to_bits())
    }
}

/// The 12-byte header at the start of every feature file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureHeader {
    /// Number of frames.
    pub sample_count: u32,
    /// Frame period in 100ns units.
    pub sample_period_hns: u32,
    /// Bytes per frame (4 x dimension).
    pub sample_size_bytes: u16,
    pub parm_kind: ParmKind,
}

impl FeatureHeader {
    /// Number of `f32` values per frame.
    pub fn dimension(&self) -> usize {
        usize::from(self.sample_size_bytes) / 4
    }

    pub fn sample_period_secs(&self) -> f64 {
        f64::from(self.sample_period_hns) * 1e-7
    }

    /// Bytes of sample data the header declares.
    pub fn payload_len(&self) -> usize {
        self.sample_count as usize * usize::from(self.sample_size_bytes)
    }
}
