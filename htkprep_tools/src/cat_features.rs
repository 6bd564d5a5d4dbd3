use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use htkprep_core::features::{
    self, ByteOrder, FeatureHeader, FeatureMatrix, ParmKind,
};
use htkprep_core::text::format_exp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatOptions {
    pub byte_order: ByteOrder,
    /// Parm kind name for the combined output, e.g. `USER` or `MFCC_D`.
    pub parm_kind: String,
}

impl Default for CatOptions {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            parm_kind: "USER".to_owned(),
        }
    }
}

/// Header fields as reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSummary {
    pub sample_count: u32,
    pub sample_period_hns: u32,
    pub sample_dim: usize,
    pub parm_kind: String,
}

impl HeaderSummary {
    pub fn from_header(header: &FeatureHeader) -> Self {
        Self {
            sample_count: header.sample_count,
            sample_period_hns: header.sample_period_hns,
            sample_dim: header.dimension(),
            parm_kind: header.parm_kind.to_string(),
        }
    }

    pub fn log(&self, label: &str) {
        info!("{label}:");
        info!("nSamples: {}", self.sample_count);
        info!("sampPeriod: {}", format_exp(f64::from(self.sample_period_hns)));
        info!("sampleDim {}", self.sample_dim);
        info!("parmKind: {}", self.parm_kind);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatSummary {
    pub left: HeaderSummary,
    pub right: HeaderSummary,
    pub output: HeaderSummary,
    pub output_path: PathBuf,
}

/// Load and decode a whole feature file.
pub fn read_feature_file<P: AsRef<Path>>(
    path: P,
    order: ByteOrder,
) -> Result<(FeatureHeader, FeatureMatrix)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to open feature file: {}", path.display()))?;
    features::decode(&bytes, order)
        .with_context(|| format!("failed to decode feature file: {}", path.display()))
}

pub fn write_feature_file<P: AsRef<Path>>(
    path: P,
    header: &FeatureHeader,
    matrix: &FeatureMatrix,
    order: ByteOrder,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = features::encode(header, matrix, order)
        .context("cannot encode output features, re-tag them with a supported parm kind")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write feature file: {}", path.display()))
}

/// Header of a feature file without keeping its samples around.
pub fn describe<P: AsRef<Path>>(path: P, order: ByteOrder) -> Result<HeaderSummary> {
    let (header, _) = read_feature_file(path, order)?;
    Ok(HeaderSummary::from_header(&header))
}

/// Concatenate two feature files frame by frame into `output`.
pub fn concatenate_files(
    left_path: &Path,
    right_path: &Path,
    output_path: &Path,
    options: &CatOptions,
) -> Result<CatSummary> {
    let target_kind = ParmKind::parse(&options.parm_kind.to_uppercase())
        .with_context(|| format!("invalid output parm kind: {}", options.parm_kind))?;

    let (left_header, left) = read_feature_file(left_path, options.byte_order)?;
    let left_summary = HeaderSummary::from_header(&left_header);
    left_summary.log("Left hand input feature");

    let (right_header, right) = read_feature_file(right_path, options.byte_order)?;
    let right_summary = HeaderSummary::from_header(&right_header);
    right_summary.log("Right hand input feature");

    let (header, matrix) = features::concatenate_along_feature_axis(
        &left_header,
        &left,
        &right_header,
        &right,
        target_kind,
    )?;
    let output = HeaderSummary::from_header(&header);
    output.log("Concatenated output feature vector");

    write_feature_file(output_path, &header, &matrix, options.byte_order)?;

    Ok(CatSummary {
        left: left_summary,
        right: right_summary,
        output,
        output_path: output_path.to_path_buf(),
    })
}
