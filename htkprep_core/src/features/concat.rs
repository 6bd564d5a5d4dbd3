use ndarray::{Axis, concatenate};

use super::{FeatureError, FeatureHeader, FeatureMatrix, FeatureResult, ParmKind};

/// Join two feature streams frame by frame: row `i` of the result is
/// `left[i] ++ right[i]`.
///
/// Both streams must agree on frame count and frame period. The result is
/// tagged with `target_kind` rather than either input's kind.
pub fn concatenate_along_feature_axis(
    left_header: &FeatureHeader,
    left: &FeatureMatrix,
    right_header: &FeatureHeader,
    right: &FeatureMatrix,
    target_kind: ParmKind,
) -> FeatureResult<(FeatureHeader, FeatureMatrix)> {
    if left_header.sample_count != right_header.sample_count {
        return Err(FeatureError::Mismatch {
            what: "sample numbers",
            left: left_header.sample_count.into(),
            right: right_header.sample_count.into(),
        });
    }
    if left_header.sample_period_hns != right_header.sample_period_hns {
        return Err(FeatureError::Mismatch {
            what: "sample rates",
            left: left_header.sample_period_hns.into(),
            right: right_header.sample_period_hns.into(),
        });
    }
    if left.nrows() != right.nrows() {
        return Err(FeatureError::Mismatch {
            what: "frame rows",
            left: left.nrows() as u64,
            right: right.nrows() as u64,
        });
    }

    let sample_size_bytes = left_header
        .sample_size_bytes
        .checked_add(right_header.sample_size_bytes)
        .ok_or_else(|| {
            FeatureError::Format(format!(
                "combined sample size {} + {} does not fit in 16 bits",
                left_header.sample_size_bytes, right_header.sample_size_bytes
            ))
        })?;

    let header = FeatureHeader {
        sample_count: left_header.sample_count,
        sample_period_hns: left_header.sample_period_hns,
        sample_size_bytes,
        parm_kind: target_kind,
    };
    let matrix = concatenate(Axis(1), &[left.view(), right.view()])
        .map_err(|e| FeatureError::Format(e.to_string()))?;

    Ok((header, matrix))
}
