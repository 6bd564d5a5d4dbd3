use ndarray::Array2;

use super::{ByteOrder, FeatureError, FeatureHeader, FeatureMatrix, FeatureResult, HEADER_SIZE, ParmKind};

/// Decode a whole feature file held in memory.
///
/// Layout: `u32` sample count, `u32` sample period, `u16` sample size,
/// `u16` parm kind, then `sample_count * sample_size / 4` `f32` values in
/// row-major order. Bytes past the declared payload are ignored.
pub fn decode(bytes: &[u8], order: ByteOrder) -> FeatureResult<(FeatureHeader, FeatureMatrix)> {
    if bytes.len() < HEADER_SIZE {
        return Err(FeatureError::Truncation {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let header = FeatureHeader {
        sample_count: order.read_u32(&bytes[0..4]),
        sample_period_hns: order.read_u32(&bytes[4..8]),
        sample_size_bytes: order.read_u16(&bytes[8..10]),
        parm_kind: ParmKind(order.read_u16(&bytes[10..12])),
    };
    header.parm_kind.ensure_supported()?;

    if header.sample_size_bytes % 4 != 0 {
        return Err(FeatureError::Format(format!(
            "sample size {} is not a whole number of 4-byte values",
            header.sample_size_bytes
        )));
    }

    let rows = header.sample_count as usize;
    let dim = header.dimension();
    let expected = HEADER_SIZE + header.payload_len();
    if bytes.len() < expected {
        return Err(FeatureError::Truncation {
            expected,
            actual: bytes.len(),
        });
    }

    let values: Vec<f32> = bytes[HEADER_SIZE..expected]
        .chunks_exact(4)
        .map(|chunk| order.read_f32(chunk))
        .collect();
    let matrix = Array2::from_shape_vec((rows, dim), values)
        .map_err(|e| FeatureError::Format(e.to_string()))?;

    Ok((header, matrix))
}

/// Encode a header and matrix.
///
/// The matrix shape is written as-is; keeping it consistent with the header
/// is up to the caller.
pub fn encode(header: &FeatureHeader, matrix: &FeatureMatrix, order: ByteOrder) -> FeatureResult<Vec<u8>> {
    header.parm_kind.ensure_supported()?;

    let mut out = Vec::with_capacity(HEADER_SIZE + matrix.len() * 4);
    out.extend_from_slice(&order.u32_bytes(header.sample_count));
    out.extend_from_slice(&order.u32_bytes(header.sample_period_hns));
    out.extend_from_slice(&order.u16_bytes(header.sample_size_bytes));
    out.extend_from_slice(&order.u16_bytes(header.parm_kind.bits()));

    // iter() walks in logical (row-major) order whatever the memory layout
    for value in matrix.iter() {
        out.extend_from_slice(&order.f32_bytes(*value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn sample() -> (FeatureHeader, FeatureMatrix) {
        let header = FeatureHeader {
            sample_count: 3,
            sample_period_hns: 100_000,
            sample_size_bytes: 8,
            parm_kind: ParmKind::parse("MFCC_E_D").unwrap(),
        };
        let matrix = array![[0.5, -1.25], [3.0, 4.5], [f32::MAX, f32::MIN_POSITIVE]];
        (header, matrix)
    }

    #[test]
    fn round_trips_in_both_orders() {
        let (header, matrix) = sample();
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = encode(&header, &matrix, order).unwrap();
            assert_eq!(bytes.len(), HEADER_SIZE + 24);
            let (h, m) = decode(&bytes, order).unwrap();
            assert_eq!(h, header);
            assert_eq!(m, matrix);
        }
    }

    #[test]
    fn big_endian_header_layout() {
        let (header, matrix) = sample();
        let bytes = encode(&header, &matrix, ByteOrder::Big).unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 3]);
        assert_eq!(&bytes[4..8], &100_000u32.to_be_bytes());
        assert_eq!(&bytes[8..10], &[0, 8]);
        assert_eq!(&bytes[10..12], &header.parm_kind.bits().to_be_bytes());
        assert_eq!(&bytes[12..16], &0.5f32.to_be_bytes());
    }

    #[test]
    fn short_header_is_truncation() {
        assert_eq!(
            decode(&[0u8; 11], ByteOrder::Big),
            Err(FeatureError::Truncation {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn short_payload_is_truncation() {
        let (header, matrix) = sample();
        let mut bytes = encode(&header, &matrix, ByteOrder::Little).unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            decode(&bytes, ByteOrder::Little),
            Err(FeatureError::Truncation { expected: 36, actual: 35 })
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let (header, matrix) = sample();
        let mut bytes = encode(&header, &matrix, ByteOrder::Big).unwrap();
        bytes.extend_from_slice(&[0xAA; 3]);
        let (_, m) = decode(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(m, matrix);
    }

    #[test]
    fn compressed_input_is_rejected() {
        let (mut header, matrix) = sample();
        let mut tampered = encode(&header, &matrix, ByteOrder::Big).unwrap();
        let kind = header.parm_kind.bits() | ParmKind::C;
        tampered[10..12].copy_from_slice(&kind.to_be_bytes());
        assert!(matches!(
            decode(&tampered, ByteOrder::Big),
            Err(FeatureError::Format(_))
        ));

        header.parm_kind = ParmKind(header.parm_kind.bits() | ParmKind::K);
        assert!(matches!(
            encode(&header, &matrix, ByteOrder::Big),
            Err(FeatureError::Format(_))
        ));
    }

    #[test]
    fn ragged_sample_size_is_rejected() {
        let mut bytes = vec![0u8; HEADER_SIZE + 6];
        bytes[3] = 1;
        bytes[9] = 6;
        bytes[11] = 9;
        assert!(matches!(
            decode(&bytes, ByteOrder::Big),
            Err(FeatureError::Format(_))
        ));
    }

    #[test]
    fn empty_matrix_decodes() {
        let header = FeatureHeader {
            sample_count: 0,
            sample_period_hns: 100_000,
            sample_size_bytes: 52,
            parm_kind: ParmKind::USER,
        };
        let bytes = encode(&header, &FeatureMatrix::zeros((0, 13)), ByteOrder::Big).unwrap();
        let (h, m) = decode(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(h, header);
        assert_eq!(m.dim(), (0, 13));
    }
}
