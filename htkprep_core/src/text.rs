/// Format a value like C's `%e`: six fractional digits and a signed,
/// at least two-digit exponent (`2.500000e-01`).
pub fn format_exp(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let rust = format!("{value:.6e}");
    let Some((mantissa, exponent)) = rust.split_once('e') else {
        return rust;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return rust;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_c_printf() {
        assert_eq!(format_exp(0.0), "0.000000e+00");
        assert_eq!(format_exp(1.0), "1.000000e+00");
        assert_eq!(format_exp(0.25), "2.500000e-01");
        assert_eq!(format_exp(-4.0), "-4.000000e+00");
        assert_eq!(format_exp(100_000.0), "1.000000e+05");
        assert_eq!(format_exp(1.5e-300), "1.500000e-300");
        assert_eq!(format_exp(f64::NEG_INFINITY), "-inf");
    }
}
