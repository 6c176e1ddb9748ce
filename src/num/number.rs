const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Renders a decoded number the way the dump prints it: integral values
/// without a fraction, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }
    let mut buffer = ryu::Buffer::new();
    trim_number(buffer.format(value))
}

fn trim_number(raw: &str) -> String {
    match raw.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => raw.to_string(),
    }
}
