const PREFIX: &str = "Distance:";

/// Parses one `Distance: <float>` line from an external sensor.
///
/// Surrounding whitespace and a trailing `cm` unit are accepted. Anything
/// else, including zero, negative or non-finite readings, is malformed.
pub fn parse_sensor_line(line: &str) -> Option<f64> {
    let rest = line.trim().strip_prefix(PREFIX)?.trim();
    let number = rest.strip_suffix("cm").unwrap_or(rest).trim_end();
    let value: f64 = number.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
