/// Parses a usage reading such as `"12.5"` or `"0.25 kWh"`
///
/// Anything that is not a finite number yields `None` (unknown). Zero stays
/// zero; it is a real reading.
pub fn parse_kwh(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed
        .strip_suffix("kWh")
        .or_else(|| trimmed.strip_suffix("kwh"))
        .unwrap_or(trimmed)
        .trim();

    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an optional attribute value, treating a missing or empty attribute as unknown
pub fn parse_kwh_attr(raw: Option<&str>) -> Option<f64> {
    raw.filter(|v| !v.trim().is_empty()).and_then(parse_kwh)
}
