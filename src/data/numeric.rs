/// Coerce one raw cell to a number.
///
/// Thousands separators (`,`) and embedded spaces are stripped first.
/// Anything that still fails to parse, including blanks, `n/a` and
/// `Yes`/`No` flags, is missing rather than an error. Non-finite results
/// (`inf`, `NaN`) count as missing too.
pub fn coerce(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
