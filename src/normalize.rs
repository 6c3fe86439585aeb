use crate::table::RawCell;

/// Cell values that mean "no code here", compared case-insensitively after
/// trimming. "ac"/"bc" are sentinel tokens in the CCI source, not codes.
const NULL_LIKE: [&str; 6] = ["", "nan", "none", "null", "ac", "bc"];

/// Canonicalize a raw cell into a comparable CPT code, or `None` when the
/// cell is absent.
pub fn normalize_code(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Null => None,
        RawCell::Text(raw) => normalize_code_str(raw),
    }
}

/// String form of [`normalize_code`]: trim, collapse null-like tokens, and
/// strip one trailing ".0" left behind by float-coerced integer codes.
pub fn normalize_code_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_LIKE.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        return None;
    }
    let code = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    Some(code.to_string())
}

/// Coerce a flag cell to its integer flag.
///
/// Anything that does not parse as a finite number is -1 (unknown);
/// fractional flags truncate toward zero. NaN must not fall through to an
/// `as i64` cast or it would turn into a valid-looking 0.
pub fn parse_flag(cell: &RawCell) -> i64 {
    let RawCell::Text(raw) = cell else {
        return -1;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => -1,
    }
}
