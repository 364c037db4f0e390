//! String and number helpers shared by resolvers, help and completion

/// Lowercase and strip everything that is not ASCII alphanumeric.
///
/// Used for loose enum matching: `dark_red`, `Dark-Red` and `DARKRED` all
/// simplify to `darkred`.
pub fn simplify_string(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Interpret a token as a boolean
pub fn is_truthy(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "t" | "true" | "on" | "y" | "yes" | "1"
    )
}

/// Check if a token is a plain (optionally signed) decimal integer
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn suffix_multiplier(c: char) -> Option<f64> {
    match c.to_ascii_lowercase() {
        'k' => Some(1_000.0),
        'm' => Some(1_000_000.0),
        'b' => Some(1_000_000_000.0),
        _ => None,
    }
}

fn parse_radix(s: &str) -> Option<i128> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        i128::from_str_radix(bin, 2).ok()?
    } else {
        return None;
    };
    Some(if negative { -value } else { value })
}

/// Parse a number token.
///
/// Accepts `0x` hex and `0b` binary literals. When `suffixes` is set, a
/// trailing `k`, `m` or `b` multiplies by a thousand, million or billion.
pub fn parse_number(s: &str, suffixes: bool) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(v) = parse_radix(s) {
        return Some(v as f64);
    }

    let mut body = s;
    let mut multiplier = 1.0;
    if suffixes {
        if let Some(last) = s.chars().last() {
            if let Some(m) = suffix_multiplier(last) {
                body = &s[..s.len() - last.len_utf8()];
                multiplier = m;
            }
        }
    }

    // Reject forms f64 parsing accepts but users never mean
    let lower = body.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }
    let value: f64 = body.parse().ok()?;
    Some(value * multiplier)
}

/// Parse an integer token with the same literal forms as [`parse_number`].
///
/// Suffixed decimals like `1.5k` are accepted when the result is integral.
pub fn parse_integer(s: &str, suffixes: bool) -> Option<i128> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i128>() {
        return Some(v);
    }
    if let Some(v) = parse_radix(s) {
        return Some(v);
    }
    let value = parse_number(s, suffixes)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return None;
    }
    Some(value as i128)
}

/// Split a comma separated list, trimming entries and skipping empty ones
pub fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

/// Parse `key=value,flag` style configuration into pairs.
///
/// Keys are lowercased. Entries without `=` have no value.
pub fn parse_config_pairs(s: &str) -> Vec<(String, Option<String>)> {
    split_list(s)
        .map(|entry| match entry.split_once('=') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), Some(v.trim().to_string())),
            None => (entry.to_ascii_lowercase(), None),
        })
        .collect()
}

/// Normalize a (possibly multi-word) label: lowercase, single spaced
pub fn normalize_label(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a `|` separated alias list into normalized labels
pub fn split_aliases(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for alias in s.split('|').map(normalize_label) {
        if !alias.is_empty() && !out.contains(&alias) {
            out.push(alias);
        }
    }
    out
}
