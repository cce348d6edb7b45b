//! Number formatting for on-screen labels.

/// `$1610.51`
pub fn money(v: f64) -> String {
    if v < 0.0 {
        return format!("-${:.2}", -v);
    }
    format!("${v:.2}")
}

/// `$1000` for whole amounts, otherwise the same as [`money`].
pub fn money_whole(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        if v < 0.0 {
            return format!("-${}", (-v) as i64);
        }
        return format!("${}", v as i64);
    }
    money(v)
}

/// Shortest decimal form with at most `max_places` fractional digits (`0.1`, `1.61051`, `1000`).
pub fn decimal(v: f64, max_places: usize) -> String {
    let s = format!("{v:.max_places$}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        return "0".to_string();
    }
    trimmed.to_string()
}

/// Annual rate as a percentage with at least one decimal (`10.0%`, `7.25%`).
pub fn percent(rate: f64) -> String {
    let mut s = decimal(rate * 100.0, 4);
    if !s.contains('.') {
        s.push_str(".0");
    }
    s.push('%');
    s
}

#[cfg(test)]
#[path = "../../tests/unit/finance/format.rs"]
mod tests;
