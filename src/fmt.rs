//! Numeric formatting helpers for fixed-width table cells.
//!
//! Everything here is pure: a value and a target width in, a string no
//! wider than the target out. Padding and alignment are the renderer's
//! job, so results are never padded.

/// Unit tags used by [`format_b`], one per 1024 scale-up.
const BYTE_UNITS: [char; 4] = ['B', 'K', 'M', 'G'];

/// Suffixes used when an integer does not fit and is scaled by 1000.
const SCALE_SUFFIXES: [char; 4] = ['K', 'M', 'G', 'T'];

// ---------------------------------------------------------------------------
// Byte sizes
// ---------------------------------------------------------------------------

/// Formats a byte count, dividing by 1024 (rounding half up) while the
/// magnitude is at least 10000, at most three times.
///
/// `0` -> `"0B"`, `9999` -> `"9999B"`, `10240` -> `"10K"`.
pub fn format_b(bytes: i64) -> String {
    let negative = bytes < 0;
    let mut v = bytes.unsigned_abs();
    let mut unit = 0;
    while v >= 10_000 && unit < BYTE_UNITS.len() - 1 {
        v = (v + 512) / 1024;
        unit += 1;
    }
    format!(
        "{}{}{}",
        if negative { "-" } else { "" },
        v,
        BYTE_UNITS[unit]
    )
}

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

/// Inserts `,` between groups of three digits: `1234567` -> `"1,234,567"`.
pub fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats an absolute value to fit in `width` columns.
pub fn format_int(v: i64, width: usize, thousands: bool) -> String {
    fit_integer(v, width, thousands, false)
}

/// Formats a delta with an explicit sign (`+12`, `-3`, `0`).
pub fn format_delta(v: i64, width: usize, thousands: bool) -> String {
    fit_integer(v, width, thousands, true)
}

fn render_integer(v: i64, thousands: bool, signed: bool) -> String {
    let body = if thousands {
        group_thousands(v)
    } else {
        v.to_string()
    };
    if signed && v > 0 {
        format!("+{}", body)
    } else {
        body
    }
}

/// Grouped form first, then plain digits, then 1000-based scaling with a
/// K/M/G/T suffix. A value that fits none of those becomes `*` filler.
fn fit_integer(v: i64, width: usize, thousands: bool, signed: bool) -> String {
    let full = render_integer(v, thousands, signed);
    if full.len() <= width {
        return full;
    }
    if thousands {
        let plain = render_integer(v, false, signed);
        if plain.len() <= width {
            return plain;
        }
    }

    let mut scaled = v;
    for suffix in SCALE_SUFFIXES {
        scaled /= 1000;
        let candidate = format!("{}{}", render_integer(scaled, false, signed), suffix);
        if candidate.len() <= width {
            return candidate;
        }
    }
    stars(width)
}

// ---------------------------------------------------------------------------
// Floats and text
// ---------------------------------------------------------------------------

/// Fixed-precision float, dropping decimals before giving up.
pub fn format_float(v: f64, precision: usize, width: usize) -> String {
    let full = format!("{:.prec$}", v, prec = precision);
    if full.len() <= width {
        return full;
    }
    let whole = format!("{:.0}", v);
    if whole.len() <= width {
        return whole;
    }
    stars(width)
}

/// Byte count fitted to `width`.
pub fn format_bytes(v: i64, width: usize) -> String {
    let s = format_b(v);
    if s.len() <= width { s } else { stars(width) }
}

/// Cuts `s` to at most `width` characters.
pub fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Replaces control whitespace so a cell never breaks the line.
pub fn normalize_for_display(s: &str) -> String {
    s.replace(['\n', '\t'], " ").replace('\r', "")
}

fn stars(width: usize) -> String {
    "*".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_b_boundaries() {
        assert_eq!(format_b(0), "0B");
        assert_eq!(format_b(9999), "9999B");
        assert_eq!(format_b(10240), "10K");
        assert_eq!(format_b(10_000), "10K");
    }

    #[test]
    fn format_b_rolls_units_and_caps() {
        // 10 MiB: 10485760 -> 10240K -> 10M
        assert_eq!(format_b(10 * 1024 * 1024), "10M");
        assert_eq!(format_b(20 * 1024 * 1024 * 1024), "20G");
        // capped after three scale-ups
        assert_eq!(format_b(20_000 * 1024 * 1024 * 1024), "20000G");
        assert_eq!(format_b(-10240), "-10K");
    }

    #[test]
    fn format_b_rounds_half_up() {
        // 10752 / 1024 = 10.5
        assert_eq!(format_b(10752), "11K");
        assert_eq!(format_b(10751), "10K");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-12_345), "-12,345");
    }

    #[test]
    fn deltas_carry_sign() {
        assert_eq!(format_delta(12, 10, false), "+12");
        assert_eq!(format_delta(-3, 10, false), "-3");
        assert_eq!(format_delta(0, 10, false), "0");
        assert_eq!(format_delta(1500, 10, true), "+1,500");
    }

    #[test]
    fn integers_scale_when_too_wide() {
        assert_eq!(format_int(123_456, 6, false), "123456");
        assert_eq!(format_int(1_234_567, 6, false), "1234K");
        assert_eq!(format_int(1_234_567, 6, true), "1234K");
        assert_eq!(format_int(1_234_567, 9, true), "1,234,567");
        assert_eq!(format_int(1_234_567_890, 4, false), "1G");
        assert_eq!(format_int(123_456, 1, false), "*");
    }

    #[test]
    fn floats_drop_precision_before_stars() {
        assert_eq!(format_float(3.14159, 2, 8), "3.14");
        assert_eq!(format_float(12345.678, 2, 6), "12346");
        assert_eq!(format_float(1e12, 2, 4), "****");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("pg_catalog", 5), "pg_ca");
        assert_eq!(truncate("ünï", 2), "ün");
        assert_eq!(truncate("ab", 5), "ab");
    }
}
