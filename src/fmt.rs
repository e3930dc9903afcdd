//! # Formatting
//!
//! Human-readable rendering of counts, byte sizes, transfer rates and
//! durations, plus `{N}` positional templating.
//!
//! Magnitude scaling picks a suffix by taking the logarithm of the value in
//! the scaling base (1000 for plain counts, 1024 for the byte family). The
//! exponent is computed from the absolute value and clamped to the suffix
//! table, so negative and oversized inputs format without panicking.

use regex::{Captures, Regex};

const HUMAN: [&str; 14] = [
    "", "k", "M", "B", "T", "Qd", "Qt", "Sx", "Sp", "Oc", "No", "De", "Ud", "Du",
];
const BYTES: [&str; 9] = [
    "Bytes", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB",
];
const BYTES_PER_SECOND: [&str; 9] = [
    "B/s", "Kbps", "Mbps", "Gbps", "Tbps", "Pbps", "Ebps", "Zbps", "Ybps",
];
const HASHES_PER_SECOND: [&str; 9] = [
    "H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s", "EH/s", "ZH/s", "YH/s",
];

/// Replace every `{N}` placeholder with the N-th argument (0-indexed).
///
/// A placeholder with no matching argument is left verbatim, so templates can
/// be filled in several passes.
pub fn format(template: &str, args: &[&str]) -> String {
    let placeholder = Regex::new(r"\{(\d+)\}").unwrap();

    placeholder
        .replace_all(template, |caps: &Captures| {
            let index: usize = caps[1].parse().unwrap_or(usize::MAX);

            match args.get(index) {
                Some(arg) => arg.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Scale a count by powers of 1000 and append a magnitude suffix.
///
/// Values below 1000 are returned unscaled and unmodified. Zero and
/// non-finite inputs return the literal `"0"`.
pub fn format_human(value: f64, decimals: usize) -> String {
    if value < 1000.0 && value != 0.0 && value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let (mantissa, suffix) = scale(value, 1000.0, &HUMAN);

    format!("{}{}", round_trim(mantissa, decimals), suffix)
}

pub fn format_bytes(bytes: f64, decimals: usize) -> String {
    scaled_with_unit(bytes, decimals, &BYTES, "0 Bytes")
}

pub fn format_bytes_per_second(bytes: f64, decimals: usize) -> String {
    scaled_with_unit(bytes, decimals, &BYTES_PER_SECOND, "0 B/s")
}

pub fn format_hashes_per_second(hashes: f64, decimals: usize) -> String {
    scaled_with_unit(hashes, decimals, &HASHES_PER_SECOND, "0 H/s")
}

/// Decompose elapsed seconds into `1y 3m 2d 16h 13m 45s ` form.
///
/// Fixed factors: 60s/min, 60min/hr, 24hr/day, 30day/month, 12month/year.
/// Zero-valued components are omitted entirely, including from the middle of
/// the sequence. Each emitted component carries a trailing space.
pub fn parse_seconds(seconds: u64, decimals: usize) -> String {
    let (minutes, seconds) = longdiv(seconds, 60);
    let (hours, minutes) = longdiv(minutes, 60);
    let (days, hours) = longdiv(hours, 24);
    let (months, days) = longdiv(days, 30);
    let (years, months) = longdiv(months, 12);

    let components = [
        (years, "y"),
        (months, "m"),
        (days, "d"),
        (hours, "h"),
        (minutes, "m"),
        (seconds, "s"),
    ];

    let mut out = String::new();
    for (value, unit) in components {
        if value != 0 {
            out.push_str(&format!("{:.*}{} ", decimals, value as f64, unit));
        }
    }

    out
}

/// Capitalize the first letter of every whitespace-delimited word,
/// lower-casing the remainder of each word.
pub fn to_title_case(input: &str) -> String {
    let word = Regex::new(r"\w\S*").unwrap();

    word.replace_all(input, |caps: &Captures| {
        let mut chars = caps[0].chars();

        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    })
    .into_owned()
}

fn scaled_with_unit(value: f64, decimals: usize, sizes: &[&'static str], zero: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return zero.to_string();
    }

    let (mantissa, suffix) = scale(value, 1024.0, sizes);

    format!("{} {}", round_trim(mantissa, decimals), suffix)
}

fn scale(value: f64, base: f64, sizes: &[&'static str]) -> (f64, &'static str) {
    let exponent = (value.abs().ln() / base.ln()).floor();
    let index = (exponent.max(0.0) as usize).min(sizes.len() - 1);

    (value / base.powi(index as i32), sizes[index])
}

/// Round to `decimals` places, then strip trailing zeros back to a plain
/// number, so `1.50` renders as `1.5` and `2.00` as `2`.
fn round_trim(value: f64, decimals: usize) -> String {
    let rounded = format!("{value:.decimals$}");

    match rounded.parse::<f64>() {
        Ok(plain) => plain.to_string(),
        Err(_) => rounded,
    }
}

fn longdiv(numerator: u64, denominator: u64) -> (u64, u64) {
    (numerator / denominator, numerator % denominator)
}
