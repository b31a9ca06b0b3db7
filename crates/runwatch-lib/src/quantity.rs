//! Parsing of Kubernetes resource quantities
//!
//! The metrics API reports usage as `Quantity` strings ("129Mi", "250m",
//! "123456789n"). These helpers interpret them as the two units the monitor
//! accumulates: bytes of memory and millicores of CPU.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Interpret a memory quantity as bytes.
///
/// Accepts plain integers, decimal SI suffixes (k, M, G, T, P, E), binary
/// suffixes (Ki, Mi, Gi, Ti, Pi, Ei), and the millibyte suffix some runtimes
/// emit. Returns `None` for negative or malformed quantities.
pub fn memory_bytes(quantity: &Quantity) -> Option<u64> {
    let (value, suffix) = split_quantity(&quantity.0)?;

    let multiplier: f64 = match suffix {
        "" => 1.0,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024.0,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        _ => return None,
    };

    to_u64(value * multiplier)
}

/// Interpret a CPU quantity as millicores, rounded to the nearest whole
/// millicore.
///
/// The metrics API reports CPU in nanocores ("123456789n"); requests and
/// limits commonly use millicores ("250m") or fractional cores ("0.5").
pub fn cpu_millicores(quantity: &Quantity) -> Option<u64> {
    let (value, suffix) = split_quantity(&quantity.0)?;

    let millicores = match suffix {
        "n" => value / 1e6,
        "u" => value / 1e3,
        "m" => value,
        "" => value * 1e3,
        _ => return None,
    };

    to_u64(millicores)
}

/// Split a quantity string into its numeric part and unit suffix.
fn split_quantity(raw: &str) -> Option<(f64, &str)> {
    let raw = raw.trim();
    let split_at = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+')
        .unwrap_or(raw.len());

    let (number, suffix) = raw.split_at(split_at);
    let value: f64 = number.parse().ok()?;
    Some((value, suffix))
}

fn to_u64(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.round() as u64)
}
