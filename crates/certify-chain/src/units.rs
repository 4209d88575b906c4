//! Ether unit formatting.

/// Wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Render a wei amount as a decimal ether string.
///
/// Always has a fractional part with trailing zeros trimmed, so
/// `10_000 ether` renders as `"10000.0"` and `1 wei` as
/// `"0.000000000000000001"`.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    let frac = format!("{frac:018}");
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{frac}")
    }
}
