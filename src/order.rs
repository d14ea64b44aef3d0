use std::cmp::Ordering;

/// numeric-friendly name order: shorter names first, then bytewise
///
/// numbered names without leading zeros thus sort by value.
pub fn numeric_order(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// value of the leading decimal digits of a name, 0 when there are none
pub fn leading_number(name: &str) -> u64 {
    name.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, d| {
            acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
        })
}
