use nodefinder_protocol::mac_digits;

pub use nodefinder_protocol::strip_separators;

/// Separator-insensitive, case-sensitive MAC comparison.
pub fn mac_eq(a: &str, b: &str) -> bool {
    mac_digits(a).eq(mac_digits(b))
}
