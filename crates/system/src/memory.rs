/// Bytes per MiB.
pub const MIB: u64 = 1 << 20;

/// Whole MiB in `bytes`, truncating.
pub fn to_mib(bytes: u64) -> u64 {
    bytes / MIB
}

/// Format a byte count as a human-readable string (e.g. `"7.3 GiB"`).
pub fn format_bytes(bytes: u64) -> String {
    const GIB: u64 = 1 << 30;
    const KIB: u64 = 1 << 10;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
