/// Binary unit prefixes below yobi
const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Human-readable byte count with 1024-based units and one decimal place,
/// e.g. `1023.0B`, `1.0KiB`, `3.5GiB`
pub fn format_size(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in UNITS {
        if num.abs() < 1024.0 {
            return format!("{:3.1}{}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1}YiB", num)
}
