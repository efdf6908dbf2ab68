const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Formats a byte count with binary units: `4 KiB`, `1.50 MiB`, `1000 B`.
pub fn readable_size(bytes: u64) -> String {
    if bytes < 1 << 10 {
        return format!("{} {}", bytes, UNITS[0]);
    }
    let mut exp = UNITS.len() - 1;
    while bytes >> (exp * 10) == 0 {
        exp -= 1;
    }
    let scale = 1u64 << (exp * 10);
    if bytes % scale == 0 {
        format!("{} {}", bytes / scale, UNITS[exp])
    } else {
        format!("{:.2} {}", bytes as f64 / scale as f64, UNITS[exp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_size() {
        assert_eq!(readable_size(0), "0 B");
        assert_eq!(readable_size(1000), "1000 B");
        assert_eq!(readable_size(4096), "4 KiB");
        assert_eq!(readable_size(1536), "1.50 KiB");
        assert_eq!(readable_size(5000), "4.88 KiB");
        assert_eq!(readable_size(1 << 25), "32 MiB");
        assert_eq!(readable_size(1 << 30), "1 GiB");
        assert_eq!(readable_size(3 << 30), "3 GiB");
        assert_eq!(readable_size((1 << 30) + (1 << 29)), "1.50 GiB");
    }
}
