//! Number formatting for human-readable reports.

const KIB: u128 = 1 << 10;
const MIB: u128 = 1 << 20;
const GIB: u128 = 1 << 30;
const TIB: u128 = 1 << 40;
const PIB: u128 = 1 << 50;
const EIB: u128 = 1 << 60;

const BYTE_UNITS: [(u128, &str); 6] = [
    (EIB, "EiB"),
    (PIB, "PiB"),
    (TIB, "TiB"),
    (GIB, "GiB"),
    (MIB, "MiB"),
    (KIB, "KiB"),
];

/// Integer with `,` thousands separators.
pub fn grouped(n: impl Into<u128>) -> String {
    let digits = n.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two decimals with trailing zeros (and a bare point) dropped.
pub fn trimmed(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Percentage such as `12.5%`.
pub fn percentage(value: f64) -> String {
    format!("{}%", trimmed(value))
}

/// Byte count, with the largest fitting binary unit appended in brackets.
pub fn byte_size(n: u128) -> String {
    for (mult, suffix) in BYTE_UNITS {
        if n >= mult {
            return format!(
                "{} bytes [{}{}]",
                grouped(n),
                trimmed(n as f64 / mult as f64),
                suffix
            );
        }
    }
    format!("{} bytes", n)
}

/// `value (p%)`, or just `value` when the share is undefined.
pub fn with_share(value: &str, share: Option<f64>) -> String {
    match share {
        Some(p) => format!("{} ({})", value, percentage(p)),
        None => value.to_string(),
    }
}

/// `value (p%, c% cumulative)`, degrading like [`with_share`].
pub fn with_cumulative(value: &str, share: Option<f64>, cumulative: Option<f64>) -> String {
    match (share, cumulative) {
        (Some(p), Some(c)) => format!(
            "{} ({}, {} cumulative)",
            value,
            percentage(p),
            percentage(c)
        ),
        _ => with_share(value, share),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(grouped(0u64), "0");
        assert_eq!(grouped(999u64), "999");
        assert_eq!(grouped(1000u64), "1,000");
        assert_eq!(grouped(1234567u64), "1,234,567");
        assert_eq!(grouped(12345678u64), "12,345,678");
        assert_eq!(
            grouped(u128::from(u64::MAX) * 3),
            "55,340,232,221,128,654,845"
        );
    }

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(trimmed(3.0), "3");
        assert_eq!(trimmed(12.5), "12.5");
        assert_eq!(trimmed(33.333), "33.33");
        assert_eq!(trimmed(10.0), "10");
        assert_eq!(percentage(50.0), "50%");
    }

    #[test]
    fn byte_sizes_use_binary_units() {
        assert_eq!(byte_size(512), "512 bytes");
        assert_eq!(byte_size(1024), "1,024 bytes [1KiB]");
        assert_eq!(byte_size(1536), "1,536 bytes [1.5KiB]");
        assert_eq!(byte_size(3 * MIB), "3,145,728 bytes [3MiB]");
        assert_eq!(byte_size(GIB), "1,073,741,824 bytes [1GiB]");
        assert_eq!(byte_size(3 * EIB), "3,458,764,513,820,540,928 bytes [3EiB]");
        assert_eq!(
            byte_size(u128::from(u64::MAX) * 2),
            "36,893,488,147,419,103,230 bytes [32EiB]"
        );
    }

    #[test]
    fn shares_are_omitted_when_undefined() {
        assert_eq!(with_share("0 bytes", None), "0 bytes");
        assert_eq!(with_share("6 bytes", Some(25.0)), "6 bytes (25%)");
        assert_eq!(
            with_cumulative("1", Some(10.0), Some(40.0)),
            "1 (10%, 40% cumulative)"
        );
        assert_eq!(with_cumulative("1", None, None), "1");
    }
}
