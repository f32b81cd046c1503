use chrono::{DateTime, Utc};

/// Truncate a hash or address to "abcdef...ef12" format
pub fn truncate_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        hash.to_string()
    }
}

/// Insert comma separators into a string of decimal digits.
pub fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    group_digits(&n.to_string())
}

/// Format a decimal amount string; anything that is not plain digits is shown as is.
pub fn format_amount(amount: &str) -> String {
    if !amount.is_empty() && amount.chars().all(|c| c.is_ascii_digit()) {
        group_digits(amount)
    } else {
        amount.to_string()
    }
}

/// Format a Unix timestamp as "Xm ago", "Xh ago", etc.
pub fn format_time_ago(timestamp: u64) -> String {
    let now = Utc::now().timestamp().max(0) as u64;
    if timestamp > now {
        return "just now".to_string();
    }
    let diff = now - timestamp;
    if diff < 60 {
        format!("{diff}s ago")
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

/// Format a Unix timestamp as a datetime string
pub fn format_timestamp(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%b %d, %Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_hash() {
        assert_eq!(
            truncate_hash("9f8b3c1e2d4a5b6c7d8e9f0a1b2c3d4e"),
            "9f8b3c1e...3d4e"
        );
        assert_eq!(truncate_hash("short"), "short");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(19234567), "19,234,567");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("100000000000000000000"), "100,000,000,000,000,000,000");
        assert_eq!(format_amount("12"), "12");
        assert_eq!(format_amount("-"), "-");
        assert_eq!(format_amount(""), "");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "Jan 01, 1970 00:00:00 UTC");
        assert_eq!(format_timestamp(u64::MAX), "Unknown");
    }

    #[test]
    fn test_format_time_ago_future() {
        assert_eq!(format_time_ago(u64::MAX), "just now");
    }
}
