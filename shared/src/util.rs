/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Alphabet of hosted-database push keys, in ASCII order so keys sort lexically.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Generate a 20-character push key the way the hosted database does.
///
/// Layout:
///   - 8 chars: milliseconds since epoch, big-endian base64 (keys sort by creation time)
///   - 12 chars: random
pub fn push_key() -> String {
    push_key_at(now_millis())
}

pub(crate) fn push_key_at(millis: i64) -> String {
    use rand::Rng;

    let mut key = [0u8; 20];
    let mut ts = millis.max(0) as u64;
    for slot in key[..8].iter_mut().rev() {
        *slot = PUSH_CHARS[(ts % 64) as usize];
        ts /= 64;
    }
    let mut rng = rand::thread_rng();
    for slot in key[8..].iter_mut() {
        *slot = PUSH_CHARS[rng.gen_range(0..64)];
    }
    // PUSH_CHARS is ASCII
    key.iter().map(|&b| b as char).collect()
}

/// Format a money amount with thousands separators, e.g. `$1,234.50`
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{symbol}{grouped}.{:02}", cents % 100)
}

/// Format epoch millis as `YYYY-MM-DD HH:MM` (UTC). Zero or invalid renders as `-`.
pub fn format_timestamp(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Human-readable byte size (`512 B`, `1.5 KB`, `2.0 MB`)
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Lowercase ASCII slug for file names; never empty.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "backup".to_string()
    } else {
        slug.to_string()
    }
}
