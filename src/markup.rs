//! Small helpers shared by everything that renders markup strings.

use std::time::{Duration, SystemTime};

/// Escape text for inclusion in element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Human label for how long ago `at` happened, relative to `now`.
pub fn relative_time(at: SystemTime, now: SystemTime) -> String {
    let elapsed = now.duration_since(at).unwrap_or(Duration::ZERO).as_secs();
    match elapsed {
        0..=59 => "Ahora".to_string(),
        60..=3599 => format!("Hace {} min", elapsed / 60),
        3600..=86_399 => format!("Hace {} h", elapsed / 3600),
        _ => format!("Hace {} d", elapsed / 86_400),
    }
}

/// Colombian peso amount without decimals, e.g. `$ 150.000`.
pub fn format_cop(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-$ {}", grouped)
    } else {
        format!("$ {}", grouped)
    }
}
