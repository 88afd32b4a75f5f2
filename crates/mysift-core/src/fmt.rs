//! Shared formatting helpers for report sections.
//!
//! All pure formatting functions (no I/O) live here: the fuzzy rounder used
//! by every analyzer, name/value fact lines, size and duration strings, and
//! the fixed-width grid used for grouped tables.

// ---------------------------------------------------------------------------
// Fuzzy rounding
// ---------------------------------------------------------------------------

/// Values at or below this are never rounded.
const FUZZY_FLOOR: f64 = 10.0;

/// Rounding increment chosen for `x`, or `None` when `x` is left as is.
///
/// Tiers are `(<= 50, 5)`, `(<= 100, 10)`, `(<= 250, 25)`, each scaled by a
/// factor that grows by ×10 until `x` fits a tier.
pub fn fuzzy_increment(x: f64) -> Option<f64> {
    if !x.is_finite() || x <= FUZZY_FLOOR {
        return None;
    }
    let mut factor = 1.0;
    loop {
        if x <= 50.0 * factor {
            return Some(5.0 * factor);
        } else if x <= 100.0 * factor {
            return Some(10.0 * factor);
        } else if x <= 250.0 * factor {
            return Some(25.0 * factor);
        }
        factor *= 10.0;
    }
}

/// Round `x` to a "nice" increment that grows with its magnitude.
///
/// Near-equal values from repeated runs land on the same display value,
/// so two reports of a similar server diff cleanly. Values `<= 10` are
/// returned unchanged. Negative inputs (counter resets) are rounded by
/// magnitude and keep their sign.
///
/// ```
/// use mysift_core::fmt::fuzzy_round;
///
/// assert_eq!(fuzzy_round(7.0), 7.0);
/// assert_eq!(fuzzy_round(47.0), 45.0);
/// assert_eq!(fuzzy_round(1234.0), 1250.0);
/// ```
pub fn fuzzy_round(x: f64) -> f64 {
    if x < 0.0 {
        return -fuzzy_round(-x);
    }
    match fuzzy_increment(x) {
        Some(step) => (x / step).round() * step,
        None => x,
    }
}

/// Fuzzy-rounded integer percentage of `part` in `total`, e.g. `"45%"`.
///
/// `"0%"` when `total <= 0`.
pub fn fuzzy_percent(part: f64, total: f64) -> String {
    if total <= 0.0 {
        return "0%".to_string();
    }
    let pct = (100.0 * part / total).round();
    format!("{}%", fuzzy_round(pct) as i64)
}

// ---------------------------------------------------------------------------
// Simple facts
// ---------------------------------------------------------------------------

/// Width of the name column in name/value fact lines.
pub const NAME_WIDTH: usize = 20;

/// Format one fact line: name right-aligned in 20 columns, then the value.
pub fn format_name_value(name: &str, value: &str) -> String {
    format!("{:>width$} | {}", name, value, width = NAME_WIDTH)
}

/// Format a section banner padded with `#` to a fixed width.
pub fn format_banner(title: &str) -> String {
    const WIDTH: usize = 72;
    let head = format!("# {} ", title);
    let fill = WIDTH.saturating_sub(head.chars().count()).max(1);
    format!("{}{}", head, "#".repeat(fill))
}

/// Format byte count as a compact human-readable size: `"1.5G"`, `"100.3M"`,
/// `"50.0K"`, `"512"`.
pub fn format_bytes(bytes: u64) -> String {
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}G", f / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}M", f / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1}K", f / 1024.0)
    } else {
        format!("{}", bytes)
    }
}

/// Format an uptime in seconds: `"12s"`, `"3m 5s"`, `"4h 2m"`, `"9d 1h"`.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Cut `s` to at most `max_chars` characters (no ellipsis).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Grid tables
// ---------------------------------------------------------------------------

/// Render a grid: first column left-aligned (min 8 wide), the rest
/// right-aligned, each one column wider than its widest cell.
///
/// Every line is indented by two spaces and ends with `\n`.
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    if let Some(first) = widths.first_mut() {
        *first = (*first).max(8);
    }

    let mut out = String::new();
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        let mut line = String::from(" ");
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            if i == 0 {
                line.push_str(&format!(" {:<width$}", cell, width = width));
            } else {
                line.push_str(&format!(" {:>width$}", cell, width = width + 1));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
