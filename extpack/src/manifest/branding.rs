//! Branding color normalization.

use regex::Regex;
use std::sync::OnceLock;

/// CSS color keywords accepted in branding configuration.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("lime", "#00ff00"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("fuchsia", "#ff00ff"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#c0c0c0"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
    ("teal", "#008080"),
    ("navy", "#000080"),
    ("purple", "#800080"),
    ("orange", "#ffa500"),
];

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // 3, 4, 6 or 8 hex digits; the alpha channel is dropped
        Regex::new(r"^#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
    })
}

fn rgb_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^rgba?\(\s*([0-9.]+%?)\s*,\s*([0-9.]+%?)\s*,\s*([0-9.]+%?)\s*(?:,\s*[0-9.]+%?\s*)?\)$",
        )
        .unwrap()
    })
}

/// Normalize a color to lowercase `#rrggbb`.
///
/// Accepts hex colors (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`),
/// `rgb()`/`rgba()` with numeric or percentage channels, and basic CSS color
/// names. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use extpack::manifest::normalize_color;
///
/// assert_eq!(normalize_color("#F80"), Some("#ff8800".to_string()));
/// assert_eq!(normalize_color("rgb(255, 0, 0)"), Some("#ff0000".to_string()));
/// assert_eq!(normalize_color("Navy"), Some("#000080".to_string()));
/// assert_eq!(normalize_color("not a color"), None);
/// ```
pub fn normalize_color(input: &str) -> Option<String> {
    let value = input.trim();

    if let Some(caps) = hex_pattern().captures(value) {
        let digits = caps[1].to_lowercase();
        let rgb = match digits.len() {
            3 | 4 => digits.chars().take(3).flat_map(|c| [c, c]).collect(),
            _ => digits[..6].to_string(),
        };
        return Some(format!("#{}", rgb));
    }

    if let Some(caps) = rgb_pattern().captures(&value.to_lowercase()) {
        let mut hex = String::from("#");
        for i in 1..=3 {
            hex.push_str(&format!("{:02x}", channel(&caps[i])?));
        }
        return Some(hex);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, hex)| hex.to_string())
}

/// Parse an `rgb()` channel: `0..=255` or `0%..=100%`.
fn channel(raw: &str) -> Option<u8> {
    let value = match raw.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? * 255.0 / 100.0,
        None => raw.parse::<f64>().ok()?,
    };
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}
