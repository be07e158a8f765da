//! Hex color parsing and ANSI terminal rendering.

const ANSI_RESET: &str = "\x1b[0m";

/// Parse a `#RRGGBB` (or `RRGGBB`) hex color string into RGB components.
///
/// # Arguments
/// * `hex_color` - The color string, with or without a leading `#`
///
/// # Returns
/// * `Some((r, g, b))` on success, `None` for any malformed input
///
/// # Example
/// ```
/// use lumen_bridge_utils::color::hex_to_rgb;
///
/// assert_eq!(hex_to_rgb("#FF00AA"), Some((255, 0, 170)));
/// assert_eq!(hex_to_rgb("#12345"), None);
/// ```
pub fn hex_to_rgb(hex_color: &str) -> Option<(u8, u8, u8)> {
    let stripped = hex_color.strip_prefix('#').unwrap_or(hex_color);
    if stripped.len() != 6 {
        return None;
    }
    let rgb = hex::decode(stripped).ok()?;
    Some((rgb[0], rgb[1], rgb[2]))
}

/// Render a hex color as a small TrueColor block for terminal output.
///
/// Malformed colors are returned unchanged so log lines never lose the raw
/// value.
pub fn terminal_swatch(hex_color: &str) -> String {
    match hex_to_rgb(hex_color) {
        Some((r, g, b)) => format!("\x1b[48;2;{r};{g};{b}m  {ANSI_RESET}"),
        None => hex_color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        let cases: &[(&str, Option<(u8, u8, u8)>)] = &[
            ("#FF00AA", Some((255, 0, 170))),
            ("00FF00", Some((0, 255, 0))),
            ("#1a2B3c", Some((26, 43, 60))),
            ("#12345", None),
            ("#1234567", None),
            ("#GGHHII", None),
            ("", None),
            ("#", None),
        ];

        for (input, expected) in cases {
            assert_eq!(hex_to_rgb(input), *expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_terminal_swatch() {
        assert_eq!(terminal_swatch("#FF0000"), "\x1b[48;2;255;0;0m  \x1b[0m");
        assert_eq!(terminal_swatch("00FF00"), "\x1b[48;2;0;255;0m  \x1b[0m");

        // Malformed input falls through untouched.
        assert_eq!(terminal_swatch("#XYZ"), "#XYZ");
        assert_eq!(terminal_swatch(""), "");
    }
}
