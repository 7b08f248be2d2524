//! Colour notation conversion between CSS hex, ASS, and ffmpeg.
//!
//! ASS stores colours as `&HAABBGGRR` (alpha first, then blue-green-red,
//! alpha 00 = opaque). ffmpeg options take `0xRRGGBB[@alpha]`.

/// Colour used when a hex string cannot be parsed.
pub const FALLBACK_HEX: &str = "#FFFFFF";

/// Parse `#RRGGBB` (leading `#` optional) into components.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

fn components_or_white(hex: &str) -> (u8, u8, u8) {
    parse_hex(hex).unwrap_or_else(|| {
        tracing::debug!(color = hex, "Unparseable colour, using white");
        (0xFF, 0xFF, 0xFF)
    })
}

/// `#RRGGBB` → `&H00BBGGRR` (opaque).
pub fn hex_to_ass(hex: &str) -> String {
    hex_to_ass_alpha(hex, 0)
}

/// `#RRGGBB` → `&HAABBGGRR`, where `alpha` 0 is opaque and 255 invisible.
pub fn hex_to_ass_alpha(hex: &str, alpha: u8) -> String {
    let (r, g, b) = components_or_white(hex);
    format!("&H{alpha:02X}{b:02X}{g:02X}{r:02X}")
}

/// `#RRGGBB` → `&HBBGGRR&`, the form used inside `\c`/`\3c` override tags.
pub fn hex_to_ass_inline(hex: &str) -> String {
    let (r, g, b) = components_or_white(hex);
    format!("&H{b:02X}{g:02X}{r:02X}&")
}

/// `&HAABBGGRR`, `&HBBGGRR` or `&HBBGGRR&` → `#RRGGBB`.
pub fn ass_to_hex(ass: &str) -> Option<String> {
    let digits = ass
        .trim()
        .trim_start_matches("&H")
        .trim_start_matches("&h")
        .trim_end_matches('&');
    let bgr = match digits.len() {
        8 => &digits[2..],
        6 => digits,
        _ => return None,
    };
    let (b, g, r) = parse_hex(bgr)?;
    Some(format!("#{r:02X}{g:02X}{b:02X}"))
}

/// `#RRGGBB` → `0xRRGGBB`.
pub fn hex_to_ffmpeg(hex: &str) -> String {
    let (r, g, b) = components_or_white(hex);
    format!("0x{r:02X}{g:02X}{b:02X}")
}

/// `#RRGGBB` → `0xRRGGBB@opacity` with opacity clamped to `[0, 1]`.
pub fn hex_to_ffmpeg_alpha(hex: &str, opacity: f64) -> String {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    format!("{}@{opacity:.2}", hex_to_ffmpeg(hex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_to_ass_swaps_channel_order() {
        assert_eq!(hex_to_ass("#FF8000"), "&H000080FF");
        assert_eq!(hex_to_ass_alpha("#FF8000", 0x80), "&H800080FF");
        assert_eq!(hex_to_ass_inline("#FFD700"), "&H00D7FF&");
    }

    #[test]
    fn test_ass_to_hex_accepts_all_forms() {
        assert_eq!(ass_to_hex("&H000080FF").as_deref(), Some("#FF8000"));
        assert_eq!(ass_to_hex("&H0080FF").as_deref(), Some("#FF8000"));
        assert_eq!(ass_to_hex("&H00D7FF&").as_deref(), Some("#FFD700"));
        assert_eq!(ass_to_hex("&Hxyz"), None);
    }

    #[test]
    fn test_ffmpeg_notation() {
        assert_eq!(hex_to_ffmpeg("#00ffcc"), "0x00FFCC");
        assert_eq!(hex_to_ffmpeg_alpha("#000000", 0.4), "0x000000@0.40");
        assert_eq!(hex_to_ffmpeg_alpha("#000000", 7.0), "0x000000@1.00");
    }

    #[test]
    fn test_invalid_hex_falls_back_to_white() {
        assert_eq!(hex_to_ass("red"), "&H00FFFFFF");
        assert_eq!(hex_to_ffmpeg("#12345"), "0xFFFFFF");
    }

    proptest! {
        #[test]
        fn hex_ass_round_trip_is_identity(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255, lower in any::<bool>()) {
            let hex = if lower {
                format!("#{r:02x}{g:02x}{b:02x}")
            } else {
                format!("#{r:02X}{g:02X}{b:02X}")
            };
            let back = ass_to_hex(&hex_to_ass(&hex)).unwrap();
            prop_assert!(back.eq_ignore_ascii_case(&hex));
        }
    }
}
