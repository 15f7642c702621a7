//! WinAnsiEncoding for Base-14 text overlays.

/// Code points of WinAnsiEncoding 0x80..=0x9F, `None` where undefined.
const HIGH_CONTROL_RANGE: [Option<char>; 32] = [
    Some('\u{20AC}'), // 0x80 euro
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None, // 0x90
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Encode text as WinAnsi bytes.
///
/// Tabs and line breaks become spaces; characters the encoding cannot express
/// become `?`. Returns the bytes and the number of substituted characters.
///
/// ```
/// use pdf_pagekit::fonts::encode_win_ansi;
///
/// let (bytes, lost) = encode_win_ansi("Café – 5€");
/// assert_eq!(bytes, b"Caf\xE9 \x96 5\x80");
/// assert_eq!(lost, 0);
/// ```
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(text.len());
    let mut substituted = 0;

    for c in text.chars() {
        let code = c as u32;
        let byte = match c {
            '\t' | '\n' | '\r' => Some(b' '),
            _ if (0x20..=0x7E).contains(&code) => Some(code as u8),
            _ if (0xA0..=0xFF).contains(&code) => Some(code as u8),
            _ => HIGH_CONTROL_RANGE
                .iter()
                .position(|&m| m == Some(c))
                .map(|i| 0x80 + i as u8),
        };

        match byte {
            Some(b) => out.push(b),
            None => {
                out.push(b'?');
                substituted += 1;
            },
        }
    }

    (out, substituted)
}
