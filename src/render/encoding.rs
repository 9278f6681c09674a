use encoding_rs::WINDOWS_1252;

/// Byte encodings usable with the standard Type1 fonts. Characters an
/// encoding cannot represent are dropped, never reported as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// PDF WinAnsiEncoding, i.e. Windows-1252: Latin-1 plus typographic quotes,
    /// dashes and the euro sign.
    WinAnsi,
    Ascii,
}

impl TextEncoding {
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Ascii => text
                .chars()
                .filter(|c| c.is_ascii() && !c.is_ascii_control())
                .map(|c| c as u8)
                .collect(),
            TextEncoding::WinAnsi => {
                let mut out = Vec::with_capacity(text.len());
                let mut buf = [0u8; 4];
                for c in text.chars().filter(|c| !c.is_control()) {
                    if c.is_ascii() {
                        out.push(c as u8);
                        continue;
                    }
                    let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
                    if !unmappable && bytes.len() == 1 {
                        out.push(bytes[0]);
                    }
                }
                out
            }
        }
    }
}
