use crate::domain::error::{ChannelError, ChannelResult};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a textual payload argument is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// UTF-8 bytes verbatim
    Text,
    /// Hex digits, whitespace ignored
    Hex,
    /// Standard base64
    Base64,
    /// Separated numbers, each 0-255, decimal or `0x`/`0b`/`0o` prefixed
    Bytes,
}

/// An immutable sequence of bytes to transmit.
///
/// The channel never looks inside a command; it is written exactly as built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandBuffer {
    bytes: Box<[u8]>,
}

impl CommandBuffer {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into().into_boxed_slice(),
        }
    }

    /// Parse a payload argument in the given format
    pub fn parse(input: &str, format: PayloadFormat) -> ChannelResult<Self> {
        let bytes = match format {
            PayloadFormat::Text => input.as_bytes().to_vec(),
            PayloadFormat::Hex => {
                let cleaned: String = input.split_whitespace().collect();
                hex::decode(&cleaned)
                    .map_err(|e| ChannelError::InvalidInput(format!("Invalid hex data: {}", e)))?
            }
            PayloadFormat::Base64 => base64::engine::general_purpose::STANDARD
                .decode(input.trim())
                .map_err(|e| ChannelError::InvalidInput(format!("Invalid base64 data: {}", e)))?,
            PayloadFormat::Bytes => parse_byte_list(input)?,
        };

        Ok(Self::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for CommandBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for CommandBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for CommandBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for CommandBuffer {
    fn from(bytes: [u8; N]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.bytes))
    }
}

fn parse_byte_list(input: &str) -> ChannelResult<Vec<u8>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_byte)
        .collect()
}

fn parse_byte(token: &str) -> ChannelResult<u8> {
    let lower = token.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else {
        (lower.as_str(), 10)
    };

    u8::from_str_radix(digits, radix)
        .map_err(|e| ChannelError::InvalidInput(format!("Invalid byte '{}': {}", token, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_list_mixed_notation() {
        let buffer =
            CommandBuffer::parse("128, 128, 128, 128, 0b00010000", PayloadFormat::Bytes).unwrap();
        assert_eq!(buffer.as_bytes(), &[128, 128, 128, 128, 16]);
    }

    #[test]
    fn test_parse_byte_list_rejects_out_of_range() {
        let result = CommandBuffer::parse("1 2 256", PayloadFormat::Bytes);
        assert!(matches!(result, Err(ChannelError::InvalidInput(_))));

        let result = CommandBuffer::parse("-1", PayloadFormat::Bytes);
        assert!(matches!(result, Err(ChannelError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_hex_ignores_whitespace() {
        let buffer = CommandBuffer::parse("80 80\n80 80 10", PayloadFormat::Hex).unwrap();
        assert_eq!(buffer.as_bytes(), &[0x80, 0x80, 0x80, 0x80, 0x10]);

        assert!(CommandBuffer::parse("8", PayloadFormat::Hex).is_err());
    }

    #[test]
    fn test_parse_text_and_base64() {
        let text = CommandBuffer::parse("0b00010000", PayloadFormat::Text).unwrap();
        assert_eq!(text.len(), 10);

        let decoded = CommandBuffer::parse("gICAgBA=", PayloadFormat::Base64).unwrap();
        assert_eq!(decoded.as_bytes(), &[128, 128, 128, 128, 16]);
    }

    #[test]
    fn test_display_is_hex() {
        let buffer = CommandBuffer::from([0x80, 0x10]);
        assert_eq!(buffer.to_string(), "8010");
        assert!(CommandBuffer::new(Vec::new()).is_empty());
    }
}
