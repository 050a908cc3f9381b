use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::ParseError;

/// Compression pointers may chain; cap how far we follow them
const MAX_POINTER_JUMPS: usize = 32;

/// Byte-level cursor over a received packet
///
/// DNS names in responses routinely use compression pointers back into the
/// packet, so the read path needs random access to the whole buffer rather
/// than a pure stream.
pub struct PacketCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PacketCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let byte = *self.buf.get(self.pos).ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        Ok(((self.read_u8()? as u16) << 8) | self.read_u8()? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(((self.read_u16()? as u32) << 16) | self.read_u16()? as u32)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if self.remaining() < len {
            return Err(ParseError::UnexpectedEnd);
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a domain name, following compression pointers
    ///
    /// Returns the labels in presentation form (no terminal empty label).
    /// The cursor advances past the name as it appears at the current
    /// position; pointer targets are read without moving it.
    pub fn read_name(&mut self) -> Result<Vec<String>, ParseError> {
        let mut labels = Vec::new();
        let mut pos = self.pos;
        let mut jumped = false;
        let mut jumps = 0;

        loop {
            let len = *self.buf.get(pos).ok_or(ParseError::UnexpectedEnd)? as usize;

            if len & 0xC0 == 0xC0 {
                let low = *self.buf.get(pos + 1).ok_or(ParseError::UnexpectedEnd)? as usize;
                if !jumped {
                    self.pos = pos + 2;
                    jumped = true;
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(ParseError::InvalidLabel);
                }
                pos = ((len & 0x3F) << 8) | low;
                continue;
            }

            if len > 63 {
                return Err(ParseError::InvalidLabel);
            }

            if len == 0 {
                if !jumped {
                    self.pos = pos + 1;
                }
                break;
            }

            if pos + 1 + len > self.buf.len() {
                return Err(ParseError::UnexpectedEnd);
            }
            labels.push(escape_label(&self.buf[pos + 1..pos + 1 + len]));
            pos += 1 + len;
        }

        Ok(labels)
    }
}

/// Render one label in DNS presentation form
///
/// Bytes outside the printable ASCII range (and the two structural
/// characters) become `\DDD` escapes; black-lie sentinels arrive as a
/// single zero byte and therefore render as `\000`.
pub fn escape_label(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'.' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x21..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{:03}", b)),
        }
    }
    out
}

/// Serialization half of the codec: queries we build contain no
/// compressed names, so the write path stays on the bit writer.
pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;

    fn write_labels<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
        labels: &[String],
    ) -> Result<(), ParseError> {
        for label in labels {
            if label.is_empty() {
                continue;
            }
            if label.len() > 63 {
                return Err(ParseError::InvalidLabel);
            }
            writer.write_var::<u8>(8, label.len() as u8)?;
            writer.write_bytes(label.as_bytes())?;
        }
        writer.write_var::<u8>(8, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_name_plain() {
        // "ab.c" then trailing data
        let buf = [2, b'a', b'b', 1, b'c', 0, 0xFF];
        let mut cursor = PacketCursor::new(&buf);
        let labels = cursor.read_name().unwrap();
        assert_eq!(labels, vec!["ab".to_string(), "c".to_string()]);
        assert_eq!(cursor.pos(), 6);
    }

    #[test]
    fn test_read_name_compressed() {
        // offset 0: "example" 0, offset 9: "www" + pointer to 0
        let mut buf = vec![7];
        buf.extend_from_slice(b"example");
        buf.push(0);
        buf.push(3);
        buf.extend_from_slice(b"www");
        buf.extend_from_slice(&[0xC0, 0x00]);
        let mut cursor = PacketCursor::at(&buf, 9);
        let labels = cursor.read_name().unwrap();
        assert_eq!(labels, vec!["www".to_string(), "example".to_string()]);
        assert_eq!(cursor.pos(), buf.len());
    }

    #[test]
    fn test_pointer_loop_bounded() {
        let buf = [0xC0, 0x00];
        let mut cursor = PacketCursor::new(&buf);
        assert!(cursor.read_name().is_err());
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label(b"www"), "www");
        assert_eq!(escape_label(&[0]), "\\000");
        assert_eq!(escape_label(b"a.b"), "a\\.b");
    }
}
