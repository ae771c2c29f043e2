use crate::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};

const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

fn read_line<'a>(buf: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let rest = &buf[*pos..];
    let end = rest.windows(2).position(|w| w == b"\r\n")?;
    *pos += end + 2;
    Some(&rest[..end])
}

fn parse_len(line: &[u8]) -> Result<usize, ProtocolError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| ProtocolError::InvalidLength(String::from_utf8_lossy(line).into_owned()))
}

fn expect_prefix(line: &[u8], expected: char) -> Result<&[u8], ProtocolError> {
    match line.first() {
        Some(&b) if b == expected as u8 => Ok(&line[1..]),
        Some(&found) => Err(ProtocolError::UnexpectedByte { expected, found }),
        None => Err(ProtocolError::UnexpectedByte { expected, found: b'\r' }),
    }
}

/// Parses one array of bulk strings off the front of `buf`.
///
/// Returns `Ok(None)` and leaves `buf` untouched when the frame is incomplete.
pub fn parse_frame(buf: &mut BytesMut) -> Result<Option<Vec<Bytes>>, ProtocolError> {
    let mut pos = 0;
    let mut spans = Vec::new();
    {
        let data: &[u8] = &buf[..];
        let Some(header) = read_line(data, &mut pos) else {
            return Ok(None);
        };
        let count = parse_len(expect_prefix(header, '*')?)?;

        for _ in 0..count {
            let Some(line) = read_line(data, &mut pos) else {
                return Ok(None);
            };
            let len = parse_len(expect_prefix(line, '$')?)?;
            if len > MAX_BULK_LEN {
                return Err(ProtocolError::TooLarge(len));
            }
            if data.len() < pos + len + 2 {
                return Ok(None);
            }
            if &data[pos + len..pos + len + 2] != b"\r\n" {
                return Err(ProtocolError::MissingTerminator);
            }
            spans.push((pos, len));
            pos += len + 2;
        }
    }

    let frame = buf.split_to(pos).freeze();
    Ok(Some(
        spans
            .into_iter()
            .map(|(start, len)| frame.slice(start..start + len))
            .collect(),
    ))
}

pub fn encode_simple_string(s: &str) -> Bytes {
    Bytes::from(format!("+{}\r\n", s))
}

pub fn encode_bulk_string(s: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(s.len() + 16);
    out.put_slice(format!("${}\r\n", s.len()).as_bytes());
    out.put_slice(s);
    out.put_slice(b"\r\n");
    out.freeze()
}

pub fn encode_null_bulk_string() -> Bytes {
    Bytes::from_static(b"$-1\r\n")
}

pub fn encode_error(msg: &str) -> Bytes {
    Bytes::from(format!("-ERR {}\r\n", msg))
}
