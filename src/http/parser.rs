use crate::http::request::{Method, RequestContext};

/// Value of one hex digit, either case.
pub fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%HH` escapes in place, moving the rest of the buffer left.
///
/// A `%` not followed by two hex digits is kept as is. The decoded text is
/// `buf[..buf.len() - removed]` where `removed` is the return value (two
/// bytes per decoded escape).
pub fn unescape(buf: &mut [u8]) -> usize {
    let mut read = 0;
    let mut write = 0;

    while read < buf.len() {
        let escape = match buf.get(read..read + 3) {
            Some([b'%', hi, lo]) => hex_value(*hi).zip(hex_value(*lo)),
            _ => None,
        };

        match escape {
            Some((hi, lo)) => {
                buf[write] = (hi << 4) | lo;
                read += 3;
            }
            None => {
                buf[write] = buf[read];
                read += 1;
            }
        }
        write += 1;
    }

    read - write
}

fn skip_whitespace(buf: &[u8]) -> usize {
    buf.iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(buf.len())
}

fn token_len(buf: &[u8]) -> usize {
    buf.iter()
        .position(u8::is_ascii_whitespace)
        .unwrap_or(buf.len())
}

/// Parses `<METHOD> <path> [version]` out of the line buffer.
///
/// The path token is decoded inside `line` and then copied out, so the
/// buffer content is clobbered. Never fails: an unknown method is reported as
/// such and a missing path yields an empty one.
pub fn parse_request_line(line: &mut [u8]) -> RequestContext {
    let start = skip_whitespace(line);
    let line = &mut line[start..];
    let method = Method::from_token(line);

    let method_end = token_len(line);
    let rest = &mut line[method_end..];
    let path_start = skip_whitespace(rest);
    let rest = &mut rest[path_start..];
    let path_len = token_len(rest);

    let token = &mut rest[..path_len];
    let removed = unescape(token);
    let path = String::from_utf8_lossy(&token[..path_len - removed]).into_owned();

    RequestContext { method, path }
}
