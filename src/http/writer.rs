use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::mime::MimeType;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Status line, optional Content-Type, caller's extra header text and the
/// blank line. `extra` goes out verbatim, so each of its lines must already
/// end in CRLF.
pub fn serialize_head(code: StatusCode, mime: Option<MimeType>, extra: Option<&str>) -> String {
    let mut head = format!("{} {} OK\r\n", HTTP_VERSION, code.as_u16());

    if let Some(mime) = mime {
        head.push_str("Content-Type: ");
        head.push_str(mime.as_str());
        head.push_str("\r\n");
    }
    if let Some(extra) = extra {
        head.push_str(extra);
    }

    head.push_str("\r\n");
    head
}

pub async fn write_head<W>(
    stream: &mut W,
    code: StatusCode,
    mime: Option<MimeType>,
    extra: Option<&str>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream
        .write_all(serialize_head(code, mime, extra).as_bytes())
        .await
}

/// Streams `file` to `stream` one `scratch`-sized chunk at a time.
///
/// Stops at end of file or at the first failed write, i.e. once the peer is
/// gone. Returns the number of bytes that made it out.
pub async fn send_file<R, W>(file: &mut R, stream: &mut W, scratch: &mut [u8]) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut sent = 0u64;
    loop {
        let n = file.read(scratch).await?;
        if n == 0 {
            break;
        }

        if let Err(e) = stream.write_all(&scratch[..n]).await {
            tracing::debug!(sent, error = %e, "client went away during transfer");
            break;
        }
        sent += n as u64;
    }

    Ok(sent)
}
