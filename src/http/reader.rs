//! Bounded reads from the client connection.
//!
//! Everything here works inside a caller-provided buffer and waits at most
//! `wait` for each chunk of input; nothing grows with the request.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("no data within {0:?}")]
    Timeout(Duration),
    #[error("line longer than {0} bytes")]
    Overflow(usize),
    #[error("peer closed the connection")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why a body transfer stopped before the declared length.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("timed out after {received} of {expected} bytes")]
    Timeout { received: u64, expected: u64 },
    #[error("peer closed after {received} of {expected} bytes")]
    Disconnected { received: u64, expected: u64 },
    #[error("declared length {declared} exceeds buffer of {capacity} bytes")]
    TooLarge { declared: u64, capacity: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

async fn next_byte<R>(reader: &mut R, wait: Duration) -> Result<u8, LineError>
where
    R: AsyncRead + Unpin,
{
    match timeout(wait, reader.read_u8()).await {
        Err(_) => Err(LineError::Timeout(wait)),
        Ok(Ok(byte)) => Ok(byte),
        Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Err(LineError::Closed),
        Ok(Err(e)) => Err(LineError::Io(e)),
    }
}

/// Reads one line into `buf` and returns its length.
///
/// `\r` is dropped and `\n` ends the line without being stored, so a blank
/// line yields `Ok(0)`. Each byte gets its own `wait` window.
pub async fn read_line<R>(reader: &mut R, buf: &mut [u8], wait: Duration) -> Result<usize, LineError>
where
    R: AsyncRead + Unpin,
{
    let mut len = 0;
    while len < buf.len() {
        match next_byte(reader, wait).await? {
            b'\r' => continue,
            b'\n' => return Ok(len),
            byte => {
                buf[len] = byte;
                len += 1;
            }
        }
    }

    Err(LineError::Overflow(buf.len()))
}

/// Copies exactly `expected` body bytes from `reader` to `writer` through
/// `scratch`, then flushes `writer`.
pub async fn copy_body<R, W>(
    reader: &mut R,
    writer: &mut W,
    scratch: &mut [u8],
    expected: u64,
    wait: Duration,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut received = 0u64;
    while received < expected {
        let want = scratch.len().min((expected - received) as usize);
        let n = match timeout(wait, reader.read(&mut scratch[..want])).await {
            Err(_) => return Err(TransferError::Timeout { received, expected }),
            Ok(res) => res?,
        };
        if n == 0 {
            return Err(TransferError::Disconnected { received, expected });
        }

        writer.write_all(&scratch[..n]).await?;
        received += n as u64;
    }

    writer.flush().await?;
    Ok(received)
}

/// Fills `buf` completely from `reader`.
pub async fn fill<R>(reader: &mut R, buf: &mut [u8], wait: Duration) -> Result<(), TransferError>
where
    R: AsyncRead + Unpin,
{
    let expected = buf.len() as u64;
    let mut filled = 0;
    while filled < buf.len() {
        let received = filled as u64;
        let n = match timeout(wait, reader.read(&mut buf[filled..])).await {
            Err(_) => return Err(TransferError::Timeout { received, expected }),
            Ok(res) => res?,
        };
        if n == 0 {
            return Err(TransferError::Disconnected { received, expected });
        }
        filled += n;
    }

    Ok(())
}
