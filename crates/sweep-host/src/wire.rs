//! Native-messaging framing.
//!
//! Wire format: `[length:4 native-endian][utf-8 json:length]`.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from the browser.
pub const MAX_INBOUND_FRAME: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame length {len} exceeds maximum {max}")]
    TooLarge { len: usize, max: usize },
}

/// Read one frame. `Ok(None)` on a clean end of stream before a length prefix.
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<Option<Vec<u8>>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > max_size {
        return Err(WireError::TooLarge { len, max: max_size });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, data: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(data.len()).map_err(|_| WireError::TooLarge {
        len: data.len(),
        max: u32::MAX as usize,
    })?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}
