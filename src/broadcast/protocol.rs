//! Centauri wire protocol.
//!
//! Every message is self-contained:
//!
//! ```text
//! bytes  0..7    ASCII magic "CENTAURI"
//! bytes  8..11   protocol version, big-endian u32
//! bytes 12..15   payload length N, big-endian u32
//! bytes 16..     N payload bytes (UTF-8 configuration)
//! ```
//!
//! There is no checksum, compression or response. Readers must expect
//! arbitrary TCP segmentation.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAGIC: &[u8; 8] = b"CENTAURI";
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 16;

/// Default upper bound accepted by [`read_frame`].
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Errors raised while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("bad magic bytes: {0:?}")]
    BadMagic([u8; 8]),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u32),

    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the 16-byte header for a payload of `len` bytes.
pub fn encode_header(len: usize) -> Result<[u8; HEADER_LEN], ProtocolError> {
    let len = u32::try_from(len).map_err(|_| ProtocolError::TooLarge {
        size: len,
        limit: u32::MAX as usize,
    })?;

    let mut header = [0u8; HEADER_LEN];
    header[..8].copy_from_slice(MAGIC);
    header[8..12].copy_from_slice(&VERSION.to_be_bytes());
    header[12..].copy_from_slice(&len.to_be_bytes());
    Ok(header)
}

/// Write one complete frame.
///
/// A failure part way through leaves the stream mid-message; callers abandon
/// that message for that peer.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let header = encode_header(payload.len())?;
    writer.write_all(&header).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one complete frame and return its payload.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;

    let mut magic = [0u8; 8];
    magic.copy_from_slice(&header[..8]);
    if &magic != MAGIC {
        return Err(ProtocolError::BadMagic(magic));
    }

    let version = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    if version != VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let size = u32::from_be_bytes([header[12], header[13], header[14], header[15]]) as usize;
    if size > max_payload {
        return Err(ProtocolError::TooLarge {
            size,
            limit: max_payload,
        });
    }

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}
