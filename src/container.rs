//! mozLz4 container codec.
//!
//! Firefox writes its bookmark backups as `.jsonlz4` files: an 8 byte magic,
//! the decompressed size as a little-endian u32, then a single raw LZ4 block.

use std::io::Read;

use thiserror::Error;

pub const MOZLZ4_MAGIC: [u8; 8] = *b"mozLz40\0";

const HEADER_LEN: usize = MOZLZ4_MAGIC.len() + 4;
const DEFAULT_LIMIT: u64 = 150 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid container: {0}")]
    Format(String),
    #[error("declared size {declared} exceeds limit {limit}")]
    SizeLimit { declared: u64, limit: u64 },
    #[error("decompress failed: {0}")]
    Decompress(String),
}

/// Bounds applied while reading a container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerLimits {
    /// Maximum number of compressed bytes read after the header.
    pub max_block_size: u64,
    /// Maximum decompressed size a header may declare.
    pub max_decompressed_size: u64,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_block_size: DEFAULT_LIMIT,
            max_decompressed_size: DEFAULT_LIMIT,
        }
    }
}

/// Decode a container with the default limits.
pub fn decode<R: Read>(reader: R) -> Result<Vec<u8>, ContainerError> {
    decode_with_limits(reader, ContainerLimits::default())
}

pub fn decode_with_limits<R: Read>(
    mut reader: R,
    limits: ContainerLimits,
) -> Result<Vec<u8>, ContainerError> {
    let mut header = [0u8; HEADER_LEN];
    read_header(&mut reader, &mut header)?;

    if header[..MOZLZ4_MAGIC.len()] != MOZLZ4_MAGIC {
        return Err(ContainerError::Format("magic mismatch".to_string()));
    }
    let declared = u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as u64;
    if declared > limits.max_decompressed_size {
        return Err(ContainerError::SizeLimit {
            declared,
            limit: limits.max_decompressed_size,
        });
    }

    let mut block = Vec::new();
    reader
        .take(limits.max_block_size)
        .read_to_end(&mut block)?;

    let mut out = vec![0u8; declared as usize];
    let written = lz4_flex::block::decompress_into(&block, &mut out)
        .map_err(|e| ContainerError::Decompress(e.to_string()))?;
    if written != out.len() {
        return Err(ContainerError::Decompress(format!(
            "expected {} bytes, got {written}",
            out.len()
        )));
    }
    Ok(out)
}

/// Wrap `data` in a mozLz4 container.
///
/// The header stores the size as a u32, so payloads of 4 GiB or more are
/// rejected with [`ContainerError::SizeLimit`].
pub fn encode(data: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let declared = declared_size(data.len())?;
    let block = lz4_flex::block::compress(data);
    let mut out = Vec::with_capacity(HEADER_LEN + block.len());
    out.extend_from_slice(&MOZLZ4_MAGIC);
    out.extend_from_slice(&declared.to_le_bytes());
    out.extend_from_slice(&block);
    Ok(out)
}

fn declared_size(len: usize) -> Result<u32, ContainerError> {
    u32::try_from(len).map_err(|_| ContainerError::SizeLimit {
        declared: len as u64,
        limit: u32::MAX as u64,
    })
}

fn read_header<R: Read>(reader: &mut R, header: &mut [u8]) -> Result<(), ContainerError> {
    reader.read_exact(header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            ContainerError::Format(format!("header shorter than {} bytes", header.len()))
        }
        _ => ContainerError::Io(e),
    })
}
