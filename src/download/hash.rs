//! Local file hashing for change detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::Result;

/// Read size while hashing.
const HASH_CHUNK_SIZE: usize = 4096;

/// Compute the hex MD5 digest of a file without loading it whole.
///
/// Discord's CDN reports the MD5 of an attachment as its ETag, so this is
/// enough to tell whether a local copy is current.
pub fn hash_md5(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

/// Compare a server ETag with a local hex digest.
///
/// ETags arrive quoted (`"d41d8..."`) and possibly weak (`W/"..."`).
pub fn etag_matches(etag: &str, digest: &str) -> bool {
    let etag = etag.trim();
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    etag.trim_matches('"').eq_ignore_ascii_case(digest)
}
