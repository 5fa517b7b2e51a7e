//! Content hashing in the format the editor records in `product.json`.
//!
//! SHA-256 over the raw file bytes, standard base64 alphabet, trailing `=`
//! padding removed.

use std::{fs, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};

use crate::error::{FixError, Result};

pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    STANDARD_NO_PAD.encode(hasher.finalize())
}

/// Hash the full contents of `path`.
pub fn compute_checksum(path: &Path) -> Result<String> {
    let data = fs::read(path).map_err(|e| FixError::read(path, e))?;
    Ok(hash_bytes(&data))
}
