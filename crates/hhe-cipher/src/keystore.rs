//! Key material persistence
//!
//! Every key file is a single standard frame (4-byte big-endian length plus
//! payload), so the on-disk layout is fixed-width and endian-stable across
//! platforms. TFHE material is stored in the library's serde stream form
//! inside the frame.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfhe::boolean::parameters::BooleanParameters;

use hhe_wire::{read_frame, write_frame};

use crate::error::{CipherError, CipherResult};
use crate::tfhe::TfheSecretKeySet;

pub const KREYVIUM_KEY_FILE: &str = "key_kreyvium.bin";
pub const TFHE_PARAMS_FILE: &str = "params_tfhe.bin";
pub const TFHE_SECRET_FILE: &str = "sk_tfhe.bin";

pub fn save_kreyvium_key(path: &Path, key: &[u8]) -> CipherResult<()> {
    save_blob(path, key)
}

pub fn load_kreyvium_key(path: &Path) -> CipherResult<Vec<u8>> {
    load_blob(path)
}

pub fn save_tfhe_params(path: &Path, params: &BooleanParameters) -> CipherResult<()> {
    save_serialized(path, params)
}

pub fn load_tfhe_params(path: &Path) -> CipherResult<BooleanParameters> {
    load_serialized(path)
}

pub fn save_tfhe_secret_set(path: &Path, keys: &TfheSecretKeySet) -> CipherResult<()> {
    save_serialized(path, keys)
}

pub fn load_tfhe_secret_set(path: &Path) -> CipherResult<TfheSecretKeySet> {
    load_serialized(path)
}

fn save_serialized<T: Serialize>(path: &Path, value: &T) -> CipherResult<()> {
    let blob = bincode::serialize(value)
        .map_err(|e| CipherError::Codec(format!("key serialization failed: {e}")))?;
    save_blob(path, &blob)
}

fn load_serialized<T: DeserializeOwned>(path: &Path) -> CipherResult<T> {
    let blob = load_blob(path)?;
    bincode::deserialize(&blob)
        .map_err(|e| CipherError::KeyLoad(format!("{} is malformed: {e}", path.display())))
}

fn save_blob(path: &Path, blob: &[u8]) -> CipherResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    write_frame(&mut file, blob)?;
    Ok(())
}

fn load_blob(path: &Path) -> CipherResult<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| CipherError::KeyLoad(format!("cannot open {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    match read_frame(&mut reader) {
        Ok(Some(blob)) => Ok(blob),
        Ok(None) => Err(CipherError::KeyLoad(format!(
            "{} is empty",
            path.display()
        ))),
        Err(e) => Err(CipherError::KeyLoad(format!(
            "{} is malformed: {e}",
            path.display()
        ))),
    }
}
