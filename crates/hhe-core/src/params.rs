//! Run parameters
//!
//! All three roles of a run must be built with the same parameters; they are
//! fixed at process start and read-only afterwards. There are no CLI
//! arguments and no environment variables - a run is configured here.

use std::fmt;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncryptionVariant {
    /// Kreyvium on the client, transciphered to TFHE on the server.
    Hhe,
    /// TFHE directly on the client.
    He,
}

impl EncryptionVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            EncryptionVariant::Hhe => "HHE",
            EncryptionVariant::He => "HE",
        }
    }
}

impl fmt::Display for EncryptionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegerSize {
    Bits8 = 8,
    Bits16 = 16,
    Bits32 = 32,
    Bits64 = 64,
    Bits128 = 128,
}

impl IntegerSize {
    pub fn bits(self) -> usize {
        self as usize
    }

    pub fn bytes(self) -> usize {
        self.bits() / 8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataHandling {
    /// Every ciphertext goes straight onto the queue.
    AllAtOnce,
    /// Every ciphertext goes into the role's spool file; roles run one at a
    /// time against the filesystem.
    SingleComponent,
    /// Replay the latest TFHE spool over the queue instead of processing.
    TransmitTfhe,
    /// Replay the latest Kreyvium spool over the queue instead of processing.
    TransmitKreyvium,
}

impl DataHandling {
    pub fn as_str(self) -> &'static str {
        match self {
            DataHandling::AllAtOnce => "ALL_AT_ONCE",
            DataHandling::SingleComponent => "SINGLE_COMPONENT",
            DataHandling::TransmitTfhe => "TRANSMIT_TFHE",
            DataHandling::TransmitKreyvium => "TRANSMIT_KREYVIUM",
        }
    }
}

impl fmt::Display for DataHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Parameters {
    pub variant: EncryptionVariant,
    pub int_size: IntegerSize,
    pub batch_size: usize,
    pub batch_count: usize,
    pub data_handling: DataHandling,
    /// Root of every data, key and measurement directory of the run.
    pub storage_root: PathBuf,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            variant: EncryptionVariant::Hhe,
            int_size: IntegerSize::Bits8,
            batch_size: 4,
            batch_count: 25,
            data_handling: DataHandling::AllAtOnce,
            storage_root: PathBuf::from("./hhe-data"),
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> CoreResult<()> {
        if self.batch_size == 0 {
            return Err(CoreError::Config("batch_size must be at least 1".into()));
        }
        if self.batch_count == 0 {
            return Err(CoreError::Config("batch_count must be at least 1".into()));
        }
        Ok(())
    }

    pub fn int_bits(&self) -> usize {
        self.int_size.bits()
    }

    pub fn int_bytes(&self) -> usize {
        self.int_size.bytes()
    }

    pub fn total_records(&self) -> usize {
        self.batch_size * self.batch_count
    }

    /// Filename prefix embedding the stamp and the run configuration.
    pub fn file_prefix(&self, stamp: &str) -> String {
        format!(
            "{stamp}_{}_BatchNr:{}_BatchSize:{}_IntSize:{}_",
            self.variant, self.batch_count, self.batch_size, self.int_bits()
        )
    }

    pub fn kreyvium_dir(&self) -> PathBuf {
        self.storage_root.join("data_kreyvium")
    }

    pub fn tfhe_dir(&self) -> PathBuf {
        self.storage_root.join("data_tfhe")
    }

    pub fn encrypted_tfhe_dir(&self) -> PathBuf {
        self.storage_root.join("data_encrypted_tfhe")
    }

    pub fn decrypted_dir(&self) -> PathBuf {
        self.storage_root.join("data_decrypted")
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.storage_root.join("storage_keys")
    }

    pub fn time_log_dir(&self) -> PathBuf {
        self.storage_root
            .join("Performance_Measurement")
            .join("data_time")
    }

    pub fn memory_log_dir(&self) -> PathBuf {
        self.storage_root
            .join("Performance_Measurement")
            .join("data_memory")
    }
}

/// Local-time stamp used as the leading component of data and log filenames.
/// Latest-file selection sorts lexicographically on this prefix.
pub fn file_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_prefix_embeds_configuration() {
        let params = Parameters {
            variant: EncryptionVariant::Hhe,
            int_size: IntegerSize::Bits16,
            batch_size: 4,
            batch_count: 25,
            ..Parameters::default()
        };
        assert_eq!(
            params.file_prefix("20250615_120000"),
            "20250615_120000_HHE_BatchNr:25_BatchSize:4_IntSize:16_"
        );
    }

    #[test]
    fn test_zero_batch_configuration_rejected() {
        let params = Parameters {
            batch_size: 0,
            ..Parameters::default()
        };
        assert!(params.validate().is_err());

        let params = Parameters {
            batch_count: 0,
            ..Parameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_record_accounting() {
        let params = Parameters {
            int_size: IntegerSize::Bits32,
            batch_size: 3,
            batch_count: 7,
            ..Parameters::default()
        };
        assert_eq!(params.int_bytes(), 4);
        assert_eq!(params.total_records(), 21);
    }

    #[test]
    fn test_file_stamp_shape() {
        let stamp = file_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
    }
}
