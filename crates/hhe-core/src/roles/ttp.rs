//! Trusted third party role
//!
//! Holds the TFHE secret key. Receives TFHE ciphertext vectors - from the
//! server on the transciphering pipeline, from the client on the direct
//! pipeline - decrypts each back to its integer block and persists the
//! plaintext blocks batch by batch.

use std::path::PathBuf;
use std::sync::Arc;

use hhe_cipher::{keystore, TfheCodec, TfheDecryptor, TfheSpoolReader};
use hhe_wire::{latest_stamped_file, receive_into_spool};

use crate::error::{CoreError, CoreResult};
use crate::params::{file_stamp, DataHandling, EncryptionVariant, Parameters};
use crate::perf::PerfLogger;
use crate::roles::format_block;

/// The client's bound push endpoint for the direct pipeline.
pub const CLIENT_ENDPOINT: &str = "tcp://localhost:5557";
/// The server's bound push endpoint for the transciphering pipeline.
pub const SERVER_ENDPOINT: &str = "tcp://localhost:5557";

pub struct Ttp {
    params: Parameters,
    client_endpoint: String,
    server_endpoint: String,
    spool_tfhe: PathBuf,
    spool_decrypted: PathBuf,
    decryptor: TfheDecryptor,
    codec: TfheCodec,
    perf: PerfLogger,
}

impl Ttp {
    /// Builds the TTP from the key store, with the default endpoints.
    pub fn new(params: Parameters) -> CoreResult<Self> {
        let role = match params.variant {
            EncryptionVariant::Hhe => "ttp_HHE",
            EncryptionVariant::He => "ttp_HE",
        };
        let perf = PerfLogger::create(&params, role)?;

        perf.log("TTP Initialisation Keys_Params Start");
        let keys_dir = params.keys_dir();
        let tfhe_params = keystore::load_tfhe_params(&keys_dir.join(keystore::TFHE_PARAMS_FILE))?;
        let keys = keystore::load_tfhe_secret_set(&keys_dir.join(keystore::TFHE_SECRET_FILE))?;
        let decryptor = TfheDecryptor::new(Arc::new(keys.client));
        perf.log("TTP Initialisation Keys_Params End");

        Self::with_parts(
            params,
            decryptor,
            TfheCodec::new(Arc::new(tfhe_params)),
            perf,
            CLIENT_ENDPOINT.to_string(),
            SERVER_ENDPOINT.to_string(),
        )
    }

    /// Builds the TTP from explicit collaborators (for testing and
    /// alternative deployments).
    pub fn with_parts(
        params: Parameters,
        decryptor: TfheDecryptor,
        codec: TfheCodec,
        perf: PerfLogger,
        client_endpoint: String,
        server_endpoint: String,
    ) -> CoreResult<Self> {
        let prefix = params.file_prefix(&file_stamp());
        let spool_tfhe = params
            .encrypted_tfhe_dir()
            .join(format!("{prefix}data_tfhe.bin"));
        let spool_decrypted = params
            .decrypted_dir()
            .join(format!("{prefix}data_decrypted.bin"));

        Ok(Self {
            params,
            client_endpoint,
            server_endpoint,
            spool_tfhe,
            spool_decrypted,
            decryptor,
            codec,
            perf,
        })
    }

    pub fn run(&mut self) -> CoreResult<()> {
        if self.params.data_handling == DataHandling::TransmitTfhe {
            // measurement isolation: only exercise the receive leg
            self.receive_tfhe_data()?;
            return Ok(());
        }

        let input = if self.params.data_handling == DataHandling::SingleComponent {
            let dir = self.params.encrypted_tfhe_dir();
            match latest_stamped_file(&dir)? {
                Some(path) => path,
                None => {
                    tracing::warn!(dir = %dir.display(), "no TFHE input spool found");
                    return Ok(());
                }
            }
        } else {
            self.receive_tfhe_data()?;
            self.spool_tfhe.clone()
        };
        let mut reader = TfheSpoolReader::open(input, self.codec.clone())?;

        self.perf.log("TTP initialized");

        for _ in 1..=self.params.batch_count {
            self.perf.log("TTP Batch Start");
            let mut batch = Vec::with_capacity(self.params.batch_size);
            for _ in 0..self.params.batch_size {
                self.perf.log("TTP Integer Start");
                let tfhe_ct = reader.next()?.ok_or(CoreError::SpoolExhausted)?;

                self.perf.log("TTP Integer Decryption Start");
                let block = self.decryptor.decrypt_block(&tfhe_ct)?;
                self.perf
                    .log(&format!("TTP Integer Decryption End : {}", format_block(&block)));

                batch.push(block);
                self.perf.log("TTP Integer End");
            }
            self.perf.log("TTP Batch End");

            self.perf.log("TTP Batch Transmission Start");
            for block in &batch {
                hhe_wire::append_frame(&self.spool_decrypted, block)?;
            }
            self.perf.log("TTP Batch Transmission End");
        }
        Ok(())
    }

    /// Pulls TFHE ciphertexts from the variant's upstream into this run's
    /// spool. Deserialization is deferred to spool-read time, so the spool
    /// holds the wire bytes unchanged.
    fn receive_tfhe_data(&self) -> CoreResult<usize> {
        let endpoint = match self.params.variant {
            EncryptionVariant::Hhe => &self.server_endpoint,
            EncryptionVariant::He => &self.client_endpoint,
        };
        let received = receive_into_spool(
            &self.spool_tfhe,
            endpoint,
            self.params.total_records(),
            true,
        )?;
        tracing::info!(
            received,
            spool = %self.spool_tfhe.display(),
            "stored TFHE ciphertexts"
        );
        Ok(received)
    }
}
