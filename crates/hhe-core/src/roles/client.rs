//! Client role
//!
//! Produces random integer blocks, encrypts each under the configured
//! variant's cipher and drains every batch either onto the queue or into the
//! variant's spool file. In the replay modes the batch loop is skipped and
//! the latest spool of the variant's directory is re-sent instead.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::RngCore;

use hhe_cipher::{
    append_ciphertexts, keystore, Kreyvium, TfheCodec, TfheCtVec, TfheEncryptor,
};
use hhe_wire::{latest_stamped_file, send_spool, PushPool};

use crate::error::{CoreError, CoreResult};
use crate::params::{file_stamp, DataHandling, EncryptionVariant, Parameters};
use crate::perf::PerfLogger;
use crate::roles::{format_block, log_parameters};

/// Bound by the client; the server connects and pulls Kreyvium ciphertexts.
pub const HHE_ENDPOINT: &str = "tcp://*:5556";
/// Bound by the client; the TTP connects and pulls TFHE ciphertexts.
pub const HE_ENDPOINT: &str = "tcp://*:5557";

/// Encryption capability for the configured variant.
pub enum ClientEncryptor {
    Kreyvium(Kreyvium),
    Tfhe(TfheEncryptor),
}

enum EncryptedRecord {
    Kreyvium(Vec<u8>),
    Tfhe(TfheCtVec),
}

pub struct Client {
    params: Parameters,
    endpoint_hhe: String,
    endpoint_he: String,
    spool_kreyvium: PathBuf,
    spool_tfhe: PathBuf,
    encryptor: ClientEncryptor,
    codec: TfheCodec,
    perf: PerfLogger,
}

impl Client {
    /// Builds the client from the key store, with the default endpoints.
    pub fn new(params: Parameters) -> CoreResult<Self> {
        let role = match params.variant {
            EncryptionVariant::Hhe => "client_HHE",
            EncryptionVariant::He => "client_HE",
        };
        let perf = PerfLogger::create(&params, role)?;

        perf.log("Client Initialisation Keys_Params Start");
        let keys_dir = params.keys_dir();
        let (encryptor, codec) = match params.variant {
            EncryptionVariant::Hhe => {
                let key =
                    keystore::load_kreyvium_key(&keys_dir.join(keystore::KREYVIUM_KEY_FILE))?;
                (
                    ClientEncryptor::Kreyvium(Kreyvium::new(&key)?),
                    TfheCodec::unbound(),
                )
            }
            EncryptionVariant::He => {
                let tfhe_params =
                    keystore::load_tfhe_params(&keys_dir.join(keystore::TFHE_PARAMS_FILE))?;
                let keys =
                    keystore::load_tfhe_secret_set(&keys_dir.join(keystore::TFHE_SECRET_FILE))?;
                (
                    ClientEncryptor::Tfhe(TfheEncryptor::new(Arc::new(keys.client))),
                    TfheCodec::new(Arc::new(tfhe_params)),
                )
            }
        };
        perf.log("Client Initialisation Keys_Params End");

        Self::with_parts(
            params,
            encryptor,
            codec,
            perf,
            HHE_ENDPOINT.to_string(),
            HE_ENDPOINT.to_string(),
        )
    }

    /// Builds the client from explicit collaborators (for testing and
    /// alternative deployments).
    pub fn with_parts(
        params: Parameters,
        encryptor: ClientEncryptor,
        codec: TfheCodec,
        perf: PerfLogger,
        endpoint_hhe: String,
        endpoint_he: String,
    ) -> CoreResult<Self> {
        let prefix = params.file_prefix(&file_stamp());
        let spool_kreyvium = params.kreyvium_dir().join(format!("{prefix}data_kreyvium.bin"));
        let spool_tfhe = params.tfhe_dir().join(format!("{prefix}data_tfhe.bin"));

        let client = Self {
            params,
            endpoint_hhe,
            endpoint_he,
            spool_kreyvium,
            spool_tfhe,
            encryptor,
            codec,
            perf,
        };

        // prime the downstream receiver; pointless when nothing consumes the
        // queue in this run
        if client.params.data_handling != DataHandling::SingleComponent {
            client.perf.log("Client Initialisation ZeroMQ Start");
            PushPool::global().send_sof(client.variant_endpoint())?;
            thread::sleep(Duration::from_millis(100));
            client.perf.log("Client Initialisation ZeroMQ End");
        }

        Ok(client)
    }

    fn variant_endpoint(&self) -> &str {
        match self.params.variant {
            EncryptionVariant::Hhe => &self.endpoint_hhe,
            EncryptionVariant::He => &self.endpoint_he,
        }
    }

    pub fn run(&mut self) -> CoreResult<()> {
        match self.params.data_handling {
            DataHandling::TransmitKreyvium | DataHandling::TransmitTfhe => self.replay_latest(),
            _ => self.run_batches(),
        }
    }

    fn run_batches(&mut self) -> CoreResult<()> {
        log_parameters(&self.params);
        self.perf.log("Client initialized");

        for _ in 1..=self.params.batch_count {
            self.perf.log("Client Batch Start");
            let mut batch = Vec::with_capacity(self.params.batch_size);
            for _ in 0..self.params.batch_size {
                self.perf.log("Client Integer Start");
                let block = self.produce_block();
                batch.push(self.encrypt_block(&block));
                self.perf.log("Client Integer End");
            }
            self.perf.log("Client Batch End");

            self.perf.log("Client Batch Transmission Start");
            self.drain(batch)?;
            self.perf.log("Client Batch Transmission End");
        }

        if self.params.data_handling != DataHandling::SingleComponent {
            PushPool::global().send_eof(self.variant_endpoint())?;
        }
        Ok(())
    }

    fn produce_block(&self) -> Vec<u8> {
        let mut block = vec![0u8; self.params.int_bytes()];
        rand::thread_rng().fill_bytes(&mut block);
        block
    }

    fn encrypt_block(&self, block: &[u8]) -> EncryptedRecord {
        self.perf
            .log(&format!("Client Integer Encryption Start : {}", format_block(block)));
        let record = match &self.encryptor {
            ClientEncryptor::Kreyvium(cipher) => EncryptedRecord::Kreyvium(cipher.encrypt(block)),
            ClientEncryptor::Tfhe(encryptor) => EncryptedRecord::Tfhe(encryptor.encrypt(block)),
        };
        self.perf
            .log(&format!("Client Integer Encryption End : {}", format_block(block)));
        record
    }

    fn drain(&self, batch: Vec<EncryptedRecord>) -> CoreResult<()> {
        for record in batch {
            match (record, self.params.data_handling) {
                (EncryptedRecord::Kreyvium(bytes), DataHandling::AllAtOnce) => {
                    PushPool::global().send(&self.endpoint_hhe, &bytes)?;
                }
                (EncryptedRecord::Kreyvium(bytes), _) => {
                    hhe_wire::append_frame(&self.spool_kreyvium, &bytes)?;
                }
                (EncryptedRecord::Tfhe(cts), DataHandling::AllAtOnce) => {
                    let buf = self.codec.encode(&cts)?;
                    PushPool::global().send(&self.endpoint_he, &buf)?;
                }
                (EncryptedRecord::Tfhe(cts), _) => {
                    append_ciphertexts(&self.spool_tfhe, &cts, &self.codec)?;
                }
            }
        }
        Ok(())
    }

    /// Replay mode: re-sends the most recent spool of the variant's
    /// directory over the queue, then terminates the stream.
    fn replay_latest(&self) -> CoreResult<()> {
        let dir = match self.params.variant {
            EncryptionVariant::Hhe => self.params.kreyvium_dir(),
            EncryptionVariant::He => self.params.tfhe_dir(),
        };
        let latest = latest_stamped_file(&dir)?.ok_or(CoreError::MissingSpool(dir))?;

        let sent = send_spool(&latest, self.variant_endpoint(), true)?;
        PushPool::global().send_eof(self.variant_endpoint())?;
        tracing::info!(spool = %latest.display(), sent, "replayed latest spool");
        Ok(())
    }
}
