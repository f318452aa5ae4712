//! Server role (HHE only)
//!
//! Receives Kreyvium ciphertexts from the client, transciphers each into a
//! TFHE ciphertext vector without learning the plaintext, and forwards the
//! results to the trusted third party. Holds the cloud key and the
//! TFHE-encrypted Kreyvium key; the transcipher is the expensive part of the
//! whole pipeline and the reason this harness exists.

use std::path::PathBuf;
use std::sync::Arc;

use hhe_cipher::{append_ciphertexts, keystore, KreyviumTfhe, TfheCodec, Transcipher};
use hhe_wire::{latest_stamped_file, receive_into_spool, send_spool, PushPool, SpoolReader};

use crate::error::{CoreError, CoreResult};
use crate::params::{file_stamp, DataHandling, Parameters};
use crate::perf::PerfLogger;
use crate::roles::log_parameters;

/// The client's bound push endpoint; the server connects and pulls.
pub const CLIENT_ENDPOINT: &str = "tcp://localhost:5556";
/// Bound by the server; the TTP connects and pulls TFHE ciphertexts.
pub const TTP_ENDPOINT: &str = "tcp://localhost:5557";

pub struct Server {
    params: Parameters,
    receive_endpoint: String,
    send_endpoint: String,
    spool_kreyvium: PathBuf,
    spool_tfhe: PathBuf,
    transcipher: Box<dyn Transcipher>,
    codec: TfheCodec,
    perf: PerfLogger,
}

impl Server {
    /// Builds the server from the key store, with the default endpoints.
    ///
    /// Loads the full TFHE secret key set and uses its cloud half for gate
    /// evaluation, then encrypts the Kreyvium key bit-by-bit under TFHE.
    pub fn new(params: Parameters) -> CoreResult<Self> {
        let perf = PerfLogger::create(&params, "server_HHE")?;

        perf.log("Server Initialisation Keys_Params Start");
        let keys_dir = params.keys_dir();
        let tfhe_params = keystore::load_tfhe_params(&keys_dir.join(keystore::TFHE_PARAMS_FILE))?;
        let keys = keystore::load_tfhe_secret_set(&keys_dir.join(keystore::TFHE_SECRET_FILE))?;
        let kreyvium_key =
            keystore::load_kreyvium_key(&keys_dir.join(keystore::KREYVIUM_KEY_FILE))?;
        let transcipher =
            KreyviumTfhe::new(&kreyvium_key, &keys.client, Arc::new(keys.server))?;
        perf.log("Server Initialisation Keys_Params End");

        Self::with_parts(
            params,
            Box::new(transcipher),
            TfheCodec::new(Arc::new(tfhe_params)),
            perf,
            CLIENT_ENDPOINT.to_string(),
            TTP_ENDPOINT.to_string(),
        )
    }

    /// Builds the server from explicit collaborators (for testing and
    /// alternative deployments).
    pub fn with_parts(
        params: Parameters,
        transcipher: Box<dyn Transcipher>,
        codec: TfheCodec,
        perf: PerfLogger,
        receive_endpoint: String,
        send_endpoint: String,
    ) -> CoreResult<Self> {
        let prefix = params.file_prefix(&file_stamp());
        let spool_kreyvium = params.kreyvium_dir().join(format!("{prefix}data_kreyvium.bin"));
        let spool_tfhe = params.tfhe_dir().join(format!("{prefix}data_tfhe.bin"));

        Ok(Self {
            params,
            receive_endpoint,
            send_endpoint,
            spool_kreyvium,
            spool_tfhe,
            transcipher,
            codec,
            perf,
        })
    }

    pub fn run(&mut self) -> CoreResult<()> {
        match self.params.data_handling {
            // measurement isolation: only exercise the client→server leg
            DataHandling::TransmitKreyvium => {
                self.receive_client_data()?;
                Ok(())
            }
            // measurement isolation: only exercise the server→TTP leg
            DataHandling::TransmitTfhe => self.replay_latest(),
            _ => self.run_batches(),
        }
    }

    fn run_batches(&mut self) -> CoreResult<()> {
        log_parameters(&self.params);

        let input = if self.params.data_handling == DataHandling::SingleComponent {
            let dir = self.params.kreyvium_dir();
            latest_stamped_file(&dir)?.ok_or(CoreError::MissingSpool(dir))?
        } else {
            self.receive_client_data()?;
            self.spool_kreyvium.clone()
        };
        let mut reader = SpoolReader::open(input)?;

        self.perf.log("Server initialized");

        for batch_counter in 1..=self.params.batch_count {
            self.perf.log("Server Batch Start");
            let mut batch = Vec::with_capacity(self.params.batch_size);
            for _ in 0..self.params.batch_size {
                self.perf.log("Server Integer Start");
                let kreyvium_ct = reader.next()?.ok_or(CoreError::SpoolExhausted)?;

                self.perf.log("Server Integer Transciphering Start");
                let tfhe_ct = self.transcipher.transcipher(&kreyvium_ct)?;
                self.perf.log("Server Integer Transciphering End");

                batch.push(tfhe_ct);
                self.perf.log("Server Integer End");
            }
            self.perf.log("Server Batch End");

            self.perf.log("Server Batch Transmission Start");
            if batch_counter == 1 {
                // the first transmission carries the one-off socket setup
                self.perf.log("Server Initialisation ZeroMQ Start");
                self.drain(batch)?;
                self.perf.log("Server Initialisation ZeroMQ End");
            } else {
                self.drain(batch)?;
            }
            self.perf.log("Server Batch Transmission End");
            tracing::info!(
                batch = batch_counter,
                batch_size = self.params.batch_size,
                int_bits = self.params.int_bits(),
                "batch transciphered"
            );
        }

        if self.params.data_handling != DataHandling::SingleComponent {
            PushPool::global().send_eof(&self.send_endpoint)?;
        }
        Ok(())
    }

    /// Pulls the client's Kreyvium ciphertexts into this run's spool.
    fn receive_client_data(&self) -> CoreResult<usize> {
        let received = receive_into_spool(
            &self.spool_kreyvium,
            &self.receive_endpoint,
            self.params.total_records(),
            true,
        )?;
        tracing::info!(
            received,
            spool = %self.spool_kreyvium.display(),
            "stored client ciphertexts"
        );
        Ok(received)
    }

    fn drain(&self, batch: Vec<hhe_cipher::TfheCtVec>) -> CoreResult<()> {
        for tfhe_ct in &batch {
            match self.params.data_handling {
                DataHandling::SingleComponent => {
                    append_ciphertexts(&self.spool_tfhe, tfhe_ct, &self.codec)?;
                }
                _ => {
                    let buf = self.codec.encode(tfhe_ct)?;
                    PushPool::global().send(&self.send_endpoint, &buf)?;
                }
            }
        }
        Ok(())
    }

    /// Replay mode: re-sends the most recent TFHE spool to the TTP.
    fn replay_latest(&self) -> CoreResult<()> {
        let dir = self.params.tfhe_dir();
        let latest = latest_stamped_file(&dir)?.ok_or(CoreError::MissingSpool(dir))?;

        let sent = send_spool(&latest, &self.send_endpoint, true)?;
        PushPool::global().send_eof(&self.send_endpoint)?;
        tracing::info!(spool = %latest.display(), sent, "replayed latest spool");
        Ok(())
    }
}
