use rand::rngs::OsRng;
use rand::RngCore;
use tfhe::boolean::parameters::DEFAULT_PARAMETERS;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hhe_cipher::{keystore, TfheSecretKeySet, KEY_BYTES};
use hhe_core::Parameters;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let keys_dir = Parameters::default().keys_dir();

    let mut kreyvium_key = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut kreyvium_key);

    tracing::info!("generating TFHE key set, this takes a moment");
    let tfhe_keys = TfheSecretKeySet::generate(&DEFAULT_PARAMETERS);

    keystore::save_kreyvium_key(&keys_dir.join(keystore::KREYVIUM_KEY_FILE), &kreyvium_key)?;
    keystore::save_tfhe_params(&keys_dir.join(keystore::TFHE_PARAMS_FILE), &DEFAULT_PARAMETERS)?;
    keystore::save_tfhe_secret_set(&keys_dir.join(keystore::TFHE_SECRET_FILE), &tfhe_keys)?;

    tracing::info!(dir = %keys_dir.display(), "key generation complete");
    Ok(())
}
