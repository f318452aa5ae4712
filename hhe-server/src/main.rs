use hhe_core::roles::Server;
use hhe_core::{EncryptionVariant, Parameters};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let params = Parameters::default();
    params.validate()?;
    anyhow::ensure!(
        params.variant == EncryptionVariant::Hhe,
        "the server only participates in the transciphering pipeline"
    );

    let mut server = Server::new(params)?;
    server.run()?;

    tracing::info!("server run complete");
    Ok(())
}
