use hhe_core::roles::Client;
use hhe_core::Parameters;
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

    let mut client = Client::new(params)?;
    client.run()?;

    tracing::info!("client run complete");
    Ok(())
}
