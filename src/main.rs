mod app;
mod modules;
mod types;
mod utils;

use crate::{
    app::App,
    types::{Config, StartupError, ToContext},
};
use std::sync::Arc;
use tracing_subscriber::{prelude::*, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    init_tracing();

    let ctx = Config::from_env()?.to_context().await.map_err(|err| {
        tracing::error!("Failed to start: {}", err);
        err
    })?;

    App::new(Arc::new(ctx)).serve().await?;

    Ok(())
}
