use anyhow::Context;
use rendezvous_kv::handler::serve;
use rendezvous_kv::{demo, Config, Mode, RendezvousMap};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_args(std::env::args().skip(1)).context("parsing arguments")?;

    match config.mode {
        Mode::Demo => {
            let demo_config = config.demo.clone();
            let reads = tokio::task::spawn_blocking(move || {
                demo::run(&demo_config, Arc::new(RendezvousMap::new()))
            })
            .await??;
            let released = reads.iter().filter(|read| read.is_some()).count();
            info!(readers = reads.len(), released, "demo finished");
            Ok(())
        }
        Mode::Serve => {
            let address = config.listen_address();
            let listener = TcpListener::bind(&address)
                .await
                .with_context(|| format!("binding {}", address))?;
            info!("Listening on {}", address);

            serve(listener, Arc::new(RendezvousMap::new()), Arc::new(config)).await
        }
    }
}
