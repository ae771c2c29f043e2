use crate::config::Config;
use crate::db::RendezvousMap;
use crate::handlers::*;
use crate::resp::*;
use anyhow::{bail, Context};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Accepts connections forever, one task per client.
pub async fn serve(
    listener: TcpListener,
    map: Arc<RendezvousMap<Bytes>>,
    config: Arc<Config>,
) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        info!(%peer, "client connected");

        let map = Arc::clone(&map);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            match handle_client(stream, map, config).await {
                Ok(()) => debug!(%peer, "client disconnected"),
                Err(e) => warn!(%peer, error = %e, "client connection failed"),
            }
        });
    }
}

pub async fn handle_client(
    mut stream: TcpStream,
    map: Arc<RendezvousMap<Bytes>>,
    config: Arc<Config>,
) -> anyhow::Result<()> {
    let mut buffer = BytesMut::with_capacity(512);

    loop {
        while let Some(args) = parse_frame(&mut buffer)? {
            let response = dispatch(&args, &map, &config).await;
            stream.write_all(&response).await?;
        }

        if stream.read_buf(&mut buffer).await? == 0 {
            if buffer.is_empty() {
                return Ok(());
            }
            bail!("connection closed mid-frame ({} bytes pending)", buffer.len());
        }
    }
}

async fn dispatch(args: &[Bytes], map: &RendezvousMap<Bytes>, config: &Config) -> Bytes {
    let Some(cmd) = args.first() else {
        return encode_error("empty command");
    };

    match &cmd.to_ascii_uppercase()[..] {
        b"PING" => handle_ping(args),
        b"ECHO" => handle_echo(args),
        b"SET" => handle_set(args, map),
        b"GET" => handle_get(args, map, config).await,
        _ => encode_error("Unknown command"),
    }
}
