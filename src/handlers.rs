use crate::config::Config;
use crate::db::RendezvousMap;
use crate::resp::*;
use bytes::Bytes;
use std::time::Duration;

/// Longest wait a client can ask `GET` for; larger values are clamped.
pub const MAX_GET_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub fn handle_ping(_args: &[Bytes]) -> Bytes {
    encode_simple_string("PONG")
}

pub fn handle_echo(args: &[Bytes]) -> Bytes {
    if args.len() != 2 {
        encode_error("wrong number of arguments for 'echo' command")
    } else {
        encode_bulk_string(&args[1])
    }
}

fn parse_key(raw: &Bytes) -> Option<String> {
    std::str::from_utf8(raw).ok().map(str::to_owned)
}

fn parse_timeout(raw: &Bytes) -> Option<Duration> {
    let secs = std::str::from_utf8(raw).ok()?.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs)
        .ok()
        .map(|timeout| timeout.min(MAX_GET_TIMEOUT))
}

pub fn handle_set(args: &[Bytes], map: &RendezvousMap<Bytes>) -> Bytes {
    if args.len() != 3 {
        return encode_error("wrong number of arguments for 'set' command");
    }
    match parse_key(&args[1]) {
        Some(key) => {
            map.put(key, args[2].clone());
            encode_simple_string("OK")
        }
        None => encode_error("key is not valid UTF-8"),
    }
}

/// `GET key [timeout]`: waits up to `timeout` seconds (or the configured
/// default) for the key, replying with a null bulk string on timeout.
pub async fn handle_get(args: &[Bytes], map: &RendezvousMap<Bytes>, config: &Config) -> Bytes {
    if args.len() < 2 || args.len() > 3 {
        return encode_error("wrong number of arguments for 'get' command");
    }
    let Some(key) = parse_key(&args[1]) else {
        return encode_error("key is not valid UTF-8");
    };
    let timeout = match args.get(2) {
        Some(raw) => match parse_timeout(raw) {
            Some(timeout) => timeout,
            None => return encode_error("timeout is not a float or out of range"),
        },
        None => config.default_timeout,
    };

    match map.get_async(&key, timeout).await {
        Some(value) => encode_bulk_string(&value),
        None => encode_null_bulk_string(),
    }
}
