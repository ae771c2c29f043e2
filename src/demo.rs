use crate::config::DemoConfig;
use crate::db::RendezvousMap;
use anyhow::anyhow;
use std::sync::Arc;
use std::thread;
use tracing::info;

pub const DEMO_KEY: &str = "key";

/// Blocks `readers` threads on [`DEMO_KEY`], waits `writer_delay`, then lets
/// `writers` threads race to set it. Returns what each reader observed, in
/// reader order; `None` means that reader timed out.
pub fn run(config: &DemoConfig, map: Arc<RendezvousMap<usize>>) -> anyhow::Result<Vec<Option<usize>>> {
    let readers: Vec<_> = (0..config.readers)
        .map(|id| {
            let map = Arc::clone(&map);
            let timeout = config.reader_timeout;
            thread::spawn(move || {
                let value = map.get(DEMO_KEY, timeout);
                info!(reader = id, ?value, "read finished");
                value
            })
        })
        .collect();

    thread::sleep(config.writer_delay);

    let writers: Vec<_> = (0..config.writers)
        .map(|value| {
            let map = Arc::clone(&map);
            thread::spawn(move || map.put(DEMO_KEY, value))
        })
        .collect();

    for writer in writers {
        writer.join().map_err(|_| anyhow!("writer thread panicked"))?;
    }
    readers
        .into_iter()
        .map(|reader| reader.join().map_err(|_| anyhow!("reader thread panicked")))
        .collect()
}
