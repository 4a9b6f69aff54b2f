// In demos/bridge_sim.rs
//
// Runs the bridge against a simulated peer: three sensor streams notify at
// different rates, CCCD writes are confirmed one at a time, and transfers
// go to a writer that prints a line per hundred.
//
//   RUST_LOG=debug cargo run --example bridge_sim -- [config.toml] [--seconds N]

use parking_lot::Mutex;
use radio_bridge::{
    AttHandle, BridgeConfig, BulkWriter, ChannelBridge, CommandQueue, ConnHandle, EventRouter, Operation,
    PeerEvent, PeerLink, SubmitError, WriteError,
};
use std::collections::{BTreeMap, VecDeque};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const CONN: ConnHandle = ConnHandle(1);

/// Peer side: every accepted request is answered on a later pump.
#[derive(Default)]
struct SimLink {
    outstanding: Mutex<VecDeque<(ConnHandle, Operation)>>,
}

impl PeerLink for SimLink {
    fn submit(&self, target: ConnHandle, op: &Operation) -> Result<(), SubmitError> {
        self.outstanding.lock().push_back((target, *op));
        Ok(())
    }
}

#[derive(Default)]
struct PrintingWriter {
    per_tag: BTreeMap<[u8; 4], u64>,
    total: u64,
}

impl BulkWriter for PrintingWriter {
    fn write(&mut self, transfer: &[u8]) -> Result<(), WriteError> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&transfer[..4]);
        *self.per_tag.entry(tag).or_default() += 1;
        self.total += 1;
        if self.total % 100 == 0 {
            println!(
                "transfer {} ({} bytes, tag {})",
                self.total,
                transfer.len(),
                String::from_utf8_lossy(&tag)
            );
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = match args.first().filter(|a| !a.starts_with("--")) {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    let seconds = args
        .iter()
        .position(|a| a == "--seconds")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok());

    // handles for channels the config leaves unassigned
    for (i, ch) in config.channels.iter_mut().enumerate() {
        let base = 0x10 * (i as u16 + 1);
        ch.notify_handle.get_or_insert(base);
        ch.cccd_handle.get_or_insert(base + 1);
    }

    let (mut bridge, producers) = ChannelBridge::from_config(&config, PrintingWriter::default())?;
    let queue = Arc::new(CommandQueue::with_capacity(SimLink::default(), config.command_capacity)?);
    let mut router = EventRouter::new(Arc::clone(&queue));
    let (routed, _) = router.add_configured(producers)?;
    println!("bridge_sim: {} channel(s) routed", routed);

    let streams: Vec<(AttHandle, usize)> = config
        .channels
        .iter()
        .enumerate()
        .filter_map(|(i, ch)| ch.notify_handle.map(|h| (AttHandle(h), 244 / (i + 1))))
        .collect();

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_for_handler = Arc::clone(&keep_running);

    // Handle Ctrl+C to stop the loop
    ctrlc::set_handler(move || {
        keep_running_for_handler.store(false, Ordering::SeqCst);
    })?;

    router.on_event(PeerEvent::Connected { conn: CONN })?;
    router.subscribe_all()?;

    let started = Instant::now();
    let mut tick = 0u8;
    let mut pump = || {
        // confirm whatever the peer was asked since the last pump
        let answered: Vec<_> = queue.link().outstanding.lock().drain(..).collect();
        for (conn, op) in answered {
            let event = match op {
                Operation::Write { handle, .. } => PeerEvent::WriteResponse { conn, handle, status: 0 },
                Operation::Read { handle } => PeerEvent::ReadResponse {
                    conn,
                    handle,
                    status: 0,
                    data: &[],
                },
            };
            if let Err(e) = router.on_event(event) {
                log::warn!("bridge_sim: {e}");
            }
        }

        tick = tick.wrapping_add(1);
        let sample = [tick; 244];
        for &(handle, len) in &streams {
            let event = PeerEvent::Notification {
                conn: CONN,
                handle,
                data: &sample[..len],
            };
            if let Err(e) = router.on_event(event) {
                log::warn!("bridge_sim: {e}");
            }
        }

        if seconds.is_some_and(|s| started.elapsed() >= Duration::from_secs(s)) {
            keep_running.store(false, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(1));
        false
    };

    let report = bridge.run(&mut pump, &keep_running);

    println!(
        "bridge_sim: {} transfers written, {} lost",
        report.written, report.lost
    );
    for (tag, n) in &bridge.writer().per_tag {
        println!("  {}: {}", String::from_utf8_lossy(tag), n);
    }
    Ok(())
}
