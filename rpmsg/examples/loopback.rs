//! Echo firmware and a host talking over two file-backed rings in one
//! process.
//!
//! Run with: `RUST_LOG=debug cargo run --example loopback`

use rpmsg::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

const ECHO_PORT: Address = Address(30);
const HOST_PORT: Address = Address(1024);

/// Coprocessor side: answer every message by swapping source and destination.
fn echo_pending<Tx: Virtqueue, Rx: Virtqueue>(
    transport: &mut Transport<Tx, Rx>,
) -> Result<usize, TransportError> {
    let mut buf = SlotBuffer::new();
    let mut echoed = 0;
    loop {
        match transport.receive(buf.as_mut_slice()) {
            Ok(msg) => {
                transport.send(msg.destination, msg.source, &buf.as_slice()[..msg.len])?;
                echoed += 1;
            }
            Err(TransportError::NoBufferAvailable) => return Ok(echoed),
            Err(e) => return Err(e),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let vring0 = dir.path().join("vring0");
    let vring1 = dir.path().join("vring1");
    let config = VringConfig::default();
    rpmsg::vring::create(&vring0, &config)?;
    rpmsg::vring::create(&vring1, &config)?;

    // Host side.
    let mut host_rx = DriverQueue::open(&vring0)?;
    let mut host_tx = DriverQueue::open(&vring1)?;
    let posted = host_rx.fill();
    tracing::info!("Host posted {} receive buffers", posted);

    // Coprocessor side, counting the interrupts it raises towards the host.
    let interrupts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&interrupts);
    let to_host = DeviceQueue::open(&vring0)?.with_notifier(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    let from_host = DeviceQueue::open(&vring1)?;
    let mut transport = Transport::new(to_host, from_host);

    transport.announce_channel(NsAction::Create, "rpmsg-echo", "Echo channel", ECHO_PORT)?;
    if let Some(used) = host_rx.take_used()? {
        let (header, payload) = split_frame(&used.data)?;
        let ns = NameServiceMessage::decode(payload)?;
        tracing::info!(
            "Host name service: {:?} '{}' ({}) at {} from {}",
            ns.action,
            ns.name,
            ns.description,
            ns.port,
            header.source
        );
        host_rx.post_buffer()?;
    }

    for text in ["hello", "from", "the host"] {
        let mut frame = vec![0u8; RpmsgHeader::ENCODED_LENGTH + text.len()];
        RpmsgHeader::new(HOST_PORT, ECHO_PORT, text.len() as u16).encode(&mut frame)?;
        frame.put_bytes(RpmsgHeader::ENCODED_LENGTH, text.as_bytes());
        host_tx.post_message(&frame)?;
    }

    let echoed = echo_pending(&mut transport)?;
    tracing::info!("Coprocessor echoed {} messages", echoed);

    while host_tx.take_used()?.is_some() {}
    while let Some(used) = host_rx.take_used()? {
        let (header, payload) = split_frame(&used.data)?;
        tracing::info!(
            "Host received {:?} from {} to {}",
            String::from_utf8_lossy(payload),
            header.source,
            header.destination
        );
        host_rx.post_buffer()?;
    }

    transport.announce_channel(NsAction::Destroy, "rpmsg-echo", "Echo channel", ECHO_PORT)?;
    tracing::info!(
        "Done, {} interrupts raised towards the host",
        interrupts.load(Ordering::Relaxed)
    );
    Ok(())
}
