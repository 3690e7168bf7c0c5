//! Example: Diffing an auth message against a reference capture
//!
//! Encodes the first authentication round trip twice (once as this crate
//! sends it, once with an extra session property the way another driver
//! might), runs both through a traced transport, and prints the comparison
//! report plus hex dumps of the packets.
//!
//! Run with: `cargo run --example capture_diff`
//! Set `RUST_LOG=tns_wire=trace` to see per-operation tracing.

#![allow(clippy::uninlined_format_args)]

use tns_wire::config::WireConfig;
use tns_wire::core::serialization::{ExportFormat, MultiFormat};
use tns_wire::transport::{LoopbackTransport, PacketTransport, TracedTransport};
use tns_wire::utils::hex_dump;
use tns_wire::utils::logging::init_logging;
use tns_wire::{AuthMessage, CaptureSet, KeyValuePair};

fn session_properties() -> Vec<KeyValuePair> {
    vec![
        KeyValuePair::new("AUTH_TERMINAL", "unknown", 0),
        KeyValuePair::new("AUTH_PROGRAM_NM", "capture_diff", 0),
        KeyValuePair::new("AUTH_MACHINE", "localhost", 0),
        KeyValuePair::new("AUTH_PID", std::process::id().to_string(), 0),
        KeyValuePair::new("AUTH_SID", "demo", 0),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = WireConfig::default_with_overrides(|c| {
        c.trace.trace_packets = true;
        c.trace.record_captures = true;
        c.trace.hex_dump_width = 16;
        c.logging.app_name = "capture_diff".to_string();
    });
    config.validate_strict()?;
    init_logging(&config.logging)?;

    println!("=== Auth Capture Diff Demo ===\n");

    // 1. Send our phase-one message through a traced transport
    let mut transport = TracedTransport::new(LoopbackTransport::new(), config.trace.clone());
    let ours = AuthMessage::phase_one("scott", session_properties());
    transport.send(&ours.encode_with(&config.buffer)?)?;

    // 2. Build the "reference" capture with one more property
    let mut reference_props = session_properties();
    reference_props.push(KeyValuePair::new("AUTH_CONNECT_STRING", "localhost:1521/FREEPDB1", 0));
    let theirs = AuthMessage::phase_one("scott", reference_props).encode()?;

    let mut reference = CaptureSet::new();
    reference.insert("auth-phase1", theirs.clone());

    // 3. Compare op1 (ours) with the reference
    let report = transport
        .captures()
        .compare_with("op1", &reference, "auth-phase1")?;
    println!("{}\n", report);

    let ours_bytes = transport.captures().get("op1")?;
    println!("ours ({} bytes):\n{}", ours_bytes.len(), hex_dump(ours_bytes, 16));
    println!("reference ({} bytes):\n{}", theirs.len(), hex_dump(&theirs, 16));

    // 4. Decode the reference and show what differs at the field level
    let decoded = AuthMessage::decode(&theirs)?;
    let extra: Vec<_> = decoded
        .pairs
        .iter()
        .filter(|p| ours.pair(&p.key).is_none())
        .map(|p| format!("{}={}", p.key, p.value))
        .collect();
    println!("pairs only in reference: {:?}", extra);

    // 5. Export the report for other tooling
    let json = report.serialize_format(ExportFormat::Json)?;
    println!("\nJSON report: {}", String::from_utf8(json)?);

    // The loopback echoes what we sent; decode it back as a sanity check
    let echoed = AuthMessage::decode(&transport.receive()?)?;
    println!("\nechoed message round-trips: {}", echoed == ours);

    Ok(())
}
