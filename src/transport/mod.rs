//! # Transport Layer
//!
//! A minimal synchronous packet transport seam plus the tracing decorator used
//! when debugging a connection against a reference capture.
//!
//! [`TracedTransport`] wraps any [`PacketTransport`]: it numbers every
//! operation (`op 1`, `op 2`, ...), logs before and after each send and
//! receive, optionally hex dumps the packet, and optionally records sent
//! packets into a [`CaptureSet`] under labels `op1`, `op2`, ... so they can be
//! compared later with captures taken from another implementation.
//!
//! Tracing behavior is driven only by [`TraceConfig`]; nothing here reads the
//! process environment.

use std::collections::VecDeque;
use std::io;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::TraceConfig;
use crate::error::{Result, WireError};
use crate::utils::compare::CaptureSet;
use crate::utils::hexdump::hex_dump;

/// Something that moves whole packets
pub trait PacketTransport {
    fn send(&mut self, packet: &[u8]) -> Result<()>;

    fn receive(&mut self) -> Result<Bytes>;
}

/// In-memory transport: every sent packet is queued and received back in order
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    queue: VecDeque<Bytes>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a packet to be returned by a later `receive`
    pub fn push_incoming(&mut self, packet: impl Into<Bytes>) {
        self.queue.push_back(packet.into());
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl PacketTransport for LoopbackTransport {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        self.queue.push_back(Bytes::copy_from_slice(packet));
        Ok(())
    }

    fn receive(&mut self) -> Result<Bytes> {
        self.queue.pop_front().ok_or_else(|| {
            WireError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no packet queued",
            ))
        })
    }
}

/// Logging decorator around a transport
#[derive(Debug)]
pub struct TracedTransport<T> {
    inner: T,
    config: TraceConfig,
    op_count: u64,
    captures: CaptureSet,
}

impl<T: PacketTransport> TracedTransport<T> {
    pub fn new(inner: T, config: TraceConfig) -> Self {
        Self {
            inner,
            config,
            op_count: 0,
            captures: CaptureSet::new(),
        }
    }

    /// Number of operations issued so far
    pub fn op_count(&self) -> u64 {
        self.op_count
    }

    /// Packets recorded so far (empty unless `record_captures` is set)
    pub fn captures(&self) -> &CaptureSet {
        &self.captures
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn next_op(&mut self) -> u64 {
        self.op_count += 1;
        self.op_count
    }

    fn dump(&self, op: u64, direction: &str, packet: &[u8]) {
        if self.config.trace_packets {
            trace!(
                op,
                direction,
                "packet dump:\n{}",
                hex_dump(packet, self.config.hex_dump_width)
            );
        }
    }
}

impl<T: PacketTransport> PacketTransport for TracedTransport<T> {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let op = self.next_op();
        debug!(op, len = packet.len(), "sending packet");
        self.dump(op, "send", packet);

        if let Err(e) = self.inner.send(packet) {
            warn!(op, error = %e, "send failed");
            return Err(e);
        }

        if self.config.record_captures {
            self.captures
                .insert(format!("op{op}"), Bytes::copy_from_slice(packet));
        }
        debug!(op, "packet sent");
        Ok(())
    }

    fn receive(&mut self) -> Result<Bytes> {
        let op = self.next_op();
        debug!(op, "receiving packet");

        let packet = match self.inner.receive() {
            Ok(packet) => packet,
            Err(e) => {
                warn!(op, error = %e, "receive failed");
                return Err(e);
            }
        };

        self.dump(op, "receive", &packet);
        debug!(op, len = packet.len(), "packet received");
        Ok(packet)
    }
}
