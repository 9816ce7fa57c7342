//! Scripted in-memory transport
//!
//! Replies are queued per direction and consumed in order. When a queue is
//! empty the transfer "succeeds" with the full buffer length, leaving IN
//! buffers untouched (zeroed by the caller). Every transfer is recorded so
//! tests can assert on what went over the wire and how many times.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::types::{ControlSetup, Direction};
use crate::UsbTransport;

/// How the mock answers the next transfer in a given direction
#[derive(Debug)]
pub enum Reply {
    /// Report the full buffer as transferred
    Accept,
    /// Report this many bytes transferred (may differ from the buffer length)
    Transferred(usize),
    /// Copy these bytes into an IN buffer and report their length
    ///
    /// Bytes beyond the buffer are dropped; the reported length is still the
    /// length of the scripted data, like a device babbling past wLength.
    Data(Vec<u8>),
    /// Fail the transfer
    Fail(TransportError),
    /// Fail a bulk transfer after moving this many bytes
    Partial(usize, TransportError),
}

/// What kind of transfer was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Control(ControlSetup),
    Bulk { endpoint: u8 },
}

/// One transfer as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    pub kind: TransferKind,
    pub direction: Direction,
    /// OUT: payload as sent. IN: buffer contents after the reply was applied.
    pub data: Vec<u8>,
    pub timeout: Duration,
    pub at: Instant,
}

impl RecordedTransfer {
    /// Control setup, if this was a control transfer
    pub fn setup(&self) -> Option<ControlSetup> {
        match self.kind {
            TransferKind::Control(setup) => Some(setup),
            TransferKind::Bulk { .. } => None,
        }
    }
}

#[derive(Default)]
struct MockState {
    out_replies: VecDeque<Reply>,
    in_replies: VecDeque<Reply>,
    transfers: Vec<RecordedTransfer>,
}

/// Transport double with scripted replies and a transfer log
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next host-to-device transfer
    pub fn queue_out(&self, reply: Reply) -> &Self {
        self.state.lock().out_replies.push_back(reply);
        self
    }

    /// Queue the reply for the next device-to-host transfer
    pub fn queue_in(&self, reply: Reply) -> &Self {
        self.state.lock().in_replies.push_back(reply);
        self
    }

    /// All transfers issued so far, in order
    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.state.lock().transfers.clone()
    }

    /// Number of transfers issued so far
    pub fn transfer_count(&self) -> usize {
        self.state.lock().transfers.len()
    }

    /// Most recent transfer, if any
    pub fn last_transfer(&self) -> Option<RecordedTransfer> {
        self.state.lock().transfers.last().cloned()
    }

    fn next_reply(state: &mut MockState, direction: Direction) -> Reply {
        let queue = match direction {
            Direction::Out => &mut state.out_replies,
            Direction::In => &mut state.in_replies,
        };
        queue.pop_front().unwrap_or(Reply::Accept)
    }

    fn record(
        state: &mut MockState,
        kind: TransferKind,
        direction: Direction,
        data: &[u8],
        timeout: Duration,
    ) {
        state.transfers.push(RecordedTransfer {
            kind,
            direction,
            data: data.to_vec(),
            timeout,
            at: Instant::now(),
        });
    }

    /// Apply a reply to a buffer, returning (transferred, status)
    fn apply(
        reply: Reply,
        direction: Direction,
        data: &mut [u8],
    ) -> (usize, Result<(), TransportError>) {
        match reply {
            Reply::Accept => (data.len(), Ok(())),
            Reply::Transferred(n) => (n, Ok(())),
            Reply::Data(bytes) => {
                if direction == Direction::In {
                    let n = bytes.len().min(data.len());
                    data[..n].copy_from_slice(&bytes[..n]);
                }
                (bytes.len(), Ok(()))
            }
            Reply::Fail(e) => (0, Err(e)),
            Reply::Partial(n, e) => (n, Err(e)),
        }
    }
}

impl UsbTransport for MockTransport {
    fn control_transfer(
        &self,
        setup: ControlSetup,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        let direction = setup.direction();
        let reply = Self::next_reply(&mut state, direction);
        debug!("mock control {} ({} bytes): {:?}", setup, data.len(), reply);

        let (transferred, status) = Self::apply(reply, direction, data);
        Self::record(
            &mut state,
            TransferKind::Control(setup),
            direction,
            data,
            timeout,
        );
        status.map(|()| transferred)
    }

    fn bulk_transfer(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> (usize, Result<(), TransportError>) {
        let mut state = self.state.lock();
        let direction = Direction::from_bit7(endpoint);
        let reply = Self::next_reply(&mut state, direction);
        debug!(
            "mock bulk ep=0x{:02X} ({} bytes): {:?}",
            endpoint,
            data.len(),
            reply
        );

        let outcome = Self::apply(reply, direction, data);
        Self::record(
            &mut state,
            TransferKind::Bulk { endpoint },
            direction,
            data,
            timeout,
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn test_default_reply_accepts_full_length() {
        let mock = MockTransport::new();
        let mut buf = [0xAB; 8];
        let n = mock
            .control_transfer(ControlSetup::set_report(0x300, 2), &mut buf, TIMEOUT)
            .unwrap();
        assert_eq!(n, 8);
        assert_eq!(mock.transfer_count(), 1);
        let t = mock.last_transfer().unwrap();
        assert_eq!(t.direction, Direction::Out);
        assert_eq!(t.data, vec![0xAB; 8]);
        assert_eq!(t.timeout, TIMEOUT);
    }

    #[test]
    fn test_in_data_is_copied() {
        let mock = MockTransport::new();
        mock.queue_in(Reply::Data(vec![1, 2, 3]));
        let mut buf = [0u8; 4];
        let n = mock
            .control_transfer(ControlSetup::get_report(0x300, 2), &mut buf, TIMEOUT)
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(buf, [1, 2, 3, 0]);
    }

    #[test]
    fn test_queues_are_per_direction() {
        let mock = MockTransport::new();
        mock.queue_in(Reply::Fail(TransportError::Timeout));
        let mut buf = [0u8; 4];
        // OUT is unaffected by the queued IN failure
        assert!(mock
            .control_transfer(ControlSetup::set_report(0x300, 2), &mut buf, TIMEOUT)
            .is_ok());
        assert!(matches!(
            mock.control_transfer(ControlSetup::get_report(0x300, 2), &mut buf, TIMEOUT),
            Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_bulk_partial() {
        let mock = MockTransport::new();
        mock.queue_out(Reply::Partial(2, TransportError::Timeout));
        let mut buf = [0u8; 16];
        let (n, status) = mock.bulk_transfer(0x06, &mut buf, TIMEOUT);
        assert_eq!(n, 2);
        assert!(matches!(status, Err(TransportError::Timeout)));
        assert_eq!(
            mock.last_transfer().unwrap().kind,
            TransferKind::Bulk { endpoint: 0x06 }
        );
    }
}
