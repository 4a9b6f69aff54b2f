use std::fmt;

use crate::Core::error::{BridgeError, BridgeResult};
use crate::Core::link::{AttHandle, ConnHandle};

/// The size of the inline write payload per slot (ATT MTU 23 minus the
/// 3-byte write header).
pub const WRITE_INLINE: usize = 20;

/// CCCD value that switches notifications on.
pub const CCCD_NOTIFY: [u8; 2] = [0x01, 0x00];
/// CCCD value that switches notifications and indications off.
pub const CCCD_DISABLE: [u8; 2] = [0x00, 0x00];

/// Sequence number handed out by [`CommandQueue::enqueue`](crate::CommandQueue::enqueue).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Write value copied into the slot at enqueue time.
///
/// The bytes live inline, so the request never borrows caller memory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct WritePayload {
    len: u8,
    bytes: [u8; WRITE_INLINE],
}

impl WritePayload {
    pub fn new(data: &[u8]) -> BridgeResult<Self> {
        if data.len() > WRITE_INLINE {
            return Err(BridgeError::PayloadTooLarge {
                len: data.len(),
                max: WRITE_INLINE,
            });
        }
        let mut bytes = [0u8; WRITE_INLINE];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self {
            len: data.len() as u8,
            bytes,
        })
    }

    const fn cccd(value: [u8; 2]) -> Self {
        let mut bytes = [0u8; WRITE_INLINE];
        bytes[0] = value[0];
        bytes[1] = value[1];
        Self { len: 2, bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for WritePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x?}", self.as_bytes())
    }
}

/// What to ask of the peer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Read { handle: AttHandle },
    Write { handle: AttHandle, payload: WritePayload },
}

impl Operation {
    pub fn read(handle: AttHandle) -> Self {
        Operation::Read { handle }
    }

    pub fn write(handle: AttHandle, data: &[u8]) -> BridgeResult<Self> {
        Ok(Operation::Write {
            handle,
            payload: WritePayload::new(data)?,
        })
    }

    /// CCCD write that subscribes to notifications on a characteristic.
    pub fn enable_notifications(cccd: AttHandle) -> Self {
        Operation::Write {
            handle: cccd,
            payload: WritePayload::cccd(CCCD_NOTIFY),
        }
    }

    pub fn disable_notifications(cccd: AttHandle) -> Self {
        Operation::Write {
            handle: cccd,
            payload: WritePayload::cccd(CCCD_DISABLE),
        }
    }

    /// Attribute the operation addresses.
    pub fn handle(&self) -> AttHandle {
        match self {
            Operation::Read { handle } | Operation::Write { handle, .. } => *handle,
        }
    }
}

/// One queued request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub target: ConnHandle,
    pub op: Operation,
}
