// Dispatches peer events to the channel producers and the command queue.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Command::{CommandQueue, Completed, Confirmation, Operation};
use crate::Core::config::ChannelConfig;
use crate::Core::error::{BridgeError, BridgeResult};
use crate::Core::link::{AttHandle, ConnHandle, PeerLink};
use crate::SPSC::ChannelProducer;

/// Events the radio stack raises for the bridged peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerEvent<'a> {
    Connected { conn: ConnHandle },
    Disconnected { conn: ConnHandle },
    /// Value notification on a characteristic.
    Notification {
        conn: ConnHandle,
        handle: AttHandle,
        data: &'a [u8],
    },
    WriteResponse {
        conn: ConnHandle,
        handle: AttHandle,
        status: u16,
    },
    ReadResponse {
        conn: ConnHandle,
        handle: AttHandle,
        status: u16,
        data: &'a [u8],
    },
}

impl PeerEvent<'_> {
    pub fn conn(&self) -> ConnHandle {
        match *self {
            PeerEvent::Connected { conn }
            | PeerEvent::Disconnected { conn }
            | PeerEvent::Notification { conn, .. }
            | PeerEvent::WriteResponse { conn, .. }
            | PeerEvent::ReadResponse { conn, .. } => conn,
        }
    }
}

/// A request retired by a peer response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retired<'a> {
    pub completed: Completed,
    /// Attribute value returned by a successful read. `None` for writes and
    /// failed reads.
    pub value: Option<&'a [u8]>,
}

struct Route {
    producer: ChannelProducer,
    cccd: Option<AttHandle>,
}

/// Event-context half of the bridge.
///
/// Owns the producer end of every channel, keyed by the notification handle
/// that feeds it, and shares the command queue with application logic.
pub struct EventRouter<L: PeerLink> {
    conn: Option<ConnHandle>,
    routes: BTreeMap<AttHandle, Route>,
    queue: Arc<CommandQueue<L>>,
}

impl<L: PeerLink> EventRouter<L> {
    pub fn new(queue: Arc<CommandQueue<L>>) -> Self {
        Self {
            conn: None,
            routes: BTreeMap::new(),
            queue,
        }
    }

    /// Route notifications on `notify` into `producer`. `cccd`, when given,
    /// is the descriptor written by [`subscribe_all`](Self::subscribe_all).
    pub fn add_route(
        &mut self,
        notify: AttHandle,
        cccd: Option<AttHandle>,
        producer: ChannelProducer,
    ) -> BridgeResult<()> {
        if self.routes.contains_key(&notify) {
            return Err(BridgeError::Config(format!(
                "notification handle 0x{:04x} already routed",
                notify.0
            )));
        }
        self.routes.insert(notify, Route { producer, cccd });
        Ok(())
    }

    /// Route every configured channel that names a notification handle.
    /// Returns how many routes were added; the remaining producers are
    /// handed back for the caller to feed directly.
    pub fn add_configured(
        &mut self,
        channels: Vec<(ChannelConfig, ChannelProducer)>,
    ) -> BridgeResult<(usize, Vec<ChannelProducer>)> {
        let mut routed = 0;
        let mut unrouted = Vec::new();
        for (config, producer) in channels {
            match config.notify_handle {
                Some(h) => {
                    self.add_route(AttHandle(h), config.cccd_handle.map(AttHandle), producer)?;
                    routed += 1;
                }
                None => unrouted.push(producer),
            }
        }
        Ok((routed, unrouted))
    }

    /// Handle one event. Returns the request retired by a response, if any,
    /// with the value a read brought back.
    ///
    /// Every event also re-drives the command queue, so a head the link
    /// refused earlier goes out again without waiting for a confirmation.
    /// Overflow on a channel is reported as `RingBufferOverflow`; the bytes
    /// that fit are kept.
    pub fn on_event<'a>(&mut self, event: PeerEvent<'a>) -> BridgeResult<Option<Retired<'a>>> {
        let result = self.dispatch(event);
        self.queue.kick();
        result
    }

    fn dispatch<'a>(&mut self, event: PeerEvent<'a>) -> BridgeResult<Option<Retired<'a>>> {
        match event {
            PeerEvent::Connected { conn } => {
                log::info!("radio-bridge: connected on {:?}", conn);
                self.conn = Some(conn);
                Ok(None)
            }
            PeerEvent::Disconnected { conn } => {
                if self.conn == Some(conn) {
                    log::info!("radio-bridge: disconnected from {:?}", conn);
                    self.conn = None;
                    self.queue.discard_target(conn);
                }
                Ok(None)
            }
            _ if Some(event.conn()) != self.conn => Ok(None),
            PeerEvent::Notification { handle, data, .. } => match self.routes.get_mut(&handle) {
                Some(route) => route.producer.deliver(data).map(|()| None),
                None => {
                    log::debug!("radio-bridge: notification on unrouted handle 0x{:04x}", handle.0);
                    Ok(None)
                }
            },
            PeerEvent::WriteResponse { conn, handle, status } => Ok(self.confirm(conn, handle, status, None)),
            PeerEvent::ReadResponse {
                conn,
                handle,
                status,
                data,
            } => Ok(self.confirm(conn, handle, status, Some(data))),
        }
    }

    fn confirm<'a>(
        &self,
        conn: ConnHandle,
        handle: AttHandle,
        status: u16,
        data: Option<&'a [u8]>,
    ) -> Option<Retired<'a>> {
        match self.queue.in_flight() {
            Some(r) if r.target == conn && r.op.handle() == handle => {
                let completed = self
                    .queue
                    .advance_on_confirmation(Confirmation::from_gatt_status(status))?;
                let value = match completed.outcome {
                    Confirmation::Success => data,
                    _ => None,
                };
                Some(Retired { completed, value })
            }
            _ => {
                log::debug!(
                    "radio-bridge: response for 0x{:04x} does not match the request in flight",
                    handle.0
                );
                None
            }
        }
    }

    /// Enqueue a notification-enable write for every route that has a CCCD.
    /// Returns how many were queued.
    pub fn subscribe_all(&self) -> BridgeResult<usize> {
        let Some(conn) = self.conn else {
            return Err(BridgeError::NotConnected);
        };

        let mut queued = 0;
        for route in self.routes.values() {
            if let Some(cccd) = route.cccd {
                log::debug!(
                    "radio-bridge: enabling notifications for {} via CCCD 0x{:04x}",
                    route.producer.meta().label(),
                    cccd.0
                );
                self.queue.enqueue(conn, Operation::enable_notifications(cccd))?;
                queued += 1;
            }
        }
        Ok(queued)
    }

    pub fn connection(&self) -> Option<ConnHandle> {
        self.conn
    }

    pub fn queue(&self) -> &Arc<CommandQueue<L>> {
        &self.queue
    }

    pub fn producer(&self, notify: AttHandle) -> Option<&ChannelProducer> {
        self.routes.get(&notify).map(|r| &r.producer)
    }
}
