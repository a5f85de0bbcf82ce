//! In-process transport used for simulations and tests.
//!
//! Elements "exist" as soon as they are connected, unless told to fail.
//! Events are injected with [`MemoryTransport::emit`] and every call made by
//! the session is recorded.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::command::{Command, Response};
use crate::element::{DiscoveredElement, ElementType};
use crate::error::TransportError;
use crate::event::ElementEvent;
use crate::transport::{EventStream, Transport};

/// A call received by a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Connect(String, ElementType),
    Disconnect(String),
    Command(String, Command),
    Close,
}

#[derive(Default)]
struct State {
    connected: HashSet<String>,
    failing_connects: HashSet<String>,
    failing_disconnects: HashSet<String>,
    responses: HashMap<String, VecDeque<Response>>,
    connect_delay: Option<Duration>,
    command_delay: Option<Duration>,
    discoverable: Vec<DiscoveredElement>,
    calls: Vec<TransportCall>,
    closed: bool,
}

struct Inner {
    state: Mutex<State>,
    event_sender: mpsc::UnboundedSender<ElementEvent>,
    event_receiver: Mutex<Option<mpsc::UnboundedReceiver<ElementEvent>>>,
}

#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<Inner>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        MemoryTransport::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                event_sender,
                event_receiver: Mutex::new(Some(event_receiver)),
            }),
        }
    }

    /// Make every connect attempt to `name` fail
    pub fn fail_connect(&self, name: impl Into<String>) {
        self.inner.state.lock().failing_connects.insert(name.into());
    }

    /// Make every disconnect of `name` fail
    pub fn fail_disconnect(&self, name: impl Into<String>) {
        self.inner
            .state
            .lock()
            .failing_disconnects
            .insert(name.into());
    }

    /// Queue a response for the next command sent to `name`. Commands without
    /// a queued response are answered with [`Response::Ack`].
    pub fn push_response(&self, name: impl Into<String>, response: Response) {
        self.inner
            .state
            .lock()
            .responses
            .entry(name.into())
            .or_default()
            .push_back(response);
    }

    /// Delay the outcome of every connect attempt by `delay`
    pub fn delay_connects(&self, delay: Duration) {
        self.inner.state.lock().connect_delay = Some(delay);
    }

    /// Delay every command response by `delay`
    pub fn delay_commands(&self, delay: Duration) {
        self.inner.state.lock().command_delay = Some(delay);
    }

    pub fn add_discoverable(&self, element: DiscoveredElement) {
        self.inner.state.lock().discoverable.push(element);
    }

    /// Deliver an event as if the element had reported it.
    /// Returns `false` once the session has stopped listening.
    pub fn emit(&self, event: ElementEvent) -> bool {
        self.inner.event_sender.send(event).is_ok()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.state.lock().calls.clone()
    }

    pub fn is_connected(&self, name: &str) -> bool {
        self.inner.state.lock().connected.contains(name)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(
        &self,
        name: &str,
        element_type: ElementType,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        let delay = {
            let mut state = self.inner.state.lock();
            state
                .calls
                .push(TransportCall::Connect(name.to_string(), element_type));
            state.connect_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.inner.state.lock();
        if state.failing_connects.contains(name) {
            return Err(format!("element {} not found", name).into());
        }

        state.connected.insert(name.to_string());
        Ok(())
    }

    async fn disconnect(&self, name: &str) -> Result<(), TransportError> {
        let mut state = self.inner.state.lock();
        state.calls.push(TransportCall::Disconnect(name.to_string()));
        state.connected.remove(name);

        if state.failing_disconnects.contains(name) {
            return Err(format!("could not disconnect {}", name).into());
        }
        Ok(())
    }

    async fn send_command(&self, name: &str, command: &Command) -> Result<Response, TransportError> {
        let delay = {
            let mut state = self.inner.state.lock();
            state
                .calls
                .push(TransportCall::Command(name.to_string(), command.clone()));

            if !state.connected.contains(name) {
                return Err(format!("element {} is not connected", name).into());
            }
            state.command_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .inner
            .state
            .lock()
            .responses
            .get_mut(name)
            .and_then(VecDeque::pop_front);

        Ok(response.unwrap_or(Response::Ack))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.inner.state.lock();
        state.calls.push(TransportCall::Close);
        state.closed = true;
        Ok(())
    }

    async fn events(&self) -> Result<EventStream, TransportError> {
        let receiver = self
            .inner
            .event_receiver
            .lock()
            .take()
            .ok_or("event stream was already taken")?;

        Ok(Box::pin(UnboundedReceiverStream::new(receiver)))
    }

    async fn discover(&self, _timeout: Duration) -> Result<Vec<DiscoveredElement>, TransportError> {
        Ok(self.inner.state.lock().discoverable.clone())
    }
}
