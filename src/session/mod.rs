use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use stream_cancel::{Trigger, Valve, Valved};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::BroadcastStream;

use crate::command::{Command, Response};
use crate::element::{ConnectionState, DiscoveredElement, ElementSpec, ElementType};
use crate::error::{CallbackError, Error, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::exception;
use crate::registry::{ConnectStart, Registry, SubscriptionId, WaitId};
use crate::transport::Transport;

mod batch;

pub use batch::ElementBatch;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Passed to the transport with every connect request.
    connect_timeout: Duration,
    /// How long a command may take before the caller gets a timeout.
    command_timeout: Duration,
    /// Pause after each disconnect, giving the element time to settle.
    disconnect_delay: Option<Duration>,
    /// Buffer size of the streams returned by [`Session::event_stream`].
    event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(5),
            disconnect_delay: None,
            event_capacity: 16,
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sleep for `delay` after every disconnect
    pub fn disconnect_delay(mut self, delay: Duration) -> Self {
        self.disconnect_delay = Some(delay);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: SessionConfig,
    registry: Mutex<Registry>,
    event_sender: broadcast::Sender<ElementEvent>,
    listener_stopper: Mutex<Option<Trigger>>,
    /// Shared by every stream handed out by [`Session::event_stream`]
    event_stream_valve: Valve,
    event_stream_stopper: Mutex<Option<Trigger>>,
}

/// Connection and event hub for a set of elements sharing one transport.
///
/// `Session` is a cheap handle; clones refer to the same session, so a clone
/// can be captured by event callbacks that need to command other elements.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Start a session on top of `transport` and begin listening for its events.
    pub async fn start(transport: impl Transport, config: SessionConfig) -> Result<Session> {
        let transport: Arc<dyn Transport> = Arc::new(transport);

        let events = transport
            .events()
            .await
            .map_err(|source| Error::Transport {
                context: "event stream".to_string(),
                source,
            })?;

        let (event_sender, _) = broadcast::channel(config.event_capacity);
        let (stopper, events) = Valved::new(events);
        let (event_stream_stopper, event_stream_valve) = Valve::new();

        let session = Session {
            inner: Arc::new(Inner {
                transport,
                config,
                registry: Mutex::new(Registry::default()),
                event_sender,
                listener_stopper: Mutex::new(Some(stopper)),
                event_stream_valve,
                event_stream_stopper: Mutex::new(Some(event_stream_stopper)),
            }),
        };

        let weak = Arc::downgrade(&session.inner);
        tokio::spawn(async move {
            listen(weak, events).await;
        });

        log::info!("Session started");

        Ok(session)
    }

    pub fn state(&self, name: &str) -> ConnectionState {
        self.inner.registry.lock().state(name)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.registry.lock().is_closed()
    }

    /// Connected elements in the order they were connected.
    pub fn connected_elements(&self) -> Vec<ElementSpec> {
        self.inner.registry.lock().connected()
    }

    /// Elements the transport can see nearby
    pub async fn discover(&self, timeout: Duration) -> Result<Vec<DiscoveredElement>> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }

        log::info!("Discovering elements for {:?}", timeout);

        self.inner
            .transport
            .discover(timeout)
            .await
            .map_err(|source| Error::Transport {
                context: "discover".to_string(),
                source,
            })
    }

    /// Connect a single element. Connecting an element that is already
    /// connected with the same type does nothing. If another task is
    /// connecting the same element, this waits for that attempt instead of
    /// starting a second one.
    pub async fn connect(&self, name: &str, element_type: ElementType) -> Result<()> {
        self.establish(name, element_type).await.map(|_| ())
    }

    /// Returns `true` only if this call made the connection.
    async fn establish(&self, name: &str, element_type: ElementType) -> Result<bool> {
        let start = self
            .inner
            .registry
            .lock()
            .begin_connect(name, element_type)?;

        let attempt = match start {
            ConnectStart::Started(attempt) => attempt,
            ConnectStart::AlreadyConnected => {
                log::debug!("Element {} is already connected", name);
                return Ok(false);
            }
            ConnectStart::InProgress(progress) => {
                log::debug!("Element {} is being connected, waiting for it", name);
                return join_connect(name, progress).await.map(|()| false);
            }
        };

        log::info!("Connecting to {} element {}", element_type, name);

        let result = self
            .inner
            .transport
            .connect(name, element_type, self.inner.config.connect_timeout)
            .await;

        match result {
            Ok(()) => {
                if self.inner.registry.lock().mark_connected(name, attempt) {
                    log::info!("Connected to {}", name);
                    return Ok(true);
                }

                log::warn!("Element {} was disconnected while connecting", name);

                // A newer attempt owns the link once the element is registered again
                let registered = self.inner.registry.lock().is_registered(name);
                if !registered {
                    self.inner.transport.disconnect(name).await.ok();
                }
                Err(Error::Disconnected(name.to_string()))
            }
            Err(source) => {
                self.inner.registry.lock().mark_failed(name, attempt);
                log::warn!("Could not connect to {}: {}", name, source);
                Err(Error::ConnectionFailure {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Connect all `elements` in order, or none of them.
    ///
    /// On the first failure the elements connected so far are disconnected
    /// again, in the order they were connected, and the failure is returned.
    /// Elements that were already connected before the call are left alone
    /// and do not become part of the returned batch.
    pub async fn connect_batch<I, E>(&self, elements: I) -> Result<ElementBatch>
    where
        I: IntoIterator<Item = E>,
        E: Into<ElementSpec>,
    {
        let mut connected: Vec<ElementSpec> = Vec::new();

        for spec in elements.into_iter().map(Into::into) {
            match self.establish(&spec.name, spec.element_type).await {
                Ok(true) => connected.push(spec),
                Ok(false) => log::debug!("{} is not owned by this batch", spec.name),
                Err(e) => {
                    log::error!("Failed to connect to element {}: {}", spec.name, e);

                    for element in &connected {
                        if let Err(e) = self.disconnect(&element.name).await {
                            log::warn!("Rollback of {} failed: {}", element.name, e);
                        }
                    }

                    return Err(e);
                }
            }
        }

        Ok(ElementBatch::new(self.clone(), connected))
    }

    /// Disconnect an element and drop its subscriptions. Unknown or already
    /// disconnected elements are ignored.
    pub async fn disconnect(&self, name: &str) -> Result<()> {
        let previous = self.inner.registry.lock().remove_element(name);

        match previous {
            None => {
                log::debug!("Element {} is not connected", name);
                return Ok(());
            }
            Some(ConnectionState::Failed) => return Ok(()),
            Some(_) => {}
        }

        log::info!("Disconnecting {}", name);

        let result = self.inner.transport.disconnect(name).await;

        if let Some(delay) = self.inner.config.disconnect_delay {
            tokio::time::sleep(delay).await;
        }

        result.map_err(|source| Error::Transport {
            context: name.to_string(),
            source,
        })
    }

    /// Disconnect everything and shut the transport down. The session cannot
    /// be used afterwards.
    pub async fn close(&self) -> Result<()> {
        let remaining = match self.inner.registry.lock().close() {
            Some(remaining) => remaining,
            None => {
                log::info!("Session is already closed");
                return Ok(());
            }
        };

        for name in remaining {
            log::info!("Disconnecting {}", name);
            if let Err(e) = self.inner.transport.disconnect(&name).await {
                log::warn!("Could not disconnect {}: {}", name, e);
            }

            if let Some(delay) = self.inner.config.disconnect_delay {
                tokio::time::sleep(delay).await;
            }
        }

        self.inner.listener_stopper.lock().take();
        self.inner.event_stream_stopper.lock().take();

        log::info!("Closing session");

        self.inner
            .transport
            .close()
            .await
            .map_err(|source| Error::Transport {
                context: "close".to_string(),
                source,
            })
    }

    /// Call `callback` for every `kind` event of `element` that passes `filter`.
    ///
    /// Callbacks run on the event listener in registration order. A callback
    /// that fails or panics is reported to the exception handler and does not
    /// affect the others.
    pub fn subscribe<F>(
        &self,
        element: &str,
        kind: EventKind,
        filter: impl Into<EventFilter>,
        callback: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let id = self.inner.registry.lock().subscribe(
            element,
            kind,
            filter.into(),
            Arc::new(callback),
        )?;

        log::debug!("Subscribed to {:?} on {}", kind, element);

        Ok(id)
    }

    /// Returns `false` if there was no such subscription.
    ///
    /// An event that is already being dispatched still reaches the
    /// subscription: dispatch works on the callbacks that matched when the
    /// event arrived, so a callback unsubscribing a later one only affects
    /// the following events.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.registry.lock().unsubscribe(id)
    }

    /// Wait for the next `kind` event of `element` that passes `filter`.
    ///
    /// Fails with [`Error::Timeout`] if nothing arrives within `timeout`; an
    /// event arriving after that is not delivered to this wait.
    pub async fn wait_for_event(
        &self,
        element: &str,
        kind: EventKind,
        filter: impl Into<EventFilter>,
        timeout: Option<Duration>,
    ) -> Result<ElementEvent> {
        let (id, receiver) = self
            .inner
            .registry
            .lock()
            .add_wait(element, kind, filter.into())?;
        let _registration = WaitRegistration {
            registry: &self.inner.registry,
            id,
        };

        log::debug!("Waiting for {:?} on {}", kind, element);

        let outcome = match timeout {
            Some(after) => match tokio::time::timeout(after, receiver).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    log::debug!("Wait for {:?} on {} timed out", kind, element);
                    return Err(Error::timeout(
                        format!("wait for {:?} on {}", kind, element),
                        after,
                    ));
                }
            },
            None => receiver.await,
        };

        outcome.unwrap_or(Err(Error::SessionClosed))
    }

    /// Send a command to a connected element and wait for its response.
    ///
    /// The request runs on its own task. If it does not finish within the
    /// configured command timeout the caller gets [`Error::Timeout`] and the
    /// eventual response is discarded.
    pub async fn send_command(&self, element: &str, command: impl Into<Command>) -> Result<Response> {
        let command = command.into();

        let actual = self.inner.registry.lock().require_connected(element)?;
        let expected = command.element_type();
        if actual != expected {
            return Err(Error::WrongElementType {
                name: element.to_string(),
                expected,
                actual,
            });
        }

        let operation = format!("{:?} on {}", command, element);
        log::trace!("Sending {}", operation);

        let transport = self.inner.transport.clone();
        let name = element.to_string();
        let request = tokio::spawn(async move { transport.send_command(&name, &command).await });

        let after = self.inner.config.command_timeout;
        match tokio::time::timeout(after, request).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(source))) => Err(Error::Transport {
                context: element.to_string(),
                source,
            }),
            Ok(Err(join_error)) => Err(Error::Transport {
                context: element.to_string(),
                source: join_error.to_string().into(),
            }),
            Err(_) => {
                log::warn!("{} timed out", operation);
                Err(Error::timeout(operation, after))
            }
        }
    }

    /// Deliver `event` to the matching waits and subscriptions.
    ///
    /// The event listener calls this for every event from the transport.
    /// Events of elements that are not connected are dropped.
    pub fn dispatch(&self, event: ElementEvent) {
        self.inner.dispatch(event)
    }

    /// Create a new stream that receives every dispatched event. All streams
    /// end when the session is closed.
    pub fn event_stream(&self) -> Valved<Pin<Box<dyn Stream<Item = ElementEvent> + Send>>> {
        let receiver = self.inner.event_sender.subscribe();

        let stream: Pin<Box<dyn Stream<Item = ElementEvent> + Send>> =
            Box::pin(BroadcastStream::new(receiver).filter_map(|x| async move { x.ok() }));

        self.inner.event_stream_valve.wrap(stream)
    }
}

impl Inner {
    fn dispatch(&self, event: ElementEvent) {
        let callbacks = match self.registry.lock().dispatch(&event) {
            Some(callbacks) => callbacks,
            None => {
                log::debug!("Dropping {:?} from {}", event.kind, event.element);
                return;
            }
        };

        log::trace!("Dispatching {:?} to {} callbacks", event, callbacks.len());

        self.event_sender.send(event.clone()).ok();

        for callback in callbacks {
            let source: CallbackError =
                match panic::catch_unwind(AssertUnwindSafe(|| callback(&event))) {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => e,
                    Err(panic) => exception::panic_message(panic.as_ref()).into(),
                };

            exception::report(Error::CallbackFailure {
                element: event.element.clone(),
                kind: event.kind,
                source,
            });
        }
    }
}

async fn join_connect(name: &str, mut progress: watch::Receiver<ConnectionState>) -> Result<()> {
    loop {
        let state = *progress.borrow();
        match state {
            ConnectionState::Connected => return Ok(()),
            ConnectionState::Connecting => {}
            ConnectionState::Failed => {
                return Err(Error::ConnectionFailure {
                    name: name.to_string(),
                    source: "concurrent connect attempt failed".into(),
                })
            }
            ConnectionState::Disconnected => return Err(Error::Disconnected(name.to_string())),
        }

        // Closed when the element is removed while connecting
        if progress.changed().await.is_err() {
            return Err(Error::Disconnected(name.to_string()));
        }
    }
}

async fn listen(session: Weak<Inner>, mut events: Valved<crate::transport::EventStream>) {
    while let Some(event) = events.next().await {
        match session.upgrade() {
            Some(inner) => inner.dispatch(event),
            None => break,
        }
    }

    log::info!("Event listener was stopped.");
}

/// Removes a pending wait however the waiting future ends.
struct WaitRegistration<'a> {
    registry: &'a Mutex<Registry>,
    id: WaitId,
}

impl Drop for WaitRegistration<'_> {
    fn drop(&mut self) {
        self.registry.lock().cancel_wait(self.id);
    }
}
