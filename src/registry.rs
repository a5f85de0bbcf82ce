//! Bookkeeping shared by the calling tasks and the event listener.
//!
//! Element states, subscriptions and pending waits live in one [`Registry`]
//! which the session keeps behind a single mutex. Callbacks are never invoked
//! while the registry is borrowed; [`Registry::dispatch`] only hands back the
//! callbacks to run.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};

use crate::element::{ConnectionState, ElementSpec, ElementType};
use crate::error::{CallbackError, Error, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};

/// Event callback stored by a subscription.
pub type Callback = Arc<dyn Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync>;

/// Handle returned by [`Session::subscribe`](crate::Session::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub(crate) type WaitId = u64;

/// Identifies one connect attempt of an element.
pub(crate) type AttemptId = u64;

/// How a connect request relates to the element's current state.
pub(crate) enum ConnectStart {
    /// The caller owns the attempt and has to connect the transport.
    Started(AttemptId),
    /// Already connected with the requested type.
    AlreadyConnected,
    /// Another attempt is in flight. The receiver sees its outcome and is
    /// closed if the element is removed first.
    InProgress(watch::Receiver<ConnectionState>),
}

struct Element {
    name: String,
    element_type: ElementType,
    state: ConnectionState,
    attempt: AttemptId,
    /// Outcome of the current attempt, one channel per attempt
    progress: watch::Sender<ConnectionState>,
}

impl Element {
    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.progress.send(state).ok();
    }
}

struct Subscription {
    id: SubscriptionId,
    element: String,
    kind: EventKind,
    filter: EventFilter,
    callback: Callback,
}

struct PendingWait {
    id: WaitId,
    element: String,
    kind: EventKind,
    filter: EventFilter,
    resolver: oneshot::Sender<Result<ElementEvent>>,
}

impl PendingWait {
    fn fail(self, error: Error) {
        self.resolver.send(Err(error)).ok();
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    closed: bool,
    /// Registered elements in connection order
    elements: Vec<Element>,
    /// Subscriptions in registration order
    subscriptions: Vec<Subscription>,
    waits: Vec<PendingWait>,
}

impl Registry {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn state(&self, name: &str) -> ConnectionState {
        self.element(name)
            .map(|e| e.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Type of a connected element.
    pub(crate) fn require_connected(&self, name: &str) -> Result<ElementType> {
        self.ensure_open()?;
        match self.element(name) {
            Some(e) if e.state == ConnectionState::Connected => Ok(e.element_type),
            _ => Err(Error::UnknownElement(name.to_string())),
        }
    }

    pub(crate) fn connected(&self) -> Vec<ElementSpec> {
        self.elements
            .iter()
            .filter(|e| e.state == ConnectionState::Connected)
            .map(|e| ElementSpec::new(e.name.clone(), e.element_type))
            .collect()
    }

    pub(crate) fn is_registered(&self, name: &str) -> bool {
        self.element(name).is_some()
    }

    /// Moves the element to `Connecting` unless it is already connected or
    /// being connected. A running attempt is joined, never restarted.
    pub(crate) fn begin_connect(
        &mut self,
        name: &str,
        element_type: ElementType,
    ) -> Result<ConnectStart> {
        self.ensure_open()?;

        let attempt = self.next_id();

        if let Some(element) = self.elements.iter_mut().find(|e| e.name == name) {
            match element.state {
                ConnectionState::Connected | ConnectionState::Connecting
                    if element.element_type != element_type =>
                {
                    return Err(Error::WrongElementType {
                        name: name.to_string(),
                        expected: element_type,
                        actual: element.element_type,
                    });
                }
                ConnectionState::Connected => return Ok(ConnectStart::AlreadyConnected),
                ConnectionState::Connecting => {
                    return Ok(ConnectStart::InProgress(element.progress.subscribe()))
                }
                ConnectionState::Failed | ConnectionState::Disconnected => {}
            }
            element.element_type = element_type;
            element.attempt = attempt;
            element.state = ConnectionState::Connecting;
            element.progress = watch::channel(ConnectionState::Connecting).0;
        } else {
            let (progress, _) = watch::channel(ConnectionState::Connecting);
            self.elements.push(Element {
                name: name.to_string(),
                element_type,
                state: ConnectionState::Connecting,
                attempt,
                progress,
            });
        }

        Ok(ConnectStart::Started(attempt))
    }

    /// Completes the connect `attempt` started with
    /// [`begin_connect`](Self::begin_connect). Returns `false` if the element
    /// was disconnected in the meantime.
    pub(crate) fn mark_connected(&mut self, name: &str, attempt: AttemptId) -> bool {
        self.transition(name, attempt, ConnectionState::Connected)
    }

    pub(crate) fn mark_failed(&mut self, name: &str, attempt: AttemptId) -> bool {
        self.transition(name, attempt, ConnectionState::Failed)
    }

    fn transition(&mut self, name: &str, attempt: AttemptId, state: ConnectionState) -> bool {
        match self.elements.iter_mut().find(|e| e.name == name) {
            Some(element)
                if element.attempt == attempt && element.state == ConnectionState::Connecting =>
            {
                element.set_state(state);
                true
            }
            _ => false,
        }
    }

    /// Forgets the element along with its subscriptions. Its pending waits
    /// fail with [`Error::Disconnected`]. Returns the state it was in.
    pub(crate) fn remove_element(&mut self, name: &str) -> Option<ConnectionState> {
        let index = self.elements.iter().position(|e| e.name == name)?;
        let element = self.elements.remove(index);

        self.subscriptions.retain(|s| s.element != name);

        let (aborted, waits): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waits)
            .into_iter()
            .partition(|w| w.element == name);
        self.waits = waits;
        for wait in aborted {
            wait.fail(Error::Disconnected(name.to_string()));
        }

        Some(element.state)
    }

    /// Marks the registry closed and returns the elements that still hold a
    /// transport connection. Returns `None` if it was already closed.
    pub(crate) fn close(&mut self) -> Option<Vec<String>> {
        if self.closed {
            return None;
        }
        self.closed = true;

        self.subscriptions.clear();
        for wait in self.waits.drain(..) {
            wait.fail(Error::SessionClosed);
        }

        Some(
            self.elements
                .drain(..)
                .filter(|e| e.state != ConnectionState::Failed)
                .map(|e| e.name)
                .collect(),
        )
    }

    pub(crate) fn subscribe(
        &mut self,
        element: &str,
        kind: EventKind,
        filter: EventFilter,
        callback: Callback,
    ) -> Result<SubscriptionId> {
        self.require_connected(element)?;

        let id = SubscriptionId(self.next_id());
        self.subscriptions.push(Subscription {
            id,
            element: element.to_string(),
            kind,
            filter,
            callback,
        });

        Ok(id)
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub(crate) fn add_wait(
        &mut self,
        element: &str,
        kind: EventKind,
        filter: EventFilter,
    ) -> Result<(WaitId, oneshot::Receiver<Result<ElementEvent>>)> {
        self.require_connected(element)?;

        let id = self.next_id();
        let (resolver, receiver) = oneshot::channel();
        self.waits.push(PendingWait {
            id,
            element: element.to_string(),
            kind,
            filter,
            resolver,
        });

        Ok((id, receiver))
    }

    pub(crate) fn cancel_wait(&mut self, id: WaitId) -> bool {
        let before = self.waits.len();
        self.waits.retain(|w| w.id != id);
        self.waits.len() != before
    }

    /// Resolves every matching wait and returns the matching callbacks in
    /// registration order. Returns `None` when the event's element is not
    /// connected.
    pub(crate) fn dispatch(&mut self, event: &ElementEvent) -> Option<Vec<Callback>> {
        if self.require_connected(&event.element).is_err() {
            return None;
        }

        let is_match = |element: &str, kind: EventKind, filter: &EventFilter| {
            element == event.element && kind == event.kind && filter.matches(event)
        };

        let (resolved, waits): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waits)
            .into_iter()
            .partition(|w| is_match(&w.element, w.kind, &w.filter));
        self.waits = waits;
        for wait in resolved {
            // The receiver is gone if the waiter gave up in the meantime.
            wait.resolver.send(Ok(event.clone())).ok();
        }

        Some(
            self.subscriptions
                .iter()
                .filter(|s| is_match(&s.element, s.kind, &s.filter))
                .map(|s| s.callback.clone())
                .collect(),
        )
    }

    #[cfg(test)]
    pub(crate) fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[cfg(test)]
    pub(crate) fn wait_count(&self) -> usize {
        self.waits.len()
    }
}
