use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;

use crate::command::{Command, Response};
use crate::element::{DiscoveredElement, ElementType};
use crate::error::TransportError;
use crate::event::ElementEvent;

pub type EventStream = Pin<Box<dyn Stream<Item = ElementEvent> + Send>>;

/// Link to the physical elements.
///
/// Calls are treated as fallible remote operations with their own timeout
/// handling; the session never retries them.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn connect(
        &self,
        name: &str,
        element_type: ElementType,
        timeout: Duration,
    ) -> Result<(), TransportError>;

    async fn disconnect(&self, name: &str) -> Result<(), TransportError>;

    async fn send_command(&self, name: &str, command: &Command) -> Result<Response, TransportError>;

    /// Tear down the link. Called once, after every element is disconnected.
    async fn close(&self) -> Result<(), TransportError>;

    /// Events reported by connected elements, in the order they were received.
    /// Requested once when the session starts.
    async fn events(&self) -> Result<EventStream, TransportError>;

    /// Elements advertising nearby
    async fn discover(&self, _timeout: Duration) -> Result<Vec<DiscoveredElement>, TransportError> {
        Ok(Vec::new())
    }
}
