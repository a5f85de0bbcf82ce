//! Typed access to each kind of element.
//!
//! Every facade is a cheap handle holding a [`Session`] clone and the
//! element's name, so it can be moved into event callbacks and spawned tasks.

use std::time::Duration;

use crate::command::{Command, Response};
use crate::error::{CallbackError, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::registry::SubscriptionId;
use crate::Session;

pub mod color;
pub mod display;
pub mod distance;
pub mod light;
pub mod motion;
pub mod motor;
pub mod music;

pub use color::Color;
pub use display::Display;
pub use distance::Distance;
pub use light::Light;
pub use motion::Motion;
pub use motor::Motor;
pub use music::Music;

#[derive(Clone)]
pub(crate) struct Handle {
    session: Session,
    name: String,
}

impl Handle {
    fn new(session: &Session, name: impl Into<String>) -> Self {
        Self {
            session: session.clone(),
            name: name.into(),
        }
    }

    async fn command(&self, command: impl Into<Command>) -> Result<Response> {
        self.session.send_command(&self.name, command).await
    }

    async fn ack(&self, command: impl Into<Command>) -> Result<()> {
        self.command(command).await?.into_ack()
    }

    fn subscribe(
        &self,
        kind: EventKind,
        filter: EventFilter,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.session.subscribe(&self.name, kind, filter, callback)
    }

    async fn wait(
        &self,
        kind: EventKind,
        filter: EventFilter,
        timeout: Option<Duration>,
    ) -> Result<ElementEvent> {
        self.session
            .wait_for_event(&self.name, kind, filter, timeout)
            .await
    }
}

impl Session {
    pub fn color(&self, name: impl Into<String>) -> Color {
        Color(Handle::new(self, name))
    }

    pub fn light(&self, name: impl Into<String>) -> Light {
        Light(Handle::new(self, name))
    }

    pub fn display(&self, name: impl Into<String>) -> Display {
        Display(Handle::new(self, name))
    }

    pub fn distance(&self, name: impl Into<String>) -> Distance {
        Distance(Handle::new(self, name))
    }

    pub fn motion(&self, name: impl Into<String>) -> Motion {
        Motion(Handle::new(self, name))
    }

    pub fn motor(&self, name: impl Into<String>) -> Motor {
        Motor(Handle::new(self, name))
    }

    pub fn music(&self, name: impl Into<String>) -> Music {
        Music(Handle::new(self, name))
    }
}
