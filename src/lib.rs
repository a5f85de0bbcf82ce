//! Session management for Bluetooth-connected Plezmo elements.
//!
//! A [`Session`] connects named elements through a [`Transport`], routes the
//! events they report to subscribed callbacks and waiting tasks, and sends
//! them commands. Failures inside callbacks never reach the event listener;
//! they go to the handler installed with [`register_exception_handler`].
//!
//! ## Usage
//!
//! Connect a color sensor and a motor, start the motor whenever the sensor
//! sees green and stop it on red:
//!
//! ```rust,no_run
//! use plezmo_session::elements::color::SensorColor;
//! use plezmo_session::elements::motor::{MotorDirection, MotorSpeed};
//! use plezmo_session::{ElementType, Error, MemoryTransport, Session, SessionConfig};
//! use tokio::time::{sleep, Duration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     pretty_env_logger::init();
//!
//!     plezmo_session::register_exception_handler(|e| log::info!("Got exception {}", e));
//!
//!     let session = Session::start(MemoryTransport::new(), SessionConfig::default()).await?;
//!     let batch = session
//!         .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
//!         .await?;
//!
//!     let motor = session.motor("Motor");
//!     session.color("Color").on_color_change(SensorColor::Green, move |_| {
//!         let motor = motor.clone();
//!         tokio::spawn(async move { motor.start(MotorSpeed::High, MotorDirection::Clockwise).await });
//!         Ok(())
//!     })?;
//!
//!     let motor = session.motor("Motor");
//!     session.color("Color").on_color_change(SensorColor::Red, move |_| {
//!         let motor = motor.clone();
//!         tokio::spawn(async move { motor.stop().await });
//!         Ok(())
//!     })?;
//!
//!     sleep(Duration::from_secs(20)).await;
//!
//!     batch.release().await?;
//!     session.close().await
//! }
//!```

#![warn(clippy::all, future_incompatible, nonstandard_style, rust_2018_idioms)]

pub use command::{Command, Response};
pub use element::{ConnectionState, DiscoveredElement, ElementSpec, ElementType};
pub use error::{CallbackError, Error, Result, TransportError};
pub use event::{ElementEvent, EventFilter, EventKind, EventValue};
pub use exception::{clear_exception_handler, register_exception_handler, ExceptionHandler};
pub use memory::{MemoryTransport, TransportCall};
pub use registry::{Callback, SubscriptionId};
pub use session::{ElementBatch, Session, SessionConfig};
pub use transport::{EventStream, Transport};

mod command;
mod element;
mod error;
mod event;
mod exception;
mod memory;
mod registry;
mod session;
mod transport;

pub mod elements;
