use std::time::Duration;

use super::Handle;
use crate::command::Response;
use crate::error::{CallbackError, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::registry::SubscriptionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tilt {
    Left,
    Right,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Start,
    Stop,
}

/// Axis an angle is measured around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftToRight,
    FrontToBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccelerationAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionCommand {
    GetAngle(Axis),
    GetAcceleration(AccelerationAxis),
}

/// Motion sensor element.
#[derive(Clone)]
pub struct Motion(pub(super) Handle);

impl Motion {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn on_tilt(
        &self,
        tilt: Tilt,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::Tilt, EventFilter::value(tilt), callback)
    }

    /// Call `callback` when the element is laid flat
    pub fn on_flat(
        &self,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0.subscribe(EventKind::Flat, EventFilter::Any, callback)
    }

    pub fn on_motion(
        &self,
        movement: Movement,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::Motion, EventFilter::value(movement), callback)
    }

    /// Angle in degrees
    pub async fn get_angle(&self, axis: Axis) -> Result<i16> {
        match self.0.command(MotionCommand::GetAngle(axis)).await? {
            Response::Angle(degrees) => Ok(degrees),
            other => Err(other.unexpected("Angle")),
        }
    }

    pub async fn get_acceleration(&self, axis: AccelerationAxis) -> Result<f32> {
        match self.0.command(MotionCommand::GetAcceleration(axis)).await? {
            Response::Acceleration(value) => Ok(value),
            other => Err(other.unexpected("Acceleration")),
        }
    }

    pub async fn wait_for_tilt(&self, tilt: Tilt, timeout: Option<Duration>) -> Result<()> {
        self.0
            .wait(EventKind::Tilt, EventFilter::value(tilt), timeout)
            .await
            .map(|_| ())
    }

    pub async fn wait_for_motion(
        &self,
        movement: Movement,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.0
            .wait(EventKind::Motion, EventFilter::value(movement), timeout)
            .await
            .map(|_| ())
    }

    pub async fn wait_for_flat(&self, timeout: Option<Duration>) -> Result<()> {
        self.0
            .wait(EventKind::Flat, EventFilter::Any, timeout)
            .await
            .map(|_| ())
    }
}
