use super::Handle;
use crate::error::{CallbackError, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::registry::SubscriptionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSpeed {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorDirection {
    Clockwise,
    Anticlockwise,
}

/// Finite number of turns for [`Motor::rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorRotation {
    Quarter,
    Half,
    One,
    Two,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotorCommand {
    Start {
        speed: MotorSpeed,
        direction: MotorDirection,
    },
    StartWithRpm {
        rpm: u16,
        direction: MotorDirection,
    },
    Rotate {
        rotation: MotorRotation,
        direction: MotorDirection,
    },
    Stop,
}

/// Motor element.
#[derive(Clone)]
pub struct Motor(pub(super) Handle);

impl Motor {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Call `callback` when the motor stalls
    pub fn on_stall(
        &self,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0.subscribe(EventKind::Stall, EventFilter::Any, callback)
    }

    pub async fn start(&self, speed: MotorSpeed, direction: MotorDirection) -> Result<()> {
        self.0
            .ack(MotorCommand::Start { speed, direction })
            .await
    }

    pub async fn start_with_rpm(&self, rpm: u16, direction: MotorDirection) -> Result<()> {
        self.0
            .ack(MotorCommand::StartWithRpm { rpm, direction })
            .await
    }

    pub async fn rotate(&self, rotation: MotorRotation, direction: MotorDirection) -> Result<()> {
        self.0
            .ack(MotorCommand::Rotate {
                rotation,
                direction,
            })
            .await
    }

    pub async fn stop(&self) -> Result<()> {
        self.0.ack(MotorCommand::Stop).await
    }
}
