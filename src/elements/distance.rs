use std::time::Duration;

use super::Handle;
use crate::command::Response;
use crate::error::{CallbackError, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::registry::SubscriptionId;

/// Threshold crossed by the distance sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceZone {
    Near,
    Far,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistanceCommand {
    GetDistanceCm,
}

/// Distance sensor element.
#[derive(Clone)]
pub struct Distance(pub(super) Handle);

impl Distance {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn on_distance_event(
        &self,
        zone: DistanceZone,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::Distance, EventFilter::value(zone), callback)
    }

    pub async fn get_distance_cm(&self) -> Result<f32> {
        match self.0.command(DistanceCommand::GetDistanceCm).await? {
            Response::DistanceCm(cm) => Ok(cm),
            other => Err(other.unexpected("DistanceCm")),
        }
    }

    pub async fn wait_for_distance_event(
        &self,
        zone: DistanceZone,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.0
            .wait(EventKind::Distance, EventFilter::value(zone), timeout)
            .await
            .map(|_| ())
    }
}
