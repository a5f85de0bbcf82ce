use std::time::Duration;

use super::Handle;
use crate::command::Response;
use crate::error::{CallbackError, Error, Result};
use crate::event::{ElementEvent, EventFilter, EventKind, EventValue};
use crate::registry::SubscriptionId;

/// Colors recognised by the color sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    White,
    Black,
}

/// Ambient light threshold crossed by the color sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightLevel {
    Dark,
    Bright,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightComponent {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorCommand {
    GetColor,
    GetLightValueLux,
    GetLightComponentLux(LightComponent),
    GetLightValuePercent,
}

/// Color sensor element.
#[derive(Clone)]
pub struct Color(pub(super) Handle);

impl Color {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Call `callback` whenever the sensor detects `color`
    pub fn on_color_change(
        &self,
        color: SensorColor,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::ColorChange, EventFilter::value(color), callback)
    }

    /// Call `callback` whenever the ambient light crosses into `level`
    pub fn on_light_event(
        &self,
        level: LightLevel,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::LightLevel, EventFilter::value(level), callback)
    }

    pub async fn get_color(&self) -> Result<SensorColor> {
        match self.0.command(ColorCommand::GetColor).await? {
            Response::Color(color) => Ok(color),
            other => Err(other.unexpected("Color")),
        }
    }

    /// Ambient light in lux
    pub async fn get_light_value_lux(&self) -> Result<f32> {
        match self.0.command(ColorCommand::GetLightValueLux).await? {
            Response::Lux(lux) => Ok(lux),
            other => Err(other.unexpected("Lux")),
        }
    }

    /// Single color component of the ambient light in lux
    pub async fn get_light_component_lux(&self, component: LightComponent) -> Result<f32> {
        match self
            .0
            .command(ColorCommand::GetLightComponentLux(component))
            .await?
        {
            Response::Lux(lux) => Ok(lux),
            other => Err(other.unexpected("Lux")),
        }
    }

    pub async fn get_light_value_percent(&self) -> Result<u8> {
        match self.0.command(ColorCommand::GetLightValuePercent).await? {
            Response::Percent(percent) => Ok(percent.value()),
            other => Err(other.unexpected("Percent")),
        }
    }

    /// Wait until the detected color changes to anything
    pub async fn wait_for_color_change(&self, timeout: Option<Duration>) -> Result<SensorColor> {
        let event = self
            .0
            .wait(EventKind::ColorChange, EventFilter::Any, timeout)
            .await?;
        match event.value {
            Some(EventValue::Color(color)) => Ok(color),
            other => Err(Error::UnexpectedResponse {
                expected: "Color",
                actual: format!("{:?}", other),
            }),
        }
    }

    pub async fn wait_for_color_to_change_to(
        &self,
        color: SensorColor,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.0
            .wait(EventKind::ColorChange, EventFilter::value(color), timeout)
            .await
            .map(|_| ())
    }

    pub async fn wait_for_light_event(
        &self,
        level: LightLevel,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.0
            .wait(EventKind::LightLevel, EventFilter::value(level), timeout)
            .await
            .map(|_| ())
    }
}
