use std::fmt;
use std::str::FromStr;

use super::Handle;
use crate::command::Response;
use crate::error::{Error, Result};

/// A percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u8);

impl Percentage {
    pub fn new(value: u8) -> Result<Self> {
        if value <= 100 {
            Ok(Percentage(value))
        } else {
            Err(Error::InvalidValue(format!("{} is not a percentage", value)))
        }
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// RGB color of the light, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LightColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl FromStr for LightColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidValue(format!("{:?} is not a #RRGGBB color", s));

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        Ok(LightColor::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FadeSpeed {
    Slow,
    Medium,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightCommand {
    TurnOn {
        color: LightColor,
        brightness: Percentage,
    },
    SetState(LightState),
    SetColor(LightColor),
    SetBrightness(Percentage),
    FadeIn {
        brightness: Percentage,
        color: LightColor,
        speed: FadeSpeed,
    },
    FadeOut(FadeSpeed),
    GetBrightness,
    GetColor,
    GetState,
}

/// Light element.
#[derive(Clone)]
pub struct Light(pub(super) Handle);

impl Light {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub async fn turn_on(&self, color: LightColor, brightness: Percentage) -> Result<()> {
        self.0
            .ack(LightCommand::TurnOn { color, brightness })
            .await
    }

    pub async fn set_state(&self, state: LightState) -> Result<()> {
        self.0.ack(LightCommand::SetState(state)).await
    }

    pub async fn set_color(&self, color: LightColor) -> Result<()> {
        self.0.ack(LightCommand::SetColor(color)).await
    }

    pub async fn set_brightness(&self, brightness: Percentage) -> Result<()> {
        self.0.ack(LightCommand::SetBrightness(brightness)).await
    }

    pub async fn fade_in(
        &self,
        brightness: Percentage,
        color: LightColor,
        speed: FadeSpeed,
    ) -> Result<()> {
        self.0
            .ack(LightCommand::FadeIn {
                brightness,
                color,
                speed,
            })
            .await
    }

    pub async fn fade_out(&self, speed: FadeSpeed) -> Result<()> {
        self.0.ack(LightCommand::FadeOut(speed)).await
    }

    pub async fn get_brightness(&self) -> Result<Percentage> {
        match self.0.command(LightCommand::GetBrightness).await? {
            Response::Percent(brightness) => Ok(brightness),
            other => Err(other.unexpected("Percent")),
        }
    }

    pub async fn get_color(&self) -> Result<LightColor> {
        match self.0.command(LightCommand::GetColor).await? {
            Response::LightColor(color) => Ok(color),
            other => Err(other.unexpected("LightColor")),
        }
    }

    pub async fn get_state(&self) -> Result<LightState> {
        match self.0.command(LightCommand::GetState).await? {
            Response::LightState(state) => Ok(state),
            other => Err(other.unexpected("LightState")),
        }
    }
}
