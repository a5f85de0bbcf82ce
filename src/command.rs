use crate::element::ElementType;
use crate::elements::color::{ColorCommand, SensorColor};
use crate::elements::display::DisplayCommand;
use crate::elements::distance::DistanceCommand;
use crate::elements::light::{LightColor, LightCommand, LightState, Percentage};
use crate::elements::motion::MotionCommand;
use crate::elements::motor::MotorCommand;
use crate::elements::music::{Instrument, MusicCommand, Tempo, Volume};
use crate::Error;

/// A request sent to an element through the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Color(ColorCommand),
    Light(LightCommand),
    Display(DisplayCommand),
    Distance(DistanceCommand),
    Motion(MotionCommand),
    Motor(MotorCommand),
    Music(MusicCommand),
}

impl Command {
    /// Type of element that understands this command
    pub fn element_type(&self) -> ElementType {
        match self {
            Command::Color(_) => ElementType::Color,
            Command::Light(_) => ElementType::Light,
            Command::Display(_) => ElementType::Display,
            Command::Distance(_) => ElementType::Distance,
            Command::Motion(_) => ElementType::Motion,
            Command::Motor(_) => ElementType::Motor,
            Command::Music(_) => ElementType::Music,
        }
    }
}

macro_rules! impl_from_command {
    ($($variant:ident($inner:ty)),* $(,)?) => {
        $(
            impl From<$inner> for Command {
                fn from(command: $inner) -> Self {
                    Command::$variant(command)
                }
            }
        )*
    };
}

impl_from_command!(
    Color(ColorCommand),
    Light(LightCommand),
    Display(DisplayCommand),
    Distance(DistanceCommand),
    Motion(MotionCommand),
    Motor(MotorCommand),
    Music(MusicCommand),
);

/// Reply to a [`Command`]. Commands without a result are answered with `Ack`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ack,
    Color(SensorColor),
    Lux(f32),
    Percent(Percentage),
    DistanceCm(f32),
    Angle(i16),
    Acceleration(f32),
    LightColor(LightColor),
    LightState(LightState),
    Instrument(Instrument),
    Tempo(Tempo),
    Volume(Volume),
}

impl Response {
    pub(crate) fn unexpected(self, expected: &'static str) -> Error {
        Error::UnexpectedResponse {
            expected,
            actual: format!("{:?}", self),
        }
    }

    pub(crate) fn into_ack(self) -> Result<(), Error> {
        match self {
            Response::Ack => Ok(()),
            other => Err(other.unexpected("Ack")),
        }
    }
}
