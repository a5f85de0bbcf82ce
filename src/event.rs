use std::fmt;
use std::sync::Arc;

use crate::elements::color::{LightLevel, SensorColor};
use crate::elements::display::Flip;
use crate::elements::distance::DistanceZone;
use crate::elements::motion::{Movement, Tilt};

/// Category of a device-originated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ColorChange,
    LightLevel,
    Distance,
    Tilt,
    Flat,
    Motion,
    Stall,
    DoubleTap,
    Flip,
}

/// Value carried by an event, also used as a subscription filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValue {
    Color(SensorColor),
    LightLevel(LightLevel),
    Distance(DistanceZone),
    Tilt(Tilt),
    Movement(Movement),
    Flip(Flip),
}

impl From<SensorColor> for EventValue {
    fn from(color: SensorColor) -> Self {
        EventValue::Color(color)
    }
}

impl From<LightLevel> for EventValue {
    fn from(level: LightLevel) -> Self {
        EventValue::LightLevel(level)
    }
}

impl From<DistanceZone> for EventValue {
    fn from(zone: DistanceZone) -> Self {
        EventValue::Distance(zone)
    }
}

impl From<Tilt> for EventValue {
    fn from(tilt: Tilt) -> Self {
        EventValue::Tilt(tilt)
    }
}

impl From<Movement> for EventValue {
    fn from(movement: Movement) -> Self {
        EventValue::Movement(movement)
    }
}

impl From<Flip> for EventValue {
    fn from(flip: Flip) -> Self {
        EventValue::Flip(flip)
    }
}

/// An event reported by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementEvent {
    pub element: String,
    pub kind: EventKind,
    pub value: Option<EventValue>,
}

impl ElementEvent {
    pub fn new(element: impl Into<String>, kind: EventKind) -> Self {
        Self {
            element: element.into(),
            kind,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<EventValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Decides which events of a given kind a subscription or wait is interested in.
#[derive(Clone, Default)]
pub enum EventFilter {
    /// Every event of the kind.
    #[default]
    Any,
    /// Only events carrying exactly this value.
    Value(EventValue),
    /// Events for which the predicate returns true.
    Predicate(Arc<dyn Fn(&ElementEvent) -> bool + Send + Sync>),
}

impl EventFilter {
    pub fn value(value: impl Into<EventValue>) -> Self {
        EventFilter::Value(value.into())
    }

    pub fn predicate(func: impl Fn(&ElementEvent) -> bool + Send + Sync + 'static) -> Self {
        EventFilter::Predicate(Arc::new(func))
    }

    pub fn matches(&self, event: &ElementEvent) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Value(value) => event.value.as_ref() == Some(value),
            EventFilter::Predicate(func) => func(event),
        }
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFilter::Any => f.write_str("Any"),
            EventFilter::Value(value) => f.debug_tuple("Value").field(value).finish(),
            EventFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<EventValue> for EventFilter {
    fn from(value: EventValue) -> Self {
        EventFilter::Value(value)
    }
}
