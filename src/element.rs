use std::fmt;

/// Kind of hardware module an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Color,
    Light,
    Display,
    Distance,
    Motion,
    Motor,
    Music,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Color => "COLOR",
            ElementType::Light => "LIGHT",
            ElementType::Display => "DISPLAY",
            ElementType::Distance => "DISTANCE",
            ElementType::Motion => "MOTION",
            ElementType::Motor => "MOTOR",
            ElementType::Music => "MUSIC",
        };
        f.write_str(name)
    }
}

/// Connection state of a single element as tracked by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// An element reported by [`Transport::discover`](crate::Transport::discover).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredElement {
    pub name: String,
    pub mac: String,
    pub element_type: ElementType,
}

/// A name and type pair, the unit of a connect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub name: String,
    pub element_type: ElementType,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
        }
    }
}

impl<S: Into<String>> From<(S, ElementType)> for ElementSpec {
    fn from((name, element_type): (S, ElementType)) -> Self {
        ElementSpec::new(name, element_type)
    }
}
