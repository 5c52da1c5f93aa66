use serde::{Deserialize, Serialize};

/// A declarative marker attached to a type member, with named arguments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub args: Vec<(String, MarkerValue)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MarkerValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl MarkerValue {
    pub fn kind(&self) -> &'static str {
        match self {
            MarkerValue::Int(_) => "int",
            MarkerValue::Bool(_) => "bool",
            MarkerValue::Str(_) => "string",
        }
    }
}

impl Marker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, key: &str, value: MarkerValue) -> Self {
        self.args.push((key.to_string(), value));
        self
    }

    pub fn arg(&self, key: &str) -> Option<&MarkerValue> {
        self.args
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

/// Shared lookup for member marker lists
pub trait HasMarkers {
    fn markers(&self) -> &[Marker];

    fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers().iter().find(|marker| marker.name == name)
    }

    fn has_marker(&self, name: &str) -> bool {
        self.marker(name).is_some()
    }
}
