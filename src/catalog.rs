//! Space object catalog
//!
//! Objects arrive as JSON, either a bare array or `{ "objects": [...] }`.
//! Attribute strings are matched case-insensitively; anything unrecognized
//! is kept verbatim so the UI can still show it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::ShapeKind;

/// How likely an object is to support life
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Habitability {
    HighPossibility,
    NotHabitable,
    Dangerous,
    #[default]
    Unknown,
    Other(String),
}

impl From<String> for Habitability {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high possibility" => Habitability::HighPossibility,
            "not habitable" => Habitability::NotHabitable,
            "dangerous" => Habitability::Dangerous,
            "" | "unknown" => Habitability::Unknown,
            _ => Habitability::Other(s),
        }
    }
}

impl From<Habitability> for String {
    fn from(h: Habitability) -> Self {
        match h {
            Habitability::HighPossibility => "High Possibility".into(),
            Habitability::NotHabitable => "Not Habitable".into(),
            Habitability::Dangerous => "Dangerous".into(),
            Habitability::Unknown => "Unknown".into(),
            Habitability::Other(s) => s,
        }
    }
}

/// Resource value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Value {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
    Other(String),
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Value::High,
            "medium" => Value::Medium,
            "low" => Value::Low,
            "" | "unknown" => Value::Unknown,
            _ => Value::Other(s),
        }
    }
}

impl From<Value> for String {
    fn from(v: Value) -> Self {
        match v {
            Value::High => "High".into(),
            Value::Medium => "Medium".into(),
            Value::Low => "Low".into(),
            Value::Unknown => "Unknown".into(),
            Value::Other(s) => s,
        }
    }
}

/// Bulk density
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Density {
    VeryHigh,
    High,
    Medium,
    Low,
    #[default]
    Unknown,
    Other(String),
}

impl Density {
    /// Dense enough to show a core and speckle in cross-section
    pub fn is_high(&self) -> bool {
        matches!(self, Density::High | Density::VeryHigh)
    }
}

impl From<String> for Density {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "very high" => Density::VeryHigh,
            "high" => Density::High,
            "medium" => Density::Medium,
            "low" => Density::Low,
            "" | "unknown" => Density::Unknown,
            _ => Density::Other(s),
        }
    }
}

impl From<Density> for String {
    fn from(d: Density) -> Self {
        match d {
            Density::VeryHigh => "very high".into(),
            Density::High => "high".into(),
            Density::Medium => "medium".into(),
            Density::Low => "low".into(),
            Density::Unknown => "unknown".into(),
            Density::Other(s) => s,
        }
    }
}

/// Organic compound readings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Organics {
    Detected,
    NotDetected,
    #[default]
    Unknown,
    Other(String),
}

impl From<String> for Organics {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "detected" => Organics::Detected,
            "not detected" | "none" => Organics::NotDetected,
            "" | "unknown" => Organics::Unknown,
            _ => Organics::Other(s),
        }
    }
}

impl From<Organics> for String {
    fn from(o: Organics) -> Self {
        match o {
            Organics::Detected => "Detected".into(),
            Organics::NotDetected => "Not Detected".into(),
            Organics::Unknown => "Unknown".into(),
            Organics::Other(s) => s,
        }
    }
}

/// Attributes the cross-section renderer reads
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialProfile {
    pub habitability: Habitability,
    pub value: Value,
    pub density: Density,
    pub organics: Organics,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceObject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "shapeType", alias = "objectShape")]
    pub shape: ShapeKind,
    #[serde(default)]
    pub habitability: Habitability,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub density: Density,
    #[serde(default)]
    pub organics: Organics,
}

impl SpaceObject {
    pub fn profile(&self) -> MaterialProfile {
        MaterialProfile {
            habitability: self.habitability.clone(),
            value: self.value.clone(),
            density: self.density.clone(),
            organics: self.organics.clone(),
        }
    }

    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<SpaceObject>),
    Wrapped { objects: Vec<SpaceObject> },
}

/// Loaded objects in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    objects: Vec<SpaceObject>,
}

impl Catalog {
    pub fn new(objects: Vec<SpaceObject>) -> Self {
        Self { objects }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).map_err(Error::Catalog)?;
        let objects = match file {
            CatalogFile::List(objects) | CatalogFile::Wrapped { objects } => objects,
        };
        log::info!("Loaded {} catalog objects", objects.len());
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[SpaceObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&SpaceObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Like `find`, but a missing id is an error
    pub fn get(&self, id: &str) -> Result<&SpaceObject> {
        self.find(id).ok_or_else(|| Error::UnknownObject(id.to_string()))
    }
}
