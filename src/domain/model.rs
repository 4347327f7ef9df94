use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Primitive and complex schema kinds a telemetry, property or command
/// parameter can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Integer,
    Long,
    Double,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
    Time,
    Duration,
    Object,
    Array,
    Enum,
    Map,
}

impl SchemaKind {
    /// Maps a DTDL primitive schema name to its kind. Unknown names return `None`.
    pub fn from_primitive(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "dateTime" => Some(Self::DateTime),
            "time" => Some(Self::Time),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }

    pub fn from_complex(name: &str) -> Option<Self> {
        match name {
            "Object" => Some(Self::Object),
            "Array" => Some(Self::Array),
            "Enum" => Some(Self::Enum),
            "Map" => Some(Self::Map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Float => "Float",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Duration => "Duration",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Enum => "Enum",
            Self::Map => "Map",
        }
    }
}

/// A schema position in a parsed document: either a primitive kind or a
/// reference to a schema entity elsewhere in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    Primitive(SchemaKind),
    Named(String),
}

#[derive(Debug, Clone)]
pub struct InterfaceEntity {
    pub id: String,
    pub display_name: HashMap<String, String>,
    pub extends: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TelemetryEntity {
    pub id: String,
    pub name: String,
    pub display_name: HashMap<String, String>,
    pub schema: SchemaRef,
    /// Semantic-type extras carried on the telemetry element, keyed by field
    /// name (`unit` holds the unit name, not the symbol).
    pub supplemental_properties: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CommandRequestEntity {
    pub name: String,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone)]
pub struct CommandEntity {
    pub id: String,
    pub name: String,
    pub display_name: HashMap<String, String>,
    pub description: HashMap<String, String>,
    pub request: Option<CommandRequestEntity>,
}

#[derive(Debug, Clone)]
pub struct PropertyEntity {
    pub id: String,
    pub name: String,
    pub display_name: HashMap<String, String>,
    pub schema: SchemaRef,
    pub writable: bool,
}

#[derive(Debug, Clone)]
pub struct ComponentEntity {
    pub id: String,
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Clone)]
pub struct UnitEntity {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct SchemaEntity {
    pub id: String,
    pub kind: SchemaKind,
}

/// One parsed model entity. Closed set; the projection layer matches
/// exhaustively instead of downcasting.
#[derive(Debug, Clone)]
pub enum Entity {
    Interface(InterfaceEntity),
    Telemetry(TelemetryEntity),
    Command(CommandEntity),
    Property(PropertyEntity),
    Component(ComponentEntity),
    Unit(UnitEntity),
    Schema(SchemaEntity),
}

/// The parser output: entities keyed by identifier, iterable in insertion
/// order so projections are deterministic across runs.
#[derive(Debug, Default)]
pub struct EntityGraph {
    order: Vec<String>,
    entities: HashMap<String, Entity>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, handing the identifier back on collision so the
    /// caller can fail the parse.
    pub fn insert(&mut self, id: String, entity: Entity) -> Result<(), String> {
        if self.entities.contains_key(&id) {
            return Err(id);
        }
        self.order.push(id.clone());
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Inserts only when the identifier is new. Used for shared entities
    /// (units) that several elements may legitimately reference.
    pub fn insert_shared(&mut self, id: String, entity: Entity) {
        if !self.entities.contains_key(&id) {
            self.order.push(id.clone());
            self.entities.insert(id, entity);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), &self.entities[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Flattened telemetry description for UI consumption. Field names on the
/// wire match the portal contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(rename = "TelemetryName")]
    pub name: String,
    #[serde(rename = "TelemetryDisplayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "dataType")]
    pub data_type: String,
}

/// Flattened command description for UI consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    #[serde(rename = "CommandName")]
    pub name: String,
    #[serde(rename = "CommandDisplayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "CommandDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "requestName", skip_serializing_if = "Option::is_none")]
    pub request_name: Option<String>,
    #[serde(rename = "requestKind", skip_serializing_if = "Option::is_none")]
    pub request_kind: Option<String>,
}

/// Everything the resolution engine extracts for one model identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescription {
    #[serde(rename = "modelId")]
    pub model_id: String,
    pub telemetry: Vec<TelemetryRecord>,
    pub commands: Vec<CommandRecord>,
}

/// Registry view of a device, produced by the external device registry
/// collaborator and passed through as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub connection_state: String,
    pub status: String,
    pub authentication_type: String,
    pub primary_key: Option<String>,
    pub secondary_key: Option<String>,
}

/// Digital twin document subset the resolver cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Twin {
    pub model_id: Option<String>,
}

/// Combined device + model view returned to portal callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    pub device_id: String,
    pub connection_state: String,
    pub status: String,
    pub authentication_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub telemetry: Vec<TelemetryRecord>,
    pub commands: Vec<CommandRecord>,
}
