use crate::core::dtmi::is_valid_dtmi;
use crate::domain::model::{
    CommandEntity, CommandRequestEntity, ComponentEntity, Entity, EntityGraph, InterfaceEntity,
    PropertyEntity, SchemaEntity, SchemaKind, SchemaRef, TelemetryEntity, UnitEntity,
};
use crate::domain::ports::DtmiResolver;
use crate::utils::error::{ResolveError, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

const DEFAULT_MAX_DEPTH: usize = 8;

/// Parses DTDL model documents into an [`EntityGraph`], pulling in referenced
/// models through a [`DtmiResolver`] until the graph reaches a fixed point.
pub struct ModelParser {
    max_depth: usize,
    deadline: Option<Instant>,
}

impl Default for ModelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelParser {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            deadline: None,
        }
    }

    /// Caps the number of resolution rounds. Each round is one resolver
    /// callback invocation for the current batch of unresolved references.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Aborts resolution with `ResolveError::Cancelled` once the deadline
    /// passes. Checked at every resolution round.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn parse(
        &self,
        seeds: &[String],
        resolver: &dyn DtmiResolver,
    ) -> Result<EntityGraph> {
        match self.parse_inner(seeds, resolver).await {
            Ok(graph) => {
                tracing::info!(
                    "model parsing succeeded: {} entities from {} seed document(s)",
                    graph.len(),
                    seeds.len()
                );
                Ok(graph)
            }
            Err(e) => {
                tracing::error!("model parsing failed: {}", e);
                Err(e)
            }
        }
    }

    async fn parse_inner(
        &self,
        seeds: &[String],
        resolver: &dyn DtmiResolver,
    ) -> Result<EntityGraph> {
        let mut graph = EntityGraph::new();
        let mut references: Vec<Reference> = Vec::new();
        let mut requested: HashSet<String> = HashSet::new();
        let mut documents: Vec<String> = seeds.to_vec();
        let mut depth = 0;

        // Worklist loop: parse the current documents, batch up every
        // still-unresolved reference, resolve, repeat. Cycles terminate
        // because an identifier is never requested twice.
        loop {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return Err(ResolveError::Cancelled);
                }
            }

            let mut pending: Vec<String> = Vec::new();
            for document in &documents {
                parse_document(document, &mut graph, &mut pending, &mut references)?;
            }

            let batch: Vec<String> = pending
                .into_iter()
                .filter(|dtmi| !graph.contains(dtmi) && requested.insert(dtmi.clone()))
                .collect();
            if batch.is_empty() {
                break;
            }

            depth += 1;
            if depth > self.max_depth {
                return Err(ResolveError::DepthCapExceeded {
                    cap: self.max_depth,
                });
            }
            tracing::debug!(
                "resolving {} referenced model(s), round {}",
                batch.len(),
                depth
            );

            // The deadline bounds the in-flight batch too, not just the
            // check between rounds; expiry mid-fetch is a cancellation, not
            // a missing document.
            let fetched = match self.deadline {
                Some(deadline) => {
                    let budget = deadline.saturating_duration_since(Instant::now());
                    match tokio::time::timeout(budget, resolver.resolve(&batch)).await {
                        Ok(fetched) => fetched,
                        Err(_) => return Err(ResolveError::Cancelled),
                    }
                }
                None => resolver.resolve(&batch).await,
            };
            let mut next = Vec::with_capacity(batch.len());
            for (i, dtmi) in batch.iter().enumerate() {
                match fetched.get(i) {
                    Some(content) if !content.trim().is_empty() => next.push(content.clone()),
                    _ => {
                        return Err(ResolveError::UnresolvedReference { dtmi: dtmi.clone() });
                    }
                }
            }
            documents = next;
        }

        validate_references(&graph, &references)?;
        Ok(graph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedKind {
    Interface,
    Schema,
}

impl ExpectedKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::Schema => "Schema",
        }
    }
}

struct Reference {
    target: String,
    expected: ExpectedKind,
}

fn invalid_model(message: impl Into<String>) -> ResolveError {
    ResolveError::InvalidModel {
        message: message.into(),
    }
}

fn duplicate(dtmi: String) -> ResolveError {
    ResolveError::DuplicateEntity { dtmi }
}

fn parse_document(
    raw: &str,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Array(items) => {
            for item in items {
                parse_top_level(&item, graph, pending, references)?;
            }
            Ok(())
        }
        Value::Object(_) => parse_top_level(&value, graph, pending, references),
        _ => Err(invalid_model(
            "model document must be a JSON object or array of objects",
        )),
    }
}

fn parse_top_level(
    value: &Value,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid_model("top-level model entry must be a JSON object"))?;
    if !type_names(obj.get("@type")).contains(&"Interface") {
        return Err(invalid_model("top-level model entry must be an Interface"));
    }
    parse_interface(obj, graph, pending, references)
}

fn parse_interface(
    obj: &Map<String, Value>,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let id = required_str(obj, "@id", "interface")?;
    if !is_valid_dtmi(id) {
        return Err(invalid_model(format!(
            "interface @id is not a valid DTMI: {}",
            id
        )));
    }

    let mut extends = Vec::new();
    match obj.get("extends") {
        Some(Value::String(parent)) => extends.push(parent.clone()),
        Some(Value::Array(parents)) => {
            for parent in parents {
                if let Some(parent) = parent.as_str() {
                    extends.push(parent.to_string());
                }
            }
        }
        _ => {}
    }
    for parent in &extends {
        pending.push(parent.clone());
        references.push(Reference {
            target: parent.clone(),
            expected: ExpectedKind::Interface,
        });
    }

    graph
        .insert(
            id.to_string(),
            Entity::Interface(InterfaceEntity {
                id: id.to_string(),
                display_name: localized(obj.get("displayName")),
                extends,
            }),
        )
        .map_err(duplicate)?;

    if let Some(Value::Array(schemas)) = obj.get("schemas") {
        for schema in schemas {
            parse_named_schema(schema, graph, pending, references)?;
        }
    }

    if let Some(Value::Array(contents)) = obj.get("contents") {
        for element in contents {
            parse_content(id, element, graph, pending, references)?;
        }
    }

    Ok(())
}

/// Interface-level reusable schema definition (`schemas` section).
fn parse_named_schema(
    value: &Value,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid_model("schemas entry must be a JSON object"))?;
    let id = required_str(obj, "@id", "schema definition")?;
    let kind = type_names(obj.get("@type"))
        .iter()
        .find_map(|name| SchemaKind::from_complex(name))
        .ok_or_else(|| invalid_model(format!("schema definition {} has no complex @type", id)))?;

    collect_nested_refs(value, pending, references);
    graph
        .insert(
            id.to_string(),
            Entity::Schema(SchemaEntity {
                id: id.to_string(),
                kind,
            }),
        )
        .map_err(duplicate)
}

fn parse_content(
    parent_id: &str,
    value: &Value,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid_model("contents element must be a JSON object"))?;
    let kinds = type_names(obj.get("@type"));
    let name = required_str(obj, "name", "contents element")?;
    // Anonymous elements get a deterministic identifier under their parent.
    let id = obj
        .get("@id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}:{}", parent_id, name));

    if kinds.contains(&"Telemetry") {
        let schema = parse_schema_ref(&id, obj.get("schema"), graph, pending, references)?;
        let mut supplemental_properties = HashMap::new();
        if let Some(unit) = obj.get("unit").and_then(|v| v.as_str()) {
            supplemental_properties.insert("unit".to_string(), unit.to_string());
            graph.insert_shared(
                unit.to_string(),
                Entity::Unit(UnitEntity {
                    name: unit.to_string(),
                    symbol: unit_symbol(unit).to_string(),
                }),
            );
        }
        graph
            .insert(
                id.clone(),
                Entity::Telemetry(TelemetryEntity {
                    id,
                    name: name.to_string(),
                    display_name: localized(obj.get("displayName")),
                    schema,
                    supplemental_properties,
                }),
            )
            .map_err(duplicate)
    } else if kinds.contains(&"Command") {
        let request = match obj.get("request") {
            Some(Value::Object(request)) => {
                let request_name = required_str(request, "name", "command request")?;
                let schema = parse_schema_ref(
                    &format!("{}:request", id),
                    request.get("schema"),
                    graph,
                    pending,
                    references,
                )?;
                Some(CommandRequestEntity {
                    name: request_name.to_string(),
                    schema,
                })
            }
            _ => None,
        };
        graph
            .insert(
                id.clone(),
                Entity::Command(CommandEntity {
                    id,
                    name: name.to_string(),
                    display_name: localized(obj.get("displayName")),
                    description: localized(obj.get("description")),
                    request,
                }),
            )
            .map_err(duplicate)
    } else if kinds.contains(&"Property") {
        let schema = parse_schema_ref(&id, obj.get("schema"), graph, pending, references)?;
        graph
            .insert(
                id.clone(),
                Entity::Property(PropertyEntity {
                    id,
                    name: name.to_string(),
                    display_name: localized(obj.get("displayName")),
                    schema,
                    writable: obj.get("writable").and_then(|v| v.as_bool()).unwrap_or(false),
                }),
            )
            .map_err(duplicate)
    } else if kinds.contains(&"Component") {
        let schema = obj
            .get("schema")
            .and_then(|v| v.as_str())
            .filter(|s| s.starts_with("dtmi:"))
            .ok_or_else(|| {
                invalid_model(format!("component {} schema must be a DTMI string", id))
            })?;
        pending.push(schema.to_string());
        references.push(Reference {
            target: schema.to_string(),
            expected: ExpectedKind::Interface,
        });
        graph
            .insert(
                id.clone(),
                Entity::Component(ComponentEntity {
                    id,
                    name: name.to_string(),
                    schema: schema.to_string(),
                }),
            )
            .map_err(duplicate)
    } else {
        tracing::debug!("skipping unsupported content element {:?} on {}", kinds, parent_id);
        Ok(())
    }
}

fn parse_schema_ref(
    owner_id: &str,
    value: Option<&Value>,
    graph: &mut EntityGraph,
    pending: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<SchemaRef> {
    match value {
        Some(Value::String(schema)) => {
            if schema.starts_with("dtmi:") {
                pending.push(schema.clone());
                references.push(Reference {
                    target: schema.clone(),
                    expected: ExpectedKind::Schema,
                });
                Ok(SchemaRef::Named(schema.clone()))
            } else {
                SchemaKind::from_primitive(schema)
                    .map(SchemaRef::Primitive)
                    .ok_or_else(|| {
                        invalid_model(format!(
                            "unknown primitive schema {:?} on {}",
                            schema, owner_id
                        ))
                    })
            }
        }
        Some(inline @ Value::Object(obj)) => {
            let kind = type_names(obj.get("@type"))
                .iter()
                .find_map(|name| SchemaKind::from_complex(name))
                .ok_or_else(|| {
                    invalid_model(format!("inline schema on {} has no complex @type", owner_id))
                })?;
            collect_nested_refs(inline, pending, references);
            let id = obj
                .get("@id")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}:schema", owner_id));
            graph
                .insert(
                    id.clone(),
                    Entity::Schema(SchemaEntity {
                        id: id.clone(),
                        kind,
                    }),
                )
                .map_err(duplicate)?;
            Ok(SchemaRef::Named(id))
        }
        _ => Err(invalid_model(format!("{} is missing a schema", owner_id))),
    }
}

/// Walks a complex schema body for DTMI references buried in object fields,
/// array element schemas and map values.
fn collect_nested_refs(value: &Value, pending: &mut Vec<String>, references: &mut Vec<Reference>) {
    match value {
        Value::Object(obj) => {
            for (key, nested) in obj {
                if matches!(key.as_str(), "schema" | "elementSchema") {
                    if let Some(target) = nested.as_str() {
                        if target.starts_with("dtmi:") {
                            pending.push(target.to_string());
                            references.push(Reference {
                                target: target.to_string(),
                                expected: ExpectedKind::Schema,
                            });
                        }
                    }
                }
                collect_nested_refs(nested, pending, references);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_nested_refs(item, pending, references);
            }
        }
        _ => {}
    }
}

fn validate_references(graph: &EntityGraph, references: &[Reference]) -> Result<()> {
    for reference in references {
        match graph.get(&reference.target) {
            None => {
                return Err(ResolveError::UnresolvedReference {
                    dtmi: reference.target.clone(),
                });
            }
            Some(entity) => {
                let compatible = matches!(
                    (reference.expected, entity),
                    (ExpectedKind::Interface, Entity::Interface(_))
                        | (ExpectedKind::Schema, Entity::Schema(_))
                );
                if !compatible {
                    return Err(ResolveError::IncompatibleReference {
                        dtmi: reference.target.clone(),
                        expected: reference.expected.name(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str, context: &str) -> Result<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid_model(format!("{} is missing required field {:?}", context, key)))
}

/// `@type` may be a single string or an array of strings (semantic types).
fn type_names(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    }
}

/// `displayName`/`description` may be a plain string (implicitly English) or
/// a language-tag map.
fn localized(value: Option<&Value>) -> HashMap<String, String> {
    match value {
        Some(Value::String(text)) => HashMap::from([("en".to_string(), text.clone())]),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(tag, text)| text.as_str().map(|t| (tag.clone(), t.to_string())))
            .collect(),
        _ => HashMap::new(),
    }
}

/// Symbols for the common DTDL semantic units. Unknown units keep their name.
fn unit_symbol(name: &str) -> &str {
    match name {
        "degreeCelsius" => "°C",
        "degreeFahrenheit" => "°F",
        "kelvin" => "K",
        "percent" => "%",
        "metre" => "m",
        "millimetre" => "mm",
        "kilometrePerHour" => "km/h",
        "metrePerSecond" => "m/s",
        "gram" => "g",
        "kilogram" => "kg",
        "volt" => "V",
        "ampere" => "A",
        "watt" => "W",
        "kilowattHour" => "kWh",
        "pascal" => "Pa",
        "hertz" => "Hz",
        "lux" => "lx",
        other => other,
    }
}
