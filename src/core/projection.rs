use crate::domain::model::{
    CommandRecord, Entity, EntityGraph, SchemaKind, SchemaRef, TelemetryRecord,
};

/// Flattens every telemetry entity in the graph, in graph order, into a
/// UI-consumable record. Absent display names and units stay absent; they are
/// expected gaps, not errors.
pub fn extract_telemetry(graph: &EntityGraph) -> Vec<TelemetryRecord> {
    let mut records = Vec::new();
    for (_, entity) in graph.iter() {
        if let Entity::Telemetry(telemetry) = entity {
            let unit = telemetry
                .supplemental_properties
                .get("unit")
                .map(|unit_name| match graph.get(unit_name) {
                    Some(Entity::Unit(unit)) => unit.symbol.clone(),
                    _ => unit_name.clone(),
                });
            // Integer maps to "Long", everything else reports "Double". This
            // mirrors the portal contract; non-numeric schemas are knowingly
            // mis-classified until the product defines their mapping.
            let data_type = match schema_kind(graph, &telemetry.schema) {
                Some(SchemaKind::Integer) => "Long",
                _ => "Double",
            };
            records.push(TelemetryRecord {
                name: telemetry.name.clone(),
                display_name: telemetry.display_name.get("en").cloned(),
                unit,
                data_type: data_type.to_string(),
            });
        }
    }
    records
}

/// Flattens every command entity in the graph, in graph order.
pub fn extract_commands(graph: &EntityGraph) -> Vec<CommandRecord> {
    let mut records = Vec::new();
    for (_, entity) in graph.iter() {
        if let Entity::Command(command) = entity {
            let (request_name, request_kind) = match &command.request {
                Some(request) => (
                    Some(request.name.clone()),
                    schema_kind(graph, &request.schema).map(|kind| kind.as_str().to_string()),
                ),
                None => (None, None),
            };
            records.push(CommandRecord {
                name: command.name.clone(),
                display_name: command.display_name.get("en").cloned(),
                description: command.description.get("en").cloned(),
                request_name,
                request_kind,
            });
        }
    }
    records
}

fn schema_kind(graph: &EntityGraph, schema: &SchemaRef) -> Option<SchemaKind> {
    match schema {
        SchemaRef::Primitive(kind) => Some(*kind),
        SchemaRef::Named(id) => match graph.get(id) {
            Some(Entity::Schema(schema)) => Some(schema.kind),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        CommandEntity, CommandRequestEntity, TelemetryEntity, UnitEntity,
    };
    use std::collections::HashMap;

    fn telemetry(
        name: &str,
        display_name: &[(&str, &str)],
        schema: SchemaRef,
        unit: Option<&str>,
    ) -> Entity {
        let mut supplemental_properties = HashMap::new();
        if let Some(unit) = unit {
            supplemental_properties.insert("unit".to_string(), unit.to_string());
        }
        Entity::Telemetry(TelemetryEntity {
            id: format!("dtmi:test:T;1:{}", name),
            name: name.to_string(),
            display_name: display_name
                .iter()
                .map(|(tag, text)| (tag.to_string(), text.to_string()))
                .collect(),
            schema,
            supplemental_properties,
        })
    }

    #[test]
    fn test_integer_telemetry_with_unit_and_display_name() {
        let mut graph = EntityGraph::new();
        graph.insert_shared(
            "degreeCelsius".to_string(),
            Entity::Unit(UnitEntity {
                name: "degreeCelsius".to_string(),
                symbol: "°C".to_string(),
            }),
        );
        graph
            .insert(
                "dtmi:test:T;1:temp".to_string(),
                telemetry(
                    "temp",
                    &[("en", "Temperature")],
                    SchemaRef::Primitive(SchemaKind::Integer),
                    Some("degreeCelsius"),
                ),
            )
            .unwrap();

        let records = extract_telemetry(&graph);
        assert_eq!(
            records,
            vec![TelemetryRecord {
                name: "temp".to_string(),
                display_name: Some("Temperature".to_string()),
                unit: Some("°C".to_string()),
                data_type: "Long".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_integer_schemas_report_double() {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                "a".to_string(),
                telemetry("hum", &[], SchemaRef::Primitive(SchemaKind::Double), None),
            )
            .unwrap();
        graph
            .insert(
                "b".to_string(),
                telemetry("label", &[], SchemaRef::Primitive(SchemaKind::String), None),
            )
            .unwrap();

        let records = extract_telemetry(&graph);
        assert_eq!(records[0].data_type, "Double");
        // Known simplification: string telemetry also reports "Double".
        assert_eq!(records[1].data_type, "Double");
    }

    #[test]
    fn test_missing_display_name_and_unit_stay_absent() {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                "a".to_string(),
                telemetry("raw", &[], SchemaRef::Primitive(SchemaKind::Integer), None),
            )
            .unwrap();
        // Localized map without an "en" entry also yields no display name.
        graph
            .insert(
                "b".to_string(),
                telemetry(
                    "nur_deutsch",
                    &[("de", "Temperatur")],
                    SchemaRef::Primitive(SchemaKind::Integer),
                    None,
                ),
            )
            .unwrap();

        let records = extract_telemetry(&graph);
        assert_eq!(records[0].display_name, None);
        assert_eq!(records[0].unit, None);
        assert_eq!(records[1].display_name, None);
    }

    #[test]
    fn test_bare_command() {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                "dtmi:test:T;1:reboot".to_string(),
                Entity::Command(CommandEntity {
                    id: "dtmi:test:T;1:reboot".to_string(),
                    name: "reboot".to_string(),
                    display_name: HashMap::new(),
                    description: HashMap::new(),
                    request: None,
                }),
            )
            .unwrap();

        let records = extract_commands(&graph);
        assert_eq!(
            records,
            vec![CommandRecord {
                name: "reboot".to_string(),
                display_name: None,
                description: None,
                request_name: None,
                request_kind: None,
            }]
        );
    }

    #[test]
    fn test_command_with_request_parameter() {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                "dtmi:test:T;1:setTarget".to_string(),
                Entity::Command(CommandEntity {
                    id: "dtmi:test:T;1:setTarget".to_string(),
                    name: "setTarget".to_string(),
                    display_name: HashMap::from([(
                        "en".to_string(),
                        "Set Target".to_string(),
                    )]),
                    description: HashMap::from([(
                        "en".to_string(),
                        "Sets the target temperature".to_string(),
                    )]),
                    request: Some(CommandRequestEntity {
                        name: "target".to_string(),
                        schema: SchemaRef::Primitive(SchemaKind::Double),
                    }),
                }),
            )
            .unwrap();

        let records = extract_commands(&graph);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name.as_deref(), Some("Set Target"));
        assert_eq!(
            records[0].description.as_deref(),
            Some("Sets the target temperature")
        );
        assert_eq!(records[0].request_name.as_deref(), Some("target"));
        assert_eq!(records[0].request_kind.as_deref(), Some("Double"));
    }

    #[test]
    fn test_unknown_unit_falls_back_to_name() {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                "a".to_string(),
                telemetry(
                    "odd",
                    &[],
                    SchemaRef::Primitive(SchemaKind::Integer),
                    Some("furlongPerFortnight"),
                ),
            )
            .unwrap();

        let records = extract_telemetry(&graph);
        assert_eq!(records[0].unit.as_deref(), Some("furlongPerFortnight"));
    }
}
