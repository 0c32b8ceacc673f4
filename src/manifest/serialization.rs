//! Deserialization of the `dependencies` section
//!
//! Two shapes are accepted:
//! - a map of `name → minimum version` (`{"ps_eventbus": "1.9.0"}`)
//! - a list of records with a `name` and free-form metadata (`[{"name": "ps_eventbus"}]`)

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::DependencyDeclaration;

/// Key of the minimum version in list-shaped records
const MIN_VERSION_KEY: &str = "min_version";

/// Ordered dependency declarations, whichever shape they were written in
#[derive(Debug, Default)]
pub struct DependencyList(pub Vec<DependencyDeclaration>);

impl<'de> Deserialize<'de> for DependencyList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DependencyListVisitor)
    }
}

struct DependencyListVisitor;

impl<'de> Visitor<'de> for DependencyListVisitor {
    type Value = DependencyList;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of dependency versions or a list of dependency records")
    }

    fn visit_unit<E>(self) -> std::result::Result<DependencyList, E>
    where
        E: de::Error,
    {
        Ok(DependencyList::default())
    }

    fn visit_none<E>(self) -> std::result::Result<DependencyList, E>
    where
        E: de::Error,
    {
        Ok(DependencyList::default())
    }

    fn visit_map<M>(self, mut map: M) -> std::result::Result<DependencyList, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut declarations = Vec::new();

        while let Some((name, min_version)) = map.next_entry::<String, Option<String>>()? {
            declarations.push(DependencyDeclaration {
                name,
                min_version,
                metadata: Map::new(),
            });
        }

        Ok(DependencyList(declarations))
    }

    fn visit_seq<S>(self, mut seq: S) -> std::result::Result<DependencyList, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut declarations = Vec::new();

        while let Some(record) = seq.next_element::<Map<String, Value>>()? {
            declarations.push(declaration_from_record(record).map_err(de::Error::custom)?);
        }

        Ok(DependencyList(declarations))
    }
}

fn declaration_from_record(
    mut record: Map<String, Value>,
) -> std::result::Result<DependencyDeclaration, String> {
    let name = match record.remove("name") {
        Some(Value::String(name)) => name,
        Some(other) => return Err(format!("dependency name must be a string, got {other}")),
        None => return Err("dependency record without a 'name'".to_string()),
    };

    let min_version = match record.remove(MIN_VERSION_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(version)) => Some(version),
        Some(other) => {
            return Err(format!(
                "'{MIN_VERSION_KEY}' of dependency '{name}' must be a string, got {other}"
            ));
        }
    };

    Ok(DependencyDeclaration {
        name,
        min_version,
        metadata: record,
    })
}
