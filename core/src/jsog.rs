//! Decoder for JSOG (JavaScript Object Graph) encoded payloads.
//!
//! The back end serializes entities with identity info: the first time an
//! object is written it carries an `"@id"` key, and every later occurrence
//! of the same object is written as `{"@ref": "<id>"}`. `normalize` turns
//! such a document back into a plain tree where every reference is replaced
//! by a full copy of the object it names.
//!
//! Decoding runs in two passes. The first registers every `@id` object in
//! the document, so a reference may precede its definition. The second
//! rebuilds the tree, inlining references and dropping the markers.
//!
//! Many-to-many relations make the back end emit cycles: a book inside a
//! collection lists its collections, and the enclosing one comes back as a
//! reference. A reference to an object that is still being rebuilt is cut
//! down to that object's scalar fields, so the result stays a finite tree.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;

const ID_KEY: &str = "@id";
const REF_KEY: &str = "@ref";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("reference to unknown object id {0:?}")]
    UnresolvedReference(String),

    #[error("object id {0:?} is defined more than once")]
    DuplicateId(String),

    #[error("JSOG marker value must be a string or number, got {0}")]
    InvalidId(String),
}

/// Replace JSOG identity markers in `value` with inlined plain objects.
///
/// Values without markers come back unchanged.
pub fn normalize(value: Value) -> Result<Value, NormalizeError> {
    let mut definitions = HashMap::new();
    collect_definitions(&value, &mut definitions)?;
    Decoder {
        definitions,
        in_progress: HashSet::new(),
        resolved: HashMap::new(),
    }
    .decode(value)
}

fn marker_id(value: &Value) -> Result<String, NormalizeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(NormalizeError::InvalidId(other.to_string())),
    }
}

fn collect_definitions(
    value: &Value,
    definitions: &mut HashMap<String, Map<String, Value>>,
) -> Result<(), NormalizeError> {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_definitions(item, definitions)?;
            }
        }
        Value::Object(map) => {
            if map.contains_key(REF_KEY) {
                return Ok(());
            }
            if let Some(raw) = map.get(ID_KEY) {
                let id = marker_id(raw)?;
                if definitions.contains_key(&id) {
                    return Err(NormalizeError::DuplicateId(id));
                }
                definitions.insert(id, map.clone());
            }
            for child in map.values() {
                collect_definitions(child, definitions)?;
            }
        }
        _ => {}
    }
    Ok(())
}

struct Decoder {
    definitions: HashMap<String, Map<String, Value>>,
    in_progress: HashSet<String>,
    resolved: HashMap<String, Value>,
}

impl Decoder {
    fn decode(&mut self, value: Value) -> Result<Value, NormalizeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.decode(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                if let Some(raw) = map.get(REF_KEY) {
                    let id = marker_id(raw)?;
                    return self.resolve_reference(id);
                }
                match map.get(ID_KEY) {
                    Some(raw) => {
                        let id = marker_id(raw)?;
                        if let Some(done) = self.resolved.get(&id) {
                            return Ok(done.clone());
                        }
                        self.decode_identified(id, map)
                    }
                    None => self.decode_fields(map).map(Value::Object),
                }
            }
            primitive => Ok(primitive),
        }
    }

    fn resolve_reference(&mut self, id: String) -> Result<Value, NormalizeError> {
        if self.in_progress.contains(&id) {
            tracing::trace!(%id, "cut JSOG back-reference");
            return Ok(self.scalar_fields(&id));
        }
        if let Some(done) = self.resolved.get(&id) {
            tracing::trace!(%id, "inlined JSOG reference");
            return Ok(done.clone());
        }
        let definition = self
            .definitions
            .get(&id)
            .cloned()
            .ok_or_else(|| NormalizeError::UnresolvedReference(id.clone()))?;
        tracing::trace!(%id, "inlined forward JSOG reference");
        self.decode_identified(id, definition)
    }

    fn decode_identified(
        &mut self,
        id: String,
        map: Map<String, Value>,
    ) -> Result<Value, NormalizeError> {
        self.in_progress.insert(id.clone());
        let fields = self.decode_fields(map)?;
        self.in_progress.remove(&id);
        let value = Value::Object(fields);
        self.resolved.insert(id, value.clone());
        Ok(value)
    }

    /// The non-container fields of definition `id`, without markers.
    fn scalar_fields(&self, id: &str) -> Value {
        let fields = self
            .definitions
            .get(id)
            .into_iter()
            .flatten()
            .filter(|(key, value)| *key != ID_KEY && !value.is_object() && !value.is_array())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Object(fields)
    }

    fn decode_fields(&mut self, map: Map<String, Value>) -> Result<Map<String, Value>, NormalizeError> {
        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            if key == ID_KEY {
                continue;
            }
            out.insert(key, self.decode(child)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_values_pass_through() {
        for value in [
            json!(null),
            json!(42),
            json!("atlas"),
            json!([1, 2, 3]),
            json!({"id": 1, "nome": "atlas"}),
        ] {
            assert_eq!(normalize(value.clone()).unwrap(), value);
        }
    }

    #[test]
    fn id_markers_are_stripped() {
        let encoded = json!({"@id": "1", "id": 7, "nome": "atlas"});
        assert_eq!(normalize(encoded).unwrap(), json!({"id": 7, "nome": "atlas"}));
    }

    #[test]
    fn shared_object_is_inlined_at_every_path() {
        let encoded = json!({
            "@id": "1",
            "content": [
                {"@id": "2", "id": 1, "livro": {"@id": "3", "titulo": "Dom Casmurro"}},
                {"@id": "4", "id": 2, "livro": {"@ref": "3"}}
            ]
        });
        let expected = json!({
            "content": [
                {"id": 1, "livro": {"titulo": "Dom Casmurro"}},
                {"id": 2, "livro": {"titulo": "Dom Casmurro"}}
            ]
        });
        assert_eq!(normalize(encoded).unwrap(), expected);
    }

    #[test]
    fn reference_may_precede_definition() {
        let encoded = json!([{"@ref": "9"}, {"@id": "9", "nome": "x"}]);
        assert_eq!(normalize(encoded).unwrap(), json!([{"nome": "x"}, {"nome": "x"}]));
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let encoded = json!([{"@id": 1, "a": true}, {"@ref": 1}]);
        assert_eq!(normalize(encoded).unwrap(), json!([{"a": true}, {"a": true}]));
    }

    #[test]
    fn nested_shared_objects_resolve_transitively() {
        let encoded = json!({
            "a": {"@id": "1", "autor": {"@id": "2", "nome": "Machado"}},
            "b": {"@ref": "1"},
            "c": {"@ref": "2"}
        });
        let autor = json!({"nome": "Machado"});
        assert_eq!(
            normalize(encoded).unwrap(),
            json!({"a": {"autor": autor}, "b": {"autor": autor}, "c": autor})
        );
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let err = normalize(json!({"x": {"@ref": "404"}})).unwrap_err();
        assert_eq!(err, NormalizeError::UnresolvedReference("404".to_string()));
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let err = normalize(json!([{"@id": "1"}, {"@id": "1"}])).unwrap_err();
        assert_eq!(err, NormalizeError::DuplicateId("1".to_string()));
    }

    #[test]
    fn back_reference_to_ancestor_keeps_its_scalar_fields() {
        let encoded = json!({
            "@id": "1",
            "content": [{
                "@id": "2", "id": 4, "nome": "atlas", "descricao": "mapas",
                "livros": [{
                    "@id": "3", "id": 9, "titulo": "Mapas do Brasil",
                    "colecoes": [{"@ref": "2"}]
                }]
            }]
        });
        let expected = json!({
            "content": [{
                "id": 4, "nome": "atlas", "descricao": "mapas",
                "livros": [{
                    "id": 9, "titulo": "Mapas do Brasil",
                    "colecoes": [{"id": 4, "nome": "atlas", "descricao": "mapas"}]
                }]
            }]
        });
        assert_eq!(normalize(encoded).unwrap(), expected);
    }

    #[test]
    fn self_reference_is_cut() {
        let encoded = json!({"@id": "1", "nome": "raiz", "eu": {"@ref": "1"}});
        assert_eq!(
            normalize(encoded).unwrap(),
            json!({"nome": "raiz", "eu": {"nome": "raiz"}})
        );
    }

    #[test]
    fn cycle_through_forward_reference_terminates() {
        let encoded = json!([
            {"@ref": "a"},
            {"@id": "a", "n": 1, "b": {"@id": "b", "n": 2, "a": {"@ref": "a"}}}
        ]);
        let a = json!({"n": 1, "b": {"n": 2, "a": {"n": 1}}});
        assert_eq!(normalize(encoded).unwrap(), json!([a, a]));
    }

    #[test]
    fn invalid_marker_is_an_error() {
        let err = normalize(json!({"@ref": {"nested": 1}})).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidId(_)));
    }
}
