//! JSOG encoder matching what the library back end emits.
//!
//! Every object is written with an `"@id"` the first time it appears; a
//! later object equal to one already written becomes `{"@ref": "<id>"}`.

use serde_json::{json, Map, Value};

pub fn encode(value: &Value) -> Value {
    let mut encoder = Encoder {
        written: Vec::new(),
        next_id: 1,
    };
    encoder.encode(value)
}

struct Encoder {
    written: Vec<(Value, String)>,
    next_id: u64,
}

impl Encoder {
    fn encode(&mut self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|item| self.encode(item)).collect()),
            Value::Object(map) => {
                if let Some((_, id)) = self.written.iter().find(|(seen, _)| seen == value) {
                    return json!({ "@ref": id });
                }
                let id = self.next_id.to_string();
                self.next_id += 1;
                self.written.push((value.clone(), id.clone()));

                let mut out = Map::with_capacity(map.len() + 1);
                out.insert("@id".to_string(), Value::String(id));
                for (key, child) in map {
                    out.insert(key.clone(), self.encode(child));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }
}
