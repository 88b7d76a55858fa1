//! Canonical JSON minimal: claves de objetos ordenadas, sin espacios.
//!
//! Se usa para el `definition_hash` de un wizard y para el fingerprint del
//! objeto enviado al colaborador de submit.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // El Display de Value ya escapa el string como JSON.
        Value::String(_) => value.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (k, v) in map {
                tree.insert(k, to_canonical_json(v));
            }
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_recursively() {
        let a = json!({"b": 1, "a": {"z": true, "y": null}});
        assert_eq!(to_canonical_json(&a), r#"{"a":{"y":null,"z":true},"b":1}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let v = json!(["say \"hi\"", "line\nbreak"]);
        assert_eq!(to_canonical_json(&v), r#"["say \"hi\"","line\nbreak"]"#);
    }
}
