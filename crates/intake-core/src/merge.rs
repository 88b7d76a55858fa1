//! Utilidades para fusionar payloads JSON de forma determinista.
//!
//! Merge "shallow": claves de `b` reemplazan a las de `a` cuando ambos son
//! objetos; si alguno no es objeto, `b` tiene precedencia.

use serde_json::Value;

pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        (_, other) => other.clone(),
    }
}
