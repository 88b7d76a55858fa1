//! Rutas con punto sobre JSON: `address.city`, `medications.1.name`.

use serde_json::Value;

/// Resuelve `path` dentro de `root`. Los segmentos numéricos indexan
/// arreglos. Ruta vacía devuelve la raíz.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, segment| match current {
                       Value::Object(map) => map.get(segment),
                       Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                       _ => None,
                   })
}

/// Une un prefijo y un segmento con punto, omitiendo prefijos vacíos.
pub fn join(prefix: &str, segment: &str) -> String {
    match (prefix.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{segment}"),
    }
}

/// Valor ausente a efectos de formulario: inexistente, null o string vacío.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_objects_and_arrays() {
        let v = json!({"address": {"city": "Lima"}, "items": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(resolve(&v, "address.city"), Some(&json!("Lima")));
        assert_eq!(resolve(&v, "items.1.name"), Some(&json!("b")));
        assert_eq!(resolve(&v, "items.7.name"), None);
        assert_eq!(resolve(&v, "address.city.zip"), None);
    }

    #[test]
    fn join_skips_empty_prefix() {
        assert_eq!(join("", "email"), "email");
        assert_eq!(join("items.0", "name"), "items.0.name");
    }

    #[test]
    fn blank_covers_whitespace_strings() {
        assert!(is_blank(Some(&json!("   "))));
        assert!(is_blank(Some(&Value::Null)));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!(false))));
    }
}
