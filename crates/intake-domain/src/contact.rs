use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Datos de contacto del paso `personalInfo` de una consulta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_date_as_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Los formularios mandan `""` para una fecha opcional sin completar.
fn blank_date_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").map(Some).map_err(serde::de::Error::custom)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Forma canónica de un teléfono: sólo dígitos, con `+` inicial si lo
/// tenía. Dos teléfonos son el mismo si su forma canónica coincide.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_ignores_separators() {
        assert_eq!(normalize_phone(" +34 (600) 12-34-56 "), "+34600123456");
        assert_eq!(normalize_phone("600.123.456"), "600123456");
        assert_eq!(normalize_phone("600 123 456"), normalize_phone("600-123-456"));
    }

    #[test]
    fn blank_birth_date_is_absent() {
        let base = serde_json::json!({"firstName": "A", "lastName": "B", "email": "a@b.co", "phone": "1"});
        let mut with_blank = base.clone();
        with_blank["dateOfBirth"] = serde_json::json!("");
        let c: ContactDetails = serde_json::from_value(with_blank).unwrap();
        assert_eq!(c.date_of_birth, None);
        let mut with_date = base;
        with_date["dateOfBirth"] = serde_json::json!("1990-04-02T00:00:00Z");
        let c: ContactDetails = serde_json::from_value(with_date).unwrap();
        assert_eq!(c.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 2));
    }
}
