//! Esquema Diesel (escrito a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    wizard_drafts (wizard_id) {
        wizard_id -> Uuid,
        definition_hash -> Text,
        format_version -> Integer,
        current_step_id -> Text,
        payload -> Jsonb,
        saved_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
