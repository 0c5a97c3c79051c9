use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod category;
pub mod order;
pub mod product;
pub mod settings;

/// Encode a value stored in a JSON text column.
pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T, column: &str) -> String {
    match serde_json::to_string(value) {
        Ok(text) => text,
        Err(err) => {
            log::error!("Failed to encode column {column}: {err}");
            "null".to_string()
        }
    }
}

/// Decode a JSON text column, falling back to the type's default for rows
/// written by older or hand-edited versions of the schema.
pub(crate) fn decode_json<T: DeserializeOwned + Default>(raw: &str, column: &str) -> T {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Malformed JSON in column {column}: {err}");
            T::default()
        }
    }
}
