use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::{ModelError, Result};
use crate::reference::id_text;
use crate::types::Record;

/// Accept either a bare array or a `{data: [...]}` envelope.
/// `null` is read as an empty collection.
pub fn unwrap_envelope(collection: Collection, payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) => Ok(Vec::new()),
            _ => Err(ModelError::UnexpectedPayload { collection }),
        },
        _ => Err(ModelError::UnexpectedPayload { collection }),
    }
}

/// Decode and shape-check one collection payload
pub fn decode_collection<T>(payload: Value) -> Result<Vec<T>>
where
    T: Record + DeserializeOwned,
{
    let collection = T::COLLECTION;
    let items = unwrap_envelope(collection, payload)?;
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        if item.get("id").and_then(id_text).is_none() {
            return Err(ModelError::MissingId { collection, index });
        }
        let record = serde_json::from_value::<T>(item).map_err(|source| {
            ModelError::InvalidRecord {
                collection,
                index,
                source,
            }
        })?;
        records.push(record);
    }

    log::debug!("Decoded {} {} records", records.len(), collection);
    Ok(records)
}

/// Parse raw JSON text for one collection
pub fn parse_collection<T>(raw: &str) -> Result<Vec<T>>
where
    T: Record + DeserializeOwned,
{
    let payload: Value = serde_json::from_str(raw).map_err(|source| ModelError::InvalidJson {
        collection: T::COLLECTION,
        source,
    })?;
    decode_collection(payload)
}
