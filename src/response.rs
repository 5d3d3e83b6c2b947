use crate::error::{FeedlyError, Result};
use serde::de::DeserializeOwned;

/// Body meaning "the collection exists but is empty"
pub const EMPTY_ARRAY: &str = "[]";

/// Body meaning "nothing to report"
pub const EMPTY_OBJECT: &str = "{}";

/// Interpret a response body as `T`.
///
/// - `[]` yields `Some(T::default())`
/// - an empty body or `{}` yields `None`
/// - anything else is deserialized, after every `[]` in the text has been
///   rewritten to `{}`: the API emits empty arrays where it means empty
///   objects, and the converters in `coerce` handle the remaining quirks.
///
/// Deserialization failures report the path of the offending field. Text
/// after the JSON value is rejected.
pub fn parse_body<T>(body: &str) -> Result<Option<T>>
where
    T: DeserializeOwned + Default,
{
    if body == EMPTY_ARRAY {
        return Ok(Some(T::default()));
    }
    if body.is_empty() || body == EMPTY_OBJECT {
        return Ok(None);
    }

    let normalized = body.replace(EMPTY_ARRAY, EMPTY_OBJECT);
    let mut de = serde_json::Deserializer::from_str(&normalized);
    let value = serde_path_to_error::deserialize(&mut de)?;
    de.end().map_err(|source| FeedlyError::Deserialize {
        path: ".".to_string(),
        message: source.to_string(),
        source,
    })?;
    Ok(Some(value))
}
