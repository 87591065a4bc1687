//! JSON encoding of the persisted location cache.
//!
//! The file is an array of records:
//!
//! ```json
//! [{"subject": {"value": "8.8.8.8"},
//!   "coords": {"lat": 37.4, "long": -122.1},
//!   "valid": true,
//!   "parameters": {"city": {"t": "s", "v": "Mountain View"}}}]
//! ```
//!
//! Parameter values carry a one-letter type tag (`l`, `i`, `s`, `d`, `f`). An
//! unknown tag fails the whole decode.

use std::collections::{BTreeMap, HashMap};

use geotrace_core::{Coordinate, GeoLocation, ParamValue, Subject};
use serde::{Deserialize, Serialize};

use crate::error::CacheLoadError;

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    subject: serde_json::Value,
    coords: Coordinate,
    valid: bool,
    #[serde(default)]
    parameters: BTreeMap<String, ParamValue>,
}

/// Whether every number in `location` survives JSON; `NaN` and infinities do not.
fn is_finite<S: Subject>(location: &GeoLocation<S>) -> bool {
    let coordinate = location.coordinate();
    coordinate.latitude_deg.is_finite()
        && coordinate.longitude_deg.is_finite()
        && location.parameters().values().all(|value| match value {
            ParamValue::F64(v) => v.is_finite(),
            ParamValue::F32(v) => v.is_finite(),
            ParamValue::I64(_) | ParamValue::I32(_) | ParamValue::Str(_) => true,
        })
}

/// Serializes `entries`, ordered by subject so the output is stable.
///
/// Entries holding a non-finite number are left out with a warning, since
/// JSON would write them as `null` and fail the next load.
///
/// # Errors
///
/// Returns the `serde_json` error if a record cannot be encoded.
pub fn encode<'a, S, I>(entries: I) -> Result<Vec<u8>, serde_json::Error>
where
    S: Subject,
    I: IntoIterator<Item = &'a GeoLocation<S>>,
{
    let mut records: Vec<(String, CacheRecord)> = entries
        .into_iter()
        .filter(|location| {
            let keep = is_finite(location);
            if !keep {
                tracing::warn!(subject = %location.subject(), "dropping non-finite location from cache");
            }
            keep
        })
        .map(|location| {
            (
                location.subject().to_string(),
                CacheRecord {
                    subject: location.subject().to_json(),
                    coords: location.coordinate(),
                    valid: location.has_valid_coordinates(),
                    parameters: location.parameters().clone(),
                },
            )
        })
        .collect();
    records.sort_by(|a, b| a.0.cmp(&b.0));
    let records: Vec<CacheRecord> = records.into_iter().map(|(_, r)| r).collect();
    serde_json::to_vec_pretty(&records)
}

/// Rebuilds the cache map from bytes produced by [`encode`].
///
/// # Errors
///
/// Returns [`CacheLoadError`] if the JSON is malformed, a parameter tag is
/// unknown, or a subject cannot be rebuilt. No partial result is returned.
pub fn decode<S: Subject>(bytes: &[u8]) -> Result<HashMap<S, GeoLocation<S>>, CacheLoadError> {
    let records: Vec<CacheRecord> =
        serde_json::from_slice(bytes).map_err(|e| CacheLoadError::Deserialize {
            context: "location cache".to_string(),
            source: e,
        })?;

    let mut entries = HashMap::with_capacity(records.len());
    for record in records {
        let subject = S::from_json(&record.subject)?;
        let location =
            GeoLocation::from_parts(subject.clone(), record.coords, record.valid, record.parameters);
        entries.insert(subject, location);
    }
    Ok(entries)
}
