//! Wire decode boundary.
//!
//! The host pipeline hands `flush` a buffer of consecutive MessagePack
//! values, each framed as a two-element `[timestamp, record]` array. This
//! module decodes that buffer into [`RawValue`] trees, a closed union over
//! everything the wire can carry, including maps whose keys are not strings
//! and raw byte buffers. Normalization happens afterwards, in
//! [`crate::normalize`].

use std::fmt;
use std::io::Cursor;

use serde::de::{Deserialize, Deserializer, Error as DeError, MapAccess, SeqAccess, Visitor};
use serde_json::Number;
use tracing::warn;

/// A decoded wire value, before normalization.
///
/// Mapping keys are themselves [`RawValue`]s: the wire format does not
/// guarantee string keys, and rejecting non-string keys is the normalizer's
/// job, not the decoder's.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Bytes(Vec<u8>),
    Sequence(Vec<RawValue>),
    Mapping(Vec<(RawValue, RawValue)>),
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any MessagePack value")
    }

    fn visit_bool<E: DeError>(self, v: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(v))
    }

    fn visit_i64<E: DeError>(self, v: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v.into()))
    }

    fn visit_u64<E: DeError>(self, v: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v.into()))
    }

    fn visit_f64<E: DeError>(self, v: f64) -> Result<RawValue, E> {
        // NaN and infinities have no JSON representation.
        Ok(Number::from_f64(v).map_or(RawValue::Null, RawValue::Number))
    }

    fn visit_str<E: DeError>(self, v: &str) -> Result<RawValue, E> {
        Ok(RawValue::Text(v.to_string()))
    }

    fn visit_string<E: DeError>(self, v: String) -> Result<RawValue, E> {
        Ok(RawValue::Text(v))
    }

    fn visit_bytes<E: DeError>(self, v: &[u8]) -> Result<RawValue, E> {
        Ok(RawValue::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: DeError>(self, v: Vec<u8>) -> Result<RawValue, E> {
        Ok(RawValue::Bytes(v))
    }

    fn visit_unit<E: DeError>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_none<E: DeError>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<RawValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<RawValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Extension values (e.g. event-time timestamps) arrive this way;
        // they decode to their (tag, payload) pair.
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(RawValue::Mapping(entries))
    }
}

/// Decodes a raw batch buffer into its records.
///
/// Entries are read until the buffer is exhausted. A malformed entry ends
/// the loop with a warning and the records decoded so far are kept, which
/// mirrors how the host's own decoder loop terminates.
#[must_use]
pub fn decode_batch(data: &[u8]) -> Vec<RawValue> {
    let mut cursor = Cursor::new(data);
    let mut records = Vec::new();

    #[allow(clippy::cast_possible_truncation)]
    while (cursor.position() as usize) < data.len() {
        let mut de = rmp_serde::Deserializer::new(&mut cursor);
        match RawValue::deserialize(&mut de) {
            Ok(entry) => records.push(into_record(entry)),
            Err(e) => {
                warn!(
                    "stopping batch decode on malformed entry at byte {}: {e}",
                    cursor.position()
                );
                break;
            }
        }
    }
    records
}

/// Unwraps the host's `[timestamp, record]` framing. The timestamp is not
/// kept. A value that is not a framed pair is taken as the record itself.
fn into_record(entry: RawValue) -> RawValue {
    match entry {
        RawValue::Sequence(mut pair)
            if pair.len() == 2 && matches!(pair[1], RawValue::Mapping(_)) =>
        {
            pair.pop().unwrap_or(RawValue::Null)
        }
        other => other,
    }
}
