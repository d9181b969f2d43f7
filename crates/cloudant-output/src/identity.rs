//! Document identity generation.

use uuid::Uuid;

/// Returns a fresh document id: a version-4 random UUID in canonical text
/// form. Ids are not derived from record content, so a redelivered batch
/// stores its documents under new ids.
#[must_use]
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_distinct() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_document_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn ids_are_canonical_version_4() {
        let id = new_document_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
    }
}
