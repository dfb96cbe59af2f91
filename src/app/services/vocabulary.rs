use tracing::{info, warn};

use super::remote::{from_record, Query, RemoteError, RemoteStore, SortDirection};
use crate::app::domain::settings::Script;
use crate::app::domain::vocab::{sample_deck, VocabCard};

pub const VOCABULARY_COLLECTION: &str = "vocabulary";

pub fn vocabulary_query(script: Script, limit: usize) -> Query {
    Query::new(VOCABULARY_COLLECTION)
        .where_eq("script", script.as_str())
        .order_by("id", SortDirection::Ascending)
        .limit(limit)
}

/// Rows that do not decode as a card are skipped with a warning.
pub fn fetch_vocabulary(
    store: &dyn RemoteStore,
    script: Script,
    limit: usize,
) -> Result<Vec<VocabCard>, RemoteError> {
    let records = store.select(&vocabulary_query(script, limit))?;
    let total = records.len();

    let cards: Vec<VocabCard> = records
        .into_iter()
        .filter_map(|record| match from_record::<VocabCard>(record) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("Skipping vocabulary row: {}", e);
                None
            }
        })
        .collect();

    info!(loaded = cards.len(), total, script = script.as_str(), "vocabulary fetched");
    Ok(cards)
}

/// The deck to practice. Falls back to the built-in sample when the remote
/// store fails or has nothing for this script.
pub fn load_deck(store: &dyn RemoteStore, script: Script, limit: usize) -> Vec<VocabCard> {
    match fetch_vocabulary(store, script, limit) {
        Ok(cards) if !cards.is_empty() => cards,
        Ok(_) => {
            warn!(script = script.as_str(), "no vocabulary found, using sample deck");
            sample_deck(script)
        }
        Err(e) => {
            warn!("Failed to load vocabulary: {}. Using sample deck.", e);
            sample_deck(script)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::remote::{to_record, MemoryStore, RemoteErrorKind};
    use serde_json::json;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for card in [
            VocabCard::new(3, "貓", "maau1", "cat", Script::Cantonese),
            VocabCard::new(1, "狗", "gau2", "dog", Script::Cantonese),
            VocabCard::new(2, "猫", "māo", "cat", Script::Mandarin),
        ] {
            store
                .insert(VOCABULARY_COLLECTION, to_record(&card).unwrap())
                .unwrap();
        }
        store
    }

    #[test]
    fn test_fetch_filters_and_sorts() {
        let cards = fetch_vocabulary(&seeded(), Script::Cantonese, 10).unwrap();
        let ids: Vec<u64> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_fetch_respects_limit() {
        let cards = fetch_vocabulary(&seeded(), Script::Cantonese, 1).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].hanzi, "狗");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let store = seeded();
        let bad = match json!({"id": 9, "script": "cantonese"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.insert(VOCABULARY_COLLECTION, bad).unwrap();

        let cards = fetch_vocabulary(&store, Script::Cantonese, 10).unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_load_deck_falls_back_on_failure() {
        let store = seeded();
        store.inject_failure(RemoteError::new(RemoteErrorKind::Transport, "offline"));
        assert_eq!(load_deck(&store, Script::Mandarin, 10), sample_deck(Script::Mandarin));
    }

    #[test]
    fn test_load_deck_falls_back_when_empty() {
        let store = MemoryStore::new();
        assert_eq!(load_deck(&store, Script::Cantonese, 10), sample_deck(Script::Cantonese));
    }

    #[test]
    fn test_query_shape() {
        let q = vocabulary_query(Script::Mandarin, 25);
        assert_eq!(q.collection, VOCABULARY_COLLECTION);
        assert_eq!(q.limit, Some(25));
        assert_eq!(q.filters[0].value, json!("mandarin"));
    }
}
