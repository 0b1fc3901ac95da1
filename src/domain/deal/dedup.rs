use std::collections::HashSet;

use crate::shared::types::PriceObservation;

/// Collapse redundant sightings of the same game/store pair coming from
/// different sources. Keyed by lowercased title and store, never by price:
/// the first-seen observation for a key wins and output order preserves
/// first-seen order.
pub fn merge_observations(observations: Vec<PriceObservation>) -> Vec<PriceObservation> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(observations.len());

    for observation in observations {
        let key = (
            observation.title.to_lowercase(),
            observation.store.to_lowercase(),
        );
        if seen.insert(key) {
            merged.push(observation);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn observation(title: &str, store: &str, source_id: &str) -> PriceObservation {
        PriceObservation::new(title, store, 9.99, 19.99, 0.0, source_id, "", Utc::now())
    }

    #[test]
    fn test_merge_keeps_first_seen_and_order() {
        let merged = merge_observations(vec![
            observation("TitleA", "StoreX", "src1"),
            observation("titlea", "storex", "src2"),
            observation("TitleB", "StoreY", "src1"),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "TitleA");
        assert_eq!(merged[0].source_id, "src1");
        assert_eq!(merged[1].title, "TitleB");
    }

    #[test]
    fn test_merge_does_not_collapse_different_stores() {
        let merged = merge_observations(vec![
            observation("TitleA", "StoreX", "src1"),
            observation("TitleA", "StoreY", "src1"),
        ]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_observations(Vec::new()).is_empty());
    }
}
