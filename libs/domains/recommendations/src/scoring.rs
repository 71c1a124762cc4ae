//! Turns raw index hits into ranked recommendations.

use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{IndexHit, Identity, Recommendation};

/// `clamp((1 - distance) * 100, 0, 100)` for a cosine distance in `[0, 2]`.
pub fn match_percentage(distance: f32) -> f64 {
    ((1.0 - f64::from(distance)) * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Deserialize)]
struct HitPayload {
    #[serde(default)]
    user_id: Option<Uuid>,
    username: String,
    name: String,
    age: u32,
    city: String,
    interests: Vec<String>,
}

/// Ranked results plus how many hits were discarded and why.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScoredHits {
    pub results: Vec<Recommendation>,
    pub dropped_self: usize,
    pub dropped_missing_distance: usize,
    pub dropped_malformed: usize,
    pub dropped_duplicate: usize,
}

/// Filters, scores and ranks hits for `requester`.
///
/// Drops the requester's own entry, hits without a usable distance, payloads
/// that do not describe a profile and repeated usernames. The rest are ordered
/// by descending match percentage (ties keep index order) and cut to `desired`.
pub fn score_hits(hits: Vec<IndexHit>, requester: &Identity, desired: usize) -> ScoredHits {
    let mut scored = ScoredHits::default();
    let mut seen = HashSet::new();

    for hit in hits {
        let Some(distance) = hit.distance.filter(|d| d.is_finite()) else {
            scored.dropped_missing_distance += 1;
            continue;
        };

        let Ok(payload) = serde_json::from_value::<HitPayload>(hit.payload) else {
            scored.dropped_malformed += 1;
            continue;
        };

        if payload.username == requester.username || payload.user_id == Some(requester.user_id) {
            scored.dropped_self += 1;
            continue;
        }

        if !seen.insert(payload.username.clone()) {
            scored.dropped_duplicate += 1;
            continue;
        }

        scored.results.push(Recommendation {
            username: payload.username,
            name: payload.name,
            age: payload.age,
            city: payload.city,
            interests: payload.interests,
            match_percentage: match_percentage(distance),
        });
    }

    scored.results.sort_by(|a, b| {
        b.match_percentage
            .partial_cmp(&a.match_percentage)
            .unwrap_or(Ordering::Equal)
    });
    scored.results.truncate(desired);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn requester() -> Identity {
        Identity::new(Uuid::from_u128(1), "ana")
    }

    fn hit(username: &str, distance: Option<f32>) -> IndexHit {
        IndexHit {
            id: Uuid::new_v4(),
            payload: json!({
                "user_id": Uuid::new_v4(),
                "username": username,
                "name": username.to_uppercase(),
                "age": 30,
                "city": "Zagreb",
                "interests": ["hiking"],
                "embedding_model": "m"
            }),
            distance,
        }
    }

    fn usernames(scored: &ScoredHits) -> Vec<&str> {
        scored.results.iter().map(|r| r.username.as_str()).collect()
    }

    #[test]
    fn test_match_percentage_bounds() {
        assert_eq!(match_percentage(0.0), 100.0);
        assert_eq!(match_percentage(1.0), 0.0);
        assert_eq!(match_percentage(2.0), 0.0);
        assert_eq!(match_percentage(-0.01), 100.0);
        assert!((match_percentage(0.125) - 87.5).abs() < 1e-9);
    }

    #[test]
    fn test_excludes_requester_by_username_and_id() {
        let mut by_id = hit("ana_old", Some(0.0));
        by_id.payload["user_id"] = json!(Uuid::from_u128(1));

        let scored = score_hits(
            vec![hit("ana", Some(0.0)), by_id, hit("ivo", Some(0.1))],
            &requester(),
            10,
        );

        assert_eq!(usernames(&scored), vec!["ivo"]);
        assert_eq!(scored.dropped_self, 2);
    }

    #[test]
    fn test_missing_distance_is_dropped_not_zeroed() {
        let scored = score_hits(
            vec![
                hit("ivo", None),
                hit("eva", Some(f32::NAN)),
                hit("marko", Some(0.5)),
            ],
            &requester(),
            10,
        );

        assert_eq!(usernames(&scored), vec!["marko"]);
        assert_eq!(scored.dropped_missing_distance, 2);
    }

    #[test]
    fn test_malformed_and_duplicate_hits() {
        let broken = IndexHit {
            id: Uuid::new_v4(),
            payload: json!({"username": "ghost"}),
            distance: Some(0.1),
        };

        let scored = score_hits(
            vec![broken, hit("ivo", Some(0.2)), hit("ivo", Some(0.3))],
            &requester(),
            10,
        );

        assert_eq!(usernames(&scored), vec!["ivo"]);
        assert_eq!(scored.dropped_malformed, 1);
        assert_eq!(scored.dropped_duplicate, 1);
    }

    #[test]
    fn test_orders_descending_and_truncates() {
        let scored = score_hits(
            vec![
                hit("far", Some(0.9)),
                hit("near", Some(0.05)),
                hit("tie_a", Some(0.3)),
                hit("tie_b", Some(0.3)),
            ],
            &requester(),
            3,
        );

        assert_eq!(usernames(&scored), vec!["near", "tie_a", "tie_b"]);
        assert!(
            scored
                .results
                .windows(2)
                .all(|w| w[0].match_percentage >= w[1].match_percentage)
        );
    }

    #[test]
    fn test_zero_desired_returns_nothing() {
        let scored = score_hits(vec![hit("ivo", Some(0.1))], &requester(), 0);
        assert!(scored.results.is_empty());
    }
}
