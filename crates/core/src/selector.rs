//! Filters and ranks indexer results into an ordered candidate list (§4.2).

use crate::candidate::{IndexerResult, ScoredCandidate};
use crate::quality::score_release;

/// Drop results with fewer than one seeder, score the rest, and sort by `(score, seeders,
/// published_at)` descending. The sort is stable, so equal keys preserve indexer order
/// (§8 property 4).
pub fn select_candidates(results: Vec<IndexerResult>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = results
        .into_iter()
        .filter(|r| r.seeders >= 1)
        .map(|result| {
            let (facets, score) = score_release(&result.title, result.seeders);
            ScoredCandidate { result, facets, score }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.result.seeders.cmp(&a.result.seeders))
            .then_with(|| b.result.published_at.cmp(&a.result.published_at))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn result(guid: &str, title: &str, seeders: i64, age_secs: i64) -> IndexerResult {
        IndexerResult {
            release_guid: guid.to_string(),
            indexer_id: 1,
            title: title.to_string(),
            seeders,
            published_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn drops_zero_seeder_results() {
        let candidates = select_candidates(vec![result("a", "Movie.2020.1080p", 0, 0)]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn orders_by_score_then_seeders_then_recency() {
        let candidates = select_candidates(vec![
            result("low", "Movie.2020.720p.WEBRip", 4, 10),
            result("high", "Movie.2020.2160p.BluRay.TrueHD-GRP", 50, 10),
        ]);
        assert_eq!(candidates[0].result.release_guid, "high");
        assert_eq!(candidates[1].result.release_guid, "low");
    }

    #[test]
    fn ties_broken_by_seeders_then_publish_date() {
        let candidates = select_candidates(vec![
            result("older", "Movie.2020.1080p", 10, 100),
            result("newer", "Movie.2020.1080p", 10, 1),
        ]);
        assert_eq!(candidates[0].result.release_guid, "newer");
    }
}
