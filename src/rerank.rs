use crate::clients::movies::Movie;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Half-life of the recency term, in years.
const RECENCY_HALF_LIFE_YEARS: f64 = 10.0;
/// Recency credited to candidates without a usable release date.
const UNKNOWN_RECENCY: f64 = 0.5;

/// User-adjustable term weights, each clamped to `[0, 1]` before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub preference: f64,
    pub recency: f64,
    pub rating: f64,
    pub popularity: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            preference: 1.0,
            recency: 0.3,
            rating: 0.7,
            popularity: 0.4,
        }
    }
}

impl Weights {
    fn clamped(self) -> Self {
        let clamp = |w: f64| if w.is_nan() { 0.0 } else { w.clamp(0.0, 1.0) };
        Self {
            preference: clamp(self.preference),
            recency: clamp(self.recency),
            rating: clamp(self.rating),
            popularity: clamp(self.popularity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie: Movie,
    pub poster_url: Option<String>,
    pub score: f64,
}

/// Scores and orders `candidates`, best first.
///
/// Excluded ids and repeated ids are dropped (first occurrence wins). Equal
/// scores keep their input order.
pub fn rerank(
    candidates: Vec<Movie>,
    preferred_genres: &[u32],
    excluded: &HashSet<u64>,
    weights: Weights,
    today: NaiveDate,
) -> Vec<ScoredMovie> {
    let weights = weights.clamped();
    let mut seen = HashSet::new();
    let candidates: Vec<Movie> = candidates
        .into_iter()
        .filter(|movie| !excluded.contains(&movie.id) && seen.insert(movie.id))
        .collect();

    let max_votes = candidates.iter().map(|movie| movie.vote_count).max().unwrap_or(0);

    let mut scored: Vec<ScoredMovie> = candidates
        .into_iter()
        .map(|movie| {
            let score = weights.preference * preference(&movie, preferred_genres)
                + weights.recency * recency(&movie, today)
                + weights.rating * (movie.vote_average.clamp(0.0, 10.0) / 10.0)
                + weights.popularity * popularity(movie.vote_count, max_votes);
            ScoredMovie {
                poster_url: movie.poster_url(),
                movie,
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

fn preference(movie: &Movie, preferred: &[u32]) -> f64 {
    if movie.genre_ids.is_empty() {
        return 0.0;
    }
    let hits = movie
        .genre_ids
        .iter()
        .filter(|id| preferred.contains(id))
        .count();
    hits as f64 / movie.genre_ids.len() as f64
}

fn recency(movie: &Movie, today: NaiveDate) -> f64 {
    let Some(released) = movie
        .release_date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    else {
        return UNKNOWN_RECENCY;
    };
    let age_years = ((today - released).num_days().max(0)) as f64 / 365.25;
    0.5_f64.powf(age_years / RECENCY_HALF_LIFE_YEARS)
}

/// Log-dampened vote count relative to the best-voted candidate.
fn popularity(votes: u64, max_votes: u64) -> f64 {
    if max_votes == 0 {
        return 0.0;
    }
    (votes as f64).ln_1p() / (max_votes as f64).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, genres: &[u32], rating: f64, votes: u64, released: Option<&str>) -> Movie {
        Movie {
            id,
            title: format!("movie {id}"),
            overview: String::new(),
            genre_ids: genres.to_vec(),
            release_date: released.map(str::to_string),
            vote_average: rating,
            vote_count: votes,
            poster_path: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("date")
    }

    fn ids(scored: &[ScoredMovie]) -> Vec<u64> {
        scored.iter().map(|entry| entry.movie.id).collect()
    }

    #[test]
    fn identical_scores_keep_input_order() {
        let candidates = vec![
            movie(3, &[28], 7.0, 100, Some("2020-01-01")),
            movie(1, &[28], 7.0, 100, Some("2020-01-01")),
            movie(2, &[28], 7.0, 100, Some("2020-01-01")),
        ];
        let ranked = rerank(candidates, &[28], &HashSet::new(), Weights::default(), today());
        assert_eq!(ids(&ranked), vec![3, 1, 2]);
    }

    #[test]
    fn preferred_genre_outranks_rating_when_weighted() {
        let candidates = vec![
            movie(1, &[18], 9.0, 1000, Some("2024-01-01")),
            movie(2, &[35], 6.0, 1000, Some("2024-01-01")),
        ];
        let weights = Weights {
            preference: 1.0,
            recency: 0.0,
            rating: 0.2,
            popularity: 0.0,
        };
        let ranked = rerank(candidates, &[35], &HashSet::new(), weights, today());
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn newer_releases_score_higher_on_recency() {
        let old = movie(1, &[], 0.0, 0, Some("1996-01-01"));
        let new = movie(2, &[], 0.0, 0, Some("2025-06-01"));
        assert!(recency(&new, today()) > recency(&old, today()));
        assert!((recency(&old, today()) - 0.125).abs() < 0.01);
        assert_eq!(recency(&movie(3, &[], 0.0, 0, None), today()), UNKNOWN_RECENCY);
    }

    #[test]
    fn popularity_is_dampened_and_bounded() {
        assert_eq!(popularity(0, 0), 0.0);
        assert_eq!(popularity(500, 500), 1.0);
        let half = popularity(50, 5000);
        assert!(half > 0.4 && half < 0.5);
    }

    #[test]
    fn excluded_and_duplicate_ids_are_removed() {
        let candidates = vec![
            movie(1, &[28], 5.0, 10, None),
            movie(2, &[28], 5.0, 10, None),
            movie(1, &[28], 9.0, 10, None),
        ];
        let excluded = HashSet::from([2]);
        let ranked = rerank(candidates, &[28], &excluded, Weights::default(), today());
        assert_eq!(ids(&ranked), vec![1]);
        assert_eq!(ranked[0].movie.vote_average, 5.0);
    }

    #[test]
    fn weights_are_clamped() {
        let candidates = vec![movie(1, &[28], 10.0, 10, Some("2026-01-01"))];
        let weights = Weights {
            preference: 5.0,
            recency: -1.0,
            rating: f64::NAN,
            popularity: 2.0,
        };
        let ranked = rerank(candidates, &[28], &HashSet::new(), weights, today());
        assert!((ranked[0].score - 2.0).abs() < 1e-9);
    }
}
