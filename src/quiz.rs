use serde::{Deserialize, Serialize};

/// Movie genres offered by the recommendation quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Documentary,
    Drama,
    Fantasy,
    Horror,
    Romance,
    ScienceFiction,
    Thriller,
}

impl Genre {
    /// Genre id used by the movie metadata service.
    pub fn catalog_id(self) -> u32 {
        match self {
            Self::Action => 28,
            Self::Adventure => 12,
            Self::Animation => 16,
            Self::Comedy => 35,
            Self::Documentary => 99,
            Self::Drama => 18,
            Self::Fantasy => 14,
            Self::Horror => 27,
            Self::Romance => 10749,
            Self::ScienceFiction => 878,
            Self::Thriller => 53,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenreScore {
    pub genre: Genre,
    pub score: u32,
}

/// Counts answers per genre, keeping first-answered order.
pub fn tally(answers: &[Genre]) -> Vec<GenreScore> {
    let mut scores: Vec<GenreScore> = Vec::new();
    for &genre in answers {
        match scores.iter_mut().find(|entry| entry.genre == genre) {
            Some(entry) => entry.score += 1,
            None => scores.push(GenreScore { genre, score: 1 }),
        }
    }
    scores
}

/// The winning genre, blended with the runner-up when the runner-up is tied
/// or one point behind.
pub fn pick_genres(scores: &[GenreScore]) -> Vec<Genre> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    match ranked.as_slice() {
        [] => Vec::new(),
        [top] => vec![top.genre],
        [top, second, ..] if top.score - second.score <= 1 => vec![top.genre, second.genre],
        [top, ..] => vec![top.genre],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_in_first_seen_order() {
        let scores = tally(&[Genre::Comedy, Genre::Drama, Genre::Comedy]);
        assert_eq!(
            scores,
            vec![
                GenreScore { genre: Genre::Comedy, score: 2 },
                GenreScore { genre: Genre::Drama, score: 1 },
            ]
        );
    }

    #[test]
    fn clear_winner_is_not_blended() {
        let scores = tally(&[Genre::Horror, Genre::Horror, Genre::Horror, Genre::Romance]);
        assert_eq!(pick_genres(&scores), vec![Genre::Horror]);
    }

    #[test]
    fn one_point_gap_blends() {
        let scores = tally(&[Genre::Action, Genre::Comedy, Genre::Comedy]);
        assert_eq!(pick_genres(&scores), vec![Genre::Comedy, Genre::Action]);
    }

    #[test]
    fn tie_blends_in_answer_order() {
        let scores = tally(&[Genre::Drama, Genre::ScienceFiction]);
        assert_eq!(pick_genres(&scores), vec![Genre::Drama, Genre::ScienceFiction]);
    }

    #[test]
    fn empty_and_single_answers() {
        assert!(pick_genres(&[]).is_empty());
        assert_eq!(pick_genres(&tally(&[Genre::Fantasy])), vec![Genre::Fantasy]);
    }

    #[test]
    fn genres_deserialize_from_snake_case() {
        let genre: Genre = serde_json::from_str("\"science_fiction\"").expect("genre");
        assert_eq!(genre.catalog_id(), 878);
    }
}
