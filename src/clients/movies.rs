use super::get_json;
use crate::errors::ClientError;
use serde::{Deserialize, Serialize};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A discovery result as returned by the movie metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genres: Vec<NamedGenre>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Clone)]
pub struct MovieClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MovieClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// One page of movies matching any of `genre_ids`, most popular first.
    pub async fn discover_by_genres(
        &self,
        genre_ids: &[u32],
        page: u32,
    ) -> Result<DiscoverPage, ClientError> {
        let genres = genre_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let page = page.max(1).to_string();
        let request = self
            .http
            .get(format!("{}/discover/movie", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("with_genres", genres.as_str()),
                ("sort_by", "popularity.desc"),
                ("include_adult", "false"),
                ("page", page.as_str()),
            ]);
        get_json(request).await
    }

    pub async fn details(&self, id: u64) -> Result<MovieDetails, ClientError> {
        let request = self
            .http
            .get(format!("{}/movie/{id}", self.base_url))
            .query(&[("api_key", self.api_key.as_str())]);
        get_json(request).await
    }
}
