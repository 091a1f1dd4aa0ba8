use anyhow::Result;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl SearchResult {
    /// Release year as a 4-digit string, when the release date carries one.
    pub fn year(&self) -> Option<String> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()))
            .map(String::from)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

pub struct TmdbClient {
    client: reqwest::Client,
    token: String,
}

impl TmdbClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            token: std::env::var("TMDB_API_TOKEN")?,
        })
    }

    /// Movie search, ordered by relevance. `year` narrows the search to
    /// releases from that year.
    pub async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<SearchResult>> {
        let mut request = self
            .client
            .get(format!("{}/search/movie", BASE_URL))
            .bearer_auth(&self.token)
            .query(&[("query", title)]);
        if let Some(year) = year {
            request = request.query(&[("year", year)]);
        }
        Ok(request
            .send()
            .await?
            .json::<SearchResponse>()
            .await?
            .results)
    }

    /// Candidate release years in relevance order. Network and parse failures
    /// degrade to an empty list; callers never see an error from here.
    pub async fn candidate_years(&self, title: &str, year: Option<&str>) -> Vec<String> {
        match self.search(title, year).await {
            Ok(results) => results.iter().filter_map(SearchResult::year).collect(),
            Err(_) => Vec::new(),
        }
    }
}
