use serde::{Deserialize, Serialize};

/// Base URL for w500 poster images on the TMDB image CDN
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A movie as it appears in TMDB list responses (search, discover)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl Movie {
    /// Full poster URL, if the movie has a poster
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }
}

/// One page of a TMDB list response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Response of `GET /movie/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Response of `GET /movie/{id}/credits`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    pub id: i64,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.video_type == "Trailer"
    }
}

/// Response of `GET /movie/{id}/videos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoList {
    pub id: i64,
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Everything the movie detail screen shows, fetched together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieOverview {
    pub movie: MovieDetail,
    pub cast: Vec<CastMember>,
    pub trailers: Vec<Video>,
}

/// Result of a browse request (search or discover)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowsePage {
    pub results: Vec<Movie>,
    /// Set when the catalog was unreachable and the built-in demo list was served
    pub demo: bool,
}

impl BrowsePage {
    pub fn live(page: MoviePage) -> Self {
        Self {
            results: page.results,
            demo: false,
        }
    }

    pub fn demo(page: MoviePage) -> Self {
        Self {
            results: page.results,
            demo: true,
        }
    }
}
