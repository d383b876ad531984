use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Original languages the catalog keeps for genre and theater listings
pub const SUPPORTED_LANGUAGES: [&str; 8] = ["hi", "te", "ta", "en", "ja", "ml", "kn", "mr"];

/// One page of TMDB movie results
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    /// Absent when TMDB answers with an error body
    pub results: Option<Vec<TmdbMovie>>,
}

/// A TMDB movie as returned by list endpoints.
/// Fields not modelled here are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_language: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TmdbMovie {
    pub fn in_supported_language(&self) -> bool {
        SUPPORTED_LANGUAGES.contains(&self.original_language.as_str())
    }
}

/// Condensed movie card for the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopPick {
    pub title: String,
    /// Full w500 poster URL, null when TMDB has no poster
    pub poster: Option<String>,
    /// TMDB genre ids joined with ", "
    #[schema(example = "28, 12")]
    pub genre: String,
    pub rated: f64,
}

impl From<&TmdbMovie> for TopPick {
    fn from(movie: &TmdbMovie) -> Self {
        Self {
            title: movie.title.clone(),
            poster: movie
                .poster_path
                .as_ref()
                .map(|path| format!("{}{}", POSTER_BASE_URL, path)),
            genre: movie
                .genre_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            rated: movie.vote_average,
        }
    }
}

/// Genres offered by the genre listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    SciFi,
    Supernatural,
    Horror,
    Comedy,
    Animation,
}

impl Genre {
    /// Parse the URL slug; slugs are case-sensitive
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "sciFi" => Some(Genre::SciFi),
            "supernatural" => Some(Genre::Supernatural),
            "horror" => Some(Genre::Horror),
            "comedy" => Some(Genre::Comedy),
            "animation" => Some(Genre::Animation),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Genre::SciFi => "sciFi",
            Genre::Supernatural => "supernatural",
            Genre::Horror => "horror",
            Genre::Comedy => "comedy",
            Genre::Animation => "animation",
        }
    }

    /// TMDB genre id
    pub fn tmdb_id(&self) -> u32 {
        match self {
            Genre::SciFi => 878,
            Genre::Supernatural => 14,
            Genre::Horror => 27,
            Genre::Comedy => 35,
            Genre::Animation => 16,
        }
    }
}

/// A partner theater
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Theater {
    pub id: u32,
    #[schema(example = "PVR Cinemas")]
    pub name: String,
}

const THEATERS: [(u32, &str); 10] = [
    (1, "PVR Cinemas"),
    (2, "INOX"),
    (3, "Carnival Cinemas"),
    (4, "Cinepolis"),
    (5, "Miraj Cinemas"),
    (6, "Movietime Cinemas"),
    (7, "Wave Cinemas"),
    (8, "Rajhans Cinemas"),
    (9, "Mukta A2 Cinemas"),
    (10, "Gold Cinema"),
];

/// The fixed theater list
pub fn theaters() -> Vec<Theater> {
    THEATERS
        .iter()
        .map(|(id, name)| Theater {
            id: *id,
            name: name.to_string(),
        })
        .collect()
}

/// Look up a theater by the id used in URLs
pub fn find_theater(theater_id: &str) -> Option<Theater> {
    let id: u32 = theater_id.parse().ok()?;
    theaters().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(json: serde_json::Value) -> TmdbMovie {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_top_pick_from_movie() {
        let m = movie(serde_json::json!({
            "id": 1,
            "title": "Dune",
            "original_language": "en",
            "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
            "genre_ids": [878, 12],
            "vote_average": 7.8
        }));

        let pick = TopPick::from(&m);
        assert_eq!(pick.title, "Dune");
        assert_eq!(
            pick.poster.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
        );
        assert_eq!(pick.genre, "878, 12");
        assert_eq!(pick.rated, 7.8);
    }

    #[test]
    fn test_missing_poster_is_null() {
        let m = movie(serde_json::json!({"id": 2, "title": "X", "poster_path": null}));
        assert!(TopPick::from(&m).poster.is_none());
        assert_eq!(TopPick::from(&m).genre, "");
    }

    #[test]
    fn test_unmodelled_fields_pass_through() {
        let m = movie(serde_json::json!({"id": 3, "overview": "text", "adult": false}));
        let out = serde_json::to_value(&m).unwrap();
        assert_eq!(out["overview"], "text");
        assert_eq!(out["adult"], false);
    }

    #[test]
    fn test_genre_slugs() {
        assert_eq!(Genre::from_slug("sciFi").map(|g| g.tmdb_id()), Some(878));
        assert_eq!(Genre::from_slug("supernatural").map(|g| g.tmdb_id()), Some(14));
        assert_eq!(Genre::from_slug("horror").map(|g| g.tmdb_id()), Some(27));
        assert_eq!(Genre::from_slug("comedy").map(|g| g.tmdb_id()), Some(35));
        assert_eq!(Genre::from_slug("animation").map(|g| g.tmdb_id()), Some(16));
        assert!(Genre::from_slug("scifi").is_none());
        assert!(Genre::from_slug("romance").is_none());
        assert_eq!(Genre::SciFi.slug(), "sciFi");
    }

    #[test]
    fn test_theaters() {
        let all = theaters();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].name, "PVR Cinemas");
        assert_eq!(all[9].name, "Gold Cinema");
        assert_eq!(find_theater("2").map(|t| t.name), Some("INOX".to_string()));
        assert!(find_theater("11").is_none());
        assert!(find_theater("abc").is_none());
    }
}
