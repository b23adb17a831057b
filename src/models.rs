use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Placeholder shown for any optional field the catalog left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// The two curated listings shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Popular,
    TopRated,
}

impl Category {
    pub const ALL: [Category; 2] = [Self::Popular, Self::TopRated];

    pub fn label(self) -> &'static str {
        match self {
            Self::Popular => "Popular",
            Self::TopRated => "Top Rated",
        }
    }

    pub fn feed(self) -> Feed {
        match self {
            Self::Popular => Feed::Popular,
            Self::TopRated => Feed::TopRated,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Popular => Self::TopRated,
            Self::TopRated => Self::Popular,
        }
    }
}

/// Every paginated listing endpoint the catalog exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Feed {
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
}

impl Feed {
    pub fn path(self) -> &'static str {
        match self {
            Self::Popular => "/movie/popular",
            Self::NowPlaying => "/movie/now_playing",
            Self::TopRated => "/movie/top_rated",
            Self::Upcoming => "/movie/upcoming",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Popular => "Popular",
            Self::NowPlaying => "Now Playing",
            Self::TopRated => "Top Rated",
            Self::Upcoming => "Upcoming",
        }
    }
}

/// One page of a paginated listing or search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

/// Lightweight row for list display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl TitleSummary {
    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// False for a missing, zero or NaN rating.
    pub fn has_rating(&self) -> bool {
        matches!(self.vote_average, Some(v) if v != 0.0 && !v.is_nan())
    }

    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn year_label(&self) -> String {
        self.year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// Extended record returned by the get-by-id endpoint with credits and
/// recommendations appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetail {
    #[serde(flatten)]
    pub summary: TitleSummary,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub recommendations: Option<Paged<TitleSummary>>,
}

impl TitleDetail {
    pub const CAST_LIMIT: usize = 10;

    /// Billed cast, capped at `CAST_LIMIT`.
    pub fn top_cast(&self) -> &[CastMember] {
        match &self.credits {
            Some(credits) => &credits.cast[..credits.cast.len().min(Self::CAST_LIMIT)],
            None => &[],
        }
    }

    pub fn recommended(&self) -> &[TitleSummary] {
        self.recommendations
            .as_ref()
            .map(|r| r.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn overview_text(&self) -> &str {
        match self.overview.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => "No description available",
        }
    }

    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(minutes) if minutes > 0 => format!("{minutes} min"),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn budget_label(&self) -> Option<String> {
        (self.budget > 0).then(|| format_millions(self.budget))
    }

    pub fn revenue_label(&self) -> Option<String> {
        (self.revenue > 0).then(|| format_millions(self.revenue))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub official: bool,
}

impl Video {
    pub fn url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub results: Vec<Video>,
}

impl VideosResponse {
    /// Best playable trailer: official trailers first, then any trailer,
    /// then any playable video.
    pub fn trailer(&self) -> Option<&Video> {
        let playable = || self.results.iter().filter(|v| v.url().is_some());
        playable()
            .find(|v| v.kind == "Trailer" && v.official)
            .or_else(|| playable().find(|v| v.kind == "Trailer"))
            .or_else(|| playable().next())
    }
}

/// Year of a `YYYY-MM-DD` release date; empty or malformed dates yield `None`.
pub fn release_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

pub fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(v) if !v.is_nan() => format!("{v:.1}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_millions(amount: u64) -> String {
    format!("${:.1}M", amount as f64 / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"{
        "id": 550,
        "title": "Fight Club",
        "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
        "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
        "vote_average": 8.4,
        "release_date": "1999-10-15",
        "overview": "A ticking-time-bomb insomniac...",
        "runtime": 139,
        "budget": 63000000,
        "revenue": 100853753,
        "genres": [{"id": 18, "name": "Drama"}],
        "credits": {"cast": [
            {"id": 819, "name": "Edward Norton", "character": "Narrator", "profile_path": "/a.jpg"},
            {"id": 287, "name": "Brad Pitt", "character": "Tyler Durden", "profile_path": null}
        ]},
        "recommendations": {"page": 1, "results": [{"id": 680, "title": "Pulp Fiction"}], "total_pages": 2, "total_results": 40}
    }"#;

    #[test]
    fn test_detail_decodes_appended_resources() {
        let detail: TitleDetail = serde_json::from_str(DETAIL_JSON).unwrap();
        assert_eq!(detail.summary.id, 550);
        assert_eq!(detail.summary.year(), Some(1999));
        assert_eq!(detail.top_cast().len(), 2);
        assert_eq!(detail.top_cast()[1].profile_path, None);
        assert_eq!(detail.recommended()[0].title, "Pulp Fiction");
        assert_eq!(detail.runtime_label(), "139 min");
        assert_eq!(detail.budget_label().as_deref(), Some("$63.0M"));
        assert_eq!(detail.revenue_label().as_deref(), Some("$100.9M"));
    }

    #[test]
    fn test_detail_missing_fields_use_placeholders() {
        let detail: TitleDetail =
            serde_json::from_str(r#"{"id": 1, "title": "Bare", "runtime": null, "overview": ""}"#)
                .unwrap();
        assert_eq!(detail.runtime_label(), NOT_AVAILABLE);
        assert_eq!(detail.summary.rating_label(), NOT_AVAILABLE);
        assert_eq!(detail.summary.year_label(), NOT_AVAILABLE);
        assert_eq!(detail.overview_text(), "No description available");
        assert!(detail.budget_label().is_none());
        assert!(detail.top_cast().is_empty());
        assert!(detail.recommended().is_empty());
    }

    #[test]
    fn test_cast_capped_at_ten() {
        let cast: Vec<CastMember> = (0..15)
            .map(|i| CastMember {
                id: i,
                name: format!("Actor {i}"),
                character: None,
                profile_path: None,
            })
            .collect();
        let mut detail: TitleDetail = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        detail.credits = Some(Credits { cast });
        assert_eq!(detail.top_cast().len(), TitleDetail::CAST_LIMIT);
        assert_eq!(detail.top_cast()[9].name, "Actor 9");
    }

    #[test]
    fn test_release_year_parsing() {
        assert_eq!(release_year(Some("2024-02-29")), Some(2024));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(Some("soon")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn test_rating_truthiness() {
        let mut title = TitleSummary {
            id: 1,
            title: "x".into(),
            poster_path: None,
            vote_average: Some(0.0),
            release_date: None,
        };
        assert!(!title.has_rating());
        assert_eq!(title.rating_label(), "0.0");
        title.vote_average = None;
        assert!(!title.has_rating());
        title.vote_average = Some(6.56);
        assert!(title.has_rating());
        assert_eq!(title.rating_label(), "6.6");
    }

    #[test]
    fn test_paged_defaults() {
        let page: Paged<TitleSummary> = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_paged_without_results_is_empty() {
        let page: Paged<TitleSummary> = serde_json::from_str(r#"{"page": 3, "total_pages": 4}"#).unwrap();
        assert_eq!(page.page, 3);
        assert!(page.results.is_empty());

        let detail: TitleDetail =
            serde_json::from_str(r#"{"id": 5, "title": "X", "recommendations": {"page": 1}}"#).unwrap();
        assert!(detail.recommended().is_empty());
    }

    #[test]
    fn test_trailer_selection_prefers_official() {
        let videos: VideosResponse = serde_json::from_str(
            r#"{"id": 7, "results": [
                {"key": "teaser", "name": "Teaser", "site": "YouTube", "type": "Teaser"},
                {"key": "fan", "name": "Fan trailer", "site": "YouTube", "type": "Trailer", "official": false},
                {"key": "off", "name": "Official", "site": "YouTube", "type": "Trailer", "official": true}
            ]}"#,
        )
        .unwrap();
        let trailer = videos.trailer().unwrap();
        assert_eq!(trailer.key, "off");
        assert_eq!(
            trailer.url().as_deref(),
            Some("https://www.youtube.com/watch?v=off")
        );
    }

    #[test]
    fn test_trailer_skips_unplayable_sites() {
        let videos: VideosResponse = serde_json::from_str(
            r#"{"results": [{"key": "k", "site": "Dailymotion", "type": "Trailer"}]}"#,
        )
        .unwrap();
        assert!(videos.trailer().is_none());
    }

    #[test]
    fn test_category_maps_to_feed() {
        assert_eq!(Category::Popular.feed().path(), "/movie/popular");
        assert_eq!(Category::TopRated.feed().path(), "/movie/top_rated");
        assert_eq!(Category::Popular.other(), Category::TopRated);
    }
}
