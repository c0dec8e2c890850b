use std::sync::LazyLock;

use regex::Regex;

use crate::app::params::ContentCard;

const ANIMATION_GENRE_ID: i64 = 16;
const TRAILER_KEYWORDS: [&str; 4] = ["трейлер", "trailer", "тизер", "teaser"];

pub(crate) fn is_anime_card(card: &ContentCard) -> bool {
    let lang = card
        .original_language
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let is_east_asian = matches!(lang.as_str(), "ja" | "zh" | "cn");
    let is_animation = card.genres.iter().any(|genre| {
        genre.id == Some(ANIMATION_GENRE_ID)
            || genre
                .name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case("animation"))
    });
    is_east_asian || is_animation
}

pub(crate) fn is_trailer_title(title: &str) -> bool {
    let lowered = title.to_lowercase();
    TRAILER_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

static YEAR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\d{4}\)").unwrap());
static TV_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\(TV\)").unwrap());
static SEASON_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Season \d+").unwrap());
static PART_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Part \d+").unwrap());

pub(crate) fn clean_search_title(raw: &str) -> String {
    let cleaned = YEAR_TAG.replace_all(raw, "");
    let cleaned = TV_TAG.replace_all(&cleaned, "");
    let cleaned = SEASON_TAG.replace_all(&cleaned, "");
    let cleaned = PART_TAG.replace_all(&cleaned, "");
    cleaned
        .replace([':', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn season_ordinal(season: u32) -> String {
    let suffix = if season % 10 == 1 && season != 11 {
        "st"
    } else if season % 10 == 2 && season != 12 {
        "nd"
    } else if season % 10 == 3 && season != 13 {
        "rd"
    } else {
        "th"
    };
    format!("{season}{suffix}")
}
