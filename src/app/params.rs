use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SkipSegment {
    pub(crate) start: f64,
    pub(crate) end: f64,
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SegmentBag {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) skip: Vec<SkipSegment>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Genre {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ContentCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kinopoisk_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kp_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) imdb_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) original_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) original_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) original_language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) genres: Vec<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) number_of_seasons: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) first_air_date: Option<String>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl ContentCard {
    pub(crate) fn card_id(&self) -> Option<String> {
        [&self.id, &self.kinopoisk_id, &self.kp_id, &self.imdb_id]
            .into_iter()
            .find_map(|value| value.as_ref().and_then(value_id_string))
    }

    pub(crate) fn local_catalog_id(&self) -> Option<String> {
        if let Some(id) = self.kinopoisk_id.as_ref().and_then(value_id_string) {
            return Some(id);
        }
        if self.source.as_deref() == Some("kinopoisk")
            && let Some(id) = self.id.as_ref().and_then(value_id_string)
        {
            return Some(id);
        }
        self.kp_id.as_ref().and_then(value_id_string)
    }

    pub(crate) fn search_name(&self) -> Option<&str> {
        [&self.original_name, &self.original_title, &self.name]
            .into_iter()
            .find_map(|field| field.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    }

    pub(crate) fn release_year(&self) -> Option<i32> {
        let date = [&self.release_date, &self.first_air_date]
            .into_iter()
            .find_map(|field| field.as_deref().filter(|s| !s.is_empty()))?;
        date.get(..4)?.parse().ok()
    }

    pub(crate) fn is_serial(&self) -> bool {
        let seasons = self
            .number_of_seasons
            .as_ref()
            .and_then(positive_number)
            .unwrap_or(0);
        let has_series_name = self
            .original_name
            .as_deref()
            .is_some_and(|name| !name.is_empty());
        let has_movie_title = self
            .original_title
            .as_deref()
            .is_some_and(|title| !title.is_empty());
        seasons > 0 || (has_series_name && !has_movie_title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PlaylistItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) season: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) s: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) episode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) e: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) episode_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) segments: Option<SegmentBag>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl PlaylistItem {
    pub(crate) fn explicit_season(&self) -> Option<u32> {
        first_positive(&[&self.season, &self.s])
    }

    pub(crate) fn explicit_episode(&self) -> Option<u32> {
        first_positive(&[&self.episode, &self.e, &self.episode_number])
    }

    pub(crate) fn has_segments(&self) -> bool {
        self.segments.as_ref().is_some_and(|bag| !bag.skip.is_empty())
    }

    pub(crate) fn set_skip_segments(&mut self, segments: Vec<SkipSegment>) {
        self.segments.get_or_insert_with(SegmentBag::default).skip = segments;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PlayParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) movie: Option<ContentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) card: Option<ContentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) playlist: Option<Vec<PlaylistItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) season: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) s: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) episode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) e: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) episode_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) segments: Option<SegmentBag>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl PlayParams {
    pub(crate) fn content_card(&self) -> Option<&ContentCard> {
        self.movie.as_ref().or(self.card.as_ref())
    }

    pub(crate) fn display_title(&self) -> Option<String> {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            return Some(title.to_string());
        }
        let card = self.content_card()?;
        [&card.title, &card.name]
            .into_iter()
            .find_map(|field| field.as_deref().filter(|t| !t.is_empty()))
            .map(str::to_string)
    }

    pub(crate) fn explicit_season(&self) -> Option<u32> {
        first_positive(&[&self.season, &self.s])
    }

    pub(crate) fn explicit_episode(&self) -> Option<u32> {
        first_positive(&[&self.episode, &self.e, &self.episode_number])
    }

    pub(crate) fn has_segments(&self) -> bool {
        self.segments.as_ref().is_some_and(|bag| !bag.skip.is_empty())
    }

    pub(crate) fn set_skip_segments(&mut self, segments: Vec<SkipSegment>) {
        self.segments.get_or_insert_with(SegmentBag::default).skip = segments;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaybackPosition {
    pub(crate) season: u32,
    pub(crate) episode: u32,
}

pub(crate) fn detect_position(params: &PlayParams) -> PlaybackPosition {
    if let Some(episode) = params.explicit_episode() {
        return PlaybackPosition {
            season: params.explicit_season().unwrap_or(1),
            episode,
        };
    }

    // degraded mode: locate the current url in the playlist and infer the
    // episode from its position
    if let (Some(url), Some(playlist)) = (
        params.url.as_deref().filter(|u| !u.is_empty()),
        params.playlist.as_ref(),
    ) && let Some(index) = playlist
        .iter()
        .position(|item| item.url.as_deref() == Some(url))
    {
        return PlaybackPosition {
            season: playlist[index].explicit_season().unwrap_or(1),
            episode: (index + 1) as u32,
        };
    }

    PlaybackPosition {
        season: 1,
        episode: 1,
    }
}

fn first_positive(fields: &[&Option<Value>]) -> Option<u32> {
    fields
        .iter()
        .find_map(|field| field.as_ref().and_then(positive_number))
}

fn positive_number(value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u32)
            }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

fn value_id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
