use serde_json::Value;

use crate::app::offsets::apply_offset;
use crate::app::params::{PlaylistItem, SkipSegment};

use super::community;

pub(crate) fn propagate(
    playlist: &mut [PlaylistItem],
    season: u32,
    episode: u32,
    segments: &[SkipSegment],
) {
    for (index, item) in playlist.iter_mut().enumerate() {
        if item.has_segments() {
            continue;
        }
        let item_season = item.explicit_season().unwrap_or(season);
        let item_episode = item.explicit_episode().unwrap_or((index + 1) as u32);
        if item_season == season && item_episode == episode {
            item.set_skip_segments(segments.to_vec());
        }
    }
}

pub(crate) fn backfill_from_document(
    playlist: &mut [PlaylistItem],
    document: &Value,
    default_season: u32,
    offset: i64,
) {
    for item in playlist.iter_mut() {
        if item.has_segments() {
            continue;
        }
        // backfill only items that name their episode explicitly
        let Some(item_episode) = item.explicit_episode() else {
            continue;
        };
        let item_season = item.explicit_season().unwrap_or(default_season);
        if let Some(segments) = community::lookup_segments(document, item_season, item_episode) {
            item.set_skip_segments(apply_offset(&segments, offset));
        }
    }
}
