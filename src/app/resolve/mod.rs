mod aniskip;
mod classify;
mod community;
mod index;
mod pipeline;
mod playlist;

#[cfg(test)]
pub(crate) use classify::*;
#[cfg(test)]
pub(crate) use community::lookup_segments;
#[cfg(test)]
pub(crate) use index::{build_search_query, candidate_year, pick_external_id};
#[cfg(test)]
pub(crate) use aniskip::parse_timing_segments;
#[cfg(test)]
pub(crate) use playlist::propagate;
pub(crate) use pipeline::run_pre_playback_hook;

use std::env;

const DEFAULT_TIMING_API: &str = "https://api.aniskip.com/v2/skip-times";
const DEFAULT_INDEX_API: &str = "https://api.jikan.moe/v4/anime";
const DEFAULT_DB_BASE: &str =
    "https://raw.githubusercontent.com/ipavlin98/lmp-series-skip-db/refs/heads/main/database";

#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub(crate) timing_api: String,
    pub(crate) index_api: String,
    pub(crate) db_base: String,
}

impl Endpoints {
    pub(crate) fn from_env() -> Self {
        Self {
            timing_api: env::var("SKIPTRACK_TIMING_API")
                .unwrap_or_else(|_| DEFAULT_TIMING_API.to_string()),
            index_api: env::var("SKIPTRACK_INDEX_API")
                .unwrap_or_else(|_| DEFAULT_INDEX_API.to_string()),
            db_base: env::var("SKIPTRACK_DB_BASE").unwrap_or_else(|_| DEFAULT_DB_BASE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Provenance {
    TimingService,
    CommunityDb,
}

#[derive(Debug, Clone)]
pub(crate) struct Resolution {
    pub(crate) season: u32,
    pub(crate) episode: u32,
    pub(crate) provenance: Provenance,
    pub(crate) segment_count: usize,
}
