use crate::app::offsets;
use crate::app::params::{PlayParams, detect_position};
use crate::db::Database;

use super::{Endpoints, Provenance, Resolution, aniskip, classify, community, index, playlist};

pub(crate) fn run_pre_playback_hook(
    db: &Database,
    endpoints: &Endpoints,
    params: &mut PlayParams,
) -> Option<Resolution> {
    let card = params.content_card()?.clone();

    let title = params.display_title().unwrap_or_default();
    if classify::is_trailer_title(&title) {
        return None;
    }
    if params.has_segments() {
        return None;
    }

    let detected = detect_position(params);
    let (season, episode) = if card.is_serial() {
        (detected.season, detected.episode)
    } else {
        (1, 1)
    };

    let mut segments = Vec::new();
    let mut provenance = None;

    if classify::is_anime_card(&card)
        && let Some(name) = card.search_name()
    {
        let cleaned = classify::clean_search_title(name);
        if !cleaned.is_empty()
            && let Some(external_id) =
                index::search_external_id(endpoints, &cleaned, season, card.release_year())
        {
            let entries = aniskip::fetch_timing_entries(endpoints, external_id, episode);
            segments = aniskip::parse_timing_segments(&entries);
            if !segments.is_empty() {
                provenance = Some(Provenance::TimingService);
            }
        }
    }

    if segments.is_empty()
        && let Some(local_id) = card.local_catalog_id()
        && let Some(document) = community::fetch_document(endpoints, &local_id)
    {
        if let Some(found) = community::lookup_segments(&document, season, episode) {
            segments = found;
            provenance = Some(Provenance::CommunityDb);
        }

        // the document is already in hand; fill the rest of the playlist
        // without a second fetch
        let offset = offsets::get_offset(db, card.card_id().as_deref());
        if let Some(items) = params.playlist.as_mut() {
            playlist::backfill_from_document(items, &document, season, offset);
        }
    }

    let provenance = provenance?;
    if segments.is_empty() {
        return None;
    }

    let offset = offsets::get_offset(db, card.card_id().as_deref());
    let adjusted = offsets::apply_offset(&segments, offset);
    params.set_skip_segments(adjusted.clone());
    if let Some(items) = params.playlist.as_mut() {
        playlist::propagate(items, season, episode, &adjusted);
    }

    Some(Resolution {
        season,
        episode,
        provenance,
        segment_count: adjusted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::params::SkipSegment;

    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Route {
        path_part: &'static str,
        status: u16,
        body: String,
    }

    struct ProviderServer {
        base_url: String,
        paths: Arc<Mutex<Vec<String>>>,
        shutdown_tx: mpsc::Sender<()>,
        join_handle: Option<std::thread::JoinHandle<()>>,
    }

    impl ProviderServer {
        fn spawn(routes: Vec<Route>) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
            listener.set_nonblocking(true).expect("set nonblocking");
            let addr = listener.local_addr().expect("local addr");

            let paths = Arc::new(Mutex::new(Vec::new()));
            let paths_clone = Arc::clone(&paths);
            let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

            let join_handle = std::thread::spawn(move || {
                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        break;
                    }
                    match listener.accept() {
                        Ok((mut stream, _)) => {
                            let path = read_request_path(&mut stream).unwrap_or_default();
                            paths_clone.lock().expect("lock paths").push(path.clone());
                            let (status, body) = routes
                                .iter()
                                .find(|route| path.contains(route.path_part))
                                .map(|route| (route.status, route.body.clone()))
                                .unwrap_or((404, String::new()));
                            let _ = write_response(&mut stream, status, &body);
                        }
                        Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                            std::thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            });

            Self {
                base_url: format!("http://{addr}"),
                paths,
                shutdown_tx,
                join_handle: Some(join_handle),
            }
        }

        fn endpoints(&self) -> Endpoints {
            Endpoints {
                timing_api: format!("{}/skip-times", self.base_url),
                index_api: format!("{}/anime", self.base_url),
                db_base: format!("{}/database", self.base_url),
            }
        }

        fn request_paths(&self) -> Vec<String> {
            self.paths.lock().expect("lock paths").clone()
        }

        fn request_count(&self) -> usize {
            self.paths.lock().expect("lock paths").len()
        }
    }

    impl Drop for ProviderServer {
        fn drop(&mut self) {
            let _ = self.shutdown_tx.send(());
            if let Some(handle) = self.join_handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn read_request_path(stream: &mut TcpStream) -> Option<String> {
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
            .ok()?;
        let mut buf = [0_u8; 4096];
        let mut data = Vec::new();
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => {
                    data.extend_from_slice(&buf[..read]);
                    if data.windows(4).any(|window| window == b"\r\n\r\n") {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        let head = String::from_utf8_lossy(&data);
        let request_line = head.lines().next()?;
        request_line.split_whitespace().nth(1).map(str::to_string)
    }

    fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
        let reason = if status == 200 { "OK" } else { "Status" };
        write!(
            stream,
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )?;
        stream.write_all(body.as_bytes())?;
        stream.flush()
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.migrate().expect("migrate");
        db
    }

    fn params_from_json(raw: &str) -> PlayParams {
        serde_json::from_str(raw).expect("test params should parse")
    }

    #[test]
    fn anime_path_resolves_from_timing_service_with_season_tiebreak() {
        let server = ProviderServer::spawn(vec![
            Route {
                path_part: "skip-times",
                status: 200,
                body: r#"{"found":true,"results":[{"interval":{"startTime":10.5,"endTime":95.0},"skipType":"op"}]}"#.to_string(),
            },
            Route {
                path_part: "anime",
                status: 200,
                body: r#"{"data":[{"mal_id":100,"title":"Show","year":2015},{"mal_id":200,"title":"Show 2nd Season","year":2016}]}"#.to_string(),
            },
        ]);
        let db = test_db();

        let mut params = params_from_json(
            r#"{
                "title": "Show",
                "season": 2,
                "episode": 5,
                "movie": {
                    "id": 42,
                    "original_language": "ja",
                    "genres": [{"id": 16}],
                    "original_name": "Show",
                    "number_of_seasons": 2
                }
            }"#,
        );

        let resolution = run_pre_playback_hook(&db, &server.endpoints(), &mut params)
            .expect("segments should resolve");
        assert_eq!(resolution.provenance, Provenance::TimingService);
        assert_eq!(resolution.season, 2);
        assert_eq!(resolution.episode, 5);
        assert_eq!(resolution.segment_count, 1);

        let skip = &params.segments.as_ref().expect("segments written").skip;
        assert_eq!(
            skip,
            &vec![SkipSegment {
                start: 10.5,
                end: 95.0,
                name: "Opening".to_string(),
            }]
        );

        let paths = server.request_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].starts_with("/anime?"), "unexpected: {}", paths[0]);
        assert!(
            paths[1].starts_with("/skip-times/200/5?"),
            "season tiebreak should pick mal_id 200, got: {}",
            paths[1]
        );
    }

    #[test]
    fn timing_404_falls_through_to_community_db_and_applies_offset() {
        let server = ProviderServer::spawn(vec![
            Route {
                path_part: "skip-times",
                status: 404,
                body: String::new(),
            },
            Route {
                path_part: "anime",
                status: 200,
                body: r#"{"data":[{"mal_id":77,"title":"Show","year":2015}]}"#.to_string(),
            },
            Route {
                path_part: "database/42.json",
                status: 200,
                body: r#"{"1":{"1":[{"start":90,"end":180,"name":"Opening"}]}}"#.to_string(),
            },
        ]);
        let db = test_db();
        offsets::set_offset(&db, "42", -10).expect("store offset");

        let mut params = params_from_json(
            r#"{
                "title": "Show",
                "season": 1,
                "episode": 1,
                "movie": {
                    "kinopoisk_id": 42,
                    "original_language": "ja",
                    "original_name": "Show",
                    "number_of_seasons": 1
                }
            }"#,
        );

        let resolution = run_pre_playback_hook(&db, &server.endpoints(), &mut params)
            .expect("community db should supply segments");
        assert_eq!(resolution.provenance, Provenance::CommunityDb);
        assert_eq!(server.request_count(), 3);

        let skip = &params.segments.as_ref().expect("segments written").skip;
        assert_eq!(
            skip,
            &vec![SkipSegment {
                start: 80.0,
                end: 170.0,
                name: "Opening".to_string(),
            }]
        );
    }

    #[test]
    fn existing_segments_short_circuit_without_network() {
        let server = ProviderServer::spawn(vec![]);
        let db = test_db();

        let mut params = params_from_json(
            r#"{
                "title": "Show",
                "episode": 1,
                "segments": {"skip": [{"start": 5, "end": 10, "name": "Opening"}]},
                "movie": {"id": 1, "original_language": "ja", "number_of_seasons": 1}
            }"#,
        );
        let before = params.segments.clone();

        let resolution = run_pre_playback_hook(&db, &server.endpoints(), &mut params);
        assert!(resolution.is_none());
        assert_eq!(params.segments, before);
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn non_anime_without_local_id_makes_no_requests() {
        let server = ProviderServer::spawn(vec![]);
        let db = test_db();

        let mut params = params_from_json(
            r#"{
                "title": "Some Movie",
                "movie": {"id": 5, "original_language": "en"}
            }"#,
        );

        let resolution = run_pre_playback_hook(&db, &server.endpoints(), &mut params);
        assert!(resolution.is_none());
        assert!(params.segments.is_none());
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn trailer_titles_are_rejected_before_any_fetch() {
        let server = ProviderServer::spawn(vec![]);
        let db = test_db();

        let mut params = params_from_json(
            r#"{
                "title": "Show - Official Trailer",
                "episode": 1,
                "movie": {"id": 7, "original_language": "ja", "number_of_seasons": 1}
            }"#,
        );

        assert!(run_pre_playback_hook(&db, &server.endpoints(), &mut params).is_none());
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn missing_card_is_a_noop() {
        let server = ProviderServer::spawn(vec![]);
        let db = test_db();

        let mut params = params_from_json(r#"{"title": "Show", "episode": 1}"#);
        assert!(run_pre_playback_hook(&db, &server.endpoints(), &mut params).is_none());
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn community_document_backfills_playlist_with_one_fetch() {
        let server = ProviderServer::spawn(vec![Route {
            path_part: "database/9.json",
            status: 200,
            body: r#"{"1":{"1":[{"start":10,"end":20,"name":"Opening"}],"2":[{"start":30,"end":40,"name":"Opening"}]}}"#.to_string(),
        }]);
        let db = test_db();

        let mut params = params_from_json(
            r#"{
                "title": "Show",
                "url": "u1",
                "playlist": [
                    {"url": "u1", "episode": 1},
                    {"url": "u2", "episode": 2},
                    {"url": "u3", "episode": 3,
                     "segments": {"skip": [{"start": 1, "end": 2, "name": "Kept"}]}}
                ],
                "movie": {"kinopoisk_id": 9, "original_language": "en", "number_of_seasons": 1}
            }"#,
        );

        let resolution = run_pre_playback_hook(&db, &server.endpoints(), &mut params)
            .expect("community db should supply segments");
        assert_eq!(resolution.provenance, Provenance::CommunityDb);
        assert_eq!((resolution.season, resolution.episode), (1, 1));
        assert_eq!(server.request_count(), 1);

        let playlist = params.playlist.as_ref().expect("playlist kept");
        let skip_of = |index: usize| &playlist[index].segments.as_ref().expect("segments").skip;
        assert_eq!(skip_of(0)[0].start, 10.0);
        assert_eq!(skip_of(1)[0].start, 30.0);
        assert_eq!(skip_of(2)[0].name, "Kept");
    }
}
