//! End-to-end pipeline tests: playlist ingest -> guide refresh -> now/next

use chrono::{DateTime, Utc};

use iptv_epg::database::Database;
use iptv_epg::database::repositories::{
    ChannelSeaOrmRepository, EpgProgrammeSeaOrmRepository, PlaylistSeaOrmRepository,
};
use iptv_epg::services::{EpgRefreshService, NowNextService, PlaylistIngestService};

const PLAYLIST: &str = concat!(
    "#EXTM3U url-tvg=\"http://x/guide.xml\"\n",
    "#EXTINF:-1 tvg-id=\"ch1\" group-title=\"News\",Channel One\n",
    "http://stream/ch1\n",
);

const GUIDE: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<tv>\n",
    "  <programme channel=\"ch1\" start=\"20240101000000 +0000\" stop=\"20240101010000 +0000\">\n",
    "    <title>A</title>\n",
    "  </programme>\n",
    "</tv>\n",
);

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

struct Pipeline {
    ingest: PlaylistIngestService,
    refresh: EpgRefreshService,
    now_next: NowNextService,
}

fn pipeline(db: &Database) -> Pipeline {
    let programmes = EpgProgrammeSeaOrmRepository::new(db.connection().clone());
    Pipeline {
        ingest: PlaylistIngestService::new(
            PlaylistSeaOrmRepository::new(db.connection().clone()),
            ChannelSeaOrmRepository::new(db.connection().clone()),
        ),
        refresh: EpgRefreshService::new(
            programmes.clone(),
            std::time::Duration::from_secs(120),
        ),
        now_next: NowNextService::new(programmes),
    }
}

#[tokio::test]
async fn ingest_detects_guide_url_and_channel_metadata() {
    let db = Database::new_in_memory().await.unwrap();
    let pipeline = pipeline(&db);

    let ingest = pipeline.ingest.ingest("news pack", None, PLAYLIST).await.unwrap();

    assert_eq!(ingest.channels_count, 1);
    assert_eq!(ingest.epg_url.as_deref(), Some("http://x/guide.xml"));

    let channels = ChannelSeaOrmRepository::new(db.connection().clone());
    let ch = channels
        .find_by_tvg_id(&ingest.playlist_id, "ch1")
        .await
        .unwrap()
        .expect("channel ch1 stored");
    assert_eq!(ch.name, "Channel One");
    assert_eq!(ch.group_title.as_deref(), Some("News"));
    assert_eq!(ch.stream_url, "http://stream/ch1");
}

#[tokio::test]
async fn mid_programme_query_returns_current_without_next() {
    let db = Database::new_in_memory().await.unwrap();
    let pipeline = pipeline(&db);

    let ingest = pipeline.ingest.ingest("news pack", None, PLAYLIST).await.unwrap();
    let epg_url = ingest.epg_url.unwrap();

    let outcome = pipeline
        .refresh
        .refresh_from_bytes(ingest.playlist_id, &epg_url, GUIDE.as_bytes(), Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome.programmes_inserted, 1);

    let answer = pipeline
        .now_next
        .now_next(&[ingest.playlist_id], "ch1", utc("2024-01-01T00:30:00Z"))
        .await
        .unwrap();

    assert_eq!(answer.playlist_id, Some(ingest.playlist_id));
    let current = answer.now.expect("programme A is airing");
    assert_eq!(current.title.as_deref(), Some("A"));
    assert_eq!(current.start, "2024-01-01T00:00:00Z");
    assert_eq!(current.stop, "2024-01-01T01:00:00Z");
    assert!(answer.next.is_none());
}

#[tokio::test]
async fn query_for_unknown_channel_is_an_explicit_empty_result() {
    let db = Database::new_in_memory().await.unwrap();
    let pipeline = pipeline(&db);

    let ingest = pipeline.ingest.ingest("news pack", None, PLAYLIST).await.unwrap();
    pipeline
        .refresh
        .refresh_from_bytes(
            ingest.playlist_id,
            "http://x/guide.xml",
            GUIDE.as_bytes(),
            Utc::now(),
        )
        .await
        .unwrap();

    let answer = pipeline
        .now_next
        .now_next(&[ingest.playlist_id], "nope", utc("2024-01-01T00:30:00Z"))
        .await
        .unwrap();

    assert_eq!(answer.tvg_id, "nope");
    assert_eq!(answer.playlist_id, None);
    assert!(answer.now.is_none());
    assert!(answer.next.is_none());
}

#[tokio::test]
async fn first_playlist_with_a_match_wins_across_entitlements() {
    let db = Database::new_in_memory().await.unwrap();
    let pipeline = pipeline(&db);

    let basic = pipeline.ingest.ingest("basic", None, PLAYLIST).await.unwrap();
    let premium = pipeline.ingest.ingest("premium", None, PLAYLIST).await.unwrap();

    let premium_guide = concat!(
        "<tv>",
        "<programme channel=\"ch1\" start=\"20240101000000 +0000\" stop=\"20240101010000 +0000\">",
        "<title>Premium cut</title>",
        "</programme>",
        "</tv>",
    );
    pipeline
        .refresh
        .refresh_from_bytes(basic.playlist_id, "http://x/a.xml", GUIDE.as_bytes(), Utc::now())
        .await
        .unwrap();
    pipeline
        .refresh
        .refresh_from_bytes(
            premium.playlist_id,
            "http://x/b.xml",
            premium_guide.as_bytes(),
            Utc::now(),
        )
        .await
        .unwrap();

    // Premium first in priority order: its schedule answers.
    let answer = pipeline
        .now_next
        .now_next(
            &[premium.playlist_id, basic.playlist_id],
            "ch1",
            utc("2024-01-01T00:30:00Z"),
        )
        .await
        .unwrap();
    assert_eq!(answer.playlist_id, Some(premium.playlist_id));
    assert_eq!(answer.now.unwrap().title.as_deref(), Some("Premium cut"));
}

#[tokio::test]
async fn reingesting_a_playlist_updates_channels_in_place() {
    let db = Database::new_in_memory().await.unwrap();
    let pipeline = pipeline(&db);
    let channels = ChannelSeaOrmRepository::new(db.connection().clone());

    let first = pipeline.ingest.ingest("pack", None, PLAYLIST).await.unwrap();

    // A newer parse of the same source overwrites channel fields in place.
    let renamed = PLAYLIST.replace("Channel One", "Channel One HD");
    channels
        .upsert_channels(
            first.playlist_id,
            &iptv_epg::sources::m3u::parse_playlist(&renamed),
        )
        .await
        .unwrap();

    let ch = channels
        .find_by_tvg_id(&first.playlist_id, "ch1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ch.name, "Channel One HD");
    assert_eq!(channels.count_by_playlist(&first.playlist_id).await.unwrap(), 1);
}
