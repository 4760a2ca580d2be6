//! Tests against a real PostgreSQL database. Run with
//! `MUSIC_LIBRARY_DB_CONNECTION_STRING` set and `--ignored`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::postgres::PgPoolOptions;
use time::Date;

use music_library::config::get_variable;
use music_library::db::{Db, PgDb};
use music_library::errors::LibraryError;
use music_library::song::{AdditionalSongInfo, BasicSongInfo, ListFilter};

const TIMEOUT: Duration = Duration::from_secs(3);

async fn make_db() -> PgDb {
    dotenv::dotenv().ok();

    let connection_string = get_variable("MUSIC_LIBRARY_DB_CONNECTION_STRING");
    let pool = PgPoolOptions::new()
        .connect_timeout(TIMEOUT)
        .connect(&connection_string)
        .await
        .expect("create database pool from MUSIC_LIBRARY_DB_CONNECTION_STRING");

    // tests run concurrently and may race to create the table; a real
    // failure shows up in the first query
    let _ = sqlx::query(include_str!(
        "../migrations/2024-09-20-120000_create_music_library/up.sql"
    ))
    .execute(&pool)
    .await;

    PgDb::new(pool, TIMEOUT)
}

/// A group name no other test run will use.
fn unique_group(test: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("read system time")
        .as_nanos();

    format!(
        "{} {} {}",
        test,
        nanos,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

fn filter_for(group: &str) -> ListFilter {
    ListFilter {
        group_name: Some(group.to_owned()),
        limit: 10,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
async fn songs_can_be_created_once() {
    let db = make_db().await;
    let group = unique_group("created once");

    let mut song = BasicSongInfo::new(&group, "Hysteria");
    let id = db.create(&song).await.expect("create song");
    assert!(id > 0);

    assert!(matches!(
        db.create(&song).await,
        Err(LibraryError::AlreadyExists)
    ));

    song.id = id;
    song.song_name = "Time Is Running Out".to_owned();
    assert!(matches!(
        db.create(&song).await,
        Err(LibraryError::AlreadyExists)
    ));

    assert_eq!(db.filtered_list(&filter_for(&group)).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn details_are_replaced_and_listed() {
    let db = make_db().await;
    let group = unique_group("details");

    let id = db
        .create(&BasicSongInfo::new(&group, "Starlight"))
        .await
        .expect("create song");

    let listed = db.filtered_list(&filter_for(&group)).await.unwrap();
    assert_eq!(listed[0].release_date, None);
    assert_eq!(listed[0].lyrics, None);

    let info = AdditionalSongInfo {
        release_date: Date::try_from_ymd(2006, 9, 4).unwrap(),
        lyrics: "Far away\n\nThis ship is taking me".to_owned(),
        link: "https://example.com/starlight".to_owned(),
    };
    db.update_info(id, &info).await.expect("update song");

    let filter = ListFilter {
        release_date_lower: Some(Date::try_from_ymd(2006, 1, 1).unwrap()),
        lyrics: Some("SHIP".to_owned()),
        ..filter_for(&group)
    };
    let listed = db.filtered_list(&filter).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].release_date, Some(info.release_date));
    assert_eq!(listed[0].lyrics.as_deref(), Some(info.lyrics.as_str()));
    assert_eq!(listed[0].link.as_deref(), Some(info.link.as_str()));

    assert_eq!(db.lyrics(id).await.unwrap(), info.lyrics);
}

#[tokio::test]
#[ignore]
async fn missing_songs_are_reported() {
    let db = make_db().await;
    let group = unique_group("missing");

    let id = db
        .create(&BasicSongInfo::new(&group, "Assassin"))
        .await
        .expect("create song");

    assert!(matches!(db.lyrics(id).await, Err(LibraryError::NoLyrics(_))));

    db.delete(id).await.expect("delete song");

    assert!(matches!(db.lyrics(id).await, Err(LibraryError::NotFound(_))));
    assert!(matches!(db.delete(id).await, Err(LibraryError::NotFound(_))));

    let info = AdditionalSongInfo {
        release_date: Date::try_from_ymd(2006, 7, 3).unwrap(),
        lyrics: "a".to_owned(),
        link: "b".to_owned(),
    };
    assert!(matches!(
        db.update_info(id, &info).await,
        Err(LibraryError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn lists_are_ordered_and_paged() {
    let db = make_db().await;
    let group = unique_group("paged");

    let mut ids = Vec::new();
    for song in &["One", "Two", "Three", "Four", "Five"] {
        ids.push(db.create(&BasicSongInfo::new(&group, *song)).await.unwrap());
    }

    let page = |limit, offset| ListFilter {
        limit,
        offset,
        ..filter_for(&group)
    };

    let listed: Vec<_> = db
        .filtered_list(&page(2, 2))
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, ids[2..4].to_vec());

    assert_eq!(db.filtered_list(&page(2, 4)).await.unwrap().len(), 1);
    assert!(db.filtered_list(&page(2, 6)).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn filters_match_literal_text() {
    let db = make_db().await;
    let group = unique_group("literal 100%");

    let percent = db
        .create(&BasicSongInfo::new(&group, "M_se at 100%"))
        .await
        .expect("create song");
    db.create(&BasicSongInfo::new(&group, "Muse"))
        .await
        .expect("create song");

    for needle in &["%", "_", "M_SE", "100%"] {
        let filter = ListFilter {
            song_name: Some((*needle).to_owned()),
            ..filter_for(&group)
        };

        let listed: Vec<_> = db
            .filtered_list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(listed, vec![percent], "filtering by {:?}", needle);
    }

    // the group name itself contains a percent sign
    let listed = db.filtered_list(&filter_for(&group)).await.unwrap();
    assert_eq!(listed.len(), 2);
}
