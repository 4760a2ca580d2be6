use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::db::Db;
use crate::errors::LibraryError;
use crate::song::{AdditionalSongInfo, BasicSongInfo, ListFilter, Song, SongId};

/// An in-memory stand-in for `PgDb`.
pub(crate) struct MockDb {
    pub(crate) songs: RwLock<BTreeMap<SongId, Song>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl Default for MockDb {
    fn default() -> Self {
        MockDb {
            songs: RwLock::default(),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
        }
    }
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the database timed out.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: SongId) -> Option<Song> {
        self.songs.read().unwrap().get(&id).cloned()
    }

    fn check_failing(&self) -> Result<(), LibraryError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(LibraryError::Timeout(Duration::from_secs(0)))
        } else {
            Ok(())
        }
    }

    fn mock_create(&self, song: &BasicSongInfo) -> Result<SongId, LibraryError> {
        self.check_failing()?;

        let mut songs = self.songs.write().unwrap();

        let taken = songs.contains_key(&song.id)
            || songs
                .values()
                .any(|s| s.group_name == song.group_name && s.song_name == song.song_name);

        if taken {
            return Err(LibraryError::AlreadyExists);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        songs.insert(
            id,
            Song {
                id,
                group_name: song.group_name.clone(),
                song_name: song.song_name.clone(),
                release_date: None,
                lyrics: None,
                link: None,
            },
        );

        Ok(id)
    }

    fn mock_update_info(&self, id: SongId, info: &AdditionalSongInfo) -> Result<(), LibraryError> {
        self.check_failing()?;

        let mut songs = self.songs.write().unwrap();
        let song = songs.get_mut(&id).ok_or(LibraryError::NotFound(id))?;

        song.release_date = Some(info.release_date);
        song.lyrics = Some(info.lyrics.clone());
        song.link = Some(info.link.clone());

        Ok(())
    }

    fn mock_delete(&self, id: SongId) -> Result<(), LibraryError> {
        self.check_failing()?;

        self.songs
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(LibraryError::NotFound(id))
    }

    fn mock_lyrics(&self, id: SongId) -> Result<String, LibraryError> {
        self.check_failing()?;

        let songs = self.songs.read().unwrap();
        let song = songs.get(&id).ok_or(LibraryError::NotFound(id))?;

        song.lyrics.clone().ok_or(LibraryError::NoLyrics(id))
    }

    fn mock_filtered_list(&self, filter: &ListFilter) -> Result<Vec<Song>, LibraryError> {
        self.check_failing()?;

        fn contains(haystack: Option<&str>, needle: &Option<String>) -> bool {
            match (haystack, needle) {
                (_, None) => true,
                (Some(haystack), Some(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                (None, Some(_)) => false,
            }
        }

        let songs = self.songs.read().unwrap();

        let matching = songs
            .values()
            .filter(|s| contains(Some(&s.group_name), &filter.group_name))
            .filter(|s| contains(Some(&s.song_name), &filter.song_name))
            .filter(|s| contains(s.lyrics.as_deref(), &filter.lyrics))
            .filter(|s| match filter.release_date_lower {
                Some(lower) => s.release_date.map_or(false, |d| d >= lower),
                None => true,
            })
            .filter(|s| match filter.release_date_upper {
                Some(upper) => s.release_date.map_or(false, |d| d <= upper),
                None => true,
            })
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(matching)
    }
}

impl Db for MockDb {
    fn create(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongId, LibraryError>> {
        let result = self.mock_create(song);

        async move { result }.boxed()
    }

    fn update_info(
        &self,
        id: SongId,
        info: &AdditionalSongInfo,
    ) -> BoxFuture<Result<(), LibraryError>> {
        let result = self.mock_update_info(id, info);

        async move { result }.boxed()
    }

    fn delete(&self, id: SongId) -> BoxFuture<Result<(), LibraryError>> {
        let result = self.mock_delete(id);

        async move { result }.boxed()
    }

    fn lyrics(&self, id: SongId) -> BoxFuture<Result<String, LibraryError>> {
        let result = self.mock_lyrics(id);

        async move { result }.boxed()
    }

    fn filtered_list(&self, filter: &ListFilter) -> BoxFuture<Result<Vec<Song>, LibraryError>> {
        let result = self.mock_filtered_list(filter);

        async move { result }.boxed()
    }
}
