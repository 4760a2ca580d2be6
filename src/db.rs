use futures::future::BoxFuture;

use crate::errors::LibraryError;
use crate::song::{AdditionalSongInfo, BasicSongInfo, ListFilter, Song, SongId};

#[cfg(test)]
pub(crate) mod mock;

pub trait Db {
    /// Stores a new song, failing with `AlreadyExists` if the ID or the
    /// group and song names are already taken.
    fn create(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongId, LibraryError>>;

    /// Replaces the release date, lyrics and link of a song.
    fn update_info(
        &self,
        id: SongId,
        info: &AdditionalSongInfo,
    ) -> BoxFuture<Result<(), LibraryError>>;

    fn delete(&self, id: SongId) -> BoxFuture<Result<(), LibraryError>>;

    fn lyrics(&self, id: SongId) -> BoxFuture<Result<String, LibraryError>>;

    /// Lists the songs matching `filter`, ordered by ID.
    fn filtered_list(&self, filter: &ListFilter) -> BoxFuture<Result<Vec<Song>, LibraryError>>;
}

pub use self::postgres::*;

mod postgres {
    use std::future::Future;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use time::Date;

    use crate::errors::LibraryError;
    use crate::song::{AdditionalSongInfo, BasicSongInfo, ListFilter, Song, SongId};

    const GROUP_SONG_CONSTRAINT: &str = "music_library_group_song";

    pub struct PgDb {
        pool: PgPool,
        timeout: Duration,
    }

    impl PgDb {
        /// Creates a database whose statements each fail with
        /// `LibraryError::Timeout` if they take longer than `timeout`.
        pub fn new(pool: PgPool, timeout: Duration) -> Self {
            PgDb { pool, timeout }
        }

        async fn exists(&self, id: SongId) -> Result<bool, LibraryError> {
            if id == 0 {
                return Ok(false);
            }

            let query = sqlx::query_as::<_, (bool,)>(include_str!("queries/song_exists.sql"));

            let (exists,) = self
                .bounded(query.bind(id).fetch_one(&self.pool))
                .await?;

            Ok(exists)
        }

        async fn find_id(
            &self,
            group_name: &str,
            song_name: &str,
        ) -> Result<Option<SongId>, LibraryError> {
            let query = sqlx::query_as::<_, (SongId,)>(include_str!("queries/find_song_id.sql"));

            let id = self
                .bounded(
                    query
                        .bind(group_name)
                        .bind(song_name)
                        .fetch_optional(&self.pool),
                )
                .await?
                .map(|(id,)| id);

            Ok(id)
        }

        async fn bounded<T>(
            &self,
            statement: impl Future<Output = Result<T, sqlx::Error>>,
        ) -> Result<T, LibraryError> {
            match tokio::time::timeout(self.timeout, statement).await {
                Ok(result) => result.map_err(map_sqlx_error),
                Err(_) => Err(LibraryError::Timeout(self.timeout)),
            }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn create(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongId, LibraryError>> {
            let song = song.clone();

            async move {
                if self.exists(song.id).await? {
                    return Err(LibraryError::AlreadyExists);
                }

                if self
                    .find_id(&song.group_name, &song.song_name)
                    .await?
                    .is_some()
                {
                    return Err(LibraryError::AlreadyExists);
                }

                let query = sqlx::query_as::<_, (SongId,)>(include_str!("queries/create.sql"));

                // a concurrent insert of the same pair returns no row
                let id = self
                    .bounded(
                        query
                            .bind(&song.group_name)
                            .bind(&song.song_name)
                            .fetch_optional(&self.pool),
                    )
                    .await?;

                id.map(|(id,)| id).ok_or(LibraryError::AlreadyExists)
            }
            .boxed()
        }

        fn update_info(
            &self,
            id: SongId,
            info: &AdditionalSongInfo,
        ) -> BoxFuture<Result<(), LibraryError>> {
            let info = info.clone();

            async move {
                let query = sqlx::query(include_str!("queries/update_info.sql"));

                let count = self
                    .bounded(
                        query
                            .bind(id)
                            .bind(info.release_date)
                            .bind(&info.lyrics)
                            .bind(&info.link)
                            .execute(&self.pool),
                    )
                    .await?
                    .rows_affected();

                if count == 0 {
                    Err(LibraryError::NotFound(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn delete(&self, id: SongId) -> BoxFuture<Result<(), LibraryError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete.sql"));

                let count = self
                    .bounded(query.bind(id).execute(&self.pool))
                    .await?
                    .rows_affected();

                if count == 0 {
                    Err(LibraryError::NotFound(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn lyrics(&self, id: SongId) -> BoxFuture<Result<String, LibraryError>> {
            async move {
                let query =
                    sqlx::query_as::<_, (Option<String>,)>(include_str!("queries/retrieve_lyrics.sql"));

                let row = self
                    .bounded(query.bind(id).fetch_optional(&self.pool))
                    .await?;

                match row {
                    None => Err(LibraryError::NotFound(id)),
                    Some((None,)) => Err(LibraryError::NoLyrics(id)),
                    Some((Some(lyrics),)) => Ok(lyrics),
                }
            }
            .boxed()
        }

        fn filtered_list(
            &self,
            filter: &ListFilter,
        ) -> BoxFuture<Result<Vec<Song>, LibraryError>> {
            let filter = filter.clone();

            async move {
                let query = sqlx::query(include_str!("queries/retrieve_filtered.sql"));

                let songs = self
                    .bounded(
                        query
                            .bind(&filter.group_name)
                            .bind(&filter.song_name)
                            .bind(filter.release_date_lower)
                            .bind(filter.release_date_upper)
                            .bind(&filter.lyrics)
                            .bind(filter.limit)
                            .bind(filter.offset)
                            .try_map(|row: PgRow| {
                                let release_date: Option<Date> = try_get(&row, "release_date")?;

                                Ok(Song {
                                    id: try_get(&row, "song_id")?,
                                    group_name: try_get(&row, "group_name")?,
                                    song_name: try_get(&row, "song_name")?,
                                    release_date,
                                    lyrics: try_get(&row, "song_lyrics")?,
                                    link: try_get(&row, "link")?,
                                })
                            })
                            .fetch_all(&self.pool),
                    )
                    .await?;

                Ok(songs)
            }
            .boxed()
        }
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> LibraryError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(GROUP_SONG_CONSTRAINT) => {
                LibraryError::AlreadyExists
            }
            _ => LibraryError::Sqlx { source: error },
        }
    }
}
