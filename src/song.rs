use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates;

/// An ID in the database. Zero means the song hasn't been stored yet.
pub type SongId = i64;

/// The minimal information needed to store a song.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicSongInfo {
    /// The ID of the song, or zero if it hasn't been created.
    pub id: SongId,

    /// The name of the group performing the song.
    pub group_name: String,

    /// The title of the song.
    pub song_name: String,
}

impl BasicSongInfo {
    pub fn new(group_name: impl Into<String>, song_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            group_name: group_name.into(),
            song_name: song_name.into(),
        }
    }
}

/// The validated details of a song, written all at once.
#[derive(Clone, Debug, PartialEq)]
pub struct AdditionalSongInfo {
    pub release_date: Date,
    pub lyrics: String,
    pub link: String,
}

/// A single song in the database. Each optional attribute is
/// omitted from the JSON form when it isn't set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Song {
    /// The ID of the song.
    pub id: SongId,

    /// The name of the group performing the song.
    #[serde(rename = "group")]
    pub group_name: String,

    /// The title of the song.
    #[serde(rename = "song")]
    pub song_name: String,

    /// The release date, if known.
    #[serde(
        rename = "releaseDate",
        skip_serializing_if = "Option::is_none",
        serialize_with = "dates::serialize_option"
    )]
    pub release_date: Option<Date>,

    /// The lyrics, as verses separated by blank lines.
    #[serde(rename = "text", skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,

    /// A link to the song elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The body of a request to add a song.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddSongRequest {
    pub group: String,
    pub song: String,
}

/// The body of a request to replace the details of a song.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateSongRequest {
    pub id: i64,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Unvalidated song details, as returned by the details API.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SongDetails {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Constraints for listing songs. `None` means the attribute is not
/// constrained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListFilter {
    /// Case-insensitive substring of the group name.
    pub group_name: Option<String>,

    /// Case-insensitive substring of the song name.
    pub song_name: Option<String>,

    /// Earliest release date, inclusive.
    pub release_date_lower: Option<Date>,

    /// Latest release date, inclusive.
    pub release_date_upper: Option<Date>,

    /// Case-insensitive substring of the lyrics.
    pub lyrics: Option<String>,

    pub limit: i64,
    pub offset: i64,
}
