use serde::Serialize;

use crate::song::{Song, SongId};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    PartiallyAdded {
        id: SongId,
        #[serde(rename = "songDetails")]
        song_details: String,
    },
    Id {
        id: SongId,
    },
    Verses {
        verses: Vec<String>,
    },
    FilteredRows {
        #[serde(rename = "filteredRows")]
        filtered_rows: Vec<Song>,
    },
}
