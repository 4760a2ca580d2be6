use serde::Deserialize;
use time::OffsetDateTime;

use crate::environment::Limits;
use crate::errors::LibraryError;
use crate::pagination::Page;
use crate::song::{ListFilter, SongId};
use crate::validation::Validator;

// every field is a string so that malformed values reach the validator

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdQuery {
    pub id: String,
}

impl IdQuery {
    pub fn validate(&self, limits: &Limits) -> Result<SongId, LibraryError> {
        let mut validator = Validator::new(limits, OffsetDateTime::now_utc());
        let id = validator.positive_integer(&self.id, "id");

        validator
            .finish(id)
            .map(SongId::from)
            .map_err(LibraryError::Validation)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LyricsQuery {
    pub id: String,
    pub page: String,
    pub page_size: String,
}

impl LyricsQuery {
    /// Returns the song ID along with the raw page number and size.
    pub fn validate(&self, limits: &Limits) -> Result<(SongId, u32, u32), LibraryError> {
        let mut validator = Validator::new(limits, OffsetDateTime::now_utc());
        let id = validator.positive_integer(&self.id, "id");
        let page = validator.positive_integer(&self.page, "page");
        let page_size = validator.positive_integer(&self.page_size, "pageSize");

        let values = match (id, page, page_size) {
            (Some(id), Some(page), Some(page_size)) => Some((SongId::from(id), page, page_size)),
            _ => None,
        };

        validator.finish(values).map_err(LibraryError::Validation)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub group: String,
    pub song: String,
    pub release_date_lower: String,
    pub release_date_upper: String,
    pub text: String,
    pub page: String,
    pub page_size: String,
}

impl ListQuery {
    pub fn validate(&self, limits: &Limits, now: OffsetDateTime) -> Result<ListFilter, LibraryError> {
        let mut validator = Validator::new(limits, now);
        let page = validator.positive_integer(&self.page, "page");
        let page_size = validator.positive_integer(&self.page_size, "pageSize");
        let release_date_lower = validator.optional_date(&self.release_date_lower, "releaseDateLower");
        let release_date_upper = validator.optional_date(&self.release_date_upper, "releaseDateUpper");

        let values = match (page, page_size) {
            (Some(page), Some(page_size)) => Some((page, page_size)),
            _ => None,
        };

        let (page, page_size) = validator.finish(values).map_err(LibraryError::Validation)?;
        let page = Page::new(page, page_size)?;

        Ok(ListFilter {
            group_name: non_empty(&self.group),
            song_name: non_empty(&self.song),
            release_date_lower,
            release_date_upper,
            lyrics: non_empty(&self.text),
            limit: page.limit(),
            offset: page.offset(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
