//! Checks user input against the configured limits, collecting every
//! problem before reporting.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::dates;
use crate::environment::Limits;
use crate::song::{
    AddSongRequest, AdditionalSongInfo, BasicSongInfo, SongDetails, SongId, UpdateSongRequest,
};

/// Exclusive upper bound for numeric query parameters.
pub const NUMERIC_LIMIT: i64 = 1 << 32;

/// One message per offending field. The first message registered for
/// a field is the one that's kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_owned()).or_insert(message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }

            write!(f, "{}: {}", field, message)?;
            first = false;
        }

        Ok(())
    }
}

/// Accumulates validation errors for a single request.
pub struct Validator<'a> {
    limits: &'a Limits,
    now: OffsetDateTime,
    errors: ValidationErrors,
}

impl<'a> Validator<'a> {
    /// Creates a validator that treats `now` as the current time.
    pub fn new(limits: &'a Limits, now: OffsetDateTime) -> Self {
        Validator {
            limits,
            now,
            errors: ValidationErrors::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Registers `message` under `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.errors.add(field, message.into());
        }
    }

    /// Returns `value` if no errors were registered and a value was
    /// produced, or the collected errors otherwise.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }

    /// Parses a required, positive base-10 integer below 2^32.
    pub fn positive_integer(&mut self, raw: &str, field: &str) -> Option<u32> {
        self.check(!raw.is_empty(), field, "should be provided");

        let parsed = raw.parse::<i64>();
        self.check(parsed.is_ok(), field, "should be an integer");

        let number = parsed.unwrap_or(0);
        self.check(number > 0, field, "should be positive");
        self.check(
            number < NUMERIC_LIMIT,
            field,
            format!("should be less than {}", NUMERIC_LIMIT),
        );

        u32::try_from(number).ok().filter(|n| *n > 0)
    }

    /// Parses a `DD.MM.YYYY` date that must lie in the past.
    pub fn date(&mut self, raw: &str, field: &str) -> Option<Date> {
        match dates::parse_date(raw) {
            Some(date) => {
                self.check(
                    dates::is_in_past(date, self.now),
                    field,
                    format!("expected to be in the past, date provided: {}", raw),
                );

                Some(date)
            }
            None => {
                self.check(
                    false,
                    field,
                    format!("expected DD.MM.YYYY format, date provided: {}", raw),
                );

                None
            }
        }
    }

    /// Like [`Validator::date`], but an empty string means no date.
    pub fn optional_date(&mut self, raw: &str, field: &str) -> Option<Date> {
        if raw.is_empty() {
            None
        } else {
            self.date(raw, field)
        }
    }

    /// Checks that `value` is non-empty and at most `max_len` bytes long.
    pub fn bounded_text(&mut self, value: &str, field: &str, max_len: usize) {
        self.check(!value.is_empty(), field, "should be provided");
        self.check(
            value.len() <= max_len,
            field,
            format!(
                "should be no more than {} characters long, current length {}",
                max_len,
                value.len()
            ),
        );
    }

    pub fn basic_song_info(&mut self, request: &AddSongRequest) -> BasicSongInfo {
        self.bounded_text(&request.group, "group", self.limits.max_group_name_len);
        self.bounded_text(&request.song, "song", self.limits.max_song_name_len);

        BasicSongInfo::new(request.group.clone(), request.song.clone())
    }

    pub fn additional_song_info(&mut self, details: &SongDetails) -> Option<AdditionalSongInfo> {
        let release_date = self.date(&details.release_date, "releaseDate");
        self.bounded_text(&details.text, "text", self.limits.max_song_lyrics_len);
        self.bounded_text(&details.link, "link", self.limits.max_song_link_len);

        release_date.map(|release_date| AdditionalSongInfo {
            release_date,
            lyrics: details.text.clone(),
            link: details.link.clone(),
        })
    }
}

/// Validates the body of a request to add a song.
pub fn validate_basic_song_info(
    limits: &Limits,
    request: &AddSongRequest,
) -> Result<BasicSongInfo, ValidationErrors> {
    let mut validator = Validator::new(limits, OffsetDateTime::now_utc());
    let song = validator.basic_song_info(request);

    validator.finish(Some(song))
}

/// Validates song details from the details API.
pub fn validate_song_details(
    limits: &Limits,
    now: OffsetDateTime,
    details: &SongDetails,
) -> Result<AdditionalSongInfo, ValidationErrors> {
    let mut validator = Validator::new(limits, now);
    let info = validator.additional_song_info(details);

    validator.finish(info)
}

/// Validates the body of a request to replace the details of a song.
pub fn validate_update_request(
    limits: &Limits,
    now: OffsetDateTime,
    request: &UpdateSongRequest,
) -> Result<(SongId, AdditionalSongInfo), ValidationErrors> {
    let mut validator = Validator::new(limits, now);
    validator.check(request.id > 0, "id", "should be positive");

    let details = SongDetails {
        release_date: request.release_date.clone(),
        text: request.text.clone(),
        link: request.link.clone(),
    };
    let info = validator.additional_song_info(&details);

    validator.finish(info.map(|info| (request.id, info)))
}
