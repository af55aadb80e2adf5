use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ApiError, PetError, ValidationError};

/// Minimum accepted password length. No other complexity rule applies.
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Parses a path segment as an entity id, mapping malformed input to the
/// taxonomy instead of a generic 400.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidIdFormat.into())
}

/// A birth date is valid when it is not strictly after the current moment.
pub fn is_valid_birth_date(birth_date: OffsetDateTime) -> bool {
    birth_date <= OffsetDateTime::now_utc()
}

/// The closed set of supported species. Parsed case-insensitively, persisted
/// and serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Perro,
    Gato,
    Conejo,
    Hamster,
    Pez,
    Ave,
    Reptil,
    Otro,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::Perro,
        Species::Gato,
        Species::Conejo,
        Species::Hamster,
        Species::Pez,
        Species::Ave,
        Species::Reptil,
        Species::Otro,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Perro => "perro",
            Species::Gato => "gato",
            Species::Conejo => "conejo",
            Species::Hamster => "hamster",
            Species::Pez => "pez",
            Species::Ave => "ave",
            Species::Reptil => "reptil",
            Species::Otro => "otro",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "perro" => Ok(Species::Perro),
            "gato" => Ok(Species::Gato),
            "conejo" => Ok(Species::Conejo),
            "hamster" => Ok(Species::Hamster),
            "pez" => Ok(Species::Pez),
            "ave" => Ok(Species::Ave),
            "reptil" => Ok(Species::Reptil),
            "otro" => Ok(Species::Otro),
            _ => Err(PetError::InvalidSpecies.into()),
        }
    }
}
