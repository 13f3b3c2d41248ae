//! Synthetic EGA accession and dataset identifiers.

use crate::message::Origin;
use rand::Rng;
use std::fmt::{Display, Formatter};

const ID_OFFSET: u64 = 12_000_000_000;
const ID_SPREAD: u64 = 1_000;
const ID_DIGITS: usize = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// `EGAF` file accession.
    Accession,
    /// `EGAD` dataset.
    Dataset,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Accession => "EGAF",
            IdKind::Dataset => "EGAD",
        }
    }

    /// Files verified upstream get accessions; everything else gets dataset ids.
    pub fn for_origin(origin: Origin) -> Self {
        match origin {
            Origin::Verified => IdKind::Accession,
            _ => IdKind::Dataset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratedId(String);

impl GeneratedId {
    /// Accepts `<prefix><11 digits>` for the given kind.
    pub fn parse(kind: IdKind, value: &str) -> Option<Self> {
        let digits = value.strip_prefix(kind.prefix())?;
        if digits.len() == ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for GeneratedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws ids from a fixed offset plus a bounded random suffix, so collisions
/// are possible. Uses the thread-local RNG and is safe to share across tasks.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn next_id(&self, kind: IdKind) -> GeneratedId {
        let suffix = rand::thread_rng().gen_range(0..ID_SPREAD);
        GeneratedId(format!("{}{}", kind.prefix(), ID_OFFSET + suffix))
    }
}
