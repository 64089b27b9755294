// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::ops::Deref;

use thiserror::Error;

use crate::core::links::traits::LinkPortAddress;

const GENERATION_SEPARATOR: char = '#';

/// Internal APIs - DO NOT USE directly.
pub mod __private {
    use super::LinkId;

    /// Creates a [`LinkId`] without validation. Use [`LinkId::from_string`] instead.
    pub fn new_unchecked(id: impl Into<String>) -> LinkId {
        let s = id.into();
        debug_assert!(
            super::validate(&s).is_ok(),
            "invalid LinkId {:?}: only alphanumeric, '_', '-', '.', '>', ':', '#' allowed",
            s
        );
        LinkId(s)
    }
}

fn validate(s: &str) -> Result<(), LinkIdError> {
    if s.is_empty() {
        return Err(LinkIdError::Empty);
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '>' | ':' | '#');
    if let Some(bad) = s.chars().find(|c| !allowed(*c)) {
        return Err(LinkIdError::InvalidCharacter {
            id: s.to_string(),
            bad,
        });
    }
    Ok(())
}

/// Identity of one link generation on an edge.
///
/// Ids built by [`LinkId::for_ports`] read `source->dest#generation`. The part
/// before `#` names the edge and stays fixed across hot swaps; the generation
/// counts replacements, so the link being swapped in never collides with the
/// one it retires.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct LinkId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkIdError {
    #[error("Link ID cannot be empty")]
    Empty,

    #[error("Link ID '{id}' contains invalid character {bad:?}")]
    InvalidCharacter { id: String, bad: char },
}

impl LinkId {
    /// Parse and validate a link ID.
    pub fn from_string(s: impl Into<String>) -> Result<Self, LinkIdError> {
        let s = s.into();
        validate(&s)?;
        Ok(Self(s))
    }

    /// Id of the `generation`-th link wired between two ports. Generation 0 is
    /// the link created at setup.
    pub fn for_ports(source: &LinkPortAddress, dest: &LinkPortAddress, generation: u32) -> Self {
        Self(format!(
            "{}->{}{}{}",
            source.full_address(),
            dest.full_address(),
            GENERATION_SEPARATOR,
            generation
        ))
    }

    /// The edge this link serves, without the generation suffix.
    pub fn edge(&self) -> &str {
        self.split().0
    }

    /// Generation suffix, if the id carries one.
    pub fn generation(&self) -> Option<u32> {
        self.split().1
    }

    /// Id for the link that replaces this one on the same edge.
    ///
    /// An id without a generation suffix is treated as generation 0.
    pub fn next_generation(&self) -> Self {
        let next = self.generation().map_or(1, |g| g.saturating_add(1));
        Self(format!("{}{}{}", self.edge(), GENERATION_SEPARATOR, next))
    }

    fn split(&self) -> (&str, Option<u32>) {
        match self.0.rsplit_once(GENERATION_SEPARATOR) {
            Some((edge, suffix)) => match suffix.parse() {
                Ok(generation) if !edge.is_empty() => (edge, Some(generation)),
                _ => (self.0.as_str(), None),
            },
            None => (self.0.as_str(), None),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for LinkId {
    type Error = LinkIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_string(s)
    }
}

impl From<LinkId> for String {
    fn from(id: LinkId) -> Self {
        id.0
    }
}

impl Deref for LinkId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for LinkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
