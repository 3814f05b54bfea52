//! Relationship (join-row) vocabulary.
//!
//! Every many-to-many association is one undirected row with a named left and
//! right endpoint. The left endpoint is always the acting side: the principal
//! whose id equals the left key owns the row.

use std::fmt;

use chrono::NaiveDate;

use crate::entity::EntityKind;
use crate::id::EntityId;

/// Contract text stored when an employment is created without one.
pub const UNSPECIFIED_CONTRACT: &str = "not specified";

/// Report text stored when a treatment is created without one.
pub const INITIAL_REPORT: &str = "treatment started";

/// The seven relationship tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// centre → therapist, carries contract text.
    Employs,
    /// therapist → patient, carries report text.
    Treats,
    /// patient → service.
    Pays,
    /// centre → course, carries post date.
    Posts,
    /// therapist → course, carries buying date.
    Buys,
    /// therapist → resource, carries publication date.
    Publish,
    /// patient → resource.
    Consume,
}

impl LinkKind {
    pub const ALL: [LinkKind; 7] = [
        LinkKind::Employs,
        LinkKind::Treats,
        LinkKind::Pays,
        LinkKind::Posts,
        LinkKind::Buys,
        LinkKind::Publish,
        LinkKind::Consume,
    ];

    pub fn left(self) -> EntityKind {
        match self {
            Self::Employs | Self::Posts => EntityKind::Centre,
            Self::Treats | Self::Buys | Self::Publish => EntityKind::Therapist,
            Self::Pays | Self::Consume => EntityKind::Patient,
        }
    }

    pub fn right(self) -> EntityKind {
        match self {
            Self::Employs => EntityKind::Therapist,
            Self::Treats => EntityKind::Patient,
            Self::Pays => EntityKind::Service,
            Self::Posts | Self::Buys => EntityKind::Course,
            Self::Publish | Self::Consume => EntityKind::Resource,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employs => "employs",
            Self::Treats => "treats",
            Self::Pays => "pays",
            Self::Posts => "posts",
            Self::Buys => "buys",
            Self::Publish => "publish",
            Self::Consume => "consume",
        }
    }

    /// Build the stored payload, filling defaults for absent attributes.
    pub fn payload_from(self, attrs: LinkAttributes, today: NaiveDate) -> LinkPayload {
        match self {
            Self::Employs => LinkPayload::Contract(
                non_blank(attrs.text).unwrap_or_else(|| UNSPECIFIED_CONTRACT.to_owned()),
            ),
            Self::Treats => LinkPayload::Report(
                non_blank(attrs.text).unwrap_or_else(|| INITIAL_REPORT.to_owned()),
            ),
            Self::Posts | Self::Buys | Self::Publish => {
                LinkPayload::Dated(attrs.date.unwrap_or(today))
            }
            Self::Pays | Self::Consume => LinkPayload::Bare,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())
}

/// Composite identity of a relationship row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub kind: LinkKind,
    pub left: EntityId,
    pub right: EntityId,
}

impl LinkKey {
    pub fn new(kind: LinkKind, left: EntityId, right: EntityId) -> Self {
        Self { kind, left, right }
    }
}

/// Attribute carried by a relationship row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPayload {
    Contract(String),
    Report(String),
    Dated(NaiveDate),
    Bare,
}

impl LinkPayload {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Contract(t) | Self::Report(t) => Some(t),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Dated(d) => Some(*d),
            _ => None,
        }
    }
}

/// A stored relationship row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub key: LinkKey,
    pub payload: LinkPayload,
}

/// Optional attributes supplied by a caller when creating or amending a link.
#[derive(Debug, Clone, Default)]
pub struct LinkAttributes {
    pub text: Option<String>,
    pub date: Option<NaiveDate>,
}
