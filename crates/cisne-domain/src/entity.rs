//! Kinds of rows addressable by an [`EntityId`](crate::id::EntityId).

use std::fmt;

/// Every table whose rows can be the endpoint of a relationship or the
/// target of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Centre,
    Therapist,
    Patient,
    Service,
    Course,
    Resource,
    Invoice,
    ServiceInvoice,
    CourseInvoice,
}

impl EntityKind {
    /// Human-readable name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Centre => "centre",
            Self::Therapist => "therapist",
            Self::Patient => "patient",
            Self::Service => "service",
            Self::Course => "course",
            Self::Resource => "resource",
            Self::Invoice => "invoice",
            Self::ServiceInvoice => "service invoice",
            Self::CourseInvoice => "course invoice",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
