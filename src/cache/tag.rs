//! Cache Tags
//!
//! Namespaced invalidation keys and the ownership model they are derived from.
//!
//! Three scopes exist for every resource kind:
//! - `global:<kind>` for list-all views
//! - `user:<ownerId>-<kind>` for one owner's views
//! - `id:<entityId>-<kind>` for a single detail view
//!
//! plus the catch-all `*` attached to every entry.

use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

// == Resource Kind ==
/// Kind segment of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    WordLists,
    SharedWordLists,
    Comments,
    Bookmarks,
    Likes,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::WordLists => "wordlists",
            ResourceKind::SharedWordLists => "sharedWordlists",
            ResourceKind::Comments => "comments",
            ResourceKind::Bookmarks => "bookmarks",
            ResourceKind::Likes => "likes",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wordlists" => Ok(ResourceKind::WordLists),
            "sharedWordlists" => Ok(ResourceKind::SharedWordLists),
            "comments" => Ok(ResourceKind::Comments),
            "bookmarks" => Ok(ResourceKind::Bookmarks),
            "likes" => Ok(ResourceKind::Likes),
            other => Err(CacheError::InvalidTag(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Tag ==
/// An invalidation key classifying a cached entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Catch-all tag carried by every entry
    All,
    Global(ResourceKind),
    User(String, ResourceKind),
    Id(String, ResourceKind),
}

impl Tag {
    pub fn global(kind: ResourceKind) -> Self {
        Tag::Global(kind)
    }

    pub fn user(owner: impl Into<String>, kind: ResourceKind) -> Self {
        Tag::User(owner.into(), kind)
    }

    pub fn id(entity: impl Into<String>, kind: ResourceKind) -> Self {
        Tag::Id(entity.into(), kind)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::All => f.write_str("*"),
            Tag::Global(kind) => write!(f, "global:{}", kind),
            Tag::User(owner, kind) => write!(f, "user:{}-{}", owner, kind),
            Tag::Id(entity, kind) => write!(f, "id:{}-{}", entity, kind),
        }
    }
}

impl FromStr for Tag {
    type Err = CacheError;

    /// Parses the textual tag shape.
    ///
    /// Owner and entity ids may themselves contain `-`, so the kind is taken
    /// from after the last one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CacheError::InvalidTag(s.to_string());

        if s == "*" {
            return Ok(Tag::All);
        }

        let (scope, rest) = s.split_once(':').ok_or_else(invalid)?;
        if scope == "global" {
            return Ok(Tag::Global(rest.parse().map_err(|_| invalid())?));
        }

        let (subject, kind) = rest.rsplit_once('-').ok_or_else(invalid)?;
        if subject.is_empty() {
            return Err(invalid());
        }
        let kind: ResourceKind = kind.parse().map_err(|_| invalid())?;

        match scope {
            "user" => Ok(Tag::User(subject.to_string(), kind)),
            "id" => Ok(Tag::Id(subject.to_string(), kind)),
            _ => Err(invalid()),
        }
    }
}

// == Resource ==
/// A row's place in the ownership model.
///
/// Expands to the tags a mutation of that row must invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub owner: Option<String>,
    pub id: Option<String>,
}

impl Resource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            owner: None,
            id: None,
        }
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Global tag always, owner and entity tags when known.
    pub fn tags(&self) -> Vec<Tag> {
        let mut tags = vec![Tag::global(self.kind)];
        if let Some(owner) = &self.owner {
            tags.push(Tag::user(owner.clone(), self.kind));
        }
        if let Some(id) = &self.id {
            tags.push(Tag::id(id.clone(), self.kind));
        }
        tags
    }
}

// == Owned ==
/// Implemented by every stored row whose writes must invalidate cached reads.
pub trait Owned {
    fn resources(&self) -> Vec<Resource>;
}

impl<T: Owned> Owned for [T] {
    fn resources(&self) -> Vec<Resource> {
        self.iter().flat_map(Owned::resources).collect()
    }
}

impl<T: Owned> Owned for Vec<T> {
    fn resources(&self) -> Vec<Resource> {
        self.as_slice().resources()
    }
}
