//! Posts, post types and the publishing lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::staff::{Actor, EmployeeId, Role};
use crate::error::DomainError;

/// Unique identifier for a Post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Creates a new random PostId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PostId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Publishing state of a post.
///
/// `Scheduled` and `Archived` are reserved: they exist in stored data but no
/// lifecycle action reaches or leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Pending,
    Published,
    Scheduled,
    Unpublished,
    Archived,
    Deleted,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "DRAFT"),
            PostStatus::Pending => write!(f, "PENDING"),
            PostStatus::Published => write!(f, "PUBLISHED"),
            PostStatus::Scheduled => write!(f, "SCHEDULED"),
            PostStatus::Unpublished => write!(f, "UNPUBLISHED"),
            PostStatus::Archived => write!(f, "ARCHIVED"),
            PostStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(PostStatus::Draft),
            "PENDING" => Ok(PostStatus::Pending),
            "PUBLISHED" => Ok(PostStatus::Published),
            "SCHEDULED" => Ok(PostStatus::Scheduled),
            "UNPUBLISHED" => Ok(PostStatus::Unpublished),
            "ARCHIVED" => Ok(PostStatus::Archived),
            "DELETED" => Ok(PostStatus::Deleted),
            other => Err(format!("unknown post status: {}", other)),
        }
    }
}

/// A named lifecycle action on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostAction {
    Submit,
    Approve,
    Reject,
    Unpublish,
    Restore,
    Delete,
}

impl std::fmt::Display for PostAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostAction::Submit => write!(f, "submit"),
            PostAction::Approve => write!(f, "approve"),
            PostAction::Reject => write!(f, "reject"),
            PostAction::Unpublish => write!(f, "unpublish"),
            PostAction::Restore => write!(f, "restore"),
            PostAction::Delete => write!(f, "delete"),
        }
    }
}

/// A CMS post authored by a staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: PostId,
    pub title: String,
    pub body: String,
    /// URL slug, unique across posts
    pub slug: String,
    pub status: PostStatus,
    /// The authoring employee (owner)
    pub employee_id: EmployeeId,
    pub post_type_id: PostTypeId,
    /// Stamped when the post is approved
    pub publish_date: Option<DateTime<Utc>>,
    /// Public view counter, maintained by the site frontend
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new draft owned by the authoring employee.
    ///
    /// # Validation
    /// - Title and slug cannot be empty
    pub fn new(
        title: String,
        body: String,
        slug: String,
        employee_id: EmployeeId,
        post_type_id: PostTypeId,
    ) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("Post title cannot be empty".into()));
        }
        if slug.trim().is_empty() {
            return Err(DomainError::Validation("Post slug cannot be empty".into()));
        }

        Ok(Self {
            id: PostId::new(),
            title,
            body,
            slug,
            status: PostStatus::Draft,
            employee_id,
            post_type_id,
            publish_date: None,
            views: 0,
            created_at: Utc::now(),
        })
    }

    /// Reconstructs a post from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PostId,
        title: String,
        body: String,
        slug: String,
        status: PostStatus,
        employee_id: EmployeeId,
        post_type_id: PostTypeId,
        publish_date: Option<DateTime<Utc>>,
        views: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            body,
            slug,
            status,
            employee_id,
            post_type_id,
            publish_date,
            views,
            created_at,
        }
    }

    /// Decides the status a lifecycle action would move this post to.
    ///
    /// Authorization is checked before the state precondition: an actor who
    /// may never perform the action is rejected even when the current state
    /// is also wrong for it. Nothing is mutated; the caller persists the
    /// returned status.
    pub fn apply(&self, action: PostAction, actor: &Actor) -> Result<PostStatus, DomainError> {
        match action {
            PostAction::Submit | PostAction::Delete => {
                if actor.employee_id != self.employee_id {
                    return Err(DomainError::NotPostOwner { action });
                }
            }
            PostAction::Approve
            | PostAction::Reject
            | PostAction::Unpublish
            | PostAction::Restore => {
                if actor.role != Role::Admin {
                    return Err(DomainError::AdminOnly { action });
                }
            }
        }

        let next = match (action, self.status) {
            (PostAction::Submit, PostStatus::Draft) => PostStatus::Pending,
            (PostAction::Approve, PostStatus::Pending) => PostStatus::Published,
            (PostAction::Reject, PostStatus::Pending) => PostStatus::Unpublished,
            (PostAction::Unpublish, PostStatus::Published) => PostStatus::Unpublished,
            (PostAction::Restore, PostStatus::Unpublished) => PostStatus::Published,
            (PostAction::Delete, PostStatus::Unpublished) => PostStatus::Deleted,
            _ => {
                return Err(DomainError::InvalidStateForAction {
                    action,
                    status: self.status,
                });
            }
        };

        Ok(next)
    }

    /// True when the actor may read this post.
    pub fn readable_by(&self, actor: &Actor) -> bool {
        actor.is_admin() || actor.employee_id == self.employee_id
    }
}

/// Unique identifier for a PostType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PostTypeId(Uuid);

impl PostTypeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PostTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PostTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostTypeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Editorial category of a post (news, guide, offer, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostType {
    pub id: PostTypeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl PostType {
    /// Creates a new post type.
    pub fn new(name: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Post type name cannot be empty".into(),
            ));
        }

        Ok(Self {
            id: PostTypeId::new(),
            name,
            created_at: Utc::now(),
        })
    }

    /// Reconstructs a post type from database fields.
    pub fn from_parts(id: PostTypeId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }
}
