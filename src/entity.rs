//! # Entity identity and host-observed state.
//!
//! The host owns content items and their lifecycle; this crate only attaches
//! retry bookkeeping to them. [`EntityId`] is the opaque, stable identifier
//! the host hands out. [`EntityState`] is the snapshot delivered with a
//! publish signal, and [`EntityState::qualifies`] is the single eligibility
//! test the controller applies before starting a cycle.

use std::fmt;

/// Opaque, stable identifier of a content item, owned by the host.
///
/// The crate never creates or destroys entities; it only reads and writes
/// auxiliary metadata keyed by this id.
///
/// Id `0` is reserved: hosts never hand it out, and operations that must
/// tolerate a missing id (such as [`clear_cycle`](crate::RetryController::clear_cycle))
/// treat it as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// True for the reserved "absent" id.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus {
    /// Unpublished working copy.
    Draft,
    /// Awaiting editorial review.
    Pending,
    /// Published but not publicly visible.
    Private,
    /// Publicly published; the only status that starts a cycle.
    Published,
}

/// Content type as reported by the host.
///
/// The controller targets exactly one kind (see
/// [`ControllerConfig::target`](crate::ControllerConfig)); signals for any
/// other kind are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Article,
    Page,
    Media,
}

/// Snapshot of the host-observable entity state delivered with a publish
/// signal.
///
/// Autosaves and revisions are intermediate host artifacts and never
/// qualify, regardless of status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityState {
    /// Current publication status.
    pub status: EntityStatus,
    /// Content type of the item.
    pub kind: ContentKind,
    /// True when the signal was produced by an autosave.
    pub autosave: bool,
    /// True when the signal refers to a stored revision, not the item itself.
    pub revision: bool,
}

impl EntityState {
    /// Convenience constructor for a plain published item of the given kind.
    pub fn published(kind: ContentKind) -> Self {
        Self {
            status: EntityStatus::Published,
            kind,
            autosave: false,
            revision: false,
        }
    }

    /// Whether this state is eligible to start a retry cycle for `target`.
    ///
    /// Eligible means: not an autosave, not a revision, status
    /// [`Published`](EntityStatus::Published), and kind equal to `target`.
    pub fn qualifies(&self, target: ContentKind) -> bool {
        !self.autosave
            && !self.revision
            && self.status == EntityStatus::Published
            && self.kind == target
    }
}
