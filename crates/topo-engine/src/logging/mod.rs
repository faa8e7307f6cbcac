use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Default number of retained audit entries.
pub const DEFAULT_AUDIT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Node,
    Link,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Node => f.write_str("node"),
            TargetType::Link => f.write_str("link"),
        }
    }
}

/// One human-readable change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub action: AuditAction,
    pub target_type: TargetType,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl AuditLogEntry {
    /// Build an entry stamped with the current time and a fresh id.
    pub fn new(action: AuditAction, target_type: TargetType, target_id: impl Into<String>) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            id: entry_id(now.as_nanos()),
            timestamp: u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
            action,
            target_type,
            target_id: target_id.into(),
            details: None,
            user: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }
}

// Nanosecond timestamp plus a random suffix: entries created within the same
// clock tick still get distinct ids.
fn entry_id(nanos: u128) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("log-{nanos}-{}", &suffix[..12])
}

/// Append-only, capacity-bounded audit trail. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditLogEntry>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Seed the log with previously persisted entries, keeping the newest ones.
    pub fn with_entries(capacity: usize, entries: impl IntoIterator<Item = AuditLogEntry>) -> Self {
        let mut log = Self::new(capacity);
        log.entries.extend(entries);
        log.evict();
        log
    }

    /// Append an entry and return how many old entries were evicted.
    pub fn append(&mut self, entry: AuditLogEntry) -> usize {
        self.entries.push_back(entry);
        self.evict()
    }

    fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            if let Some(old) = self.entries.pop_front() {
                tracing::trace!(entry = %old.id, target = %old.target_id, "audit entry evicted");
                evicted += 1;
            }
        }
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditLogEntry> {
        self.entries.back()
    }

    /// Entries oldest first, newest last.
    pub fn iter(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
