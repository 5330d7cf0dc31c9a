//! Room membership registry
//!
//! The set of currently open room sessions. Holds connection handles only;
//! session lifetime is owned by the connection task.
//!
//! Name resolution and insertion happen under the same write lock, so two
//! concurrent joins can never resolve to the same name. The lock is never
//! held across an `.await`.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::connection::Connection;
use crate::error::AppError;
use crate::names::resolve_name;
use crate::types::SessionId;

/// A registry entry
#[derive(Debug, Clone)]
pub struct Member {
    /// Resolved display name
    pub name: String,
    /// Outbound handle used for broadcasts
    pub connection: Connection,
}

/// Result of a successful rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// Name in effect before the rename
    pub old: String,
    /// Newly resolved name
    pub new: String,
}

impl Renamed {
    /// True if resolution produced the name already in use
    pub fn is_unchanged(&self) -> bool {
        self.old == self.new
    }
}

/// Concurrent membership set of room sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    members: RwLock<HashMap<SessionId, Member>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a unique name for `requested` and insert the session
    ///
    /// Returns the resolved name. Adding a session that is already a member
    /// is an invariant violation.
    pub fn add(
        &self,
        id: SessionId,
        requested: &str,
        connection: Connection,
    ) -> Result<String, AppError> {
        let mut members = self.members.write();
        if members.contains_key(&id) {
            return Err(AppError::AlreadyRegistered(id));
        }

        let name = resolve_name(requested, members.values().map(|m| m.name.as_str()));
        members.insert(
            id,
            Member {
                name: name.clone(),
                connection,
            },
        );
        debug!("Session {} registered as '{}' ({} members)", id, name, members.len());
        Ok(name)
    }

    /// Remove a session, returning its name if it was a member
    pub fn remove(&self, id: SessionId) -> Option<String> {
        let removed = self.members.write().remove(&id).map(|m| m.name);
        if removed.is_none() {
            debug!("Session {} was not registered", id);
        }
        removed
    }

    /// Resolve a new unique name for a member and apply it
    ///
    /// The member's own current name does not count as a collision.
    pub fn rename(&self, id: SessionId, requested: &str) -> Result<Renamed, AppError> {
        let mut members = self.members.write();
        if !members.contains_key(&id) {
            return Err(AppError::NotRegistered(id));
        }

        let new = resolve_name(
            requested,
            members
                .iter()
                .filter(|(other, _)| **other != id)
                .map(|(_, m)| m.name.as_str()),
        );
        let member = members
            .get_mut(&id)
            .ok_or(AppError::NotRegistered(id))?;
        let old = std::mem::replace(&mut member.name, new.clone());
        Ok(Renamed { old, new })
    }

    /// Current member names
    pub fn snapshot(&self) -> Vec<String> {
        self.members.read().values().map(|m| m.name.clone()).collect()
    }

    /// Current members, cloned out of the lock
    fn members(&self) -> Vec<Member> {
        self.members.read().values().cloned().collect()
    }

    /// Apply `visitor` to every current member
    ///
    /// Iterates over a snapshot taken under the read lock; the lock is
    /// released before the first visit, so joins and leaves during the
    /// iteration are neither blocked nor observed.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&Member),
    {
        for member in self.members() {
            visitor(&member);
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;

    fn connection() -> Connection {
        let (tx, _rx) = mpsc::channel(32);
        Connection::new(SessionId::new(), tx)
    }

    #[test]
    fn test_add_resolves_collisions() {
        let registry = SessionRegistry::new();

        let names: Vec<String> = (0..3)
            .map(|_| {
                registry
                    .add(SessionId::new(), "Alice", connection())
                    .unwrap()
            })
            .collect();

        assert_eq!(names, vec!["Alice", "Alice 2", "Alice 3"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_double_add_is_rejected() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();

        registry.add(id, "Alice", connection()).unwrap();
        let err = registry.add(id, "Alice", connection()).unwrap_err();

        assert!(matches!(err, AppError::AlreadyRegistered(dup) if dup == id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        registry.add(id, "Bob", connection()).unwrap();

        assert_eq!(registry.remove(id), Some("Bob".to_string()));
        assert_eq!(registry.remove(id), None);
        assert!(registry.is_empty());
        assert!(!registry.snapshot().contains(&"Bob".to_string()));
    }

    #[test]
    fn test_name_is_reusable_after_remove() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        registry.add(id, "Bob", connection()).unwrap();
        registry.remove(id);

        assert_eq!(registry.add(SessionId::new(), "bob", connection()).unwrap(), "bob");
    }

    #[test]
    fn test_rename_excludes_own_name() {
        let registry = SessionRegistry::new();
        let alice = SessionId::new();
        registry.add(alice, "Alice", connection()).unwrap();
        registry.add(SessionId::new(), "Bob", connection()).unwrap();

        let same = registry.rename(alice, "ALICE").unwrap();
        assert_eq!(same.old, "Alice");
        assert_eq!(same.new, "ALICE");

        let clash = registry.rename(alice, "bob").unwrap();
        assert_eq!(clash.new, "bob 2");
        let mut names = registry.snapshot();
        names.sort();
        assert_eq!(names, vec!["Bob".to_string(), "bob 2".to_string()]);
    }

    #[test]
    fn test_rename_unknown_session() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        assert!(matches!(
            registry.rename(id, "Alice"),
            Err(AppError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_for_each_tolerates_membership_changes() {
        let registry = SessionRegistry::new();
        let ids: Vec<SessionId> = (0..3).map(|_| SessionId::new()).collect();
        for id in &ids {
            registry.add(*id, "Chatter", connection()).unwrap();
        }

        let mut visited = 0;
        registry.for_each(|_| {
            visited += 1;
            // Leaving and joining mid-iteration must not deadlock or fail
            for id in &ids {
                registry.remove(*id);
            }
            let _ = registry.add(SessionId::new(), "Late", connection());
        });

        assert_eq!(visited, 3);
    }

    #[test]
    fn test_concurrent_joins_keep_names_unique() {
        let registry = Arc::new(SessionRegistry::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..8)
                        .map(|_| registry.add(SessionId::new(), "alice", connection()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }

        let unique: HashSet<String> = all.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(all.len(), 128);
        assert_eq!(unique.len(), 128);
        assert_eq!(registry.len(), 128);
    }
}
