//! uid/gid to account name resolution with a per-parser cache.

use nix::unistd::{Gid, Group, Uid, User};
use std::cell::RefCell;
use std::collections::HashMap;

/// Resolves numeric ids to account names.
pub trait IdentityResolver {
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Resolver backed by the system account database (`getpwuid_r`,
/// `getgrgid_r`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl IdentityResolver for SystemResolver {
    fn user_name(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                tracing::debug!("getpwuid({uid}) failed: {e}");
                None
            }
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        match Group::from_gid(Gid::from_raw(gid)) {
            Ok(group) => group.map(|g| g.name),
            Err(e) => {
                tracing::debug!("getgrgid({gid}) failed: {e}");
                None
            }
        }
    }
}

/// Memoizes uid and gid lookups for the lifetime of one parser.
///
/// Misses are cached as well, so each id reaches the resolver at most once.
pub struct IdentityCache {
    resolver: Box<dyn IdentityResolver>,
    users: RefCell<HashMap<u32, Option<String>>>,
    groups: RefCell<HashMap<u32, Option<String>>>,
}

impl IdentityCache {
    pub fn new(resolver: Box<dyn IdentityResolver>) -> Self {
        Self {
            resolver,
            users: RefCell::new(HashMap::new()),
            groups: RefCell::new(HashMap::new()),
        }
    }

    pub fn user_name(&self, uid: u32) -> Option<String> {
        self.users
            .borrow_mut()
            .entry(uid)
            .or_insert_with(|| self.resolver.user_name(uid))
            .clone()
    }

    pub fn group_name(&self, gid: u32) -> Option<String> {
        self.groups
            .borrow_mut()
            .entry(gid)
            .or_insert_with(|| self.resolver.group_name(gid))
            .clone()
    }

    /// Forget every cached entry.
    pub fn clear(&self) {
        self.users.borrow_mut().clear();
        self.groups.borrow_mut().clear();
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(Box::new(SystemResolver))
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("users", &self.users.borrow().len())
            .field("groups", &self.groups.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        calls: Rc<Cell<usize>>,
    }

    impl IdentityResolver for Counting {
        fn user_name(&self, uid: u32) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            (uid == 0).then(|| "root".to_string())
        }

        fn group_name(&self, _gid: u32) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            None
        }
    }

    #[test]
    fn test_hits_and_misses_are_cached() {
        let calls = Rc::new(Cell::new(0));
        let cache = IdentityCache::new(Box::new(Counting {
            calls: Rc::clone(&calls),
        }));
        assert_eq!(cache.user_name(0).as_deref(), Some("root"));
        assert_eq!(cache.user_name(0).as_deref(), Some("root"));
        assert_eq!(cache.group_name(7), None);
        assert_eq!(cache.group_name(7), None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_clear_forces_new_lookup() {
        let calls = Rc::new(Cell::new(0));
        let cache = IdentityCache::new(Box::new(Counting {
            calls: Rc::clone(&calls),
        }));
        cache.user_name(0);
        cache.clear();
        cache.user_name(0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_system_resolver_knows_root() {
        assert_eq!(SystemResolver.user_name(0).as_deref(), Some("root"));
    }
}
