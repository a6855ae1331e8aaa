//! Denylist policy: daemons that must never be restarted.

use std::collections::BTreeSet;

use serde::Serialize;

/// Daemons whose restart takes down too much (the bus, PID 1, storage
/// servers) to be done unattended.
pub const BUILTIN_DENYLIST: &[&str] = &[
    "dbus",
    "systemd",
    "auditd",
    "mysqld",
    "httpd",
    "bacula-sd",
    "bacula-dir",
    "keepalived",
    "nfs-server",
    "nfsdcld",
    "rpc-statd",
    "nfs-mountd",
];

/// The effective, immutable denylist for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DaemonPolicy {
    denied: BTreeSet<String>,
}

impl DaemonPolicy {
    /// Policy from the built-in list merged with configured overrides.
    #[must_use]
    pub fn from_overrides(deny: &BTreeSet<String>, allow: &BTreeSet<String>) -> Self {
        Self {
            denied: effective_policy(&builtin_denylist(), deny, allow),
        }
    }

    /// Whether `daemon` must be left alone.
    #[must_use]
    pub fn denies(&self, daemon: &str) -> bool {
        self.denied.contains(daemon)
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.denied.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.denied.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.denied.is_empty()
    }
}

impl Default for DaemonPolicy {
    fn default() -> Self {
        Self {
            denied: builtin_denylist(),
        }
    }
}

/// [`BUILTIN_DENYLIST`] as an owned set.
#[must_use]
pub fn builtin_denylist() -> BTreeSet<String> {
    BUILTIN_DENYLIST.iter().map(|s| (*s).to_string()).collect()
}

/// `(builtin ∪ deny) − allow`.
///
/// With no overrides at all the builtin set is returned untouched and no merge
/// happens.
#[must_use]
pub fn effective_policy(
    builtin: &BTreeSet<String>,
    deny: &BTreeSet<String>,
    allow: &BTreeSet<String>,
) -> BTreeSet<String> {
    if deny.is_empty() && allow.is_empty() {
        return builtin.clone();
    }
    builtin
        .union(deny)
        .filter(|name| !allow.contains(*name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DaemonPolicy, builtin_denylist, effective_policy};
    use proptest::collection::btree_set;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn no_overrides_returns_builtin() {
        let builtin = builtin_denylist();
        assert_eq!(
            effective_policy(&builtin, &BTreeSet::new(), &BTreeSet::new()),
            builtin
        );
    }

    #[test]
    fn deny_adds_and_allow_removes() {
        assert_eq!(
            effective_policy(&set(&["a", "b"]), &set(&["c"]), &set(&["a"])),
            set(&["b", "c"])
        );
    }

    #[test]
    fn allow_wins_over_deny() {
        assert_eq!(
            effective_policy(&set(&["a"]), &set(&["x"]), &set(&["x"])),
            set(&["a"])
        );
    }

    #[test]
    fn whitelisting_builtin_entry_permits_it() {
        let policy = DaemonPolicy::from_overrides(&BTreeSet::new(), &set(&["httpd"]));
        assert!(!policy.denies("httpd"));
        assert!(policy.denies("dbus"));
    }

    #[test]
    fn default_policy_is_builtin() {
        let policy = DaemonPolicy::default();
        assert!(policy.denies("systemd"));
        assert!(!policy.denies("sshd"));
        assert_eq!(policy.len(), builtin_denylist().len());
    }

    proptest! {
        #[test]
        fn merge_is_set_algebra(
            builtin in btree_set("[a-e]", 0..5),
            deny in btree_set("[a-e]", 0..5),
            allow in btree_set("[a-e]", 0..5),
        ) {
            let merged = effective_policy(&builtin, &deny, &allow);
            for name in &merged {
                prop_assert!(!allow.contains(name));
                prop_assert!(builtin.contains(name) || deny.contains(name));
            }
            for name in builtin.iter().chain(deny.iter()) {
                prop_assert_eq!(merged.contains(name), !allow.contains(name));
            }
        }
    }
}
