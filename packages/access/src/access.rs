use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Mode;

/// Name of the scope that grants access to the whole storage.
pub const ROOT_SCOPE: &str = "root";

const PUBLIC_PREFIX: &str = "/public/";

#[derive(Debug, Default)]
struct Scopes {
    modes: HashMap<String, Mode>,
    /// Set once `root` is granted and kept until `reset`.
    root: bool,
}

/// The scopes an application has been granted, and the paths they cover.
///
/// Each scope `s` other than `root` covers `/s/` and `/public/s/`. Once
/// `root` has been granted, the only root path is `/`.
#[derive(Debug, Default)]
pub struct Access {
    scopes: RwLock<Scopes>,
}

impl Access {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Scopes> {
        self.scopes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Scopes> {
        self.scopes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `mode` for `scope`, replacing any previous grant.
    pub fn set(&self, scope: &str, mode: Mode) {
        let mut scopes = self.write();
        if scope == ROOT_SCOPE {
            scopes.root = true;
        }
        scopes.modes.insert(scope.to_string(), mode);
    }

    pub fn get(&self, scope: &str) -> Option<Mode> {
        self.read().modes.get(scope).copied()
    }

    /// Whether `scope` was granted at least `mode`.
    pub fn check(&self, scope: &str, mode: Mode) -> bool {
        self.get(scope)
            .is_some_and(|granted| granted.satisfies(mode))
    }

    /// Path prefixes covered by the granted scopes, sorted.
    pub fn root_paths(&self) -> Vec<String> {
        let scopes = self.read();
        if scopes.root {
            return vec!["/".to_string()];
        }
        let mut paths: Vec<String> = scopes
            .modes
            .keys()
            .flat_map(|scope| [format!("/{}/", scope), format!("{}{}/", PUBLIC_PREFIX, scope)])
            .collect();
        paths.sort();
        paths
    }

    /// All granted scopes with their modes, sorted by name.
    pub fn scopes(&self) -> Vec<(String, Mode)> {
        let mut scopes: Vec<(String, Mode)> = self
            .read()
            .modes
            .iter()
            .map(|(scope, mode)| (scope.clone(), *mode))
            .collect();
        scopes.sort();
        scopes
    }

    /// Whether a request for `mode` on `path` is covered by a granted scope.
    ///
    /// With `root` granted every absolute path is governed by the root grant.
    /// Otherwise the owning scope is the first segment of `path`, after
    /// stripping `/public/`.
    pub fn check_path(&self, path: &str, mode: Mode) -> bool {
        if !path.starts_with('/') {
            return false;
        }
        if self.read().root {
            return self.check(ROOT_SCOPE, mode);
        }
        let rest = path.strip_prefix(PUBLIC_PREFIX).unwrap_or(&path[1..]);
        match rest.split_once('/') {
            Some((scope, _)) if !scope.is_empty() => self.check(scope, mode),
            _ => false,
        }
    }

    /// Forget every grant, including `root`.
    pub fn reset(&self) {
        let mut scopes = self.write();
        scopes.modes.clear();
        scopes.root = false;
    }
}
