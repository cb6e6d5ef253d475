use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use padbind_bit_mask::Bitable;
use parking_lot::RwLock;

use crate::action::{ActionRef, NoAction};
use crate::types::Source;

/// Menu ids with a `.` name stand-alone menu files rather than profile menus.
pub fn is_file_menu(id: &str) -> bool {
    id.contains('.')
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub action: ActionRef,
}

#[derive(Debug, Clone)]
pub struct Menu {
    pub id: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Complete set of bindings loaded from one file.
///
/// Every source has exactly one slot. Slots are rewritten only by the
/// interception layer; everything else about a profile is fixed once built.
#[derive(Debug)]
pub struct Profile {
    path: PathBuf,
    slots: Vec<RwLock<ActionRef>>,
    gyro: ActionRef,
    menus: AHashMap<String, Menu>,
}

impl Profile {
    pub fn builder(path: impl Into<PathBuf>) -> ProfileBuilder {
        ProfileBuilder::new(path.into())
    }

    /// A profile that binds nothing.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::builder(path).build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Node currently bound to `source`.
    #[inline]
    pub fn resolve(&self, source: Source) -> ActionRef {
        Arc::clone(&self.slots[source.index() as usize].read())
    }

    /// Replace the binding of `source` with whatever `f` builds from it.
    /// Returns `false`, leaving the slot alone, when `f` declines.
    ///
    /// The new node is computed without holding the slot; callers serialize
    /// rewrites of the same profile.
    pub fn rewrite<F>(&self, source: Source, f: F) -> bool
    where
        F: FnOnce(&ActionRef) -> Option<ActionRef>,
    {
        let current = self.resolve(source);
        match f(&current) {
            Some(next) => {
                *self.slots[source.index() as usize].write() = next;
                true
            }
            None => false,
        }
    }

    pub fn gyro(&self) -> &ActionRef {
        &self.gyro
    }

    /// Whether the gyro binding does anything, so the sensor must be on.
    pub fn requires_gyro(&self) -> bool {
        !self.gyro.is_noop()
    }

    pub fn menu(&self, id: &str) -> Option<&Menu> {
        self.menus.get(id)
    }

    pub fn menus(&self) -> impl Iterator<Item = &Menu> {
        self.menus.values()
    }

    pub fn menu_item_action(&self, menu: &str, item: &str) -> Option<ActionRef> {
        self.menu(menu)?
            .item(item)
            .map(|item| Arc::clone(&item.action))
    }

    /// Current root of every source, in source order.
    pub fn roots(&self) -> impl Iterator<Item = (Source, ActionRef)> + '_ {
        Source::all().map(|source| (source, self.resolve(source)))
    }
}

#[derive(Debug)]
pub struct ProfileBuilder {
    path: PathBuf,
    bindings: Vec<ActionRef>,
    gyro: ActionRef,
    menus: AHashMap<String, Menu>,
}

impl ProfileBuilder {
    fn new(path: PathBuf) -> Self {
        let noop: ActionRef = Arc::new(NoAction);
        Self {
            path,
            bindings: vec![Arc::clone(&noop); Source::COUNT as usize],
            gyro: noop,
            menus: AHashMap::new(),
        }
    }

    pub fn bind(mut self, source: Source, action: ActionRef) -> Self {
        self.bindings[source.index() as usize] = action;
        self
    }

    pub fn gyro(mut self, action: ActionRef) -> Self {
        self.gyro = action;
        self
    }

    pub fn menu(mut self, menu: Menu) -> Self {
        self.menus.insert(menu.id.clone(), menu);
        self
    }

    pub fn build(self) -> Profile {
        Profile {
            path: self.path,
            slots: self.bindings.into_iter().map(RwLock::new).collect(),
            gyro: self.gyro,
            menus: self.menus,
        }
    }
}
