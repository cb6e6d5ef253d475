//! Shared runtime state: the active profile, live sessions and the task
//! inbox.
//!
//! Structural changes (profile swap, lock, observe, unlock, disconnect) run on
//! session threads and serialize on the session table. The poll thread only
//! ever reads the profile reference and the per-source slots.

use std::error::Error;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use colored::Colorize;
use ahash::AHashMap;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::action::ActionRef;
use crate::error::{InterceptError, Result, RuntimeError};
use crate::intercept::{is_locked, lock_node, observe_node, unlock_node, unobserve_node};
use crate::profile::{is_file_menu, Menu, Profile};
use crate::scheduler::Task;
use crate::session::{SessionHandle, SessionId, SessionState, SessionTable};
use crate::types::{Source, Sources};

/// Device side effects the runtime needs.
pub trait DeviceControl: Send + Sync {
    fn set_gyro_enabled(&self, enabled: bool);
}

pub type LoadError = Box<dyn Error + Send + Sync>;

/// Builds profiles from files. A failed build never yields a partial profile.
pub trait ProfileLoader: Send + Sync {
    fn load(&self, path: &Path) -> std::result::Result<Profile, LoadError>;

    /// Builds a stand-alone menu file.
    fn load_menu(&self, path: &Path) -> std::result::Result<Menu, LoadError> {
        Err(format!("menu files are not supported: {}", path.display()).into())
    }
}

pub struct Runtime {
    profile: RwLock<Arc<Profile>>,
    sessions: Mutex<SessionTable>,
    /// Menu files loaded by item selections, keyed by path.
    file_menus: RwLock<AHashMap<String, Arc<Menu>>>,
    device: Arc<dyn DeviceControl>,
    loader: Box<dyn ProfileLoader>,
    inbox_tx: Sender<Task>,
    inbox_rx: Receiver<Task>,
    sniffing: AtomicBool,
    next_session: AtomicU64,
}

impl Runtime {
    pub fn new(
        profile: Profile,
        device: Arc<dyn DeviceControl>,
        loader: Box<dyn ProfileLoader>,
    ) -> Self {
        if profile.requires_gyro() {
            device.set_gyro_enabled(true);
        }
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            profile: RwLock::new(Arc::new(profile)),
            sessions: Mutex::new(SessionTable::default()),
            file_menus: RwLock::new(AHashMap::new()),
            device,
            loader,
            inbox_tx,
            inbox_rx,
            sniffing: AtomicBool::new(false),
            next_session: AtomicU64::new(1),
        }
    }

    /// Allow sessions to observe sources.
    pub fn set_sniffing(&self, enabled: bool) {
        self.sniffing.store(enabled, Ordering::Relaxed);
    }

    pub fn profile(&self) -> Arc<Profile> {
        Arc::clone(&self.profile.read())
    }

    /// Node currently bound to `source` in the active profile.
    pub fn resolve(&self, source: Source) -> ActionRef {
        self.profile().resolve(source)
    }

    pub fn connect(&self, tx: Sender<String>) -> SessionHandle {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let handle = SessionHandle::new(id, tx);
        self.sessions.lock().insert(handle.clone());
        crate::print_debug!("session {id} connected");
        handle
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Sources `session` currently locks and observes.
    pub fn intercepted(&self, session: SessionId) -> Option<(Sources, Sources)> {
        let sessions = self.sessions.lock();
        sessions
            .get(session)
            .map(|state| (state.locked, state.observed))
    }

    /// Lock every named source for `session`, or none of them.
    pub fn lock(&self, session: SessionId, names: &[&str]) -> std::result::Result<(), InterceptError> {
        let requested = parse_names(names)?;
        let mut sessions = self.sessions.lock();
        let state = sessions
            .get_mut(session)
            .ok_or(InterceptError::UnknownSession(session))?;
        let profile = self.profile();

        if let Some(&taken) = requested.iter().find(|source| !can_lock(&profile, **source)) {
            return Err(InterceptError::Conflict(taken));
        }
        let sources: Sources = requested.into_iter().collect();
        for source in sources.iter() {
            profile.rewrite(source, |node| Some(lock_node(node, source, &state.handle)));
            state.locked.insert(source);
            self.reset_pad(source);
        }
        crate::print_debug!("session {session} locked {sources:?}");
        Ok(())
    }

    /// Tee every named source to `session`.
    pub fn observe(
        &self,
        session: SessionId,
        names: &[&str],
    ) -> std::result::Result<(), InterceptError> {
        if !self.sniffing.load(Ordering::Relaxed) {
            return Err(InterceptError::SniffingDisabled);
        }
        let sources = parse_sources(names)?;
        let mut sessions = self.sessions.lock();
        let state = sessions
            .get_mut(session)
            .ok_or(InterceptError::UnknownSession(session))?;
        let profile = self.profile();

        for source in sources.iter() {
            if state.observed.contains(source) {
                continue;
            }
            profile.rewrite(source, |node| Some(observe_node(node, source, &state.handle)));
            state.observed.insert(source);
            self.reset_pad(source);
        }
        crate::print_debug!("session {session} observes {sources:?}");
        Ok(())
    }

    /// Release one lock held by `session`.
    pub fn unlock_source(
        &self,
        session: SessionId,
        source: Source,
    ) -> std::result::Result<(), InterceptError> {
        let mut sessions = self.sessions.lock();
        let state = sessions
            .get_mut(session)
            .ok_or(InterceptError::UnknownSession(session))?;
        self.remove_lock(&self.profile(), state, source)
    }

    /// Stop one observation of `session`.
    pub fn unobserve_source(
        &self,
        session: SessionId,
        source: Source,
    ) -> std::result::Result<(), InterceptError> {
        let mut sessions = self.sessions.lock();
        let state = sessions
            .get_mut(session)
            .ok_or(InterceptError::UnknownSession(session))?;
        self.remove_observer(&self.profile(), state, source)
    }

    /// Release every lock, then every observation, of `session`. The
    /// session stays connected.
    pub fn unlock(&self, session: SessionId) -> std::result::Result<(), InterceptError> {
        let mut sessions = self.sessions.lock();
        let state = sessions
            .get_mut(session)
            .ok_or(InterceptError::UnknownSession(session))?;
        self.release_all(&self.profile(), state);
        Ok(())
    }

    /// Reverse everything `session` intercepts and forget it.
    pub fn disconnect(&self, session: SessionId) {
        let mut sessions = self.sessions.lock();
        if let Some(mut state) = sessions.remove(session) {
            self.release_all(&self.profile(), &mut state);
            crate::print_debug!("session {session} disconnected");
        }
    }

    /// Disconnect every session.
    pub fn shutdown(&self) {
        let mut sessions = self.sessions.lock();
        let profile = self.profile();
        for id in sessions.ids() {
            if let Some(mut state) = sessions.remove(id) {
                self.release_all(&profile, &mut state);
            }
        }
    }

    /// Make `profile` the active one, carrying every live interception over.
    pub fn swap_profile(&self, profile: Profile) {
        let sessions = self.sessions.lock();
        let next = Arc::new(profile);
        let previous = self.profile();

        if previous.requires_gyro() != next.requires_gyro() {
            self.device.set_gyro_enabled(next.requires_gyro());
        }

        for state in sessions.values() {
            for source in state.observed.iter() {
                next.rewrite(source, |node| Some(observe_node(node, source, &state.handle)));
            }
            for source in state.locked.iter() {
                next.rewrite(source, |node| Some(lock_node(node, source, &state.handle)));
            }
            for source in state.observed.union(&state.locked).iter() {
                self.reset_pad(source);
            }
        }

        *self.profile.write() = Arc::clone(&next);

        let line = format!("Current profile: {}", next.path().display());
        for state in sessions.values() {
            state.handle.send(line.as_str());
        }
        crate::print_info!("Profile {} activated", next.path().display());
    }

    /// Build the profile at `path` and swap it in. A failed build changes
    /// nothing.
    pub fn load_profile(&self, path: &Path) -> Result<()> {
        let profile = self.loader.load(path).map_err(|source| RuntimeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.swap_profile(profile);
        Ok(())
    }

    /// Press then release a menu item's action on the poll thread. Menu
    /// files are (re)loaded here, so edits apply on the next selection.
    pub fn select_menu_item(&self, menu: &str, item: &str) -> Result<()> {
        let invalid = || RuntimeError::UnknownMenuItem {
            menu: menu.to_string(),
            item: item.to_string(),
        };
        if is_file_menu(menu) {
            let loaded = self.loader.load_menu(Path::new(menu)).map_err(|e| {
                crate::print_warning!("Cannot load menu {menu}: {e}");
                invalid()
            })?;
            if loaded.item(item).is_none() {
                return Err(invalid());
            }
            self.file_menus
                .write()
                .insert(menu.to_string(), Arc::new(loaded));
        } else if self.profile().menu_item_action(menu, item).is_none() {
            return Err(invalid());
        }
        self.schedule(Task::MenuPress {
            menu: menu.to_string(),
            item: item.to_string(),
        });
        Ok(())
    }

    /// Action of `item` in a profile menu or a loaded menu file.
    pub fn menu_item_action(&self, menu: &str, item: &str) -> Option<ActionRef> {
        if is_file_menu(menu) {
            let menus = self.file_menus.read();
            return menus
                .get(menu)?
                .item(item)
                .map(|item| Arc::clone(&item.action));
        }
        self.profile().menu_item_action(menu, item)
    }

    pub(crate) fn file_menus(&self) -> Vec<Arc<Menu>> {
        self.file_menus.read().values().cloned().collect()
    }

    /// Simulate a click of whatever is bound to `source`.
    pub fn click(&self, source: Source) {
        self.schedule(Task::Click(source));
    }

    /// Hand a task to the poll thread. It fires on the next tick.
    pub fn schedule(&self, task: Task) {
        // The receiver is owned by `self`, so the send cannot fail.
        let _ = self.inbox_tx.send(task);
    }

    pub(crate) fn take_inbox(&self) -> Vec<Task> {
        self.inbox_rx.try_iter().collect()
    }

    /// Send a line to every session.
    pub fn broadcast(&self, line: &str) {
        let sessions = self.sessions.lock();
        for state in sessions.values() {
            state.handle.send(line);
        }
    }

    fn reset_pad(&self, source: Source) {
        if source.is_pad() {
            self.schedule(Task::ResetPad(source));
        }
    }

    fn remove_lock(
        &self,
        profile: &Profile,
        state: &mut SessionState,
        source: Source,
    ) -> std::result::Result<(), InterceptError> {
        let id = state.handle.id();
        if !state.locked.contains(source) || !profile.rewrite(source, |node| unlock_node(node, id)) {
            return Err(InterceptError::NotLocked(source));
        }
        state.locked.remove(source);
        self.reset_pad(source);
        Ok(())
    }

    fn remove_observer(
        &self,
        profile: &Profile,
        state: &mut SessionState,
        source: Source,
    ) -> std::result::Result<(), InterceptError> {
        let id = state.handle.id();
        if !state.observed.contains(source)
            || !profile.rewrite(source, |node| unobserve_node(node, id))
        {
            return Err(InterceptError::NotObserved(source));
        }
        state.observed.remove(source);
        Ok(())
    }

    fn release_all(&self, profile: &Profile, state: &mut SessionState) {
        for source in state.locked.iter() {
            if let Err(e) = self.remove_lock(profile, state, source) {
                crate::print_warning!("session {}: {e}", state.handle.id());
            }
        }
        for source in state.observed.iter() {
            if let Err(e) = self.remove_observer(profile, state, source) {
                crate::print_warning!("session {}: {e}", state.handle.id());
            }
        }
        state.locked.clear();
        state.observed.clear();
    }
}

/// Whether nobody locks `source` yet. The stick also counts as locked while
/// its click is.
fn can_lock(profile: &Profile, source: Source) -> bool {
    if source == Source::Stick && is_locked(&profile.resolve(Source::StickPress)) {
        return false;
    }
    !is_locked(&profile.resolve(source))
}

/// Parse source names in request order. Fails on the first unknown name.
fn parse_names(names: &[&str]) -> std::result::Result<Vec<Source>, InterceptError> {
    names.iter().map(|name| name.parse::<Source>()).collect()
}

/// Parse and deduplicate source names. Fails on the first unknown name.
fn parse_sources(names: &[&str]) -> std::result::Result<Sources, InterceptError> {
    names
        .iter()
        .map(|name| name.parse::<Source>())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossbeam_channel::Receiver;

    use super::*;
    use crate::intercept::InterceptKind;
    use crate::profile::{Menu, MenuItem};
    use crate::testing::Probe;

    #[derive(Default)]
    struct FakeDevice {
        gyro: Mutex<Vec<bool>>,
    }

    impl DeviceControl for FakeDevice {
        fn set_gyro_enabled(&self, enabled: bool) {
            self.gyro.lock().push(enabled);
        }
    }

    /// Builds a gyro profile for paths containing `gyro`, fails for `broken`.
    struct FakeLoader;

    impl ProfileLoader for FakeLoader {
        fn load(&self, path: &Path) -> std::result::Result<Profile, LoadError> {
            let name = path.to_string_lossy();
            if name.contains("broken") {
                return Err("unexpected token".into());
            }
            let mut builder = Profile::builder(path);
            if name.contains("gyro") {
                builder = builder.gyro(Probe::new());
            }
            Ok(builder.build())
        }

        fn load_menu(&self, path: &Path) -> std::result::Result<Menu, LoadError> {
            if !path.to_string_lossy().contains("tools") {
                return Err("no such file".into());
            }
            Ok(Menu {
                id: path.display().to_string(),
                items: vec![MenuItem {
                    id: "go".into(),
                    label: "Go".into(),
                    action: Probe::new(),
                }],
            })
        }
    }

    fn runtime(profile: Profile) -> (Runtime, Arc<FakeDevice>) {
        let device = Arc::new(FakeDevice::default());
        let runtime = Runtime::new(profile, device.clone(), Box::new(FakeLoader));
        (runtime, device)
    }

    fn connect(runtime: &Runtime) -> (SessionId, Receiver<String>) {
        let (tx, rx) = unbounded();
        (runtime.connect(tx).id(), rx)
    }

    fn kind(node: &ActionRef) -> Option<InterceptKind> {
        node.as_interceptor().map(|wrapper| wrapper.kind())
    }

    #[test]
    fn lock_then_unlock_restores_binding() {
        let original: ActionRef = Probe::new();
        let (runtime, _) = runtime(Profile::builder("p").bind(Source::A, Arc::clone(&original)).build());
        let (session, _rx) = connect(&runtime);

        runtime.lock(session, &["A"]).unwrap();
        assert_eq!(kind(&runtime.resolve(Source::A)), Some(InterceptKind::Lock));

        runtime.unlock(session).unwrap();
        assert!(Arc::ptr_eq(&runtime.resolve(Source::A), &original));
        assert_eq!(runtime.intercepted(session), Some((Sources::empty(), Sources::empty())));
    }

    #[test]
    fn lock_batch_is_all_or_nothing() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (first, _rx1) = connect(&runtime);
        let (second, _rx2) = connect(&runtime);

        runtime.lock(first, &["A"]).unwrap();
        let err = runtime.lock(second, &["B", "A"]).unwrap_err();

        assert_eq!(err, InterceptError::Conflict(Source::A));
        assert_eq!(err.to_string(), "Cannot lock A");
        assert_eq!(kind(&runtime.resolve(Source::B)), None);
    }

    #[test]
    fn conflict_names_first_requested_source() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (first, _rx1) = connect(&runtime);
        let (second, _rx2) = connect(&runtime);

        runtime.lock(first, &["Y", "A"]).unwrap();

        assert_eq!(
            runtime.lock(second, &["Y", "A"]),
            Err(InterceptError::Conflict(Source::Y))
        );
        assert_eq!(
            runtime.lock(second, &["A", "Y"]),
            Err(InterceptError::Conflict(Source::A))
        );
    }

    #[test]
    fn locked_stick_click_blocks_stick() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (first, _rx1) = connect(&runtime);
        let (second, _rx2) = connect(&runtime);

        runtime.lock(first, &["STICKPRESS"]).unwrap();
        let err = runtime.lock(second, &["STICK"]).unwrap_err();

        assert_eq!(err.to_string(), "Cannot lock STICK");
        assert_eq!(kind(&runtime.resolve(Source::Stick)), None);

        runtime.unlock(first).unwrap();
        runtime.lock(second, &["STICK"]).unwrap();
        runtime.lock(first, &["STICKPRESS"]).unwrap();
    }

    #[test]
    fn unknown_source_changes_nothing() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (session, _rx) = connect(&runtime);

        let err = runtime.lock(session, &["A", "TOUCHPAD"]).unwrap_err();

        assert_eq!(err, InterceptError::UnknownSource("TOUCHPAD".into()));
        assert_eq!(kind(&runtime.resolve(Source::A)), None);
    }

    #[test]
    fn duplicate_names_collapse() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (session, _rx) = connect(&runtime);

        runtime.lock(session, &["X", "X"]).unwrap();

        let node = runtime.resolve(Source::X);
        let wrapper = node.as_interceptor().unwrap();
        assert_eq!(kind(wrapper.child()), None);
    }

    #[test]
    fn observing_requires_sniffing() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (session, _rx) = connect(&runtime);

        assert_eq!(
            runtime.observe(session, &["A"]),
            Err(InterceptError::SniffingDisabled)
        );
        runtime.set_sniffing(true);
        runtime.observe(session, &["A"]).unwrap();
        assert_eq!(kind(&runtime.resolve(Source::A)), Some(InterceptKind::Observe));
    }

    #[test]
    fn removing_absent_wrappers_fails() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (session, _rx) = connect(&runtime);

        assert_eq!(
            runtime.unlock_source(session, Source::A),
            Err(InterceptError::NotLocked(Source::A))
        );
        assert_eq!(
            runtime.unobserve_source(session, Source::A),
            Err(InterceptError::NotObserved(Source::A))
        );
        assert_eq!(
            runtime.lock(99, &["A"]),
            Err(InterceptError::UnknownSession(99))
        );
    }

    #[test]
    fn disconnect_reverses_interceptions() {
        let original: ActionRef = Probe::new();
        let (runtime, _) = runtime(Profile::builder("p").bind(Source::Start, Arc::clone(&original)).build());
        runtime.set_sniffing(true);
        let (watcher, _rx1) = connect(&runtime);
        let (owner, _rx2) = connect(&runtime);

        runtime.lock(owner, &["START"]).unwrap();
        runtime.observe(watcher, &["START"]).unwrap();
        runtime.disconnect(owner);

        assert_eq!(kind(&runtime.resolve(Source::Start)), Some(InterceptKind::Observe));
        runtime.disconnect(watcher);
        assert!(Arc::ptr_eq(&runtime.resolve(Source::Start), &original));
        assert_eq!(runtime.session_count(), 0);
    }

    #[test]
    fn gyro_toggles_only_on_change() {
        let (runtime, device) = runtime(Profile::empty("plain"));

        runtime.load_profile(Path::new("gyro-1.yaml")).unwrap();
        runtime.load_profile(Path::new("gyro-2.yaml")).unwrap();
        runtime.load_profile(Path::new("plain.yaml")).unwrap();
        runtime.load_profile(Path::new("plain-2.yaml")).unwrap();

        assert_eq!(*device.gyro.lock(), vec![true, false]);
    }

    #[test]
    fn locks_survive_profile_swap() {
        let (runtime, _) = runtime(Profile::empty("old.yaml"));
        runtime.set_sniffing(true);
        let (session, rx) = connect(&runtime);
        runtime.lock(session, &["B", "LEFT"]).unwrap();
        runtime.observe(session, &["B"]).unwrap();
        runtime.take_inbox();

        let fresh: ActionRef = Probe::new();
        runtime.swap_profile(Profile::builder("new.yaml").bind(Source::B, Arc::clone(&fresh)).build());

        let node = runtime.resolve(Source::B);
        let observer = node.as_interceptor().unwrap();
        assert_eq!(observer.kind(), InterceptKind::Observe);
        let lock = observer.child().as_interceptor().unwrap();
        assert_eq!(lock.kind(), InterceptKind::Lock);
        assert!(Arc::ptr_eq(lock.child(), &fresh));
        assert_eq!(kind(&runtime.resolve(Source::LeftPad)), Some(InterceptKind::Lock));

        assert_eq!(runtime.take_inbox(), vec![Task::ResetPad(Source::LeftPad)]);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["Current profile: new.yaml"]);
    }

    #[test]
    fn failed_load_keeps_profile() {
        let (runtime, _) = runtime(Profile::empty("old.yaml"));

        let err = runtime.load_profile(Path::new("broken.yaml")).unwrap_err();

        assert!(matches!(err, RuntimeError::Load { ref path, .. } if path == &PathBuf::from("broken.yaml")));
        assert_eq!(runtime.profile().path(), Path::new("old.yaml"));
    }

    #[test]
    fn menu_selection_is_validated_and_queued() {
        let profile = Profile::builder("p")
            .menu(Menu {
                id: "main".into(),
                items: vec![MenuItem {
                    id: "a".into(),
                    label: "A".into(),
                    action: Probe::new(),
                }],
            })
            .build();
        let (runtime, _) = runtime(profile);

        let err = runtime.select_menu_item("main", "b").unwrap_err();
        assert_eq!(err.to_string(), "Selected menu item is no longer valid");
        runtime.select_menu_item("main", "a").unwrap();

        assert_eq!(
            runtime.take_inbox(),
            vec![Task::MenuPress {
                menu: "main".into(),
                item: "a".into(),
            }]
        );
    }

    #[test]
    fn menu_files_load_on_selection() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let path = "/ws/menus/tools.menu";

        assert!(runtime.menu_item_action(path, "go").is_none());
        runtime.select_menu_item(path, "go").unwrap();
        assert!(runtime.menu_item_action(path, "go").is_some());
        assert_eq!(runtime.file_menus().len(), 1);
        assert_eq!(
            runtime.take_inbox(),
            vec![Task::MenuPress {
                menu: path.into(),
                item: "go".into(),
            }]
        );

        assert!(runtime.select_menu_item(path, "stop").is_err());
        let err = runtime.select_menu_item("/ws/menus/missing.menu", "go").unwrap_err();
        assert_eq!(err.to_string(), "Selected menu item is no longer valid");
        assert!(runtime.take_inbox().is_empty());
    }

    #[test]
    fn pad_interception_requests_reset() {
        let (runtime, _) = runtime(Profile::empty("p"));
        let (session, _rx) = connect(&runtime);

        runtime.lock(session, &["RIGHT", "A"]).unwrap();
        assert_eq!(runtime.take_inbox(), vec![Task::ResetPad(Source::RightPad)]);

        runtime.unlock(session).unwrap();
        assert_eq!(runtime.take_inbox(), vec![Task::ResetPad(Source::RightPad)]);
    }
}
