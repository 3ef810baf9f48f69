//! # Theme State Store
//!
//! The single writer of [`ThemeState`]. The store is an explicitly
//! constructed handle (clone it to share) rather than a process global, so
//! tests and embedders can run as many independent instances as they like.
//!
//! ## Mutation Flow
//!
//! 1. A setter (or [`ThemeStore::apply_setting`]) enqueues a [`Mutation`]
//! 2. If no notification cycle is running, the caller drains the queue
//! 3. Each mutation is validated against the palette and applied to a copy
//!    of the current state; mutations that change nothing are dropped
//! 4. The new snapshot is published and every listener registered at that
//!    moment is invoked once, in registration order, with the same snapshot
//!
//! Mutations issued from inside a listener land in the queue and are
//! processed after the running cycle has notified every listener, so no
//! listener ever observes an interleaved or partially applied state.
//!
//! ## Failure Semantics
//!
//! Nothing here returns an error to the caller. Unknown setting keys,
//! unparsable values and preset ids missing from the palette are logged and
//! leave the state untouched.

use crate::error::{ThemeError, ThemeResult};
use crate::palette::Palette;
use crate::state::{CustomRole, Direction, Layout, Mode, PresetRole, ThemeState};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener = Arc<dyn Fn(&ThemeState) + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A single requested change to the theme state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetMode(Mode),
    SetDirection(Direction),
    SetLayout(Layout),
    SetPreset(PresetRole, String),
    /// `None` removes the override and reverts the role to its derived value.
    SetCustomColor(CustomRole, Option<String>),
    SetSettingsOpen(bool),
    ToggleMode,
    ToggleDirection,
    ToggleSettings,
    /// Restore the store's defaults for every persisted field.
    Reset,
}

impl Mutation {
    /// Translate a settings key/value pair into a mutation.
    ///
    /// Keys are matched case-insensitively and accept both kebab-case
    /// (`primary-preset`) and the persisted camelCase names (`primaryPreset`).
    /// Custom colors use `custom.<role>`; the values `none` and `null` clear
    /// the override.
    pub fn parse(key: &str, value: &str) -> ThemeResult<Self> {
        let normalized = key.trim().to_ascii_lowercase().replace('_', "-");
        let invalid = |reason: String| ThemeError::invalid_setting(key, value, reason);

        if let Some(role) = normalized
            .strip_prefix("custom.")
            .or_else(|| normalized.strip_prefix("custom-"))
        {
            let role = role.parse::<CustomRole>().map_err(invalid)?;
            let color = match value.trim() {
                "none" | "null" => None,
                other => Some(other.to_string()),
            };
            return Ok(Mutation::SetCustomColor(role, color));
        }

        match normalized.as_str() {
            "mode" => value.parse().map(Mutation::SetMode).map_err(invalid),
            "direction" | "dir" => value.parse().map(Mutation::SetDirection).map_err(invalid),
            "layout" => value.parse().map(Mutation::SetLayout).map_err(invalid),
            "primary-preset" | "primarypreset" | "primary" => Ok(Mutation::SetPreset(
                PresetRole::Primary,
                value.trim().to_string(),
            )),
            "secondary-preset" | "secondarypreset" | "secondary" => Ok(Mutation::SetPreset(
                PresetRole::Secondary,
                value.trim().to_string(),
            )),
            "accent-preset" | "accentpreset" | "accent" => Ok(Mutation::SetPreset(
                PresetRole::Accent,
                value.trim().to_string(),
            )),
            "settings-open" | "issettingsopen" => match value.trim().to_ascii_lowercase().as_str()
            {
                "true" | "open" | "yes" | "1" => Ok(Mutation::SetSettingsOpen(true)),
                "false" | "closed" | "no" | "0" => Ok(Mutation::SetSettingsOpen(false)),
                _ => Err(invalid("expected a boolean".to_string())),
            },
            _ => Err(invalid("unknown setting".to_string())),
        }
    }

    /// Apply to `state`, returning whether anything changed.
    fn apply_to(&self, state: &mut ThemeState, palette: &Palette, defaults: &ThemeState) -> bool {
        match self {
            Mutation::SetMode(mode) => replace(&mut state.mode, *mode),
            Mutation::SetDirection(direction) => replace(&mut state.direction, *direction),
            Mutation::SetLayout(layout) => replace(&mut state.layout, *layout),
            Mutation::SetPreset(role, id) => {
                if !palette.contains(id) {
                    log::warn!("Ignoring {role} preset '{id}': not in palette");
                    return false;
                }
                replace(state.preset_mut(*role), id.clone())
            }
            Mutation::SetCustomColor(role, Some(color)) => {
                let color = color.trim();
                if color.is_empty() {
                    log::warn!("Ignoring empty custom color for role '{role}'");
                    return false;
                }
                if state.custom_color(*role) == Some(color) {
                    return false;
                }
                state
                    .custom_palette_color
                    .insert(*role, color.to_string());
                true
            }
            Mutation::SetCustomColor(role, None) => state.custom_palette_color.remove(role).is_some(),
            Mutation::SetSettingsOpen(open) => replace(&mut state.is_settings_open, *open),
            Mutation::ToggleMode => {
                state.mode = state.mode.toggled();
                true
            }
            Mutation::ToggleDirection => {
                state.direction = state.direction.toggled();
                true
            }
            Mutation::ToggleSettings => {
                state.is_settings_open = !state.is_settings_open;
                true
            }
            Mutation::Reset => {
                let next = ThemeState {
                    is_settings_open: state.is_settings_open,
                    ..defaults.clone()
                };
                replace(state, next)
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

struct ListenerEntry {
    id: u64,
    listener: Listener,
}

struct StoreInner {
    palette: Palette,
    defaults: ThemeState,
    state: Mutex<Arc<ThemeState>>,
    listeners: Mutex<Vec<ListenerEntry>>,
    pending: Mutex<VecDeque<Mutation>>,
    dispatching: AtomicBool,
    next_listener_id: AtomicU64,
}

impl StoreInner {
    fn remove_listener(&self, id: u64) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        before != listeners.len()
    }

    fn is_registered(&self, id: u64) -> bool {
        lock(&self.listeners).iter().any(|entry| entry.id == id)
    }
}

/// Resets the dispatching flag even if a listener panics.
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a shared theme state with observer-style notifications.
#[derive(Clone)]
pub struct ThemeStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(ThemeState::default())
    }
}

impl ThemeStore {
    /// Create a store over the builtin palette with library defaults.
    pub fn new(initial: ThemeState) -> Self {
        Self::with_config(initial, ThemeState::default(), Palette::builtin())
    }

    /// Create a store with explicit reset defaults and palette.
    ///
    /// Preset references in `initial` and `defaults` that the palette cannot
    /// resolve are replaced by each role's fallback id.
    pub fn with_config(mut initial: ThemeState, mut defaults: ThemeState, palette: Palette) -> Self {
        for role in initial.repair_presets(&palette) {
            log::warn!("Initial {role} preset not in palette, using fallback");
        }
        defaults.repair_presets(&palette);
        defaults.is_settings_open = false;

        Self {
            inner: Arc::new(StoreInner {
                palette,
                defaults,
                state: Mutex::new(Arc::new(initial)),
                listeners: Mutex::new(Vec::new()),
                pending: Mutex::new(VecDeque::new()),
                dispatching: AtomicBool::new(false),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.inner.palette
    }

    pub fn defaults(&self) -> &ThemeState {
        &self.inner.defaults
    }

    /// Current state. Snapshots are immutable; hold on to one as long as needed.
    pub fn snapshot(&self) -> Arc<ThemeState> {
        Arc::clone(&lock(&self.inner.state))
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    pub fn set_mode(&self, mode: Mode) {
        self.dispatch(Mutation::SetMode(mode));
    }

    pub fn set_direction(&self, direction: Direction) {
        self.dispatch(Mutation::SetDirection(direction));
    }

    pub fn set_layout(&self, layout: Layout) {
        self.dispatch(Mutation::SetLayout(layout));
    }

    pub fn set_preset(&self, role: PresetRole, id: &str) {
        self.dispatch(Mutation::SetPreset(role, id.to_string()));
    }

    pub fn set_primary_preset(&self, id: &str) {
        self.set_preset(PresetRole::Primary, id);
    }

    pub fn set_secondary_preset(&self, id: &str) {
        self.set_preset(PresetRole::Secondary, id);
    }

    pub fn set_accent_preset(&self, id: &str) {
        self.set_preset(PresetRole::Accent, id);
    }

    pub fn set_custom_palette_color(&self, role: CustomRole, color: Option<&str>) {
        self.dispatch(Mutation::SetCustomColor(role, color.map(str::to_string)));
    }

    pub fn set_is_settings_open(&self, open: bool) {
        self.dispatch(Mutation::SetSettingsOpen(open));
    }

    pub fn toggle_mode(&self) {
        self.dispatch(Mutation::ToggleMode);
    }

    pub fn toggle_direction(&self) {
        self.dispatch(Mutation::ToggleDirection);
    }

    pub fn toggle_settings(&self) {
        self.dispatch(Mutation::ToggleSettings);
    }

    pub fn reset(&self) {
        self.dispatch(Mutation::Reset);
    }

    /// Parse and apply a settings key/value pair. Invalid input is logged
    /// and ignored.
    pub fn apply_setting(&self, key: &str, value: &str) {
        match Mutation::parse(key, value) {
            Ok(mutation) => self.dispatch(mutation),
            Err(e) => log::warn!("Ignoring setting: {e}"),
        }
    }

    /// Queue a mutation and, unless a notification cycle is already running,
    /// process the queue until it is empty.
    pub fn dispatch(&self, mutation: Mutation) {
        lock(&self.inner.pending).push_back(mutation);

        loop {
            if self.inner.dispatching.swap(true, Ordering::AcqRel) {
                // the running cycle picks the mutation up
                return;
            }

            {
                let _guard = DispatchGuard(&self.inner.dispatching);
                while let Some(next) = self.next_pending() {
                    self.process(next);
                }
            }

            if lock(&self.inner.pending).is_empty() {
                return;
            }
        }
    }

    fn next_pending(&self) -> Option<Mutation> {
        lock(&self.inner.pending).pop_front()
    }

    fn process(&self, mutation: Mutation) {
        let snapshot = {
            let mut current = lock(&self.inner.state);
            let mut next = ThemeState::clone(&current);
            if !mutation.apply_to(&mut next, &self.inner.palette, &self.inner.defaults) {
                log::trace!("Mutation {mutation:?} left state unchanged");
                return;
            }
            let snapshot = Arc::new(next);
            *current = Arc::clone(&snapshot);
            snapshot
        };

        log::debug!("Applied {mutation:?}");

        let listeners: Vec<(u64, Listener)> = lock(&self.inner.listeners)
            .iter()
            .map(|entry| (entry.id, Arc::clone(&entry.listener)))
            .collect();

        for (id, listener) in listeners {
            // skip listeners removed by an earlier listener in this cycle
            if self.inner.is_registered(id) {
                listener(&snapshot);
            }
        }
    }

    /// Register a listener invoked after every effective mutation.
    ///
    /// The returned guard deregisters the listener when dropped or when
    /// [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push(ListenerEntry {
            id,
            listener: Arc::new(listener),
        });

        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Subscribe and immediately deliver the current snapshot.
    ///
    /// This is the consumer hook: the listener renders once right away and
    /// again after every change until the returned guard is dropped.
    pub fn watch<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let subscription = {
            let listener = Arc::clone(&listener);
            self.subscribe(move |state| listener(state))
        };
        listener(&self.snapshot());
        subscription
    }
}

/// Registration guard returned by [`ThemeStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
    active: AtomicBool,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Deregister the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.store.upgrade() {
            if inner.remove_listener(self.id) {
                log::trace!("Listener {} unsubscribed", self.id);
            }
        }
    }

    /// Keep the listener registered for the remaining lifetime of the store.
    pub fn detach(self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            Mutation::parse("mode", "dark").unwrap(),
            Mutation::SetMode(Mode::Dark)
        );
        assert_eq!(
            Mutation::parse("primaryPreset", "emerald").unwrap(),
            Mutation::SetPreset(PresetRole::Primary, "emerald".to_string())
        );
        assert_eq!(
            Mutation::parse("accent_preset", " rose ").unwrap(),
            Mutation::SetPreset(PresetRole::Accent, "rose".to_string())
        );
        assert_eq!(
            Mutation::parse("custom.dark", "#112233").unwrap(),
            Mutation::SetCustomColor(CustomRole::Dark, Some("#112233".to_string()))
        );
        assert_eq!(
            Mutation::parse("custom.muted", "none").unwrap(),
            Mutation::SetCustomColor(CustomRole::Muted, None)
        );
        assert_eq!(
            Mutation::parse("settings-open", "open").unwrap(),
            Mutation::SetSettingsOpen(true)
        );

        assert!(Mutation::parse("mode", "sepia").is_err());
        assert!(Mutation::parse("custom.brand", "#fff").is_err());
        assert!(Mutation::parse("font", "serif").is_err());
        assert!(Mutation::parse("settings-open", "maybe").is_err());
    }

    #[test]
    fn test_noop_mutation_does_not_notify() {
        let store = ThemeStore::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set_mode(Mode::Light);
        store.set_custom_palette_color(CustomRole::Dark, None);
        store.set_primary_preset("default");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        store.set_mode(Mode::Dark);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_preset_is_rejected_not_defaulted() {
        let store = ThemeStore::default();
        store.set_primary_preset("emerald");
        store.set_primary_preset("does-not-exist");
        assert_eq!(store.snapshot().primary_preset, "emerald");
    }

    #[test]
    fn test_empty_custom_color_is_rejected() {
        let store = ThemeStore::default();
        store.set_custom_palette_color(CustomRole::Light, Some("   "));
        assert!(store.snapshot().custom_palette_color.is_empty());
    }

    #[test]
    fn test_reset_restores_defaults_but_keeps_panel_state() {
        let store = ThemeStore::default();
        store.set_mode(Mode::Dark);
        store.set_direction(Direction::Rtl);
        store.set_custom_palette_color(CustomRole::Dark, Some("#000000"));
        store.set_is_settings_open(true);

        store.reset();

        let state = store.snapshot();
        assert_eq!(state.mode, Mode::Light);
        assert_eq!(state.direction, Direction::Ltr);
        assert!(state.custom_palette_color.is_empty());
        assert!(state.is_settings_open);
    }

    #[test]
    fn test_with_config_repairs_unknown_presets() {
        let initial = ThemeState {
            accent_preset: "gone".to_string(),
            ..ThemeState::default()
        };
        let store = ThemeStore::with_config(initial, ThemeState::default(), Palette::builtin());
        assert_eq!(store.snapshot().accent_preset, "violet");
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let store = ThemeStore::default();
        let sub = store.subscribe(|_| {});
        let other = store.subscribe(|_| {});
        assert_eq!(store.listener_count(), 2);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(store.listener_count(), 1);

        drop(sub);
        assert_eq!(store.listener_count(), 1);
        drop(other);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_detach_keeps_listener() {
        let store = ThemeStore::default();
        store.subscribe(|_| {}).detach();
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_subscription_outliving_store() {
        let store = ThemeStore::default();
        let sub = store.subscribe(|_| {});
        drop(store);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
