//! # Style Reifier
//!
//! Turns a [`ThemeState`] into root-element effects: exactly one of the
//! `light`/`dark` classes, the `dir` attribute and the fixed set of CSS
//! custom properties listed in [`CssProperty::ALL`].
//!
//! The platform is abstracted by the [`Document`] trait, which receives one
//! [`RootPatch`] per notification and must apply it as a single batch.
//! [`HeadlessDocument`] keeps the root element in memory and can render it as
//! a `:root { ... }` stylesheet.
//!
//! ## Value Resolution
//!
//! | Property              | Source                                                     |
//! |-----------------------|------------------------------------------------------------|
//! | `--color-brand`       | primary preset                                             |
//! | `--color-secondary`   | secondary preset                                           |
//! | `--color-accent`      | accent preset                                              |
//! | `--color-dark`        | `dark` override, else primary preset at 15% lightness      |
//! | `--color-light`       | `light` override, else primary preset at 97% lightness     |
//! | `--color-muted`       | `muted` override, else primary preset desaturated          |
//! | `--color-background`  | light in light mode, dark in dark mode                     |
//! | `--color-foreground`  | dark in light mode, light in dark mode                     |
//!
//! Every value is written as lower-case hex (`#rrggbb`, or `#rrggbbaa` when
//! translucent) whatever notation the preset or override used. A value that
//! fails to parse is logged and replaced by the property's last successfully
//! written value, or by its static fallback if nothing has been written yet.
//! Every property is present in every patch; a patch identical to the last
//! committed one is not committed again.

use crate::color::Color;
use crate::palette::Palette;
use crate::state::{CustomRole, Mode, ThemeState};
use crate::store::{Subscription, ThemeStore};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

const DARK_LIGHTNESS: f32 = 15.0;
const LIGHT_LIGHTNESS: f32 = 97.0;
const MUTED_SATURATION: f32 = 10.0;
const MUTED_LIGHTNESS: f32 = 55.0;

/// CSS custom properties written to the root element.
///
/// The names are a public contract with every stylesheet in the component
/// library and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CssProperty {
    Brand,
    Secondary,
    Accent,
    Dark,
    Light,
    Muted,
    Background,
    Foreground,
}

impl CssProperty {
    pub const ALL: [CssProperty; 8] = [
        CssProperty::Brand,
        CssProperty::Secondary,
        CssProperty::Accent,
        CssProperty::Dark,
        CssProperty::Light,
        CssProperty::Muted,
        CssProperty::Background,
        CssProperty::Foreground,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CssProperty::Brand => "--color-brand",
            CssProperty::Secondary => "--color-secondary",
            CssProperty::Accent => "--color-accent",
            CssProperty::Dark => "--color-dark",
            CssProperty::Light => "--color-light",
            CssProperty::Muted => "--color-muted",
            CssProperty::Background => "--color-background",
            CssProperty::Foreground => "--color-foreground",
        }
    }

    /// Value used when neither the state nor the history yields a valid color.
    pub fn static_fallback(self) -> &'static str {
        match self {
            CssProperty::Brand => "#2563eb",
            CssProperty::Secondary => "#64748b",
            CssProperty::Accent => "#8b5cf6",
            CssProperty::Dark => "#111827",
            CssProperty::Light => "#f9fafb",
            CssProperty::Muted => "#9ca3af",
            CssProperty::Background => "#ffffff",
            CssProperty::Foreground => "#111827",
        }
    }

    fn custom_role(self) -> Option<CustomRole> {
        match self {
            CssProperty::Dark => Some(CustomRole::Dark),
            CssProperty::Light => Some(CustomRole::Light),
            CssProperty::Muted => Some(CustomRole::Muted),
            _ => None,
        }
    }
}

impl fmt::Display for CssProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CssProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CssProperty::ALL
            .into_iter()
            .find(|property| property.name() == s.trim())
            .ok_or_else(|| format!("unknown CSS property '{s}'"))
    }
}

/// One batch of root-element changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPatch {
    pub add_class: &'static str,
    pub remove_class: &'static str,
    pub dir: &'static str,
    /// One entry per [`CssProperty`], in [`CssProperty::ALL`] order.
    pub properties: Vec<(CssProperty, String)>,
}

impl RootPatch {
    pub fn property(&self, property: CssProperty) -> Option<&str> {
        self.properties
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }
}

/// Platform root element that accepts batched style patches.
pub trait Document: Send {
    /// Apply every change in `patch` as a single batch.
    fn commit(&mut self, patch: &RootPatch);
}

/// The one-method style application interface consumed by the store wiring.
pub trait StyleApplier: Send {
    fn apply(&mut self, state: &ThemeState);
}

/// Computes root patches from theme state and commits them to a document.
pub struct Reifier<D: Document> {
    palette: Palette,
    document: D,
    last_good: HashMap<CssProperty, String>,
    last_committed: Option<RootPatch>,
}

impl<D: Document> Reifier<D> {
    pub fn new(palette: Palette, document: D) -> Self {
        Self {
            palette,
            document,
            last_good: HashMap::new(),
            last_committed: None,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Build the patch for `state`, updating the last-known-good values.
    pub fn compute(&mut self, state: &ThemeState) -> RootPatch {
        let primary = self.palette.resolve(&state.primary_preset).value.clone();
        let secondary = self.palette.resolve(&state.secondary_preset).value.clone();
        let accent = self.palette.resolve(&state.accent_preset).value.clone();
        let primary_color = Color::parse(&primary).ok();

        let brand = self.settle(CssProperty::Brand, &primary);
        let secondary = self.settle(CssProperty::Secondary, &secondary);
        let accent = self.settle(CssProperty::Accent, &accent);
        let dark = self.settle_role(CssProperty::Dark, state, primary_color);
        let light = self.settle_role(CssProperty::Light, state, primary_color);
        let muted = self.settle_role(CssProperty::Muted, state, primary_color);

        let (background, foreground) = match state.mode {
            Mode::Light => (light.clone(), dark.clone()),
            Mode::Dark => (dark.clone(), light.clone()),
        };
        let background = self.settle(CssProperty::Background, &background);
        let foreground = self.settle(CssProperty::Foreground, &foreground);

        RootPatch {
            add_class: state.mode.class_name(),
            remove_class: state.mode.toggled().class_name(),
            dir: state.direction.as_str(),
            properties: vec![
                (CssProperty::Brand, brand),
                (CssProperty::Secondary, secondary),
                (CssProperty::Accent, accent),
                (CssProperty::Dark, dark),
                (CssProperty::Light, light),
                (CssProperty::Muted, muted),
                (CssProperty::Background, background),
                (CssProperty::Foreground, foreground),
            ],
        }
    }

    fn settle_role(
        &mut self,
        property: CssProperty,
        state: &ThemeState,
        primary: Option<Color>,
    ) -> String {
        let candidate = property
            .custom_role()
            .and_then(|role| state.custom_color(role))
            .map(str::to_string)
            .or_else(|| derive(property, primary?))
            .unwrap_or_else(|| property.static_fallback().to_string());

        self.settle(property, &candidate)
    }

    fn settle(&mut self, property: CssProperty, candidate: &str) -> String {
        match Color::parse(candidate) {
            Ok(color) => {
                let value = color.to_hex();
                self.last_good.insert(property, value.clone());
                value
            }
            Err(e) => {
                log::warn!("Rejected value for {property}: {e}");
                self.last_good
                    .get(&property)
                    .cloned()
                    .unwrap_or_else(|| property.static_fallback().to_string())
            }
        }
    }
}

fn derive(property: CssProperty, primary: Color) -> Option<String> {
    let derived = match property {
        CssProperty::Dark => primary.with_lightness(DARK_LIGHTNESS),
        CssProperty::Light => primary.with_lightness(LIGHT_LIGHTNESS),
        CssProperty::Muted => primary
            .with_saturation(MUTED_SATURATION)
            .with_lightness(MUTED_LIGHTNESS),
        _ => return None,
    };
    Some(derived.to_hex())
}

impl<D: Document> StyleApplier for Reifier<D> {
    fn apply(&mut self, state: &ThemeState) {
        let patch = self.compute(state);
        // settings-panel and other non-visual changes leave the root alone
        if self.last_committed.as_ref() == Some(&patch) {
            log::trace!("Root element unchanged, skipping commit");
            return;
        }
        self.document.commit(&patch);
        self.last_committed = Some(patch);
    }
}

/// Shared access to a reifier attached to a store.
pub struct ReifierHandle<D: Document> {
    inner: Arc<Mutex<Reifier<D>>>,
}

impl<D: Document> Clone for ReifierHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Document> ReifierHandle<D> {
    pub fn with_document<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let reifier = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(reifier.document())
    }
}

impl<D: Document + 'static> Reifier<D> {
    /// Apply the store's current state, then re-apply on every notification.
    pub fn attach(store: &ThemeStore, document: D) -> (ReifierHandle<D>, Subscription) {
        let mut reifier = Reifier::new(store.palette().clone(), document);
        reifier.apply(&store.snapshot());
        log::info!("Style reifier attached");

        let inner = Arc::new(Mutex::new(reifier));
        let listener = Arc::clone(&inner);
        let subscription = store.subscribe(move |state| {
            listener
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(state);
        });

        (ReifierHandle { inner }, subscription)
    }
}

/// In-memory root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessDocument {
    class_list: BTreeSet<String>,
    dir: Option<String>,
    style: BTreeMap<String, String>,
    commit_count: usize,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.contains(class)
    }

    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.class_list.iter().map(String::as_str)
    }

    pub fn dir(&self) -> Option<&str> {
        self.dir.as_deref()
    }

    pub fn property(&self, property: CssProperty) -> Option<&str> {
        self.style.get(property.name()).map(String::as_str)
    }

    /// Number of batches applied so far.
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }

    /// Render the custom properties as a `:root` rule, in contract order.
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for property in CssProperty::ALL {
            if let Some(value) = self.property(property) {
                css.push_str(&format!("  {}: {};\n", property.name(), value));
            }
        }
        css.push('}');
        css
    }

    /// `class="..." dir="..."` as it would appear on the `<html>` tag.
    pub fn root_attributes(&self) -> String {
        let classes: Vec<&str> = self.class_list().collect();
        format!(
            "class=\"{}\" dir=\"{}\"",
            classes.join(" "),
            self.dir().unwrap_or_default()
        )
    }
}

impl Document for HeadlessDocument {
    fn commit(&mut self, patch: &RootPatch) {
        self.class_list.remove(patch.remove_class);
        self.class_list.insert(patch.add_class.to_string());
        self.dir = Some(patch.dir.to_string());
        for (property, value) in &patch.properties {
            self.style.insert(property.name().to_string(), value.clone());
        }
        self.commit_count += 1;
    }
}
