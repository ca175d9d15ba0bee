use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::PreferenceStore;
use crate::{ContentLayout, Preference, SidebarCollapsible, SidebarVariant, ThemeMode, ThemePreset};

/// Look up `key` and return it if it is one of `allowed`, else `default`.
///
/// A store failure is treated like a missing value: the key falls back to
/// its default and the error is logged.
pub async fn resolve<S>(store: &S, key: &str, allowed: &[&str], default: &str) -> String
where
    S: PreferenceStore + ?Sized,
{
    match store.get(key).await {
        Ok(Some(value)) if allowed.contains(&value.as_str()) => value,
        Ok(Some(value)) => {
            debug!(key, value = %value, "Stored preference not allowed, using default");
            default.to_string()
        }
        Ok(None) => default.to_string(),
        Err(e) => {
            warn!(key, error = %e, "Preference lookup failed, using default");
            default.to_string()
        }
    }
}

/// Typed form of [`resolve`] for a registered preference.
pub async fn get_preference<T, S>(store: &S) -> T
where
    T: Preference,
    S: PreferenceStore + ?Sized,
{
    let raw = resolve(store, T::KEY, &T::allowed(), T::DEFAULT.as_str()).await;
    T::parse(&raw).unwrap_or(T::DEFAULT)
}

/// The three preferences that shape the dashboard chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreferences {
    pub content_layout: ContentLayout,
    pub variant: SidebarVariant,
    pub collapsible: SidebarCollapsible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreferences {
    pub mode: ThemeMode,
    pub preset: ThemePreset,
}

/// Resolve the layout preferences concurrently; returns once all three
/// lookups have completed.
pub async fn resolve_layout<S>(store: &S) -> LayoutPreferences
where
    S: PreferenceStore + ?Sized,
{
    let (variant, collapsible, content_layout) = tokio::join!(
        get_preference::<SidebarVariant, _>(store),
        get_preference::<SidebarCollapsible, _>(store),
        get_preference::<ContentLayout, _>(store),
    );

    LayoutPreferences {
        content_layout,
        variant,
        collapsible,
    }
}

pub async fn resolve_theme<S>(store: &S) -> ThemePreferences
where
    S: PreferenceStore + ?Sized,
{
    let (mode, preset) = tokio::join!(
        get_preference::<ThemeMode, _>(store),
        get_preference::<ThemePreset, _>(store),
    );
    ThemePreferences { mode, preset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PreferenceError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct MapStore(HashMap<&'static str, &'static str>);

    impl MapStore {
        fn new(entries: &[(&'static str, &'static str)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    #[async_trait]
    impl PreferenceStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
            Ok(self.0.get(key).map(|v| v.to_string()))
        }
    }

    /// Fails for one key, serves the rest from a map.
    struct FlakyStore {
        broken: &'static str,
        inner: MapStore,
    }

    #[async_trait]
    impl PreferenceStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
            if key == self.broken {
                return Err(PreferenceError::Unavailable("connection refused".into()));
            }
            self.inner.get(key).await
        }
    }

    /// Every lookup blocks until three lookups are in flight.
    struct RendezvousStore {
        barrier: Arc<Barrier>,
    }

    #[async_trait]
    impl PreferenceStore for RendezvousStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, PreferenceError> {
            self.barrier.wait().await;
            Ok(None)
        }
    }

    const VARIANTS: &[&str] = &["inset", "sidebar", "floating"];

    #[tokio::test]
    async fn test_resolve_returns_allowed_value() {
        let store = MapStore::new(&[("sidebar_variant", "floating")]);
        assert_eq!(resolve(&store, "sidebar_variant", VARIANTS, "inset").await, "floating");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_unknown_value() {
        let store = MapStore::new(&[("sidebar_variant", "bogus")]);
        assert_eq!(resolve(&store, "sidebar_variant", VARIANTS, "inset").await, "inset");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_when_absent() {
        let store = MapStore::new(&[]);
        assert_eq!(resolve(&store, "sidebar_variant", VARIANTS, "sidebar").await, "sidebar");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_store_error() {
        let store = FlakyStore {
            broken: "sidebar_variant",
            inner: MapStore::new(&[("sidebar_variant", "floating")]),
        };
        assert_eq!(resolve(&store, "sidebar_variant", VARIANTS, "inset").await, "inset");
    }

    #[tokio::test]
    async fn test_layout_uses_stored_values() {
        let store = MapStore::new(&[
            ("sidebar_variant", "inset"),
            ("sidebar_collapsible", "offcanvas"),
            ("content_layout", "full-width"),
        ]);
        let prefs = resolve_layout(&store).await;
        assert_eq!(prefs.variant, SidebarVariant::Inset);
        assert_eq!(prefs.collapsible, SidebarCollapsible::Offcanvas);
        assert_eq!(prefs.content_layout, ContentLayout::FullWidth);
    }

    #[tokio::test]
    async fn test_layout_defaults_each_key_independently() {
        let store = FlakyStore {
            broken: "content_layout",
            inner: MapStore::new(&[
                ("sidebar_variant", "bogus"),
                ("sidebar_collapsible", "offcanvas"),
                ("content_layout", "full-width"),
            ]),
        };
        let prefs = resolve_layout(&store).await;
        assert_eq!(prefs.variant, SidebarVariant::Inset);
        assert_eq!(prefs.collapsible, SidebarCollapsible::Offcanvas);
        assert_eq!(prefs.content_layout, ContentLayout::Centered);
    }

    #[tokio::test]
    async fn test_layout_lookups_run_concurrently() {
        let store = RendezvousStore {
            barrier: Arc::new(Barrier::new(3)),
        };
        let prefs = tokio::time::timeout(Duration::from_secs(5), resolve_layout(&store))
            .await
            .expect("lookups were serialized");
        assert_eq!(prefs, LayoutPreferences::default());
    }

    #[tokio::test]
    async fn test_theme() {
        let store = MapStore::new(&[("theme_mode", "dark"), ("theme_preset", "neon")]);
        let theme = resolve_theme(&store).await;
        assert_eq!(theme.mode, ThemeMode::Dark);
        assert_eq!(theme.preset, ThemePreset::Standard);
    }

    #[test]
    fn test_layout_json_shape() {
        let json = serde_json::to_value(LayoutPreferences::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contentLayout": "centered",
                "variant": "inset",
                "collapsible": "icon",
            })
        );
    }
}
