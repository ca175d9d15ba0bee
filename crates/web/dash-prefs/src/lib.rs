//! User layout preferences: the closed set of keys, where their values are
//! stored, and how a stored value is turned into a validated preference.

pub mod error;
pub mod keys;
pub mod resolve;
pub mod store;

pub use error::PreferenceError;
pub use keys::{
    ContentLayout, Preference, PreferenceKey, SidebarCollapsible, SidebarVariant, ThemeMode,
    ThemePreset,
};
pub use resolve::{
    LayoutPreferences, ThemePreferences, get_preference, resolve, resolve_layout, resolve_theme,
};
pub use store::{CookiePreferences, PreferenceStore, preference_cookie, set_preference};
