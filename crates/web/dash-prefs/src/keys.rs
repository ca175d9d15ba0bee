use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PreferenceError;

/// A named preference whose values form a closed set.
///
/// Each implementor is an enum with one variant per allowed value, so a
/// resolved preference can never hold a value outside its set.
pub trait Preference: Copy + Send + Sync + 'static {
    /// Cookie / storage key.
    const KEY: &'static str;
    const DEFAULT: Self;
    const VARIANTS: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }

    fn allowed() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.as_str()).collect()
    }
}

macro_rules! preference {
    (
        $(#[$meta:meta])*
        $name:ident, key = $key:literal, default = $default:ident,
        { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl Preference for $name {
            const KEY: &'static str = $key;
            const DEFAULT: Self = Self::$default;
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

preference! {
    /// How the sidebar is drawn next to the content.
    SidebarVariant, key = "sidebar_variant", default = Inset, {
        Inset => "inset",
        Sidebar => "sidebar",
        Floating => "floating",
    }
}

preference! {
    /// What the sidebar collapses to.
    SidebarCollapsible, key = "sidebar_collapsible", default = Icon, {
        Icon => "icon",
        Offcanvas => "offcanvas",
    }
}

preference! {
    ContentLayout, key = "content_layout", default = Centered, {
        Centered => "centered",
        FullWidth => "full-width",
    }
}

preference! {
    ThemeMode, key = "theme_mode", default = Light, {
        Light => "light",
        Dark => "dark",
    }
}

preference! {
    ThemePreset, key = "theme_preset", default = Standard, {
        Standard => "default",
        Brutalist => "brutalist",
        SoftPop => "soft-pop",
        Tangerine => "tangerine",
    }
}

/// Registry of every preference key the shell knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    SidebarVariant,
    SidebarCollapsible,
    ContentLayout,
    ThemeMode,
    ThemePreset,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 5] = [
        PreferenceKey::SidebarVariant,
        PreferenceKey::SidebarCollapsible,
        PreferenceKey::ContentLayout,
        PreferenceKey::ThemeMode,
        PreferenceKey::ThemePreset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SidebarVariant => SidebarVariant::KEY,
            Self::SidebarCollapsible => SidebarCollapsible::KEY,
            Self::ContentLayout => ContentLayout::KEY,
            Self::ThemeMode => ThemeMode::KEY,
            Self::ThemePreset => ThemePreset::KEY,
        }
    }

    pub fn allowed(self) -> Vec<&'static str> {
        match self {
            Self::SidebarVariant => SidebarVariant::allowed(),
            Self::SidebarCollapsible => SidebarCollapsible::allowed(),
            Self::ContentLayout => ContentLayout::allowed(),
            Self::ThemeMode => ThemeMode::allowed(),
            Self::ThemePreset => ThemePreset::allowed(),
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            Self::SidebarVariant => SidebarVariant::DEFAULT.as_str(),
            Self::SidebarCollapsible => SidebarCollapsible::DEFAULT.as_str(),
            Self::ContentLayout => ContentLayout::DEFAULT.as_str(),
            Self::ThemeMode => ThemeMode::DEFAULT.as_str(),
            Self::ThemePreset => ThemePreset::DEFAULT.as_str(),
        }
    }

    /// Check `value` against this key's allowed set, returning the
    /// canonical static string on success.
    pub fn validate(self, value: &str) -> Result<&'static str, PreferenceError> {
        self.allowed()
            .into_iter()
            .find(|allowed| *allowed == value)
            .ok_or_else(|| PreferenceError::NotAllowed {
                key: self.as_str().to_string(),
                value: value.to_string(),
            })
    }
}

impl FromStr for PreferenceKey {
    type Err = PreferenceError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| PreferenceError::UnknownKey(key.to_string()))
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
