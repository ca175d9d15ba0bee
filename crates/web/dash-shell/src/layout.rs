use dash_auth::Session;
use dash_prefs::{ContentLayout, LayoutPreferences, SidebarCollapsible, SidebarVariant};
use serde::{Deserialize, Serialize};

/// Render description for the dashboard chrome around page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardShell {
    pub sidebar: SidebarConfig,
    pub content: ContentRegion,
    pub header: HeaderControls,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarConfig {
    pub variant: SidebarVariant,
    pub collapsible: SidebarCollapsible,
    pub default_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRegion {
    pub layout: ContentLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderControls {
    /// Current values shown by the layout switcher.
    pub layout_controls: LayoutPreferences,
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: AccountRole,
}

/// Display tag for the account switcher; not an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Admin,
}

impl From<&Session> for AccountEntry {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user.id.clone(),
            name: session.user.name.clone(),
            email: session.user.email.clone(),
            avatar: session.user.image.clone(),
            role: AccountRole::Admin,
        }
    }
}

pub fn compose(session: &Session, prefs: LayoutPreferences, default_open: bool) -> DashboardShell {
    DashboardShell {
        sidebar: SidebarConfig {
            variant: prefs.variant,
            collapsible: prefs.collapsible,
            default_open,
        },
        content: ContentRegion {
            layout: prefs.content_layout,
        },
        header: HeaderControls {
            layout_controls: prefs,
            accounts: vec![AccountEntry::from(session)],
        },
    }
}
