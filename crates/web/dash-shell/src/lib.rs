//! Dashboard shell: gates a request on its session, resolves the layout
//! preferences and composes the description the UI renders.

pub mod context;
pub mod layout;
pub mod page;

pub use context::{RequestContext, SIDEBAR_STATE_COOKIE};
pub use layout::{AccountEntry, AccountRole, ContentRegion, DashboardShell, HeaderControls, SidebarConfig, compose};
pub use page::{PageOutcome, render_dashboard};
