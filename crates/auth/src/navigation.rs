//! Page-level routing guard.
//!
//! Low-privilege visitors are redirected instead of shown an error page.

use crate::{Action, Principal, ResourceClass, policy};

pub const SIGN_IN_PATH: &str = "/sign-in";
pub const DASHBOARD_PATH: &str = "/admin";

/// Which part of the site a page belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageArea {
    Public,
    /// Sign-in / register: only meaningful while logged out.
    AuthOnly,
    Dashboard,
    Admin(ResourceClass),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Render,
    RedirectToSignIn,
    RedirectToDashboard,
}

impl PageOutcome {
    pub fn location(&self) -> Option<&'static str> {
        match self {
            PageOutcome::Render => None,
            PageOutcome::RedirectToSignIn => Some(SIGN_IN_PATH),
            PageOutcome::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

impl PageArea {
    /// Resolve an admin section segment (`/admin/<section>`).
    pub fn admin_section(section: &str) -> Option<Self> {
        ResourceClass::from_slug(section).map(PageArea::Admin)
    }
}

pub fn guard_page(principal: Option<&Principal>, area: PageArea) -> PageOutcome {
    match (area, principal) {
        (PageArea::Public, _) => PageOutcome::Render,
        (PageArea::AuthOnly, None) => PageOutcome::Render,
        // A MEMBER cannot use the dashboard, so sign-in stays reachable for them.
        (PageArea::AuthOnly, Some(p)) if !p.role.has_admin_surface() => PageOutcome::Render,
        (PageArea::AuthOnly, Some(_)) => PageOutcome::RedirectToDashboard,
        (PageArea::Dashboard | PageArea::Admin(_), None) => PageOutcome::RedirectToSignIn,
        (PageArea::Dashboard | PageArea::Admin(_), Some(p)) if !p.role.has_admin_surface() => {
            PageOutcome::RedirectToSignIn
        }
        (PageArea::Dashboard, Some(_)) => PageOutcome::Render,
        (PageArea::Admin(class), Some(p)) => {
            if policy::decide(p, class, Action::Read).is_allowed() {
                PageOutcome::Render
            } else {
                PageOutcome::RedirectToDashboard
            }
        }
    }
}
