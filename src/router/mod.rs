//! Route table and navigation access control.
//!
//! The table is built once and never mutated. [`guard::evaluate`] decides each
//! navigation; [`navigator::Navigator`] drives a full navigation in-process and
//! the HTTP layer applies the same guard as middleware.

pub mod guard;
pub mod navigator;

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

pub use guard::{GuardDecision, CATALOG_PATH};
pub use navigator::{NavigationOutcome, NavigationState, Navigator};

pub const ADMIN_PATH: &str = "/admin";

/// Views a route can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewKind {
    Catalog,
    Admin,
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Catalog => "Catalog",
            ViewKind::Admin => "Admin",
        }
    }
}

/// Metadata flags attached to a route. Both default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub public: bool,
    #[serde(rename = "requiresAuth")]
    pub requires_auth: bool,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self { public: true, requires_auth: false }
    }

    pub fn requires_auth() -> Self {
        Self { public: false, requires_auth: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    /// Static rewrite applied before the guard runs
    Redirect(String),
    View(ViewKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub target: RouteTarget,
    pub meta: RouteMeta,
}

impl RouteDescriptor {
    pub fn view(path: &str, name: &str, view: ViewKind, meta: RouteMeta) -> Self {
        Self {
            path: path.to_string(),
            name: Some(name.to_string()),
            target: RouteTarget::View(view),
            meta,
        }
    }

    pub fn redirect(path: &str, to: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            target: RouteTarget::Redirect(to.to_string()),
            meta: RouteMeta::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Route path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Duplicate route path: {0}")]
    DuplicatePath(String),

    #[error("Redirect from '{from}' targets '{to}', which is not a view route")]
    InvalidRedirect { from: String, to: String },

    #[error("Guard fallback '{0}' must be a public view route")]
    InvalidFallback(String),
}

/// Result of matching a path against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Redirect(&'a str),
    Matched(&'a RouteDescriptor),
    Unmatched,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

static STANDARD: Lazy<RouteTable> = Lazy::new(RouteTable::standard);

/// Process-wide standard route table
pub fn routes() -> &'static RouteTable {
    &STANDARD
}

impl RouteTable {
    /// Validate and build a table. Every navigation over a valid table
    /// terminates: redirects land on view routes, and the guard fallback is a
    /// public view.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(RouteTableError::InvalidPath(route.path.clone()));
            }
            if !seen.insert(normalize(&route.path)) {
                return Err(RouteTableError::DuplicatePath(route.path.clone()));
            }
        }

        let table = Self { routes };

        for route in &table.routes {
            if let RouteTarget::Redirect(to) = &route.target {
                match table.resolve(to) {
                    Resolution::Matched(_) => {}
                    _ => {
                        return Err(RouteTableError::InvalidRedirect {
                            from: route.path.clone(),
                            to: to.clone(),
                        })
                    }
                }
            }
        }

        match table.resolve(CATALOG_PATH) {
            Resolution::Matched(route) if !route.meta.requires_auth => Ok(table),
            _ => Err(RouteTableError::InvalidFallback(CATALOG_PATH.to_string())),
        }
    }

    /// `/` → `/catalog`, public `/catalog`, protected `/admin`
    pub fn standard() -> Self {
        Self {
            routes: vec![
                RouteDescriptor::redirect("/", CATALOG_PATH),
                RouteDescriptor::view(CATALOG_PATH, "Catalog", ViewKind::Catalog, RouteMeta::public()),
                RouteDescriptor::view(ADMIN_PATH, "Admin", ViewKind::Admin, RouteMeta::requires_auth()),
            ],
        }
    }

    /// Re-run construction checks on an existing table
    pub fn validate(self) -> Result<Self, RouteTableError> {
        Self::new(self.routes)
    }

    /// Match a request path. Query string and fragment are ignored, as is a
    /// single trailing slash.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        match self.find(path) {
            Some(route) => match &route.target {
                RouteTarget::Redirect(to) => Resolution::Redirect(to),
                RouteTarget::View(_) => Resolution::Matched(route),
            },
            None => Resolution::Unmatched,
        }
    }

    pub fn find(&self, path: &str) -> Option<&RouteDescriptor> {
        let wanted = normalize(path);
        self.routes.iter().find(|route| normalize(&route.path) == wanted)
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| route.name.as_deref() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
