//! Route classification: which paths are public, which belong to the auth
//! flow, and which are static assets the gateway never sees.
//!
//! Classification is a table of declarative patterns evaluated once per
//! request, independent of any transport. The embedding server asks
//! [`RouteTable::is_exempt`] first (assets bypass the gateway entirely),
//! then hands the path to the gateway, which calls
//! [`RouteTable::classify`].

use std::fmt;

// ---------------------------------------------------------------------------
// RouteClass
// ---------------------------------------------------------------------------

/// What kind of route a path is, from the gateway's point of view.
///
/// Anything that isn't explicitly public or part of the auth flow is
/// protected — the safe default for a new, unlisted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Safe for anyone; no verification call is made.
    Public,

    /// Login/registration pages. Interesting both ways: authenticated
    /// users get bounced home, unauthenticated ones pass.
    AuthPage,

    /// Requires a valid session.
    Protected,
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::AuthPage => write!(f, "auth-page"),
            Self::Protected => write!(f, "protected"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoutePattern
// ---------------------------------------------------------------------------

/// A single path pattern in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// The path matches exactly.
    Exact(String),

    /// The path starts with the given prefix (`/login` also covers
    /// `/login/reset`).
    Prefix(String),

    /// The path ends with the given suffix (used for asset extensions
    /// like `.svg`).
    Suffix(String),
}

impl RoutePattern {
    /// Convenience constructors, so table definitions read as data.
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        Self::Prefix(path.into())
    }

    pub fn suffix(path: impl Into<String>) -> Self {
        Self::Suffix(path.into())
    }

    /// Returns `true` if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix),
            Self::Suffix(suffix) => path.ends_with(suffix),
        }
    }
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// The classification table, plus the two well-known redirect targets.
///
/// [`RouteTable::default`] reproduces the reference deployment: the home
/// page is the only public route, `/login` and `/register` are the auth
/// pages, and framework/static assets are exempt from evaluation.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<RoutePattern>,
    auth_pages: Vec<RoutePattern>,
    exempt: Vec<RoutePattern>,
    home_path: String,
    login_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: vec![RoutePattern::exact("/")],
            auth_pages: vec![
                RoutePattern::prefix("/login"),
                RoutePattern::prefix("/register"),
            ],
            exempt: vec![
                RoutePattern::prefix("/static/"),
                RoutePattern::prefix("/assets/"),
                RoutePattern::exact("/favicon.ico"),
                RoutePattern::suffix(".svg"),
                RoutePattern::suffix(".png"),
                RoutePattern::suffix(".jpg"),
                RoutePattern::suffix(".jpeg"),
                RoutePattern::suffix(".gif"),
                RoutePattern::suffix(".webp"),
            ],
            home_path: "/".into(),
            login_path: "/login".into(),
        }
    }
}

impl RouteTable {
    /// An empty table: every path protected, nothing exempt. Start here
    /// when the defaults don't fit, then add patterns.
    pub fn new(
        home_path: impl Into<String>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            public: Vec::new(),
            auth_pages: Vec::new(),
            exempt: Vec::new(),
            home_path: home_path.into(),
            login_path: login_path.into(),
        }
    }

    /// Adds a public pattern.
    pub fn public(mut self, pattern: RoutePattern) -> Self {
        self.public.push(pattern);
        self
    }

    /// Adds an auth-page pattern.
    pub fn auth_page(mut self, pattern: RoutePattern) -> Self {
        self.auth_pages.push(pattern);
        self
    }

    /// Adds an exemption (the path bypasses the gateway entirely).
    pub fn exempt(mut self, pattern: RoutePattern) -> Self {
        self.exempt.push(pattern);
        self
    }

    /// Classifies a path. Public wins over auth-page if a path somehow
    /// appears in both lists; anything unlisted is protected.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.public.iter().any(|p| p.matches(path)) {
            return RouteClass::Public;
        }
        if self.auth_pages.iter().any(|p| p.matches(path)) {
            return RouteClass::AuthPage;
        }
        RouteClass::Protected
    }

    /// Returns `true` if the path should never reach the gateway
    /// (framework internals, images, the favicon).
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|p| p.matches(path))
    }

    /// Where authenticated users land when bounced off an auth page.
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Where unauthenticated users are sent to log in.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

// =========================================================================
// Tests
// =========================================================================
