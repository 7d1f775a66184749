//! Single-page application route table.
//!
//! Two routes are declared: the home view at `/` and a catch-all that sends
//! every other path back to `/`.

use serde::Serialize;

/// How a matched route responds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RouteTarget {
    /// Render a view component
    View { component: &'static str },
    /// Send the client elsewhere
    Redirect { to: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RoutePattern {
    Exact(&'static str),
    /// Matches any path (`/:pathMatch(.*)*`)
    CatchAll,
}

/// A single route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    #[serde(flatten)]
    pub target: RouteTarget,
    #[serde(skip)]
    pattern: RoutePattern,
}

/// Outcome of matching a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Render {
        route: &'a Route,
        component: &'static str,
    },
    Redirect {
        to: &'static str,
    },
}

/// Ordered route table; the first matching route wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The application's route declarations.
    pub fn spa() -> Self {
        Self {
            routes: vec![
                Route {
                    path: "/",
                    name: Some("home"),
                    target: RouteTarget::View {
                        component: "MainView",
                    },
                    pattern: RoutePattern::Exact("/"),
                },
                Route {
                    path: "/:pathMatch(.*)*",
                    name: None,
                    target: RouteTarget::Redirect { to: "/" },
                    pattern: RoutePattern::CatchAll,
                },
            ],
        }
    }

    /// Match a request path. Query strings and fragments are ignored.
    ///
    /// Returns `None` only if no route matches, which cannot happen for
    /// [`RouteTable::spa`] since it ends with a catch-all.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = if path.is_empty() { "/" } else { path };

        let route = self.routes.iter().find(|route| match route.pattern {
            RoutePattern::Exact(exact) => exact == path,
            RoutePattern::CatchAll => true,
        })?;

        Some(match route.target {
            RouteTarget::View { component } => RouteMatch::Render { route, component },
            RouteTarget::Redirect { to } => RouteMatch::Redirect { to },
        })
    }
}
