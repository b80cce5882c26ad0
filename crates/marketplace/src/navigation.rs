//! Routes and navigation.

use std::fmt;
use std::str::FromStr;

use crate::session::SessionStore;

/// Pages of the marketplace front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    SignUp,
    Profile,
    Collections,
    ExploreItems,
    ItemDetail,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Login,
        Route::SignUp,
        Route::Profile,
        Route::Collections,
        Route::ExploreItems,
        Route::ItemDetail,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::SignUp => "/sign-up",
            Route::Profile => "/profile",
            Route::Collections => "/collections",
            Route::ExploreItems => "/exploreItems",
            Route::ItemDetail => "/itemDetail",
        }
    }

    /// Whether the route is only reachable with a session token.
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Profile)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|r| r.path() == s)
            .ok_or_else(|| format!("Unknown route: {}", s))
    }
}

/// Resolve where a request for `route` actually lands given the session.
pub fn guard(route: Route, session: &SessionStore) -> Route {
    if route.requires_session() && !session.is_authenticated() {
        tracing::debug!(route = %route, "No session, redirecting to login");
        Route::Login
    } else {
        route
    }
}

/// Something that can move the user to another page.
pub trait Navigator: Send {
    fn navigate(&mut self, route: Route);
}

/// Navigator that records every visited route.
#[derive(Debug, Clone, Default)]
pub struct History {
    visited: Vec<Route>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.visited.last().copied()
    }

    pub fn visited(&self) -> &[Route] {
        &self.visited
    }
}

impl Navigator for History {
    fn navigate(&mut self, route: Route) {
        tracing::debug!(route = %route, "Navigating");
        self.visited.push(route);
    }
}
