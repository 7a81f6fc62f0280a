//! Navigator port - the single navigation side-effect seam
//!
//! The session store navigates to the landing route on sign-out, and
//! denied route guards redirect through the same seam. Nothing else in
//! the core performs navigation.

/// Application routes the core can redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public landing / sign-in page
    Landing,
    Home,
    MyTrips,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Home => "/home",
            Route::MyTrips => "/my-trips",
        }
    }
}

/// Navigation sink
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only logs, for headless front ends
#[derive(Debug, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = route.path(), "navigation requested");
    }
}
