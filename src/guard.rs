use crate::SessionStatus;

/// Where unauthenticated visitors get sent.
pub const LOGIN_ROUTE: &str = "/login";

/// What the UI layer should do with a navigation attempt into a protected
/// area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The startup check hasn't resolved; show a neutral waiting state.
    /// Deciding now would flash the login page at users who are about to be
    /// authenticated.
    Wait,
    /// Send the visitor to `to`, remembering `return_to` so a successful
    /// login can come back to the page they originally asked for.
    Redirect { to: &'static str, return_to: String },
    /// Render the requested destination.
    Render,
}

/// Decide whether a navigation to `requested` may proceed.
///
/// A pure function of the session status, evaluated on every navigation.
/// It holds no state of its own.
pub fn evaluate(status: SessionStatus, requested: &str) -> RouteDecision {
    match status {
        SessionStatus::Initializing => RouteDecision::Wait,
        SessionStatus::Unauthenticated => RouteDecision::Redirect {
            to: LOGIN_ROUTE,
            return_to: requested.to_string(),
        },
        SessionStatus::Authenticated => RouteDecision::Render,
    }
}
