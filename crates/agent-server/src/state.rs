//! Application State

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use agent_core::{LlmProvider, SessionHandle, SessionId, SessionRegistry};
use reno_advisor::{HouseStore, RenovationAgent, RenovationShell};

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "reno_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// One shell (and house store) per browser session
    pub sessions: Arc<SessionRegistry<RenovationShell>>,

    /// Renovation agent (None if the provider credential is missing)
    pub agent: Option<Arc<RenovationAgent>>,

    /// LLM provider, for health reporting
    pub provider: Arc<dyn LlmProvider>,

    pub model: String,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        agent: Option<Arc<RenovationAgent>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            agent,
            provider,
            model: model.into(),
        }
    }

    /// Session named by the request cookie, or a new seeded one
    pub async fn session(&self, jar: &CookieJar) -> SessionHandle<RenovationShell> {
        let id = session_id(jar);
        let agent = self.agent.clone();
        self.sessions
            .get_or_create(id.as_ref(), || RenovationShell::new(HouseStore::seeded(), agent))
            .await
    }
}

pub fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| SessionId::from_string(cookie.value()))
}

/// Adds the session cookie when the session was just created
pub fn remember_session<S>(jar: CookieJar, handle: &SessionHandle<S>) -> CookieJar {
    if !handle.created {
        return jar;
    }
    jar.add(
        Cookie::build((SESSION_COOKIE, handle.id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};
    use axum::response::IntoResponse;

    fn handle(created: bool) -> SessionHandle<()> {
        SessionHandle {
            id: SessionId::from_string("abc"),
            state: Arc::new(tokio::sync::Mutex::new(())),
            created,
        }
    }

    #[test]
    fn test_session_id_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; reno_session=abc-123; lang=en"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_id(&jar), Some(SessionId::from_string("abc-123")));

        assert_eq!(session_id(&CookieJar::new()), None);
    }

    #[test]
    fn test_cookie_only_set_for_new_sessions() {
        let response = remember_session(CookieJar::new(), &handle(true)).into_response();
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("reno_session=abc"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Path=/"));

        let response = remember_session(CookieJar::new(), &handle(false)).into_response();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
