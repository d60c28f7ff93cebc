//! Session cookies and the gate in front of user data.
//!
//! Identity itself is delegated to an [`IdentityProvider`]: it exchanges an identity token
//! obtained at sign-in for an opaque session token, and later resolves session tokens back to a
//! user id. The [`SessionGate`] wraps a provider and owns the cookie side:
//!
//! - [`SessionGate::login`] creates a session and returns the `Set-Cookie` value carrying it
//! - [`SessionGate::authorize`] checks a request path and its `Cookie` header
//! - [`SessionGate::logout`] revokes the session and returns an expiring `Set-Cookie` value
//!
//! Paths under `/api/auth` are public; everything else needs a cookie that verifies. There is a
//! single verification path ([`SessionGate::verify`]) and it is never retried.
//!
//! [`MemoryIdentityProvider`] keeps everything in process memory, which is what tests and
//! single-process deployments use.

use std::collections::HashMap;

use tokio::{sync::RwLock, time::Instant};

use super::*;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "AuthToken";

/// Lifetime of a session and its cookie.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 5);

/// Path prefix reachable without a session.
pub const PUBLIC_PREFIX: &str = "/api/auth";

/// The signed-in user behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  /// Stable user id, the owner key of every stored collection
  pub uid: String,
}

/// Source of truth for who a session belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
  /// Exchanges an identity token for a session token valid for `ttl`.
  async fn create_session(&self, id_token: &str, ttl: Duration) -> Result<String>;

  /// Resolves a session token to its user.
  async fn verify_session(&self, session: &str) -> Result<Identity>;

  /// Invalidates a session token. Providers without revocation may ignore this.
  async fn revoke_session(&self, _session: &str) -> Result<()> { Ok(()) }
}

/// An issued session.
#[derive(Debug, Clone)]
struct Session {
  /// Owner
  uid:        String,
  /// When the session stops verifying
  expires_at: Instant,
}

/// In-process identity provider.
///
/// Identity tokens must be registered up front with [`MemoryIdentityProvider::register`];
/// sessions are random tokens kept in memory until they expire.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityProvider {
  /// Identity token to user id
  identities: Arc<RwLock<HashMap<String, String>>>,
  /// Session token to session
  sessions:   Arc<RwLock<HashMap<String, Session>>>,
}

impl MemoryIdentityProvider {
  /// An empty provider.
  pub fn new() -> Self { Self::default() }

  /// Makes `id_token` sign in as `uid`.
  pub async fn register(&self, id_token: impl Into<String>, uid: impl Into<String>) {
    self.identities.write().await.insert(id_token.into(), uid.into());
  }

  /// Drops expired sessions, returning how many were removed.
  pub async fn purge_expired(&self) -> usize { purge(&mut *self.sessions.write().await) }

  /// Random session token.
  fn generate_token() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
  }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
  async fn create_session(&self, id_token: &str, ttl: Duration) -> Result<String> {
    let uid = self
      .identities
      .read()
      .await
      .get(id_token)
      .cloned()
      .ok_or_else(|| PaperboardError::Unauthorized("Unknown identity token".into()))?;

    let token = Self::generate_token();
    let mut sessions = self.sessions.write().await;
    let purged = purge(&mut sessions);
    if purged > 0 {
      debug!("Purged {purged} expired sessions");
    }
    sessions.insert(token.clone(), Session { uid, expires_at: Instant::now() + ttl });
    Ok(token)
  }

  async fn verify_session(&self, session: &str) -> Result<Identity> {
    {
      let sessions = self.sessions.read().await;
      match sessions.get(session) {
        Some(s) if s.expires_at > Instant::now() => return Ok(Identity { uid: s.uid.clone() }),
        Some(_) => {},
        None => return Err(PaperboardError::Unauthorized("Unknown session".into())),
      }
    }
    self.sessions.write().await.remove(session);
    Err(PaperboardError::Unauthorized("Session expired".into()))
  }

  async fn revoke_session(&self, session: &str) -> Result<()> {
    self.sessions.write().await.remove(session);
    Ok(())
  }
}

/// Removes every session past its expiry, returning how many went.
fn purge(sessions: &mut HashMap<String, Session>) -> usize {
  let now = Instant::now();
  let before = sessions.len();
  sessions.retain(|_, session| session.expires_at > now);
  before - sessions.len()
}

/// Builds the `Set-Cookie` value carrying a session token.
///
/// ```
/// use paperboard::session::session_cookie;
///
/// assert_eq!(session_cookie("tok", false), "AuthToken=tok; Max-Age=432000; Path=/; HttpOnly");
/// assert!(session_cookie("tok", true).ends_with("; Secure"));
/// ```
pub fn session_cookie(token: &str, secure: bool) -> String {
  let mut cookie =
    format!("{COOKIE_NAME}={token}; Max-Age={}; Path=/; HttpOnly", SESSION_TTL.as_secs());
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// Builds the `Set-Cookie` value that clears the session cookie.
pub fn expired_cookie(secure: bool) -> String {
  let mut cookie = format!("{COOKIE_NAME}=; Max-Age=0; Path=/; HttpOnly");
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// Value of cookie `name` in a `Cookie` request header, if present and non-empty.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
  header
    .split(';')
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(key, _)| key.trim() == name)
    .map(|(_, value)| value.trim())
    .filter(|value| !value.is_empty())
}

/// Gate deciding whether a request may reach user data.
#[derive(Clone)]
pub struct SessionGate {
  /// Where sessions are created and verified
  provider: Arc<dyn IdentityProvider>,
  /// Whether cookies carry the `Secure` attribute
  secure:   bool,
}

impl std::fmt::Debug for SessionGate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionGate").field("secure", &self.secure).finish_non_exhaustive()
  }
}

impl SessionGate {
  /// Creates a gate. `production` turns on the `Secure` cookie attribute.
  pub fn new(provider: Arc<dyn IdentityProvider>, production: bool) -> Self {
    Self { provider, secure: production }
  }

  /// The underlying provider.
  pub fn provider(&self) -> &Arc<dyn IdentityProvider> { &self.provider }

  /// Resolves a session token to its user.
  ///
  /// Every failure is reported as `Unauthorized("Invalid session")`; the provider's reason is
  /// only logged.
  pub async fn verify(&self, session: &str) -> Result<Identity> {
    self.provider.verify_session(session).await.map_err(|e| {
      debug!("Session rejected: {e}");
      PaperboardError::Unauthorized("Invalid session".into())
    })
  }

  /// Decides whether a request for `path` with the given `Cookie` header may proceed.
  ///
  /// Returns `Ok(None)` for public paths and `Ok(Some(identity))` for verified sessions.
  pub async fn authorize(
    &self,
    path: &str,
    cookie_header: Option<&str>,
  ) -> Result<Option<Identity>> {
    if path.starts_with(PUBLIC_PREFIX) {
      return Ok(None);
    }
    let Some(session) = cookie_header.and_then(|header| cookie_value(header, COOKIE_NAME)) else {
      return Err(PaperboardError::Unauthorized("Unauthorized".into()));
    };
    let identity = self.verify(session).await?;
    trace!("Authorized {} for {path}", identity.uid);
    Ok(Some(identity))
  }

  /// Signs in with an identity token, returning the `Set-Cookie` value for the new session.
  pub async fn login(&self, id_token: &str) -> Result<String> {
    if id_token.trim().is_empty() {
      return Err(PaperboardError::InvalidInput("ID token is required".into()));
    }
    let session = self.provider.create_session(id_token.trim(), SESSION_TTL).await.map_err(|e| {
      warn!("Error creating session: {e}");
      PaperboardError::Unauthorized("Failed to create session".into())
    })?;
    Ok(session_cookie(&session, self.secure))
  }

  /// Signs out, revoking the session named in the `Cookie` header if there is one, and returns
  /// the `Set-Cookie` value that clears the cookie.
  pub async fn logout(&self, cookie_header: Option<&str>) -> Result<String> {
    if let Some(session) = cookie_header.and_then(|header| cookie_value(header, COOKIE_NAME)) {
      self.provider.revoke_session(session).await?;
    }
    Ok(expired_cookie(self.secure))
  }
}
