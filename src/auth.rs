use chrono::Utc;

use crate::error::{Result, TallyError};
use crate::store::Store;

/// A currently-valid bearer credential for the remote service.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub realm_id: String,
    pub access_token: String,
}

/// Supplies credentials to the sync/post paths. Refresh is not handled
/// here; a caller holding only expired tokens gets an auth error and is
/// expected to store a fresh token first.
pub trait TokenSource {
    fn credentials(&self) -> Result<ApiCredentials>;
}

/// Token source backed by the ledger store's token table. Uses the most
/// recently updated token.
pub struct StoredTokens<'a> {
    store: &'a Store,
}

impl<'a> StoredTokens<'a> {
    pub fn new(store: &'a Store) -> Self {
        StoredTokens { store }
    }
}

impl TokenSource for StoredTokens<'_> {
    fn credentials(&self) -> Result<ApiCredentials> {
        let token = self.store.latest_token()?.ok_or_else(|| {
            TallyError::Auth("no stored token; run `tally auth set-token` first".into())
        })?;
        if token.is_expired(Utc::now()) {
            return Err(TallyError::Auth(format!(
                "token for realm {} expired at {}; store a fresh one",
                token.realm_id, token.expires_at
            )));
        }
        Ok(ApiCredentials {
            realm_id: token.realm_id,
            access_token: token.access_token,
        })
    }
}
