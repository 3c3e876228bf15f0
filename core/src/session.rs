use std::sync::Arc;

use log::{info, warn};

use crate::api::{ClientFactory, EquipmentApi};
use crate::error::{ApiError, AuthError};
use crate::models::Credentials;

/// En verifisert innlogging: credentials + klienten bygget fra dem.
pub struct Session {
    credentials: Credentials,
    api: Arc<dyn EquipmentApi>,
}

impl Session {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api(&self) -> &dyn EquipmentApi {
        self.api.as_ref()
    }

    /// Delt klient, for kall som kjøres på en annen tråd.
    pub fn shared_api(&self) -> Arc<dyn EquipmentApi> {
        Arc::clone(&self.api)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Verifiserer credentials med et probe-kall (`GET /history/`), som gir
/// tom liste og ikke feil når det ikke finnes data.
///
/// Tomme felt feiler før noe nettverkskall. Probe-klienten kastes; session
/// får en ny klient bygget fra de committede credentials.
pub fn login(factory: &dyn ClientFactory, username: &str, password: &str) -> Result<Session, AuthError> {
    let candidate = Credentials::new(username, password);
    if !candidate.is_complete() {
        return Err(AuthError::MissingCredentials);
    }

    let probe = factory.build(&candidate);
    match probe.history() {
        Ok(entries) => {
            info!(
                "🔓 Login successful for {} ({} datasets in history)",
                candidate.username,
                entries.len()
            );
            let api = factory.build(&candidate);
            Ok(Session {
                credentials: candidate,
                api,
            })
        }
        Err(e) if e.is_unauthorized() => {
            warn!("Login rejected for {}", candidate.username);
            Err(AuthError::InvalidCredentials)
        }
        Err(e) => {
            warn!("Login probe failed: {e}");
            Err(AuthError::Unreachable {
                message: Some(unreachable_message(&e)),
            })
        }
    }
}

fn unreachable_message(e: &ApiError) -> String {
    match e {
        ApiError::Transport(_) => format!("{e} (is the backend running?)"),
        other => other.user_message(),
    }
}
