//! Credential-derived transport options for one connection attempt.

use crate::control_plane::credential::CredentialKey;
use crate::settings::PubSubSettings;
use crate::transport::ConnectOptions;
use uuid::Uuid;

/// Username under which the credential is presented to the broker.
pub const AUTHORIZATION_USERNAME: &str = "authorization";

const CLIENT_ID_SUFFIX_LEN: usize = 8;

/// Generates `<prefix>_<8 lowercase hex digits>`.
pub(crate) fn generate_client_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..CLIENT_ID_SUFFIX_LEN])
}

pub(crate) fn connect_options_for(
    credential: &CredentialKey,
    settings: &PubSubSettings,
) -> ConnectOptions {
    ConnectOptions {
        client_id: generate_client_id(&settings.client_id_prefix),
        username: AUTHORIZATION_USERNAME.to_string(),
        password: credential.expose_secret().to_string(),
        keep_alive: settings.keep_alive(),
        reconnect_period: settings.reconnect_period(),
    }
}
