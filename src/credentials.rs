//! Observability credentials from an INI-style properties file.
//!
//! ```ini
//! [langfuse]
//! langfuse_public_key = pk-...
//! langfuse_secret_key = sk-...
//! langfuse_host = https://cloud.langfuse.com
//! ```
//!
//! Loading never fails: a missing file, a parse error, a missing section or a
//! missing key is logged and the affected values stay unset. Section and key
//! names match case-insensitively.

use ini::Ini;
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

const SECTION: &str = "langfuse";
const PUBLIC_KEY: &str = "langfuse_public_key";
const SECRET_KEY: &str = "langfuse_secret_key";
const HOST: &str = "langfuse_host";

/// Tracing-service credentials; any value may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub host: Option<String>,
}

impl Credentials {
    /// Names of the keys that were not set, in file order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            (PUBLIC_KEY, &self.public_key),
            (SECRET_KEY, &self.secret_key),
            (HOST, &self.host),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .finish()
    }
}

/// Read credentials from `path`.
pub fn load_credentials(path: &Path) -> Credentials {
    if !path.exists() {
        warn!("Credentials file not found: {}", path.display());
        return Credentials::default();
    }

    let ini = match Ini::load_from_file(path) {
        Ok(ini) => ini,
        Err(e) => {
            error!("Error loading credentials from {}: {}", path.display(), e);
            return Credentials::default();
        }
    };

    if !ini.sections().any(|name| is_section(name)) {
        warn!("No [{}] section in {}", SECTION, path.display());
        return Credentials::default();
    }

    let credentials = from_ini(&ini);
    for key in credentials.missing_keys() {
        warn!("Credentials key '{}' not set in {}", key, path.display());
    }
    info!("Loaded credentials from {}", path.display());
    credentials
}

fn is_section(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.eq_ignore_ascii_case(SECTION))
}

fn from_ini(ini: &Ini) -> Credentials {
    let mut credentials = Credentials::default();
    let sections = ini.iter().filter(|(name, _)| is_section(*name));
    for (_, props) in sections {
        for (key, value) in props.iter() {
            let slot = if key.eq_ignore_ascii_case(PUBLIC_KEY) {
                &mut credentials.public_key
            } else if key.eq_ignore_ascii_case(SECRET_KEY) {
                &mut credentials.secret_key
            } else if key.eq_ignore_ascii_case(HOST) {
                &mut credentials.host
            } else {
                continue;
            };
            *slot = Some(value.to_string());
        }
    }
    credentials
}
