// Sonarr credentials: the service URL and API key kept in the data store.

use crate::endpoint;
use crate::error::{Error, Result};
use crate::store::KeyValueStore;

pub const SERVICE_URL_KEY: &str = "sonarr-url";
pub const API_KEY_KEY: &str = "sonarr-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub service_url: String,
    pub api_key: String,
}

impl Credentials {
    /// Validate user input before anything is written.
    pub fn new(service_url: &str, api_key: &str) -> Result<Self> {
        let service_url = service_url.trim();
        let api_key = api_key.trim();

        if service_url.is_empty() {
            return Err(Error::validation("url is required"));
        }
        if api_key.is_empty() {
            return Err(Error::validation("api key is required"));
        }
        endpoint::parse_base(service_url)?;

        Ok(Self {
            service_url: service_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Read both secrets. An empty entry counts as missing, which is what a
    /// rolled back save leaves behind.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        let service_url = load_non_empty(store, SERVICE_URL_KEY)?;
        let api_key = load_non_empty(store, API_KEY_KEY)?;
        Ok(Self {
            service_url,
            api_key,
        })
    }
}

fn load_non_empty<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<String> {
    let value = store.get(key)?;
    if value.is_empty() {
        return Err(Error::NotFound(key.to_string()));
    }
    Ok(value)
}

/// Write the URL and then the key. If the key cannot be written the URL is
/// cleared again so the store never holds a URL without its key.
pub fn save_credentials<S: KeyValueStore + ?Sized>(
    store: &mut S,
    credentials: &Credentials,
) -> Result<()> {
    store.set(SERVICE_URL_KEY, &credentials.service_url)?;

    if let Err(err) = store.set(API_KEY_KEY, &credentials.api_key) {
        tracing::warn!(error = %err, "saving api key failed, reverting url");
        if let Err(rollback) = store.set(SERVICE_URL_KEY, "") {
            tracing::error!(error = %rollback, "failed to revert saved url");
        }
        return Err(err);
    }

    tracing::debug!("saved credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::store::Store;

    /// Delegates to a real store but refuses writes to one key.
    struct FailingKey<'a> {
        inner: &'a mut Store,
        failing: &'static str,
        fail_rollback: bool,
    }

    impl KeyValueStore for FailingKey<'_> {
        fn get(&self, key: &str) -> Result<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if key == self.failing {
                return Err(Error::io(
                    "simulated write failure",
                    std::io::Error::other("disk full"),
                ));
            }
            if self.fail_rollback && value.is_empty() {
                return Err(Error::StoreClosed);
            }
            self.inner.set(key, value)
        }
    }

    #[derive(Default)]
    struct MemoryStore(HashMap<String, String>);

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<String> {
            self.0
                .get(key)
                .cloned()
                .ok_or_else(|| Error::NotFound(key.to_string()))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    fn sample() -> Credentials {
        Credentials::new("http://192.168.1.25:8989", "abc123").unwrap()
    }

    #[test]
    fn new_trims_and_validates() {
        let creds = Credentials::new("  http://localhost:8989/sonarr ", " key ").unwrap();
        assert_eq!(creds.service_url, "http://localhost:8989/sonarr");
        assert_eq!(creds.api_key, "key");

        assert!(matches!(Credentials::new("", "key"), Err(Error::Validation(_))));
        assert!(matches!(
            Credentials::new("http://localhost:8989", "   "),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Credentials::new("localhost", "key"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::default();
        save_credentials(&mut store, &sample()).unwrap();
        assert_eq!(Credentials::load(&store).unwrap(), sample());
    }

    #[test]
    fn load_without_saved_values_is_not_found() {
        let store = MemoryStore::default();
        assert!(matches!(Credentials::load(&store), Err(Error::NotFound(_))));
    }

    #[test]
    fn failed_key_write_clears_previously_saved_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store.set(SERVICE_URL_KEY, "http://old-host:8989").unwrap();

        let mut failing = FailingKey {
            inner: &mut store,
            failing: API_KEY_KEY,
            fail_rollback: false,
        };
        let err = save_credentials(&mut failing, &sample()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));

        assert_eq!(store.get(SERVICE_URL_KEY).unwrap(), "");
        assert!(matches!(Credentials::load(&store), Err(Error::NotFound(_))));
    }

    #[test]
    fn rollback_failure_still_reports_original_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();

        let mut failing = FailingKey {
            inner: &mut store,
            failing: API_KEY_KEY,
            fail_rollback: true,
        };
        let err = save_credentials(&mut failing, &sample()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));

        // the revert itself failed, so the url is still there without a key
        assert_eq!(store.get(SERVICE_URL_KEY).unwrap(), "http://192.168.1.25:8989");
        assert!(matches!(store.get(API_KEY_KEY), Err(Error::NotFound(_))));
    }

    #[test]
    fn failed_url_write_leaves_key_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store.set(API_KEY_KEY, "previous").unwrap();

        let mut failing = FailingKey {
            inner: &mut store,
            failing: SERVICE_URL_KEY,
            fail_rollback: false,
        };
        assert!(save_credentials(&mut failing, &sample()).is_err());
        assert_eq!(store.get(API_KEY_KEY).unwrap(), "previous");
    }
}
