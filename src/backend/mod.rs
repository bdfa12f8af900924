//! Long-lived handles to the hosted document database and object store.
//!
//! The handles only know how to address the backend. Reads, writes and
//! consistency are the hosted platform's concern; clients fetch from the
//! addresses these handles hand out.

use tracing::info;
use url::Url;

use crate::config::{BackendConfig, EndpointConfig};
use crate::error::StartupError;

/// Handle pair created once at startup and shared read-only afterwards
#[derive(Debug, Clone)]
pub struct BackendClients {
    pub database: DocumentDatabase,
    pub storage: ObjectStorage,
}

/// Handle to the project's default document database
#[derive(Debug, Clone)]
pub struct DocumentDatabase {
    documents_root: Url,
    api_key: String,
}

/// Handle to the project's default storage bucket
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    bucket_root: Url,
}

/// Build the database and storage handles against the hosted endpoints
pub fn initialize(config: &BackendConfig) -> Result<BackendClients, StartupError> {
    initialize_with(config, &EndpointConfig::default())
}

/// Build the handles against explicit endpoint bases (e.g. local emulators)
pub fn initialize_with(
    config: &BackendConfig,
    endpoints: &EndpointConfig,
) -> Result<BackendClients, StartupError> {
    let database_base = parse_base(&endpoints.database)?;
    let storage_base = parse_base(&endpoints.storage)?;

    let documents_root = with_segments(
        &database_base,
        &["projects", config.project_id.as_str(), "databases", "(default)", "documents"],
    );
    let bucket_root = with_segments(&storage_base, &["b", config.storage_bucket.as_str(), "o"]);

    info!(
        project = %config.project_id,
        bucket = %config.storage_bucket,
        "Initialized backend clients"
    );

    Ok(BackendClients {
        database: DocumentDatabase {
            documents_root,
            api_key: config.api_key.clone(),
        },
        storage: ObjectStorage { bucket_root },
    })
}

impl DocumentDatabase {
    /// REST root under which every document of the project lives
    pub fn documents_url(&self) -> &Url {
        &self.documents_root
    }

    /// URL of a top-level collection, authenticated with the project API key
    pub fn collection_url(&self, collection: &str) -> Url {
        let mut url = with_segments(&self.documents_root, &[collection]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}

impl ObjectStorage {
    pub fn bucket_url(&self) -> &Url {
        &self.bucket_root
    }

    /// Download URL for an object. The object path is encoded as a single
    /// segment, so `products/ring.jpg` becomes `products%2Fring.jpg`.
    pub fn object_url(&self, object_path: &str) -> Url {
        let mut url = with_segments(&self.bucket_root, &[object_path]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }
}

fn parse_base(endpoint: &str) -> Result<Url, StartupError> {
    let url = Url::parse(endpoint).map_err(|source| StartupError::BackendEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(StartupError::BackendEndpoint {
            endpoint: endpoint.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

/// Append percent-encoded path segments, ignoring a trailing slash on the base
fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> BackendConfig {
        BackendConfig {
            api_key: "test-key".to_string(),
            auth_domain: "gems.firebaseapp.com".to_string(),
            project_id: "gems".to_string(),
            storage_bucket: "gems.appspot.com".to_string(),
            messaging_sender_id: "42".to_string(),
            app_id: "1:42:web:abc".to_string(),
        }
    }

    #[test]
    fn documents_root_points_at_default_database() {
        let clients = initialize(&sample_config()).unwrap();
        assert_eq!(
            clients.database.documents_url().as_str(),
            "https://firestore.googleapis.com/v1/projects/gems/databases/(default)/documents"
        );
    }

    #[test]
    fn collection_url_carries_api_key() {
        let clients = initialize(&sample_config()).unwrap();
        let url = clients.database.collection_url("products");
        assert!(url.path().ends_with("/documents/products"));
        assert_eq!(url.query(), Some("key=test-key"));
    }

    #[test]
    fn object_url_encodes_path_as_one_segment() {
        let clients = initialize(&sample_config()).unwrap();
        let url = clients.storage.object_url("products/ring.jpg");
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/gems.appspot.com/o/products%2Fring.jpg?alt=media"
        );
    }

    #[test]
    fn emulator_endpoints_are_honored() {
        let endpoints = EndpointConfig {
            database: "http://127.0.0.1:8080/v1".to_string(),
            storage: "http://127.0.0.1:9199/v0/".to_string(),
        };
        let clients = initialize_with(&sample_config(), &endpoints).unwrap();
        assert_eq!(
            clients.database.documents_url().as_str(),
            "http://127.0.0.1:8080/v1/projects/gems/databases/(default)/documents"
        );
        assert_eq!(
            clients.storage.bucket_url().as_str(),
            "http://127.0.0.1:9199/v0/b/gems.appspot.com/o"
        );
    }

    #[test]
    fn malformed_endpoint_is_a_startup_fault() {
        let endpoints = EndpointConfig {
            database: "not a url".to_string(),
            ..EndpointConfig::default()
        };
        let err = initialize_with(&sample_config(), &endpoints).unwrap_err();
        assert!(matches!(err, StartupError::BackendEndpoint { .. }));
    }

    #[test]
    fn placeholder_config_initializes_without_validation() {
        assert!(initialize(&BackendConfig::default()).is_ok());
    }
}
