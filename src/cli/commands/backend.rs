use serde::Serialize;

use crate::backend::{self, BackendClients};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct Addresses {
    documents: String,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
}

pub fn handle(collection: Option<&str>, object: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let clients = backend::initialize_with(&config.backend, &config.endpoints)?;
    let addresses = addresses(&clients, collection, object);

    utils::output(output_format, &addresses, |addresses| {
        println!("documents:  {}", addresses.documents);
        println!("bucket:     {}", addresses.bucket);
        if let Some(url) = &addresses.collection {
            println!("collection: {}", url);
        }
        if let Some(url) = &addresses.object {
            println!("object:     {}", url);
        }
    })
}

fn addresses(clients: &BackendClients, collection: Option<&str>, object: Option<&str>) -> Addresses {
    Addresses {
        documents: clients.database.documents_url().to_string(),
        bucket: clients.storage.bucket_url().to_string(),
        collection: collection.map(|name| clients.database.collection_url(name).to_string()),
        object: object.map(|path| clients.storage.object_url(path).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn addresses_include_only_requested_items() {
        let clients = backend::initialize(&BackendConfig::default()).unwrap();

        let bare = addresses(&clients, None, None);
        assert!(bare.collection.is_none());
        assert!(bare.object.is_none());

        let full = addresses(&clients, Some("products"), Some("rings/gold.jpg"));
        assert!(full.collection.unwrap().ends_with("/documents/products?key=YOUR_API_KEY"));
        assert!(full.object.unwrap().ends_with("/o/rings%2Fgold.jpg?alt=media"));
    }
}
