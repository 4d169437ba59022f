//! Photo source: fetches and parses the per-variant photo manifest.
//!
//! Manifests are published by the site build as `photos.<variant>.json`:
//!
//! ```json
//! { "variant": "desktop", "count": 2, "photos": [
//!     { "filename": "a.jpg", "url": "assets/photos/desktop/a.jpg",
//!       "view_url": "view/?variant=desktop&file=a.jpg" } ] }
//! ```

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{SourceOptions, Variant};
use crate::error::Error;
use crate::slides::Photo;

#[derive(Debug, Deserialize)]
struct Manifest {
    variant: String,
    count: usize,
    photos: Vec<ManifestPhoto>,
}

#[derive(Debug, Deserialize)]
struct ManifestPhoto {
    filename: String,
    url: String,
    view_url: String,
}

pub struct PhotoSource {
    client: Client,
    base_url: String,
}

impl PhotoSource {
    pub fn new(opts: &SourceOptions) -> Self {
        Self {
            client: Client::new(),
            base_url: opts.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn manifest_url(&self, variant: Variant) -> String {
        format!("{}/photos.{variant}.json", self.base_url)
    }

    /// Fetch the ordered photo list for a variant. Any failure is reported
    /// whole; the caller never sees a partial list.
    pub async fn fetch(&self, variant: Variant) -> Result<Vec<Photo>, Error> {
        let url = self.manifest_url(variant);
        debug!(%url, "fetching photo manifest");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let photos = parse_manifest(&body, variant)?;
        info!(count = photos.len(), %variant, "photo manifest loaded");
        Ok(photos)
    }
}

pub fn parse_manifest(body: &str, variant: Variant) -> Result<Vec<Photo>, Error> {
    let manifest: Manifest =
        serde_json::from_str(body).map_err(|err| Error::Manifest(err.to_string()))?;
    if manifest.variant != variant.as_str() {
        return Err(Error::Manifest(format!(
            "variant mismatch: requested {variant}, manifest says {}",
            manifest.variant
        )));
    }
    if manifest.count != manifest.photos.len() {
        return Err(Error::Manifest(format!(
            "count says {} but {} photos listed",
            manifest.count,
            manifest.photos.len()
        )));
    }
    Ok(manifest
        .photos
        .into_iter()
        .map(|p| Photo {
            filename: p.filename,
            display_url: p.url,
            link_url: p.view_url,
        })
        .collect())
}
