use thiserror::Error;

/// Errors from address-resolution collaborators and the landmark loader.
///
/// Note that [`crate::AddressNormalizer`] never surfaces these to its caller;
/// they exist for the collaborator implementations themselves and for the
/// landmark file loader.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoding API returned a non-OK status string.
    #[error("geocoder API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A zone-lookup collaborator failed; carries the collaborator's message.
    #[error("zone lookup error: {0}")]
    ZoneLookup(String),

    /// The landmark override file could not be read.
    #[error("landmarks file {path}: {source}")]
    LandmarksIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The landmark override file is not valid YAML.
    #[error("landmarks file parse error: {0}")]
    LandmarksParse(#[from] serde_yaml::Error),

    /// The landmark override file failed validation.
    #[error("landmarks validation error: {0}")]
    LandmarksValidation(String),
}
