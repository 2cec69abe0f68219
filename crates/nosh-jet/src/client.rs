use derive_builder::Builder;
use thiserror::Error;

use crate::{api_interfaces::restaurants, constants::*, error::GetError, Postcode, Restaurant};

#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    pub base_url: String,
    #[builder(default = "DEFAULT_RESTAURANTS_PATH_FORMAT.to_string()")]
    pub path_format: String,
    #[builder(default = "DEFAULT_COUNTRY.to_string()")]
    pub country: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path_format: DEFAULT_RESTAURANTS_PATH_FORMAT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Endpoint {
    pub url: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum EndpointConfigError {
    #[error("the base URL is missing")]
    MissingBaseUrl,
    #[error("the country is missing")]
    MissingCountry,
    #[error("the endpoint format does not contain `{0}`")]
    ReplaceTokenNotInEndpoint(&'static str),
}

impl Endpoint {
    /// Joins the base URL and path format, filling in the country now and
    /// leaving the postcode token for each request.
    pub fn try_new(config: &ClientConfig) -> Result<Self, EndpointConfigError> {
        let base_url = config.base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(EndpointConfigError::MissingBaseUrl);
        }
        if !config.path_format.contains(POSTCODE_REPLACE_TOKEN) {
            return Err(EndpointConfigError::ReplaceTokenNotInEndpoint(
                POSTCODE_REPLACE_TOKEN,
            ));
        }
        let path = if config.path_format.contains(COUNTRY_REPLACE_TOKEN) {
            let country = config.country.trim();
            if country.is_empty() {
                return Err(EndpointConfigError::MissingCountry);
            }
            config.path_format.replace(COUNTRY_REPLACE_TOKEN, country)
        } else {
            config.path_format.clone()
        };
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(Self {
            url: format!("{base_url}{separator}{path}"),
        })
    }

    pub fn to_url(&self, postcode: &Postcode) -> String {
        self.url.replace(POSTCODE_REPLACE_TOKEN, postcode.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid endpoint configuration: {0}")]
    InvalidEndpointConfig(#[from] EndpointConfigError),
}

/// Client for the aggregator's restaurant discovery service.
#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    endpoint: std::sync::Arc<Endpoint>,
}

impl Client {
    pub fn new(
        http_client: reqwest::Client,
        config: &ClientConfig,
    ) -> Result<Self, ClientInitError> {
        let endpoint = Endpoint::try_new(config)?;
        Ok(Self {
            http_client,
            endpoint: std::sync::Arc::new(endpoint),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Retrieve the restaurants delivering to `postcode`.
    ///
    /// A response without a `restaurants` key is treated as an empty list.
    pub async fn restaurants_by_postcode(
        &self,
        postcode: &Postcode,
    ) -> Result<Vec<Restaurant>, GetError> {
        let url = self.endpoint.to_url(postcode);
        tracing::debug!(%postcode, %url, "requesting restaurants");
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(%postcode, status = %response.status(), "restaurant lookup rejected");
            return Err(GetError::ResponseError(response.status()));
        }
        let body = response.text().await.map_err(GetError::ResponseBodyError)?;
        let parsed_body: restaurants::Response = serde_json::from_str(&body)?;
        tracing::debug!(
            %postcode,
            count = parsed_body.restaurants.len(),
            "restaurants received"
        );
        Ok(parsed_body.restaurants)
    }

    /// Like [`Client::restaurants_by_postcode`], validating a raw postcode first.
    pub async fn restaurants_by_raw_postcode(
        &self,
        postcode: &str,
    ) -> Result<Vec<Restaurant>, GetError> {
        let postcode = Postcode::parse(postcode)?;
        self.restaurants_by_postcode(&postcode).await
    }
}
