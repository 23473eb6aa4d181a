use crate::center::SearchInput;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::ranking::{self, RankingOptions};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const MISSING_KEY_MESSAGE: &str = "Missing GOOGLE_MAPS_API_KEY";

/// Provider status meaning "the lookup worked and found nothing".
pub const ZERO_RESULTS: &str = "ZERO_RESULTS";
const OK_STATUS: &str = "OK";

/// Place category requested from nearby search.
pub const PLACE_TYPE: &str = "cafe";
pub const PLAIN_KEYWORD: &str = "coffee";
pub const ROASTER_KEYWORD: &str = "coffee roaster roastery";

/// Outcome of one provider call whose transport succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome<T> {
    Success(T),
    /// The provider answered `ZERO_RESULTS` (or `OK` with nothing in it).
    EmptyResult,
    /// Any other status, e.g. `REQUEST_DENIED` or `OVER_QUERY_LIMIT`.
    Failure(String),
}

impl<T> ProviderOutcome<T> {
    /// Classifies a provider status. `payload` is only consulted for `OK`.
    pub fn from_status(status: &str, payload: Option<T>) -> Self {
        match status {
            OK_STATUS => match payload {
                Some(value) => ProviderOutcome::Success(value),
                None => ProviderOutcome::EmptyResult,
            },
            ZERO_RESULTS => ProviderOutcome::EmptyResult,
            other => ProviderOutcome::Failure(other.to_string()),
        }
    }
}

/// Parameters of one nearby-search request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub radius_m: u32,
    /// Free-text bias sent as the `keyword` parameter.
    pub keyword: String,
}

impl NearbyQuery {
    pub fn plain(radius_m: u32) -> Self {
        Self {
            radius_m,
            keyword: PLAIN_KEYWORD.to_string(),
        }
    }

    pub fn roaster(radius_m: u32) -> Self {
        Self {
            radius_m,
            keyword: ROASTER_KEYWORD.to_string(),
        }
    }
}

/// Client for the geocoding and nearby-search endpoints of the places provider.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    /// Creates a new `PlacesClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://maps.googleapis.com/maps/api`.
    /// * `api_key` - The provider credential.
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to create places client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Looks up the coordinates of a free-text address (here, a ZIP code).
    ///
    /// # Returns
    ///
    /// * `Ok(ProviderOutcome)` - The classified provider answer.
    /// * `Err(AppError::Upstream)` - The request could not be sent or decoded.
    pub async fn geocode(&self, address: &str) -> Result<ProviderOutcome<LatLng>, AppError> {
        // Build URL with proper parameter encoding
        let url = Url::parse_with_params(
            &format!("{}/geocode/json", self.base_url),
            &[("address", address), ("key", self.api_key.as_str())],
        )?;

        tracing::info!("Geocoding address: {}", address);
        tracing::debug!(
            "Geocode URL: {}/geocode/json?address={}&key=[REDACTED]",
            self.base_url,
            address
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Geocode endpoint returned HTTP {}", status);
            return Ok(ProviderOutcome::Failure(format!("HTTP {}", status.as_u16())));
        }

        let body: GeocodeResponse = response.json().await?;
        if let Some(ref message) = body.error_message {
            tracing::warn!("Geocode status {}: {}", body.status, message);
        }

        let location = body.results.first().map(|r| r.geometry.location);
        Ok(ProviderOutcome::from_status(&body.status, location))
    }

    /// Searches cafes around `center`.
    pub async fn nearby_search(
        &self,
        center: LatLng,
        query: &NearbyQuery,
    ) -> Result<ProviderOutcome<Vec<PlaceCandidate>>, AppError> {
        let location = format!("{},{}", center.lat, center.lng);
        let radius = query.radius_m.to_string();
        let url = Url::parse_with_params(
            &format!("{}/place/nearbysearch/json", self.base_url),
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", PLACE_TYPE),
                ("keyword", query.keyword.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )?;

        tracing::debug!(
            "Nearby search at {} radius={}m keyword='{}'",
            location,
            radius,
            query.keyword
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Nearby search endpoint returned HTTP {}", status);
            return Ok(ProviderOutcome::Failure(format!("HTTP {}", status.as_u16())));
        }

        let body: NearbySearchResponse = response.json().await?;
        if let Some(ref message) = body.error_message {
            tracing::warn!("Nearby search status {}: {}", body.status, message);
        }

        tracing::info!(
            "Nearby search '{}' returned {} place(s) with status {}",
            query.keyword,
            body.results.len(),
            body.status
        );
        Ok(ProviderOutcome::from_status(&body.status, Some(body.results)))
    }
}

/// Resolves the search center, fans out to nearby search and ranks the merged results.
#[derive(Clone)]
pub struct CafeSearchService {
    places: PlacesClient,
    plain_query: NearbyQuery,
    roaster_query: Option<NearbyQuery>,
    ranking: RankingOptions,
}

impl CafeSearchService {
    /// Fails with a configuration error when no provider credential is set.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let api_key = config
            .google_maps_api_key
            .clone()
            .ok_or_else(|| AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))?;
        let places = PlacesClient::new(config.google_maps_base_url.clone(), api_key)?;

        Ok(Self {
            places,
            plain_query: NearbyQuery::plain(config.search_radius_m),
            roaster_query: config
                .roaster_query_enabled
                .then(|| NearbyQuery::roaster(config.roaster_radius_m)),
            ranking: config.ranking_options(),
        })
    }

    /// Turns the request input into a search center, geocoding ZIP codes.
    pub async fn resolve_center(&self, input: &SearchInput) -> Result<LatLng, AppError> {
        match input {
            SearchInput::Coords(coords) => Ok(*coords),
            SearchInput::Zip(zip) => match self.places.geocode(zip).await? {
                ProviderOutcome::Success(center) => Ok(center),
                ProviderOutcome::EmptyResult => {
                    Err(AppError::Upstream(format!("Geocode failed: {}", ZERO_RESULTS)))
                }
                ProviderOutcome::Failure(status) => {
                    Err(AppError::Upstream(format!("Geocode failed: {}", status)))
                }
            },
        }
    }

    async fn search(
        &self,
        center: LatLng,
        query: &NearbyQuery,
    ) -> Result<Vec<PlaceCandidate>, AppError> {
        match self.places.nearby_search(center, query).await? {
            ProviderOutcome::Success(places) => Ok(places),
            ProviderOutcome::EmptyResult => Ok(Vec::new()),
            ProviderOutcome::Failure(status) => {
                Err(AppError::Upstream(format!("Places failed: {}", status)))
            }
        }
    }

    /// Runs the plain and roaster-biased queries concurrently.
    ///
    /// Either failure aborts the whole fetch; the plain list always comes first.
    pub async fn fetch_candidates(
        &self,
        center: LatLng,
    ) -> Result<Vec<Vec<PlaceCandidate>>, AppError> {
        let plain = self.search(center, &self.plain_query);
        let roaster = async {
            match &self.roaster_query {
                Some(query) => self.search(center, query).await,
                None => Ok(Vec::new()),
            }
        };

        let (plain, roaster) = tokio::try_join!(plain, roaster)?;
        Ok(vec![plain, roaster])
    }

    /// Full request pipeline: center, retrieval, merge, filter, rank, project.
    pub async fn find_cafes(&self, input: SearchInput) -> Result<CafesResponse, AppError> {
        let center = self.resolve_center(&input).await?;
        let batches = self.fetch_candidates(center).await?;
        let retrieved: usize = batches.iter().map(Vec::len).sum();

        let ranked = self.ranking.rank(batches);
        let cafes = ranking::project_all(&ranked, Some(center));

        tracing::info!(
            "Ranked {} cafe(s) from {} retrieved candidate(s) around ({}, {})",
            cafes.len(),
            retrieved,
            center.lat,
            center.lng
        );

        Ok(CafesResponse {
            mode: input.mode(),
            zip: input.zip().map(str::to_string),
            center,
            cafes,
        })
    }
}
