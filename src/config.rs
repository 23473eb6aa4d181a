use crate::ranking::{ChainPolicy, KeywordSet, RankingOptions};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Brand names and convenience-store coffee counters that never count as independent cafes.
pub const DEFAULT_CHAIN_KEYWORDS: &[&str] = &[
    "starbucks",
    "sbux",
    "dunkin",
    "peet",
    "philz",
    "coffee bean",
    "coffee bean & tea leaf",
    "the coffee bean",
    "mcdonald",
    "mc donald",
    "mcdonald's",
    "mccafe",
    "tim hortons",
    "panera",
    "caribou",
    "7-eleven",
    "7 eleven",
    "711",
    "ampm",
    "costa coffee",
    "gloria jean",
    "tully",
    "biggby",
    "lavazza",
    "segafredo",
];

pub const DEFAULT_ROASTER_KEYWORDS: &[&str] = &[
    "roaster",
    "roasters",
    "roastery",
    "roasting",
    "micro roastery",
    "micro-roastery",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Provider credential. Requests fail with a configuration error while unset.
    pub google_maps_api_key: Option<String>,
    pub google_maps_base_url: String,
    pub result_limit: usize,
    pub search_radius_m: u32,
    pub roaster_radius_m: u32,
    pub roaster_query_enabled: bool,
    pub roaster_boost: f64,
    pub chain_policy: ChainPolicy,
    pub chain_keywords: Vec<String>,
    pub roaster_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            google_maps_api_key: None,
            google_maps_base_url: DEFAULT_BASE_URL.to_string(),
            result_limit: 12,
            search_radius_m: 5000,
            roaster_radius_m: 7000,
            roaster_query_enabled: true,
            roaster_boost: 1.8,
            chain_policy: ChainPolicy::Exclude,
            chain_keywords: DEFAULT_CHAIN_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            roaster_keywords: DEFAULT_ROASTER_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Unset or blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            port: match var("PORT") {
                Some(p) => p
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
                None => defaults.port,
            },
            google_maps_api_key: var("GOOGLE_MAPS_API_KEY").map(|k| k.trim().to_string()),
            google_maps_base_url: match var("GOOGLE_MAPS_BASE_URL") {
                Some(url) => {
                    let url = url.trim().trim_end_matches('/').to_string();
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("GOOGLE_MAPS_BASE_URL must start with http:// or https://");
                    }
                    url
                }
                None => defaults.google_maps_base_url,
            },
            result_limit: match var("CAFE_RESULT_LIMIT") {
                Some(v) => {
                    let limit: usize = v
                        .trim()
                        .parse()
                        .map_err(|_| anyhow::anyhow!("CAFE_RESULT_LIMIT must be a number"))?;
                    if !(1..=50).contains(&limit) {
                        anyhow::bail!("CAFE_RESULT_LIMIT must be between 1 and 50");
                    }
                    limit
                }
                None => defaults.result_limit,
            },
            search_radius_m: parse_radius(var("CAFE_SEARCH_RADIUS_M"), "CAFE_SEARCH_RADIUS_M")?
                .unwrap_or(defaults.search_radius_m),
            roaster_radius_m: parse_radius(
                var("ROASTER_SEARCH_RADIUS_M"),
                "ROASTER_SEARCH_RADIUS_M",
            )?
            .unwrap_or(defaults.roaster_radius_m),
            roaster_query_enabled: match var("ROASTER_QUERY_ENABLED") {
                Some(v) => parse_bool(&v).ok_or_else(|| {
                    anyhow::anyhow!("ROASTER_QUERY_ENABLED must be true or false")
                })?,
                None => defaults.roaster_query_enabled,
            },
            roaster_boost: match var("ROASTER_BOOST") {
                Some(v) => {
                    let boost: f64 = v
                        .trim()
                        .parse()
                        .map_err(|_| anyhow::anyhow!("ROASTER_BOOST must be a number"))?;
                    if !boost.is_finite() || boost < 1.0 {
                        anyhow::bail!("ROASTER_BOOST must be a finite number >= 1");
                    }
                    boost
                }
                None => defaults.roaster_boost,
            },
            chain_policy: match var("CHAIN_POLICY") {
                Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                    "exclude" => ChainPolicy::Exclude,
                    "penalize" => {
                        let penalty = match var("CHAIN_PENALTY") {
                            Some(p) => p
                                .trim()
                                .parse()
                                .map_err(|_| anyhow::anyhow!("CHAIN_PENALTY must be a number"))?,
                            None => 0.6,
                        };
                        if !(0.0..=1.0).contains(&penalty) {
                            anyhow::bail!("CHAIN_PENALTY must be between 0 and 1");
                        }
                        ChainPolicy::Penalize(penalty)
                    }
                    other => anyhow::bail!(
                        "CHAIN_POLICY must be 'exclude' or 'penalize', got '{}'",
                        other
                    ),
                },
                None => defaults.chain_policy,
            },
            chain_keywords: var("CHAIN_KEYWORDS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.chain_keywords),
            roaster_keywords: var("ROASTER_KEYWORDS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.roaster_keywords),
        };

        // Log successful configuration load (without the credential)
        tracing::info!("Configuration loaded successfully");
        if config.google_maps_api_key.is_none() {
            tracing::warn!("GOOGLE_MAPS_API_KEY is not set; cafe lookups will fail");
        }
        tracing::debug!("Provider Base URL: {}", config.google_maps_base_url);
        tracing::debug!(
            "Result limit: {}, radii: {}m / {}m, roaster query: {}",
            config.result_limit,
            config.search_radius_m,
            config.roaster_radius_m,
            config.roaster_query_enabled
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Ranking knobs derived from this configuration.
    pub fn ranking_options(&self) -> RankingOptions {
        RankingOptions {
            chain_keywords: KeywordSet::new(&self.chain_keywords),
            roaster_keywords: KeywordSet::new(&self.roaster_keywords),
            roaster_boost: self.roaster_boost,
            chain_policy: self.chain_policy,
            limit: self.result_limit,
        }
    }
}

fn parse_radius(raw: Option<String>, name: &str) -> anyhow::Result<Option<u32>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let radius: u32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a whole number of meters", name))?;
    // Nearby Search rejects radii above 50km
    if radius == 0 || radius > 50_000 {
        anyhow::bail!("{} must be between 1 and 50000", name);
    }
    Ok(Some(radius))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
