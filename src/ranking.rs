//! Cafe ranking pipeline
//!
//! Turns the raw place lists returned by nearby search into the curated list
//! shown to users:
//! 1. Score every candidate (`rating × log10(reviews + 1)`, boosted for roasters)
//! 2. Merge lists, collapsing duplicate place ids onto the higher-scoring record
//! 3. Drop (or penalize) chain establishments
//! 4. Stable sort by score, truncate to the result limit
//! 5. Project into the public [`CafeResult`] shape with a formatted distance
use crate::config::{DEFAULT_CHAIN_KEYWORDS, DEFAULT_ROASTER_KEYWORDS};
use crate::models::{CafeId, CafeResult, LatLng, PlaceCandidate};
use std::collections::HashMap;

/// Earth radius used for great-circle distances.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Shown instead of a distance when either coordinate is unknown.
pub const DISTANCE_UNAVAILABLE: &str = "—";

pub const UNKNOWN_NAME: &str = "Unknown cafe";
pub const UNKNOWN_ADDRESS: &str = "Address unavailable";

/// Lowercases `name` and blanks out everything except ASCII letters, digits and spaces.
///
/// `"Peet's Coffee"` becomes `"peet s coffee"`, `"7-Eleven"` becomes `"7 eleven"`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// A set of name fragments matched as substrings of normalized names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Normalizes and trims each keyword. Keywords that normalize to nothing are
    /// dropped since they would match every name.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let k = normalize_name(keyword.as_ref()).trim().to_string();
            if !k.is_empty() && !normalized.contains(&k) {
                normalized.push(k);
            }
        }
        Self {
            keywords: normalized,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let n = normalize_name(name);
        self.keywords.iter().any(|k| n.contains(k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// What happens to candidates whose name matches a chain keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainPolicy {
    /// Remove chains entirely, whatever their score.
    Exclude,
    /// Keep chains but multiply their score by the given factor.
    Penalize(f64),
}

/// Knobs for one ranking run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOptions {
    pub chain_keywords: KeywordSet,
    pub roaster_keywords: KeywordSet,
    pub roaster_boost: f64,
    pub chain_policy: ChainPolicy,
    pub limit: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            chain_keywords: KeywordSet::new(DEFAULT_CHAIN_KEYWORDS),
            roaster_keywords: KeywordSet::new(DEFAULT_ROASTER_KEYWORDS),
            roaster_boost: 1.8,
            chain_policy: ChainPolicy::Exclude,
            limit: 12,
        }
    }
}

/// A candidate together with everything the ranking derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: PlaceCandidate,
    pub score: f64,
    pub is_roaster: bool,
    pub is_chain: bool,
}

/// `rating × log10(reviews + 1)`.
///
/// Missing, negative or non-finite ratings count as 0, so the result is always
/// finite and non-negative, and exactly 0 without reviews.
pub fn base_score(rating: Option<f64>, reviews: Option<u64>) -> f64 {
    let rating = rating.filter(|r| r.is_finite() && *r > 0.0).unwrap_or(0.0);
    let reviews = reviews.unwrap_or(0) as f64;
    rating * (reviews + 1.0).log10()
}

impl RankingOptions {
    pub fn score(&self, candidate: PlaceCandidate) -> ScoredCandidate {
        let name = candidate.name_or_empty();
        let is_roaster = self.roaster_keywords.matches(name);
        let is_chain = self.chain_keywords.matches(name);

        let mut score = base_score(candidate.rating, candidate.user_ratings_total);
        if is_roaster {
            score *= self.roaster_boost;
        }
        if let (true, ChainPolicy::Penalize(factor)) = (is_chain, self.chain_policy) {
            score *= factor;
        }

        ScoredCandidate {
            candidate,
            score,
            is_roaster,
            is_chain,
        }
    }

    /// Runs the whole pipeline over the provider's result lists.
    ///
    /// Lists are merged in the order given; that order only matters for ties.
    pub fn rank<I>(&self, batches: I) -> Vec<ScoredCandidate>
    where
        I: IntoIterator<Item = Vec<PlaceCandidate>>,
    {
        let scored = batches
            .into_iter()
            .flatten()
            .map(|candidate| self.score(candidate));

        let merged = dedupe(scored);
        let kept = apply_chain_policy(merged, self.chain_policy);
        sort_and_truncate(kept, self.limit)
    }
}

/// Collapses candidates sharing a place id onto the higher-scoring record.
///
/// Candidates without an id are dropped. First-seen order is preserved and a
/// later duplicate only replaces the kept record when it scores strictly higher.
pub fn dedupe<I>(candidates: I) -> Vec<ScoredCandidate>
where
    I: IntoIterator<Item = ScoredCandidate>,
{
    let mut merged: Vec<ScoredCandidate> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for scored in candidates {
        let Some(id) = scored
            .candidate
            .place_id
            .as_deref()
            .filter(|id| !id.is_empty())
        else {
            tracing::trace!(
                "Dropping candidate without place id: {:?}",
                scored.candidate.name
            );
            continue;
        };

        match index_by_id.get(id) {
            Some(&i) => {
                if scored.score > merged[i].score {
                    merged[i] = scored;
                }
            }
            None => {
                index_by_id.insert(id.to_string(), merged.len());
                merged.push(scored);
            }
        }
    }

    merged
}

pub fn apply_chain_policy(
    candidates: Vec<ScoredCandidate>,
    policy: ChainPolicy,
) -> Vec<ScoredCandidate> {
    match policy {
        ChainPolicy::Exclude => candidates.into_iter().filter(|c| !c.is_chain).collect(),
        // Penalty already applied while scoring
        ChainPolicy::Penalize(_) => candidates,
    }
}

/// Sorts by score, highest first, keeping the prior order for ties.
pub fn sort_and_truncate(
    mut candidates: Vec<ScoredCandidate>,
    limit: usize,
) -> Vec<ScoredCandidate> {
    // slice::sort_by is stable
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(limit);
    candidates
}

/// Great-circle distance between two points, in miles.
pub fn haversine_miles(a: LatLng, b: LatLng) -> f64 {
    // abs() keeps the result bit-for-bit symmetric in its arguments
    let d_lat = (b.lat - a.lat).abs().to_radians();
    let d_lng = (b.lng - a.lng).abs().to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// `"1.3 mi"`, or [`DISTANCE_UNAVAILABLE`] when either point is unknown.
pub fn format_distance(center: Option<LatLng>, place: Option<LatLng>) -> String {
    match (center, place) {
        (Some(c), Some(p)) => format!("{:.1} mi", haversine_miles(c, p)),
        _ => DISTANCE_UNAVAILABLE.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Maps a ranked candidate to the public shape. `position` is its index in the
/// ranked list and stands in for the id when the provider sent none.
pub fn project(scored: &ScoredCandidate, position: usize, center: Option<LatLng>) -> CafeResult {
    let place = &scored.candidate;
    let place_id = non_empty(&place.place_id).map(str::to_string);

    CafeResult {
        id: match &place_id {
            Some(id) => CafeId::Place(id.clone()),
            None => CafeId::Position(position),
        },
        name: non_empty(&place.name).unwrap_or(UNKNOWN_NAME).to_string(),
        address: non_empty(&place.vicinity)
            .or_else(|| non_empty(&place.formatted_address))
            .unwrap_or(UNKNOWN_ADDRESS)
            .to_string(),
        distance: format_distance(center, place.location()),
        place_id,
        location: place
            .geometry
            .as_ref()
            .and_then(|g| g.location)
            .unwrap_or_default(),
        rating: place.rating.filter(|r| r.is_finite()),
        user_ratings_total: place.user_ratings_total.unwrap_or(0),
        is_roaster: scored.is_roaster,
        score: (scored.score * 1000.0).round() / 1000.0,
    }
}

/// Projects an already ranked list, preserving order.
pub fn project_all(ranked: &[ScoredCandidate], center: Option<LatLng>) -> Vec<CafeResult> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, scored)| project(scored, i, center))
        .collect()
}
