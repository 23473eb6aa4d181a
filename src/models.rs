use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============ Geographic Types ============

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// ============ Provider Models ============

/// A single place record returned by the nearby-search provider.
///
/// Every field is optional on the wire; missing values are handled during
/// scoring and projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Opaque provider identifier.
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Short address fragment ("123 Main St, Springfield").
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Non-numeric values are read as absent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    /// Accepts `12` and `12.0`; anything that is not a non-negative whole
    /// number is read as absent.
    #[serde(default, deserialize_with = "lenient_count")]
    pub user_ratings_total: Option<u64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v.as_u64() {
        Some(count) => Some(count),
        None => v
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64),
    }))
}

impl PlaceCandidate {
    /// Coordinates of the place, when the provider sent complete geometry.
    pub fn location(&self) -> Option<LatLng> {
        let location = self.geometry.as_ref()?.location.as_ref()?;
        Some(LatLng::new(location.lat?, location.lng?))
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<PartialLatLng>,
}

/// Coordinates as the provider sends them; either member may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLatLng {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Raw geocoding API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeGeometry {
    pub location: LatLng,
}

/// Raw nearby-search API response.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceCandidate>,
    #[serde(default)]
    pub error_message: Option<String>,
}

// ============ Request/Response Models ============

/// Query parameters for `GET /api/cafes`.
///
/// Kept as raw strings so malformed numbers degrade to "absent" instead of
/// rejecting the whole query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CafeQueryParams {
    pub zip: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Which input the search center came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Zip,
    Coords,
}

/// Identifier exposed to clients: the provider id, or the position in the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CafeId {
    Place(String),
    Position(usize),
}

/// One entry of the public cafe list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafeResult {
    pub id: CafeId,
    pub name: String,
    pub address: String,
    pub distance: String,
    #[serde(rename = "placeId")]
    pub place_id: Option<String>,
    pub location: PartialLatLng,
    pub rating: Option<f64>,
    pub user_ratings_total: u64,
    #[serde(rename = "isRoaster")]
    pub is_roaster: bool,
    pub score: f64,
}

/// Response envelope for `GET /api/cafes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafesResponse {
    pub mode: InputMode,
    pub zip: Option<String>,
    pub center: LatLng,
    pub cafes: Vec<CafeResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_tolerates_missing_fields() {
        let candidate: PlaceCandidate = serde_json::from_value(json!({
            "name": "Harbor Coffee Roasters",
            "geometry": { "location": { "lat": 33.9 } }
        }))
        .unwrap();

        assert_eq!(candidate.place_id, None);
        assert_eq!(candidate.rating, None);
        assert_eq!(candidate.location(), None);
    }

    #[test]
    fn test_candidate_location() {
        let candidate: PlaceCandidate = serde_json::from_value(json!({
            "place_id": "p1",
            "geometry": { "location": { "lat": 33.9, "lng": -118.0 } },
            "rating": 4.5,
            "user_ratings_total": 100
        }))
        .unwrap();

        assert_eq!(candidate.location(), Some(LatLng::new(33.9, -118.0)));
        assert_eq!(candidate.user_ratings_total, Some(100));
    }

    #[test]
    fn test_candidate_numeric_fields_are_lenient() {
        let candidate: PlaceCandidate = serde_json::from_value(json!({
            "place_id": "p1",
            "rating": "4.5",
            "user_ratings_total": 12.0
        }))
        .unwrap();
        assert_eq!(candidate.rating, None);
        assert_eq!(candidate.user_ratings_total, Some(12));

        let candidate: PlaceCandidate = serde_json::from_value(json!({
            "place_id": "p2",
            "rating": 4,
            "user_ratings_total": -3
        }))
        .unwrap();
        assert_eq!(candidate.rating, Some(4.0));
        assert_eq!(candidate.user_ratings_total, None);

        for bad in [json!(12.5), json!("12"), json!(null), json!([1])] {
            let candidate: PlaceCandidate =
                serde_json::from_value(json!({ "user_ratings_total": bad })).unwrap();
            assert_eq!(candidate.user_ratings_total, None);
        }
    }

    #[test]
    fn test_cafe_id_serializes_untagged() {
        assert_eq!(
            serde_json::to_value(CafeId::Place("p1".into())).unwrap(),
            json!("p1")
        );
        assert_eq!(serde_json::to_value(CafeId::Position(3)).unwrap(), json!(3));
    }

    #[test]
    fn test_input_mode_serialization() {
        assert_eq!(serde_json::to_value(InputMode::Zip).unwrap(), json!("zip"));
        assert_eq!(
            serde_json::to_value(InputMode::Coords).unwrap(),
            json!("coords")
        );
    }
}
