/// Search center input validation
///
/// Decides, before any network call, whether a request searches around raw
/// coordinates or around a ZIP code that still needs geocoding.
use crate::errors::AppError;
use crate::models::{CafeQueryParams, InputMode, LatLng};
use regex::Regex;
use std::sync::LazyLock;

pub const INVALID_INPUT_MESSAGE: &str =
    "Provide either a valid zip (5 digits) or valid lat & lng query params.";

// regex's \d is Unicode-aware, so spell out the ASCII range
static ZIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{5}$").unwrap());

/// Where the search center comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchInput {
    /// Coordinates supplied directly by the client.
    Coords(LatLng),
    /// A 5-digit ZIP code to geocode.
    Zip(String),
}

impl SearchInput {
    pub fn mode(&self) -> InputMode {
        match self {
            SearchInput::Coords(_) => InputMode::Coords,
            SearchInput::Zip(_) => InputMode::Zip,
        }
    }

    pub fn zip(&self) -> Option<&str> {
        match self {
            SearchInput::Zip(zip) => Some(zip.as_str()),
            SearchInput::Coords(_) => None,
        }
    }
}

/// Parses a coordinate pair.
///
/// Returns `None` when either value is missing, non-numeric, non-finite or out
/// of range (latitude in [-90, 90], longitude in [-180, 180]).
pub fn parse_coords(lat: Option<&str>, lng: Option<&str>) -> Option<LatLng> {
    let lat: f64 = lat?.trim().parse().ok()?;
    let lng: f64 = lng?.trim().parse().ok()?;

    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }

    Some(LatLng::new(lat, lng))
}

/// Exactly five ASCII digits.
pub fn is_valid_zip(zip: &str) -> bool {
    ZIP_PATTERN.is_match(zip)
}

/// Picks the search input for a request. Valid coordinates win over a ZIP;
/// otherwise the trimmed ZIP must be exactly five digits.
pub fn resolve_input(params: &CafeQueryParams) -> Result<SearchInput, AppError> {
    if let Some(coords) = parse_coords(params.lat.as_deref(), params.lng.as_deref()) {
        return Ok(SearchInput::Coords(coords));
    }

    let zip = params.zip.as_deref().unwrap_or("").trim();
    if !is_valid_zip(zip) {
        return Err(AppError::InvalidInput(INVALID_INPUT_MESSAGE.to_string()));
    }

    Ok(SearchInput::Zip(zip.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(zip: Option<&str>, lat: Option<&str>, lng: Option<&str>) -> CafeQueryParams {
        CafeQueryParams {
            zip: zip.map(str::to_string),
            lat: lat.map(str::to_string),
            lng: lng.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_coords() {
        assert_eq!(
            parse_coords(Some("33.87"), Some(" -118.07 ")),
            Some(LatLng::new(33.87, -118.07))
        );
        assert_eq!(parse_coords(Some("90"), Some("180")), Some(LatLng::new(90.0, 180.0)));
        assert_eq!(parse_coords(Some("90.1"), Some("0")), None);
        assert_eq!(parse_coords(Some("0"), Some("-180.5")), None);
        assert_eq!(parse_coords(Some("abc"), Some("0")), None);
        assert_eq!(parse_coords(Some("NaN"), Some("0")), None);
        assert_eq!(parse_coords(Some("inf"), Some("0")), None);
        assert_eq!(parse_coords(Some(""), Some("0")), None);
        assert_eq!(parse_coords(Some("10"), None), None);
    }

    #[test]
    fn test_zip_validation() {
        assert!(is_valid_zip("90703"));
        assert!(!is_valid_zip("9070"));
        assert!(!is_valid_zip("907031"));
        assert!(!is_valid_zip("9070a"));
        assert!(!is_valid_zip("٩٠٧٠٣"));
        assert!(!is_valid_zip(""));
    }

    #[test]
    fn test_coords_take_precedence() {
        let input = resolve_input(&params(Some("90703"), Some("33.8"), Some("-118.1"))).unwrap();
        assert_eq!(input, SearchInput::Coords(LatLng::new(33.8, -118.1)));
        assert_eq!(input.mode(), InputMode::Coords);
        assert_eq!(input.zip(), None);
    }

    #[test]
    fn test_bad_coords_fall_back_to_zip() {
        let input = resolve_input(&params(Some(" 90703 "), Some("999"), Some("0"))).unwrap();
        assert_eq!(input, SearchInput::Zip("90703".to_string()));
        assert_eq!(input.zip(), Some("90703"));
    }

    #[test]
    fn test_invalid_zip_rejected() {
        let err = resolve_input(&params(Some("9070"), None, None)).unwrap_err();
        assert_eq!(err, AppError::InvalidInput(INVALID_INPUT_MESSAGE.to_string()));

        assert!(resolve_input(&params(None, None, None)).is_err());
        assert!(resolve_input(&params(None, Some("x"), Some("y"))).is_err());
    }
}
