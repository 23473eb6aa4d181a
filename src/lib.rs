//! Cafe Finder API Library
//!
//! Finds independent cafes near a ZIP code or coordinate: geocodes the
//! input, queries the places provider, removes chain coffee shops, boosts
//! roasters and returns a ranked, distance-annotated list.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Ranking pipeline and shared models/errors.
//! - `integrations`: Places provider client.
//! - `center`: Search center input validation.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Provider and response data models.
//! - `ranking`: Scoring, dedupe, chain filtering and projection.
//! - `services`: Places client and cafe search orchestration.

pub mod api;
pub mod core;
pub mod integrations;

pub mod center;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod ranking;
pub mod services;
