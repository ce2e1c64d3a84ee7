//! One-line scenario codes for sharing deterministic sessions.
//!
//! A code carries everything a run needs to be replayed elsewhere: world
//! dimensions, seed, control mode, wrap flag, tick interval and the key
//! script. The dimensions ride in the clear so a human can eyeball a code;
//! the rest travels as base64-encoded JSON.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use cube_serpent_core::WorldSize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCENARIO_DOMAIN: &str = "serpent";
const SCENARIO_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SCENARIO_HEADER: &str = "serpent:v1";
/// Delimiter separating the prefix, dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Complete description of a replayable session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Scenario {
    /// Dimensions of the playable box.
    pub size: WorldSize,
    /// Seed for the score-point placement stream.
    pub seed: u64,
    /// Whether the session starts in the free-look scheme.
    pub free_look: bool,
    /// Whether the box wraps around toroidally.
    pub wrap: bool,
    /// Logic tick interval in milliseconds.
    pub tick_ms: u64,
    /// Key script tokens, one per logic tick.
    pub script: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ScenarioPayload {
    seed: u64,
    free_look: bool,
    wrap: bool,
    tick_ms: u64,
    script: Vec<String>,
}

impl Scenario {
    /// Encodes the scenario into a single-line shareable string.
    pub(crate) fn encode(&self) -> String {
        let payload = ScenarioPayload {
            seed: self.seed,
            free_look: self.free_look,
            wrap: self.wrap,
            tick_ms: self.tick_ms,
            script: self.script.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("scenario serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{SCENARIO_HEADER}:{}x{}x{}:{encoded}",
            self.size.width(),
            self.size.height(),
            self.size.depth()
        )
    }

    /// Decodes a scenario from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioError::MissingSegment("prefix"))?;
        let version = parts
            .next()
            .ok_or(ScenarioError::MissingSegment("version"))?;
        let dimensions = parts
            .next()
            .ok_or(ScenarioError::MissingSegment("dimensions"))?;
        let payload = parts
            .next()
            .ok_or(ScenarioError::MissingSegment("payload"))?;

        if domain != SCENARIO_DOMAIN {
            return Err(ScenarioError::InvalidPrefix(domain.to_owned()));
        }
        if version != SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: ScenarioPayload = serde_json::from_slice(&bytes)?;

        Ok(Self {
            size,
            seed: decoded.seed,
            free_look: decoded.free_look,
            wrap: decoded.wrap,
            tick_ms: decoded.tick_ms,
            script: decoded.script,
        })
    }
}

/// Errors that can occur while decoding scenario codes.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The provided string was empty or contained only whitespace.
    #[error("scenario code was empty")]
    EmptyPayload,
    /// A structural segment was missing from the code.
    #[error("scenario code is missing the {0} segment")]
    MissingSegment(&'static str),
    /// The code used an unexpected prefix segment.
    #[error("scenario prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("scenario version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The world dimensions could not be parsed.
    #[error("could not parse world dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode scenario payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse scenario payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<WorldSize, ScenarioError> {
    let mut axes = dimensions.split(['x', 'X']);
    let mut next_axis = || -> Result<u32, ScenarioError> {
        let axis = axes
            .next()
            .ok_or_else(|| ScenarioError::InvalidDimensions(dimensions.to_owned()))?;
        axis.trim()
            .parse::<u32>()
            .map_err(|_| ScenarioError::InvalidDimensions(dimensions.to_owned()))
    };

    let width = next_axis()?;
    let height = next_axis()?;
    let depth = next_axis()?;

    if width == 0 || height == 0 || depth == 0 {
        return Err(ScenarioError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok(WorldSize::new(width, height, depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_without_script() {
        let scenario = Scenario {
            size: WorldSize::new(13, 13, 13),
            seed: 42,
            free_look: false,
            wrap: true,
            tick_ms: 250,
            script: Vec::new(),
        };

        let encoded = scenario.encode();
        assert!(encoded.starts_with(&format!("{SCENARIO_HEADER}:13x13x13:")));

        let decoded = Scenario::decode(&encoded).expect("scenario decodes");
        assert_eq!(scenario, decoded);
    }

    #[test]
    fn round_trip_with_script() {
        let scenario = Scenario {
            size: WorldSize::new(5, 9, 7),
            seed: 0xDEAD_BEEF,
            free_look: true,
            wrap: false,
            tick_ms: 125,
            script: vec!["d".into(), ".".into(), "e".into(), "w+r".into()],
        };

        let encoded = scenario.encode();
        let decoded = Scenario::decode(&encoded).expect("scenario decodes");
        assert_eq!(scenario, decoded);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            Scenario::decode("   "),
            Err(ScenarioError::EmptyPayload)
        ));
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        assert!(matches!(
            Scenario::decode("maze:v1:5x5x5:e30"),
            Err(ScenarioError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        assert!(matches!(
            Scenario::decode("serpent:v9:5x5x5:e30"),
            Err(ScenarioError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            Scenario::decode("serpent:v1:5x0x5:e30"),
            Err(ScenarioError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn mangled_payload_is_rejected() {
        assert!(matches!(
            Scenario::decode("serpent:v1:5x5x5:!!!"),
            Err(ScenarioError::InvalidEncoding(_))
        ));
        assert!(matches!(
            Scenario::decode("serpent:v1:5x5x5:e30"),
            Err(ScenarioError::InvalidPayload(_))
        ));
    }
}
