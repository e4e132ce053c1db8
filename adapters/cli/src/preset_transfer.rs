use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use dune_skirmish_core::{MapSeed, SkirmishConfig};

const PRESET_DOMAIN: &str = "skirmish";
const PRESET_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded preset payload.
pub(crate) const PRESET_HEADER: &str = "skirmish:v1";
/// Delimiter used to separate the prefix, seed and payload.
const FIELD_DELIMITER: char = ':';

/// Lobby configuration paired with the seed that produced a map.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SkirmishPreset {
    /// Seed that regenerates the map.
    pub seed: MapSeed,
    /// Lobby configuration used for generation.
    pub config: SkirmishConfig,
}

impl SkirmishPreset {
    /// Encodes the preset into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, PresetTransferError> {
        let json = serde_json::to_vec(&self.config).map_err(PresetTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{PRESET_HEADER}:{}:{encoded}", self.seed.get()))
    }

    /// Decodes a preset from the provided string representation.
    ///
    /// The seed segment takes precedence over the seed stored in the payload.
    pub(crate) fn decode(value: &str) -> Result<Self, PresetTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PresetTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(PresetTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(PresetTransferError::MissingVersion)?;
        let seed = parts.next().ok_or(PresetTransferError::MissingSeed)?;
        let payload = parts.next().ok_or(PresetTransferError::MissingPayload)?;

        if domain != PRESET_DOMAIN {
            return Err(PresetTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != PRESET_VERSION {
            return Err(PresetTransferError::UnsupportedVersion(version.to_owned()));
        }

        let seed = seed
            .trim()
            .parse::<u32>()
            .map(MapSeed::new)
            .map_err(|_| PresetTransferError::InvalidSeed(seed.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(PresetTransferError::InvalidEncoding)?;
        let mut config: SkirmishConfig =
            serde_json::from_slice(&bytes).map_err(PresetTransferError::InvalidPayload)?;
        config.seed = seed;

        Ok(Self { seed, config })
    }
}

/// Errors that can occur while encoding or decoding preset strings.
#[derive(Debug)]
pub(crate) enum PresetTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded preset.
    MissingPrefix,
    /// The encoded preset did not contain a version segment.
    MissingVersion,
    /// The encoded preset did not include the seed.
    MissingSeed,
    /// The encoded preset did not include the payload segment.
    MissingPayload,
    /// The encoded preset used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded preset used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The seed segment is not an unsigned 32-bit number.
    InvalidSeed(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for PresetTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "preset string was empty"),
            Self::MissingPrefix => write!(f, "preset string is missing the prefix"),
            Self::MissingVersion => write!(f, "preset string is missing the version"),
            Self::MissingSeed => write!(f, "preset string is missing the seed"),
            Self::MissingPayload => write!(f, "preset string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "preset prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "preset version '{version}' is not supported")
            }
            Self::InvalidSeed(seed) => write!(f, "could not parse preset seed '{seed}'"),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode preset payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process preset payload: {error}")
            }
        }
    }
}

impl Error for PresetTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
