//! Seed selection across generation attempts.

use dune_skirmish_core::{GenerationError, GenerationMode, MapSeed, SkirmishConfig};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::{Scenario, ScenarioAssembler};

/// Random seeds tried before a run gives up.
pub const DEFAULT_MAX_REROLLS: u32 = 64;

const REROLL_STREAM_LABEL: &str = "skirmish-reroll";

/// Drives the generation mode state machine over repeated attempts.
#[derive(Debug)]
pub struct RetryPolicy {
    max_rerolls: u32,
    seeds: ChaCha8Rng,
}

impl RetryPolicy {
    /// Creates a policy whose random seeds are derived from the configured seed.
    #[must_use]
    pub fn for_config(config: &SkirmishConfig) -> Self {
        Self {
            max_rerolls: DEFAULT_MAX_REROLLS,
            seeds: ChaCha8Rng::seed_from_u64(derive_reroll_seed(config.seed)),
        }
    }

    /// Replaces the reroll ceiling.
    #[must_use]
    pub fn with_max_rerolls(mut self, max_rerolls: u32) -> Self {
        self.max_rerolls = max_rerolls;
        self
    }

    /// Reroll ceiling of the policy.
    #[must_use]
    pub const fn max_rerolls(&self) -> u32 {
        self.max_rerolls
    }

    /// Attempts generation until the mode stops, returning the first scenario produced.
    ///
    /// # Errors
    ///
    /// Returns the configuration error, [`GenerationError::Stopped`] when the
    /// mode starts stopped, or the failure of the last attempt.
    pub fn run(
        &mut self,
        assembler: &mut ScenarioAssembler,
        config: &SkirmishConfig,
    ) -> Result<Scenario, GenerationError> {
        config.validate()?;

        let mut mode = config.mode;
        let mut last_error = GenerationError::Stopped;
        let mut rerolls = 0;
        let mut attempt = 0;

        while mode != GenerationMode::Stop {
            let seed = if mode.uses_random_seed() {
                if rerolls == self.max_rerolls {
                    break;
                }
                rerolls += 1;
                MapSeed::from_random(self.seeds.next_u32())
            } else {
                config.seed
            };
            attempt += 1;

            match assembler.assemble(config, seed) {
                Ok(scenario) => {
                    tracing::info!(
                        target: "dune_skirmish::retry",
                        attempt,
                        seed = seed.get(),
                        "retry.succeeded"
                    );
                    return Ok(scenario);
                }
                Err(error) => {
                    mode = mode.transition(false);
                    tracing::warn!(
                        target: "dune_skirmish::retry",
                        attempt,
                        seed = seed.get(),
                        error = %error,
                        next_mode = ?mode,
                        "retry.attempt_failed"
                    );
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }
}

fn derive_reroll_seed(seed: MapSeed) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.get().to_le_bytes());
    hasher.update(REROLL_STREAM_LABEL.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reroll_seeds_depend_on_the_configured_seed() {
        assert_eq!(
            derive_reroll_seed(MapSeed::new(12345)),
            derive_reroll_seed(MapSeed::new(12345))
        );
        assert_ne!(
            derive_reroll_seed(MapSeed::new(12345)),
            derive_reroll_seed(MapSeed::new(12346))
        );
    }
}
