//! Training parameters.
//!
//! Defaults reproduce the long-running training configuration. A TOML file may
//! override any subset of fields:
//!
//! ```toml
//! population_size = 200
//! fitness_games = 20
//! search_depth = 4
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use connect4_evaluator::search::DEFAULT_SEARCH_DEPTH;
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to parse training parameters: {source}")]
    Parse { source: toml::de::Error },
    #[display("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingParams {
    /// Members per generation.
    pub population_size: usize,
    /// Matches per benchmark opponent.
    pub benchmark_games: usize,
    /// Matches each member starts during fitness evaluation.
    pub fitness_games: usize,
    /// Generations per run.
    pub generations: u64,
    /// Share of the population carried over unchanged.
    pub elitist_share: f64,
    /// Extra candidates drawn per tournament.
    pub tournament_size: usize,
    /// Share of the population that receives a mutation call.
    pub genome_mutation_probability: f64,
    /// Share of genes changed by one mutation call.
    pub gene_mutation_probability: f64,
    /// Mutation offsets are drawn from `[-range, range)`.
    pub mutation_range: u8,
    pub search_depth: u32,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            population_size: 1000,
            benchmark_games: 100,
            fitness_games: 100,
            generations: 1000,
            elitist_share: 0.05,
            tournament_size: 10,
            genome_mutation_probability: 0.4,
            gene_mutation_probability: 0.05,
            mutation_range: 3,
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl TrainingParams {
    pub fn from_toml_str(text: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(text).map_err(|source| ParamsError::Parse { source })?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_toml_file<P>(path: P) -> Result<Self, ParamsError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParamsError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.population_size < 2 {
            return Err(invalid("population_size", "must be at least 2"));
        }
        if self.fitness_games == 0 {
            return Err(invalid("fitness_games", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.elitist_share) {
            return Err(invalid("elitist_share", "must be in [0, 1)"));
        }
        for (field, value) in [
            ("genome_mutation_probability", self.genome_mutation_probability),
            ("gene_mutation_probability", self.gene_mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be in [0, 1]"));
            }
        }
        Ok(())
    }

    /// `⌊population_size × elitist_share⌋`.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        share_of(self.population_size, self.elitist_share)
    }

    /// `⌊population_size × genome_mutation_probability⌋`.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        share_of(self.population_size, self.genome_mutation_probability)
    }
}

fn invalid(field: &'static str, reason: &str) -> ParamsError {
    ParamsError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn share_of(count: usize, share: f64) -> usize {
    (count as f64 * share).floor() as usize
}
