//! Evolutionary training of evaluator genomes through self-play.
//!
//! # How Training Works
//!
//! 1. **Population** - every member starts as a fresh-identity clone of a seed
//!    genome (or a random genome), with a seeded history of one win and one loss
//! 2. **Elitism** - the fittest share of the previous generation is carried over
//!    unchanged
//! 3. **Reproduction** - tournament-selected parents produce two children each by
//!    single-point crossover until the population is full again
//! 4. **Mutation** - a share of the non-elite members receive point mutations
//! 5. **Fitness** - every member plays a fixed number of matches against random
//!    members of the same population, all members concurrently
//! 6. **Report** - the fittest genome is benchmarked against up to three fixed
//!    opponents and persisted together with the generation index
//!
//! # Architecture
//!
//! ```text
//! TrainingGround (generation loop, interrupt, persistence)
//!     ↓ drives
//! Population (selection, crossover, mutation, fitness evaluation)
//!     ↓ plays matches via
//! connect4-evaluator session (AiPlayer vs AiPlayer on a private Board)
//! ```
//!
//! # Modules
//!
//! - [`params`] - [`TrainingParams`](params::TrainingParams), loadable from TOML
//! - [`genetic`] - [`GenomeFitness`](genetic::GenomeFitness) and
//!   [`Population`](genetic::Population)
//! - [`benchmark`] - matches of the fittest genome against fixed opponents
//! - [`store`] - generation counter, fittest genome history and stats log
//! - [`training_ground`] - the generation loop
//!
//! # Fitness
//!
//! ```text
//! fitness = ⌊1000 × (won / played + drawn / played / 2)⌋ / 1000
//! ```
//!
//! A record that has not played yet has fitness `0.0`.

pub mod benchmark;
pub mod genetic;
pub mod params;
pub mod store;
pub mod training_ground;
