//! Population records, genetic operators and concurrent fitness evaluation.
//!
//! # Generation Pipeline
//!
//! [`Population::next_generation`] expects a population sorted by fitness
//! (fittest first) and builds the next one in a fixed order:
//!
//! 1. **Elitism** - the top `⌊N × elitist_share⌋` members are carried over with
//!    the same genome and identity and fresh counters
//! 2. **Parent pool** - the weakest `⌊N × elitist_share⌋` members are replaced by
//!    the elite, so elite genomes also compete in tournaments
//! 3. **Reproduction** - pairs of tournament winners from the non-elite region of
//!    the pool are crossed over at a single cut point; both children are kept and
//!    the result is truncated to `N`
//! 4. **Mutation** - `⌊N × genome_mutation_probability⌋` uniformly drawn non-elite
//!    members receive one [`Genome::mutate`] call each (a member may be drawn twice)
//!
//! # Tournament Selection
//!
//! One candidate is drawn uniformly from the non-elite region, then
//! `tournament_size` more; a later candidate replaces the current winner only if
//! it is strictly fitter.
//!
//! # Fitness Evaluation
//!
//! [`Population::evaluate_fitness`] spawns one scoped thread per member. Each
//! thread plays `games` matches against uniformly drawn members of the same
//! population (possibly itself), alternating who moves first, and records the
//! result on both participants. Counters are atomic, so a record may be updated
//! from any number of threads. The population is sorted after all threads join.

use std::{
    cmp::Ordering,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering as AtomicOrdering},
    },
    thread,
};

use connect4_engine::{GameResult, MatchOutcome, Seat};
use connect4_evaluator::{
    genome::{GENOME_LEN, Genome, GenomeId, GenomeIdGenerator, IdentifiedGenome},
    session::play_genome_match,
};
use rand::{Rng, seq::IndexedRandom};

use crate::params::TrainingParams;

/// A genome with its match record for the current generation.
#[derive(Debug)]
pub struct GenomeFitness {
    genome: IdentifiedGenome,
    played: AtomicU32,
    won: AtomicU32,
    lost: AtomicU32,
}

impl GenomeFitness {
    #[must_use]
    pub fn new(genome: IdentifiedGenome) -> Self {
        Self::with_history(genome, 0, 0, 0)
    }

    #[must_use]
    pub fn with_history(genome: IdentifiedGenome, played: u32, won: u32, lost: u32) -> Self {
        debug_assert!(won + lost <= played);
        Self {
            genome,
            played: AtomicU32::new(played),
            won: AtomicU32::new(won),
            lost: AtomicU32::new(lost),
        }
    }

    /// Initial record: one win and one loss, so fresh members start at 0.5.
    #[must_use]
    pub fn seeded(genome: IdentifiedGenome) -> Self {
        Self::with_history(genome, 2, 1, 1)
    }

    /// Same genome and identity, counters cleared.
    #[must_use]
    pub fn carry_over(&self) -> Self {
        Self::new(self.genome.clone())
    }

    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.genome.id()
    }

    #[must_use]
    pub fn genome(&self) -> &Arc<Genome> {
        self.genome.genome()
    }

    #[must_use]
    pub fn played(&self) -> u32 {
        self.played.load(AtomicOrdering::Relaxed)
    }

    #[must_use]
    pub fn won(&self) -> u32 {
        self.won.load(AtomicOrdering::Relaxed)
    }

    #[must_use]
    pub fn lost(&self) -> u32 {
        self.lost.load(AtomicOrdering::Relaxed)
    }

    #[must_use]
    pub fn drawn(&self) -> u32 {
        self.played() - self.won() - self.lost()
    }

    /// `⌊1000 × (win rate + draw rate / 2)⌋ / 1000`, or `0.0` before any match.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        fitness(self.played(), self.won(), self.lost())
    }

    pub fn record(&self, result: GameResult) {
        self.played.fetch_add(1, AtomicOrdering::Relaxed);
        match result {
            GameResult::Won => {
                self.won.fetch_add(1, AtomicOrdering::Relaxed);
            }
            GameResult::Lost => {
                self.lost.fetch_add(1, AtomicOrdering::Relaxed);
            }
            GameResult::Drawn => {}
        }
    }
}

fn fitness(played: u32, won: u32, lost: u32) -> f64 {
    if played == 0 {
        return 0.0;
    }
    let played = f64::from(played);
    let win_rate = f64::from(won) / played;
    let draw_rate = (played - f64::from(won) - f64::from(lost)) / played;
    ((win_rate + draw_rate / 2.0) * 1000.0).floor() / 1000.0
}

/// Orders fitter records first.
#[must_use]
pub fn compare_fitness(a: &GenomeFitness, b: &GenomeFitness) -> Ordering {
    b.fitness().total_cmp(&a.fitness())
}

/// Minimum, mean and maximum fitness of a population.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug)]
pub struct Population {
    members: Vec<GenomeFitness>,
}

impl Population {
    #[must_use]
    pub fn from_members(members: Vec<GenomeFitness>) -> Self {
        Self { members }
    }

    /// `size` fresh-identity clones of `seed`, each with a seeded history.
    #[must_use]
    pub fn from_seed(seed: &Genome, size: usize, ids: &GenomeIdGenerator) -> Self {
        let seed = Arc::new(seed.clone());
        let members = (0..size)
            .map(|_| {
                GenomeFitness::seeded(IdentifiedGenome::new(ids.next_id(), Arc::clone(&seed)))
            })
            .collect();
        Self { members }
    }

    /// `size` uniformly random genomes, each with a seeded history.
    pub fn random<R>(size: usize, ids: &GenomeIdGenerator, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let members = (0..size)
            .map(|_| {
                let genome = Arc::new(Genome::random(rng));
                GenomeFitness::seeded(IdentifiedGenome::new(ids.next_id(), genome))
            })
            .collect();
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[GenomeFitness] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// First member; the fittest once the population is sorted.
    #[must_use]
    pub fn fittest(&self) -> Option<&GenomeFitness> {
        self.members.first()
    }

    /// Stable sort, fittest first.
    pub fn sort_by_fitness(&mut self) {
        self.members.sort_by(compare_fitness);
    }

    #[must_use]
    pub fn is_sorted_by_fitness(&self) -> bool {
        self.members
            .is_sorted_by(|a, b| compare_fitness(a, b) != Ordering::Greater)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fitness_summary(&self) -> FitnessSummary {
        if self.members.is_empty() {
            return FitnessSummary::default();
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for member in &self.members {
            let fitness = member.fitness();
            min = min.min(fitness);
            max = max.max(fitness);
            sum += fitness;
        }
        FitnessSummary {
            min,
            mean: sum / self.members.len() as f64,
            max,
        }
    }

    /// Plays `games` self-play matches per member at `depth`, then sorts.
    pub fn evaluate_fitness(&mut self, games: usize, depth: u32) {
        self.evaluate_fitness_with(games, |first, second| {
            play_genome_match(first, second, depth)
        });
    }

    /// [`Population::evaluate_fitness`] with a custom match function.
    ///
    /// `play(first, second)` must return the outcome with `first` in
    /// [`Seat::First`].
    pub fn evaluate_fitness_with<F>(&mut self, games: usize, play: F)
    where
        F: Fn(&Arc<Genome>, &Arc<Genome>) -> MatchOutcome + Sync,
    {
        let members = &self.members;
        let play = &play;
        thread::scope(|s| {
            for member in members {
                s.spawn(move || {
                    let mut rng = rand::rng();
                    for game in 0..games {
                        let Some(opponent) = members.choose(&mut rng) else {
                            return;
                        };
                        let (first, second) = if game % 2 == 0 {
                            (member, opponent)
                        } else {
                            (opponent, member)
                        };
                        let outcome = play(first.genome(), second.genome());
                        first.record(outcome.result_for(Seat::First));
                        second.record(outcome.result_for(Seat::Second));
                    }
                });
            }
        });
        log::debug!(
            "evaluated {} members with {games} matches each",
            self.members.len()
        );
        self.sort_by_fitness();
    }

    /// Builds the next generation from this sorted population.
    ///
    /// See the module documentation for the pipeline.
    #[must_use]
    pub fn next_generation<R>(
        &self,
        params: &TrainingParams,
        ids: &GenomeIdGenerator,
        rng: &mut R,
    ) -> Population
    where
        R: Rng + ?Sized,
    {
        debug_assert!(self.is_sorted_by_fitness());
        let size = params.population_size;
        let elite = params.elite_count().min(self.members.len());

        let mut next: Vec<GenomeFitness> = self.members[..elite]
            .iter()
            .map(GenomeFitness::carry_over)
            .collect();

        let pool = self.parent_pool(elite);
        let candidates = &pool[elite..];
        while next.len() < size {
            let (Some(parent1), Some(parent2)) = (
                tournament_select(candidates, params.tournament_size, rng),
                tournament_select(candidates, params.tournament_size, rng),
            ) else {
                break;
            };
            let cut = rng.random_range(0..=GENOME_LEN);
            for child in crossover(parent1.genome(), parent2.genome(), cut) {
                next.push(GenomeFitness::new(IdentifiedGenome::new(
                    ids.next_id(),
                    Arc::new(child),
                )));
            }
        }
        next.truncate(size);

        if elite < next.len() {
            for _ in 0..params.mutation_count() {
                let index = rng.random_range(elite..next.len());
                next[index].genome.genome_mut().mutate(
                    rng,
                    params.mutation_range,
                    params.gene_mutation_probability,
                );
            }
        }

        Population { members: next }
    }

    /// Members with the weakest `elite` entries replaced by the elite.
    fn parent_pool(&self, elite: usize) -> Vec<&GenomeFitness> {
        let len = self.members.len();
        let kill = len - elite;
        let mut pool: Vec<&GenomeFitness> = self.members.iter().collect();
        for (i, slot) in pool.iter_mut().enumerate().skip(kill) {
            *slot = &self.members[i - kill];
        }
        pool
    }
}

/// Tournament over `candidates`: one draw plus `tournament_size` challengers.
///
/// Returns `None` only when `candidates` is empty.
pub fn tournament_select<'a, R>(
    candidates: &[&'a GenomeFitness],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a GenomeFitness>
where
    R: Rng + ?Sized,
{
    let mut winner = *candidates.choose(rng)?;
    for _ in 0..tournament_size {
        let challenger = *candidates.choose(rng)?;
        if compare_fitness(challenger, winner) == Ordering::Less {
            winner = challenger;
        }
    }
    Some(winner)
}

/// Single-point crossover at `cut` (`0..=GENOME_LEN`).
///
/// The first child takes `parent1` before the cut and `parent2` from it on; the
/// second child is the mirror image.
#[must_use]
pub fn crossover(parent1: &Genome, parent2: &Genome, cut: usize) -> [Genome; 2] {
    debug_assert!(cut <= GENOME_LEN);
    let mut child1 = *parent1.genes();
    let mut child2 = *parent2.genes();
    child1[cut..].copy_from_slice(&parent2.genes()[cut..]);
    child2[cut..].copy_from_slice(&parent1.genes()[cut..]);
    [Genome::from_genes(child1), Genome::from_genes(child2)]
}
