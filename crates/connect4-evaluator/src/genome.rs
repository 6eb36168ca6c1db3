//! Genetic material for the evaluator.
//!
//! A [`Genome`] is a fixed-length signed byte vector. Its layout is the persisted
//! wire format (Base64 of the raw bytes), so offsets are fixed:
//!
//! | offset | meaning |
//! |---|---|
//! | `0`, `1` | positional score weight (own, opponent) |
//! | `2`, `3` | major threat weight (own, opponent) |
//! | `4`, `5` | minor threat weight (own, opponent) |
//! | `6`, `7` | win weight (own, opponent) |
//! | `8..50` | positional score table, row-major, row 0 is the bottom row |
//! | `50` | win bonus |
//!
//! The positional table is read straight from the gene bytes, so it can never
//! drift from them after [`Genome::mutate`].

use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use base64::{Engine as _, prelude::BASE64_STANDARD};
use connect4_engine::{CELL_COUNT, COLS, ROWS};
use rand::Rng;

/// Number of genes in a genome.
pub const GENOME_LEN: usize = 51;

const POSITION_WEIGHT_OFFSET: usize = 0;
const MAJOR_WEIGHT_OFFSET: usize = 2;
const MINOR_WEIGHT_OFFSET: usize = 4;
const WIN_WEIGHT_OFFSET: usize = 6;
const TABLE_OFFSET: usize = 8;
const WIN_BONUS_OFFSET: usize = TABLE_OFFSET + CELL_COUNT;

const _: () = assert!(WIN_BONUS_OFFSET + 1 == GENOME_LEN);

/// Hand-tuned starting point: centre-weighted positions, decisive win terms.
const REFERENCE_GENES: [i8; GENOME_LEN] = [
    1, -1, 1, -1, 1, -1, 100, -100, //
    3, 4, 5, 7, 5, 4, 3, //
    4, 6, 8, 10, 8, 6, 4, //
    5, 8, 11, 13, 11, 8, 5, //
    5, 8, 11, 13, 11, 8, 5, //
    4, 6, 8, 10, 8, 6, 4, //
    3, 4, 5, 7, 5, 4, 3, //
    100,
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeDecodeError {
    #[display("invalid base64 genome: {_0}")]
    Base64(base64::DecodeError),
    #[display("decoded genome has {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
}

/// Weight pair applied to one heuristic term for each side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWeights {
    pub own: i32,
    pub opponent: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    genes: [i8; GENOME_LEN],
}

impl Genome {
    #[must_use]
    pub const fn from_genes(genes: [i8; GENOME_LEN]) -> Self {
        Self { genes }
    }

    /// Builds a genome from raw bytes, truncating or zero-padding to [`GENOME_LEN`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut genes = [0; GENOME_LEN];
        for (gene, byte) in genes.iter_mut().zip(bytes) {
            *gene = i8::from_ne_bytes([*byte]);
        }
        Self { genes }
    }

    /// Every gene sampled uniformly over the full signed byte range.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut genes = [0; GENOME_LEN];
        for gene in &mut genes {
            *gene = rng.random();
        }
        Self { genes }
    }

    #[must_use]
    pub const fn reference() -> Self {
        Self::from_genes(REFERENCE_GENES)
    }

    /// Strict inverse of [`Genome::encode`].
    ///
    /// Surrounding whitespace is ignored. Anything that is not standard Base64 of
    /// exactly [`GENOME_LEN`] bytes is rejected.
    pub fn decode(encoded: &str) -> Result<Self, GenomeDecodeError> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(GenomeDecodeError::Base64)?;
        if bytes.len() != GENOME_LEN {
            return Err(GenomeDecodeError::Length {
                expected: GENOME_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self::from_bytes(&bytes))
    }

    #[must_use]
    pub fn encode(&self) -> String {
        BASE64_STANDARD.encode(self.to_bytes())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; GENOME_LEN] {
        self.genes.map(|gene| gene.to_ne_bytes()[0])
    }

    #[must_use]
    pub fn genes(&self) -> &[i8; GENOME_LEN] {
        &self.genes
    }

    #[must_use]
    pub fn position_weights(&self) -> TermWeights {
        self.weights_at(POSITION_WEIGHT_OFFSET)
    }

    #[must_use]
    pub fn major_threat_weights(&self) -> TermWeights {
        self.weights_at(MAJOR_WEIGHT_OFFSET)
    }

    #[must_use]
    pub fn minor_threat_weights(&self) -> TermWeights {
        self.weights_at(MINOR_WEIGHT_OFFSET)
    }

    #[must_use]
    pub fn win_weights(&self) -> TermWeights {
        self.weights_at(WIN_WEIGHT_OFFSET)
    }

    fn weights_at(&self, offset: usize) -> TermWeights {
        TermWeights {
            own: i32::from(self.genes[offset]),
            opponent: i32::from(self.genes[offset + 1]),
        }
    }

    #[must_use]
    pub fn win_bonus(&self) -> i32 {
        i32::from(self.genes[WIN_BONUS_OFFSET])
    }

    /// Positional score of the cell at `(row, col)`, row 0 being the bottom row.
    #[must_use]
    pub fn position_score(&self, row: usize, col: usize) -> i32 {
        debug_assert!(row < ROWS && col < COLS);
        i32::from(self.genes[TABLE_OFFSET + row * COLS + col])
    }

    /// The positional score table, bottom row first.
    #[must_use]
    pub fn position_table(&self) -> [[i8; COLS]; ROWS] {
        let mut table = [[0; COLS]; ROWS];
        for (row, cells) in table.iter_mut().enumerate() {
            let start = TABLE_OFFSET + row * COLS;
            cells.copy_from_slice(&self.genes[start..start + COLS]);
        }
        table
    }

    /// Applies `⌊GENOME_LEN × gene_fraction⌋` point mutations.
    ///
    /// Each mutation adds an offset drawn from `[-range, range)` to a uniformly
    /// chosen gene. Offsets that would leave the `i8` range are redrawn. A `range`
    /// of zero leaves the genome unchanged.
    pub fn mutate<R>(&mut self, rng: &mut R, range: u8, gene_fraction: f64)
    where
        R: Rng + ?Sized,
    {
        if range == 0 {
            return;
        }
        let range = i16::from(range);
        for _ in 0..mutation_count(gene_fraction) {
            let gene = &mut self.genes[rng.random_range(0..GENOME_LEN)];
            let mutated = loop {
                let offset = rng.random_range(-range..range);
                if let Ok(value) = i8::try_from(i16::from(*gene) + offset) {
                    break value;
                }
            };
            *gene = mutated;
        }
    }

    /// Human-readable dump of the weights and the positional table.
    #[must_use]
    pub fn describe(&self) -> GenomeDescription<'_> {
        GenomeDescription(self)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn mutation_count(gene_fraction: f64) -> usize {
    (GENOME_LEN as f64 * gene_fraction.clamp(0.0, 1.0)).floor() as usize
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Genome {
    type Err = GenomeDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// See [`Genome::describe`].
#[derive(Debug)]
pub struct GenomeDescription<'a>(&'a Genome);

impl fmt::Display for GenomeDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genome = self.0;
        let terms = [
            ("position", genome.position_weights()),
            ("major threat", genome.major_threat_weights()),
            ("minor threat", genome.minor_threat_weights()),
            ("win", genome.win_weights()),
        ];
        for (name, weights) in terms {
            writeln!(
                f,
                "{name:<13} own {:>4}  opponent {:>4}",
                weights.own, weights.opponent
            )?;
        }
        writeln!(f, "{:<13} {:>8}", "win bonus", genome.win_bonus())?;
        writeln!(f, "position table (top row first):")?;
        for cells in genome.position_table().iter().rev() {
            for cell in cells {
                write!(f, "{cell:>5}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Population-scoped identity of a genome.
///
/// Two records holding byte-identical genomes still have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct GenomeId(u64);

impl GenomeId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic [`GenomeId`] source, shared by reference between threads.
#[derive(Debug, Default)]
pub struct GenomeIdGenerator {
    next: AtomicU64,
}

impl GenomeIdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> GenomeId {
        GenomeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// A shared genome tagged with its population identity.
#[derive(Debug, Clone)]
pub struct IdentifiedGenome {
    id: GenomeId,
    genome: Arc<Genome>,
}

impl IdentifiedGenome {
    #[must_use]
    pub fn new(id: GenomeId, genome: Arc<Genome>) -> Self {
        Self { id, genome }
    }

    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.id
    }

    #[must_use]
    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    /// Mutable access, cloning the genome first if it is shared. The id is kept.
    pub fn genome_mut(&mut self) -> &mut Genome {
        Arc::make_mut(&mut self.genome)
    }
}
