//! Persistence of training progress.
//!
//! Three plain-text files make up a training directory:
//!
//! - **generation counter** - a single decimal integer, the last completed
//!   generation, overwritten after each generation
//! - **fittest history** - one Base64 genome per line, appended after each
//!   generation; the last line seeds a resumed run
//! - **stats log** - one pipe-delimited line per generation
//!
//! Appends write a newline and then the content, so a file created by the
//! trainer starts with an empty line.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use connect4_evaluator::genome::{Genome, GenomeDecodeError};

pub const GENERATION_FILE: &str = "generation.txt";
pub const FITTEST_FILE: &str = "fittest.txt";
pub const STATS_FILE: &str = "stats.txt";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid generation counter in {}: {content:?}", path.display())]
    InvalidGeneration { path: PathBuf, content: String },
    #[display("invalid genome in {} line {line}: {source}", path.display())]
    InvalidGenome {
        path: PathBuf,
        line: usize,
        source: GenomeDecodeError,
    },
    #[display("{} has no line {line}", path.display())]
    MissingLine { path: PathBuf, line: usize },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_owned(),
        source,
    }
}

/// Where the trainer keeps its progress.
pub trait TrainingStore {
    /// Last completed generation, `None` if no counter has been written yet.
    fn latest_generation(&self) -> Result<Option<u64>, StoreError>;

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError>;

    fn append_fittest(&mut self, genome: &Genome) -> Result<(), StoreError>;

    fn append_stats(&mut self, line: &str) -> Result<(), StoreError>;
}

impl<S> TrainingStore for &mut S
where
    S: TrainingStore + ?Sized,
{
    fn latest_generation(&self) -> Result<Option<u64>, StoreError> {
        (**self).latest_generation()
    }

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError> {
        (**self).save_generation(generation)
    }

    fn append_fittest(&mut self, genome: &Genome) -> Result<(), StoreError> {
        (**self).append_fittest(genome)
    }

    fn append_stats(&mut self, line: &str) -> Result<(), StoreError> {
        (**self).append_stats(line)
    }
}

/// [`TrainingStore`] backed by the three training files.
#[derive(Debug, Clone)]
pub struct FileStore {
    generation_path: PathBuf,
    fittest_path: PathBuf,
    stats_path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(generation_path: PathBuf, fittest_path: PathBuf, stats_path: PathBuf) -> Self {
        Self {
            generation_path,
            fittest_path,
            stats_path,
        }
    }

    /// Store using the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join(GENERATION_FILE),
            dir.join(FITTEST_FILE),
            dir.join(STATS_FILE),
        )
    }

    #[must_use]
    pub fn fittest_path(&self) -> &Path {
        &self.fittest_path
    }

    /// Most recently appended fittest genome, if any.
    pub fn latest_fittest(&self) -> Result<Option<Genome>, StoreError> {
        if !self.fittest_path.exists() {
            return Ok(None);
        }
        genome_file::latest(&self.fittest_path)
    }
}

impl TrainingStore for FileStore {
    fn latest_generation(&self) -> Result<Option<u64>, StoreError> {
        let path = &self.generation_path;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path)(e)),
        };
        content
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| StoreError::InvalidGeneration {
                path: path.clone(),
                content,
            })
    }

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError> {
        fs::write(&self.generation_path, generation.to_string())
            .map_err(io_error(&self.generation_path))
    }

    fn append_fittest(&mut self, genome: &Genome) -> Result<(), StoreError> {
        genome_file::append(&self.fittest_path, genome)
    }

    fn append_stats(&mut self, line: &str) -> Result<(), StoreError> {
        append_line(&self.stats_path, line)
    }
}

/// In-memory [`TrainingStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    generation: Option<u64>,
    fittest: Vec<Genome>,
    stats: Vec<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_generation(generation: u64) -> Self {
        Self {
            generation: Some(generation),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fittest(&self) -> &[Genome] {
        &self.fittest
    }

    #[must_use]
    pub fn stats(&self) -> &[String] {
        &self.stats
    }
}

impl TrainingStore for MemoryStore {
    fn latest_generation(&self) -> Result<Option<u64>, StoreError> {
        Ok(self.generation)
    }

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError> {
        self.generation = Some(generation);
        Ok(())
    }

    fn append_fittest(&mut self, genome: &Genome) -> Result<(), StoreError> {
        self.fittest.push(genome.clone());
        Ok(())
    }

    fn append_stats(&mut self, line: &str) -> Result<(), StoreError> {
        self.stats.push(line.to_owned());
        Ok(())
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error(path))?;
    write!(file, "\n{line}").map_err(io_error(path))
}

/// Line-oriented genome files: one Base64 genome per line.
pub mod genome_file {
    use super::{Genome, Path, StoreError, append_line, fs, io_error};

    /// Last non-empty line of the file, decoded.
    ///
    /// Trailing newlines (`\n` or `\r\n`) are skipped. An empty file yields `None`.
    pub fn latest(path: &Path) -> Result<Option<Genome>, StoreError> {
        let content = fs::read_to_string(path).map_err(io_error(path))?;
        let Some((line, text)) = content
            .lines()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .last()
        else {
            return Ok(None);
        };
        decode_line(path, line, text).map(Some)
    }

    /// Zero-indexed line `line`, decoded.
    pub fn nth(path: &Path, line: usize) -> Result<Genome, StoreError> {
        let content = fs::read_to_string(path).map_err(io_error(path))?;
        let text = content
            .lines()
            .nth(line)
            .ok_or_else(|| StoreError::MissingLine {
                path: path.to_owned(),
                line,
            })?;
        decode_line(path, line, text)
    }

    /// Appends a newline followed by the encoded genome.
    pub fn append(path: &Path, genome: &Genome) -> Result<(), StoreError> {
        append_line(path, &genome.encode())
    }

    fn decode_line(path: &Path, line: usize, text: &str) -> Result<Genome, StoreError> {
        Genome::decode(text).map_err(|source| StoreError::InvalidGenome {
            path: path.to_owned(),
            line,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use connect4_evaluator::genome::GENOME_LEN;

    use super::*;

    #[test]
    fn test_generation_counter() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        assert_eq!(store.latest_generation().unwrap(), None);

        store.save_generation(4).unwrap();
        store.save_generation(5).unwrap();
        assert_eq!(store.latest_generation().unwrap(), Some(5));
        assert_eq!(fs::read_to_string(dir.path().join(GENERATION_FILE)).unwrap(), "5");

        fs::write(dir.path().join(GENERATION_FILE), "five").unwrap();
        assert!(matches!(
            store.latest_generation(),
            Err(StoreError::InvalidGeneration { .. })
        ));
    }

    #[test]
    fn test_fittest_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        assert!(store.latest_fittest().unwrap().is_none());

        let first = Genome::reference();
        let second = Genome::from_genes([3; GENOME_LEN]);
        store.append_fittest(&first).unwrap();
        store.append_fittest(&second).unwrap();

        let content = fs::read_to_string(store.fittest_path()).unwrap();
        assert_eq!(content, format!("\n{first}\n{second}"));
        assert_eq!(store.latest_fittest().unwrap(), Some(second.clone()));
        assert_eq!(genome_file::nth(store.fittest_path(), 1).unwrap(), first);
        assert_eq!(genome_file::nth(store.fittest_path(), 2).unwrap(), second);
    }

    #[test]
    fn test_latest_skips_trailing_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genomes.txt");
        let genome = Genome::reference();
        fs::write(&path, format!("{}\r\n{genome}\r\n\r\n", Genome::from_genes([0; GENOME_LEN]))).unwrap();
        assert_eq!(genome_file::latest(&path).unwrap(), Some(genome));

        fs::write(&path, "").unwrap();
        assert_eq!(genome_file::latest(&path).unwrap(), None);
    }

    #[test]
    fn test_latest_reports_line_of_bad_genome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genomes.txt");
        fs::write(&path, format!("\n{}\n\nbroken\n\n", Genome::reference())).unwrap();
        assert!(matches!(
            genome_file::latest(&path),
            Err(StoreError::InvalidGenome { line: 3, .. })
        ));
    }

    #[test]
    fn test_nth_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmarks.txt");
        fs::write(&path, format!("{}\nnot-a-genome\n", Genome::reference())).unwrap();

        assert!(genome_file::nth(&path, 0).is_ok());
        assert!(matches!(
            genome_file::nth(&path, 1),
            Err(StoreError::InvalidGenome { line: 1, .. })
        ));
        assert!(matches!(
            genome_file::nth(&path, 2),
            Err(StoreError::MissingLine { line: 2, .. })
        ));
        assert!(matches!(
            genome_file::nth(&dir.path().join("missing.txt"), 0),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_stats_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        store.append_stats("0 | a;").unwrap();
        store.append_stats("1 | b;").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(STATS_FILE)).unwrap(),
            "\n0 | a;\n1 | b;"
        );
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_generation(2);
        assert_eq!(store.latest_generation().unwrap(), Some(2));
        store.append_fittest(&Genome::reference()).unwrap();
        store.append_stats("line").unwrap();
        assert_eq!(store.fittest().len(), 1);
        assert_eq!(store.stats(), ["line".to_owned()]);
    }
}
