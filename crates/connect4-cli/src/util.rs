use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use connect4_evaluator::genome::{Genome, GenomeDecodeError};
use connect4_training::store::genome_file;

use crate::model::genome_model::GenomeModel;

/// Destination of a command's results: a file, or stdout when no path is given.
pub struct Output {
    writer: Box<dyn io::Write>,
    target: String,
}

impl Output {
    /// Truncates or creates the file at `path`.
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::open(path, OpenOptions::new().write(true).create(true).truncate(true))
    }

    /// Appends to the file at `path`, creating it if needed.
    pub fn appending(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::open(path, OpenOptions::new().create(true).append(true))
    }

    fn open(path: Option<&Path>, options: &OpenOptions) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                target: "stdout".to_owned(),
            });
        };
        let file = options
            .open(path)
            .with_context(|| format!("Failed to open output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            target: path.display().to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.target))?;
        self.write_line("")
    }

    /// Writes `line` followed by a newline and flushes, so progress survives an abort.
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to write to {}", self.target))
    }
}

/// Where to get a genome from on the command line.
///
/// - `reference` - the built-in reference genome
/// - `@PATH` - the last genome in a genome file, or the genome of an exported
///   `.json` model
/// - `@PATH:LINE` - the zero-indexed line of a genome file
/// - anything else is decoded as a Base64 genome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenomeSource {
    Reference,
    Literal(Genome),
    Latest(PathBuf),
    Line(PathBuf, usize),
}

impl FromStr for GenomeSource {
    type Err = GenomeDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "reference" {
            return Ok(Self::Reference);
        }
        let Some(file) = s.strip_prefix('@') else {
            return Genome::decode(s).map(Self::Literal);
        };
        if let Some((path, line)) = file.rsplit_once(':')
            && let Ok(line) = line.parse()
        {
            return Ok(Self::Line(PathBuf::from(path), line));
        }
        Ok(Self::Latest(PathBuf::from(file)))
    }
}

impl GenomeSource {
    pub fn load(&self) -> anyhow::Result<Genome> {
        match self {
            GenomeSource::Reference => Ok(Genome::reference()),
            GenomeSource::Literal(genome) => Ok(genome.clone()),
            GenomeSource::Latest(path) if path.extension().is_some_and(|ext| ext == "json") => {
                read_model(path)?.genome()
            }
            GenomeSource::Latest(path) => genome_file::latest(path)?
                .with_context(|| format!("No genome found in {}", path.display())),
            GenomeSource::Line(path, line) => Ok(genome_file::nth(path, *line)?),
        }
    }
}

fn read_model(path: &Path) -> anyhow::Result<GenomeModel> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open genome model: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse genome model: {}", path.display()))
}

/// Loads up to `count` genomes from the leading lines of `path`.
///
/// Lines that are missing or fail to decode are skipped with a warning.
pub fn read_leading_genomes(path: &Path, count: usize) -> Vec<Genome> {
    (0..count)
        .filter_map(|line| match genome_file::nth(path, line) {
            Ok(genome) => Some(genome),
            Err(e) => {
                log::warn!("skipping genome: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use connect4_evaluator::genome::GENOME_LEN;

    use super::*;

    #[test]
    fn test_parse_genome_source() {
        assert_eq!(
            "reference".parse::<GenomeSource>().unwrap(),
            GenomeSource::Reference
        );
        assert_eq!(
            Genome::reference().encode().parse::<GenomeSource>().unwrap(),
            GenomeSource::Literal(Genome::reference())
        );
        assert_eq!(
            "@train/fittest.txt".parse::<GenomeSource>().unwrap(),
            GenomeSource::Latest(PathBuf::from("train/fittest.txt"))
        );
        assert_eq!(
            "@selection.txt:1".parse::<GenomeSource>().unwrap(),
            GenomeSource::Line(PathBuf::from("selection.txt"), 1)
        );
        assert!("not base64!".parse::<GenomeSource>().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genomes.txt");
        let zero = Genome::from_genes([0; GENOME_LEN]);
        fs::write(&path, format!("{zero}\n{}\n", Genome::reference())).unwrap();

        let latest = GenomeSource::Latest(path.clone()).load().unwrap();
        assert_eq!(latest, Genome::reference());
        let first = GenomeSource::Line(path.clone(), 0).load().unwrap();
        assert_eq!(first, zero);
        assert!(GenomeSource::Line(path.clone(), 5).load().is_err());

        fs::write(&path, "").unwrap();
        assert!(GenomeSource::Latest(path).load().is_err());
    }

    #[test]
    fn test_load_from_model_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = GenomeModel {
            name: "test".to_owned(),
            trained_at: chrono::Utc::now(),
            generation: 3,
            final_fitness: 0.5,
            genome: Genome::reference().encode(),
            benchmarks: Vec::new(),
        };
        Output::create(Some(path.as_path())).unwrap().write_json(&model).unwrap();
        let source: GenomeSource = format!("@{}", path.display()).parse().unwrap();
        assert_eq!(source.load().unwrap(), Genome::reference());
    }

    #[test]
    fn test_output_create_truncates_and_appending_keeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        Output::create(Some(path.as_path())).unwrap().write_line("first").unwrap();
        Output::appending(Some(path.as_path())).unwrap().write_line("second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        let mut output = Output::create(Some(path.as_path())).unwrap();
        assert_eq!(output.target(), path.display().to_string());
        output.write_line("third").unwrap();
        drop(output);
        assert_eq!(fs::read_to_string(&path).unwrap(), "third\n");
    }

    #[test]
    fn test_read_leading_genomes_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmarks.txt");
        fs::write(&path, format!("{}\ngarbage\n", Genome::reference())).unwrap();
        assert_eq!(read_leading_genomes(&path, 3), vec![Genome::reference()]);
    }
}
