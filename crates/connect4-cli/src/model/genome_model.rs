use chrono::{DateTime, Utc};
use connect4_evaluator::genome::Genome;
use connect4_training::{benchmark::BenchmarkResult, training_ground::GenerationReport};
use serde::{Deserialize, Serialize};

/// Exported result of a training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenomeModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generation: u64,
    pub final_fitness: f64,
    /// Base64 genome, as stored in the fittest history.
    pub genome: String,
    pub benchmarks: Vec<BenchmarkSummary>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchmarkSummary {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub win_ratio: f64,
    pub draw_ratio: f64,
}

impl From<BenchmarkResult> for BenchmarkSummary {
    fn from(result: BenchmarkResult) -> Self {
        Self {
            played: result.played(),
            won: result.won(),
            lost: result.lost(),
            win_ratio: result.win_ratio(),
            draw_ratio: result.draw_ratio(),
        }
    }
}

impl GenomeModel {
    pub(crate) fn from_report(name: String, report: &GenerationReport) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            generation: report.generation(),
            final_fitness: report.fittest_fitness(),
            genome: report.fittest().encode(),
            benchmarks: report
                .benchmarks()
                .iter()
                .flatten()
                .copied()
                .map(BenchmarkSummary::from)
                .collect(),
        }
    }

    pub(crate) fn genome(&self) -> anyhow::Result<Genome> {
        Ok(Genome::decode(&self.genome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_keeps_genome() {
        let model = GenomeModel {
            name: "connect4".to_owned(),
            trained_at: Utc::now(),
            generation: 12,
            final_fitness: 0.75,
            genome: Genome::reference().encode(),
            benchmarks: vec![BenchmarkResult::new(10, 6, 2).into()],
        };
        let json = serde_json::to_string(&model).unwrap();
        let parsed: GenomeModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.generation, 12);
        assert_eq!(parsed.benchmarks[0].won, 6);
        assert!((parsed.benchmarks[0].win_ratio - 0.75).abs() < 1e-9);
        assert_eq!(parsed.genome().unwrap(), Genome::reference());
    }
}
