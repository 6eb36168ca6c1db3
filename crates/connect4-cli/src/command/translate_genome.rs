use connect4_evaluator::genome::{GENOME_LEN, Genome};

use crate::util::GenomeSource;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TranslateGenomeArg {
    /// Genome to print: `reference`, Base64, `@FILE` or `@FILE:LINE` [default: reference]
    genome: Option<GenomeSource>,
    /// Comma-separated signed genes to encode instead; padded or truncated to the genome length
    #[arg(long, conflicts_with = "genome", value_delimiter = ',', allow_hyphen_values = true)]
    genes: Option<Vec<i8>>,
}

pub(crate) fn run(arg: &TranslateGenomeArg) -> anyhow::Result<()> {
    let TranslateGenomeArg { genome, genes } = arg;
    let genome = match (genes, genome) {
        (Some(genes), _) => from_signed_genes(genes),
        (None, Some(source)) => source.load()?,
        (None, None) => Genome::reference(),
    };
    print!("{}", genome.describe());
    println!("{genome}");
    Ok(())
}

fn from_signed_genes(genes: &[i8]) -> Genome {
    if genes.len() != GENOME_LEN {
        log::warn!("{} genes given, expected {GENOME_LEN}", genes.len());
    }
    let bytes: Vec<u8> = genes.iter().map(|gene| gene.cast_unsigned()).collect();
    Genome::from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_genes_match_reference() {
        let genes = Genome::reference().genes().to_vec();
        assert_eq!(from_signed_genes(&genes), Genome::reference());
    }

    #[test]
    fn test_short_gene_list_is_padded() {
        let genome = from_signed_genes(&[1, -1]);
        assert_eq!(genome.genes()[..3], [1, -1, 0]);
        assert_eq!(genome.win_bonus(), 0);
    }
}
