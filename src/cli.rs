use clap::Parser;

/// Solve quadratic equations on a reader → solver → printer thread pipeline.
#[derive(Debug, Clone, Parser)]
#[command(name = "quad-pipeline", version)]
#[command(about = "Read coefficient triples, solve each equation on a worker thread, print the results.")]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Capacity of each queue between stages. Default: unbounded.
    #[arg(long, short = 'c', value_parser = clap::value_parser!(usize))]
    pub capacity: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Coefficients, three per equation: a b c [a b c ...]. Malformed triples are skipped.
    #[arg(value_name = "COEFFS", allow_hyphen_values = true, trailing_var_arg = true)]
    pub coeffs: Vec<String>,
}
