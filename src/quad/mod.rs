//! Quadratic-equation pipeline: reader → solver → printer.

pub mod printer;
pub mod reader;
pub mod solver;
pub mod types;

pub use printer::QuadPrinter;
pub use reader::{arg_reader, ArgReader, ArgTriples};
pub use solver::{quad_solver, solve, QuadSolver};
pub use types::{Coeffs, QuadEquation, Roots};

use crate::buffer::BoundedBlockingQueue;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineBuilder};
use std::io::Write;

/// A wired quadratic pipeline together with the two queues between its stages
pub struct QuadPipeline {
    pub pipeline: Pipeline,
    pub coeffs: BoundedBlockingQueue<Coeffs>,
    pub equations: BoundedBlockingQueue<QuadEquation>,
}

fn queue<T>(capacity: Option<usize>) -> Result<BoundedBlockingQueue<T>> {
    match capacity {
        Some(capacity) => BoundedBlockingQueue::with_capacity(capacity),
        None => Ok(BoundedBlockingQueue::new()),
    }
}

/// Wire reader, solver and printer over two queues of the given capacity
/// (`None` for unbounded). The pipeline is built but not started.
pub fn build_quad_pipeline<W>(
    args: Vec<String>,
    capacity: Option<usize>,
    out: W,
) -> Result<QuadPipeline>
where
    W: Write + Send + 'static,
{
    let coeffs = queue(capacity)?;
    let equations = queue(capacity)?;

    let pipeline = PipelineBuilder::new()
        .stage(arg_reader(args, coeffs.clone()))
        .stage(quad_solver(coeffs.clone(), equations.clone()))
        .stage(QuadPrinter::new(equations.clone(), out))
        .build()?;

    Ok(QuadPipeline {
        pipeline,
        coeffs,
        equations,
    })
}
