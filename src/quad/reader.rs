use super::types::Coeffs;
use crate::buffer::BoundedBlockingQueue;
use crate::error::{PipelineError, Result};
use crate::stage::SourceStage;
use log::debug;

const COEFFS_PER_EQUATION: usize = 3;

/// Reader stage: command-line arguments in, coefficients out
pub type ArgReader = SourceStage<Coeffs, ArgTriples>;

pub fn arg_reader(args: Vec<String>, output: BoundedBlockingQueue<Coeffs>) -> ArgReader {
    SourceStage::new("reader", ArgTriples::new(args), output)
}

/// Groups arguments three at a time into [`Coeffs`].
///
/// A group with any unparsable member yields `MalformedInput` and is skipped
/// as a whole. Leftover arguments that do not fill a group are ignored.
#[derive(Debug, Clone)]
pub struct ArgTriples {
    args: Vec<String>,
    pos: usize,
}

impl ArgTriples {
    pub fn new(args: Vec<String>) -> Self {
        Self { args, pos: 0 }
    }

    fn parse_group(&self, start: usize) -> Result<Coeffs> {
        Ok(Coeffs::new(
            self.parse_at(start)?,
            self.parse_at(start + 1)?,
            self.parse_at(start + 2)?,
        ))
    }

    fn parse_at(&self, position: usize) -> Result<i32> {
        let raw = self.args[position].trim();
        raw.parse::<i32>()
            .map_err(|e| PipelineError::MalformedInput {
                position,
                reason: format!("'{}': {}", raw, e),
            })
    }
}

impl Iterator for ArgTriples {
    type Item = Result<Coeffs>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        if start + COEFFS_PER_EQUATION > self.args.len() {
            if start < self.args.len() {
                debug!(
                    "Ignoring {} trailing argument(s) that do not form an equation",
                    self.args.len() - start
                );
                self.pos = self.args.len();
            }
            return None;
        }
        self.pos += COEFFS_PER_EQUATION;

        Some(self.parse_group(start))
    }
}
