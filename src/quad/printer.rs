use super::types::QuadEquation;
use crate::buffer::{BoundedBlockingQueue, QueueEnd};
use crate::error::{PipelineError, Result};
use crate::flag::WorkFlag;
use crate::stage::{Stage, Step, StepResult};
use log::error;
use std::io::Write;
use std::sync::Arc;

/// Sink stage: writes one line per solved equation
pub struct QuadPrinter<W: Write + Send + 'static> {
    input: BoundedBlockingQueue<QuadEquation>,
    out: W,
    write_error: Option<std::io::Error>,
}

impl<W: Write + Send + 'static> QuadPrinter<W> {
    pub fn new(input: BoundedBlockingQueue<QuadEquation>, out: W) -> Self {
        Self {
            input,
            out,
            write_error: None,
        }
    }
}

impl<W: Write + Send + 'static> Stage for QuadPrinter<W> {
    fn step(&mut self, flag: &WorkFlag) -> StepResult {
        let Some(equation) = self.input.recv(flag)? else {
            return Ok(Step::Finished);
        };
        match writeln!(self.out, "{}", equation) {
            Ok(()) => Ok(Step::Processed),
            Err(e) => {
                error!("Printer cannot write output: {}", e);
                self.write_error = Some(e);
                Ok(Step::Finished)
            }
        }
    }

    fn queues(&self) -> Vec<Arc<dyn QueueEnd>> {
        vec![Arc::new(self.input.clone()) as Arc<dyn QueueEnd>]
    }

    fn on_shutdown(&mut self) -> Result<()> {
        if let Some(e) = self.write_error.take() {
            return Err(PipelineError::Io(e));
        }
        self.out.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "printer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quad::types::{Coeffs, Roots};
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn equation() -> QuadEquation {
        QuadEquation {
            coeffs: Coeffs::new(1, 2, 1),
            roots: Roots::One(-1.0),
            extremum: Some(-1.0),
        }
    }

    #[test]
    fn test_prints_one_line_per_item() {
        let input = BoundedBlockingQueue::new();
        let flag = WorkFlag::new();
        input.enqueue(equation(), &flag).unwrap();

        let mut printer = QuadPrinter::new(input, Vec::new());
        assert_eq!(printer.step(&flag), Ok(Step::Processed));
        printer.on_shutdown().unwrap();
        assert_eq!(
            String::from_utf8(printer.out).unwrap(),
            "(1 2 1) => root (-1), extremum (-1)\n"
        );
    }

    #[test]
    fn test_write_failure_finishes_stage() {
        let input = BoundedBlockingQueue::new();
        let flag = WorkFlag::new();
        input.enqueue(equation(), &flag).unwrap();

        let mut printer = QuadPrinter::new(input, BrokenPipe);
        assert_eq!(printer.step(&flag), Ok(Step::Finished));
        assert!(matches!(printer.on_shutdown(), Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_closed_input_finishes_cleanly() {
        let input = BoundedBlockingQueue::new();
        let flag = WorkFlag::new();
        input.enqueue(equation(), &flag).unwrap();
        input.close();

        let mut printer = QuadPrinter::new(input, Vec::new());
        assert_eq!(printer.step(&flag), Ok(Step::Processed));
        assert_eq!(printer.step(&flag), Ok(Step::Finished));
        printer.on_shutdown().unwrap();
        assert_eq!(String::from_utf8(printer.out).unwrap().lines().count(), 1);
    }
}
