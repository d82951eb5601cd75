use crate::error::{PipelineError, Result};
use crate::metrics::StageMetrics;
use crate::stage::{Stage, StageControl, StageRunner, StageState, StopHandle};
use log::{debug, error};

/// Builder for constructing pipelines.
///
/// Stages are added in data-flow order: the first one is the source, each
/// later stage consumes what the previous one produces.
pub struct PipelineBuilder {
    runners: Vec<Box<dyn StageControl>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    /// Append a stage to the pipeline
    pub fn stage<S: Stage>(mut self, stage: S) -> Self {
        self.runners.push(Box::new(StageRunner::new(stage)));
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.runners.is_empty() {
            return Err(PipelineError::NoStages);
        }
        Ok(Pipeline {
            runners: self.runners,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered chain of stage runners sharing queues between neighbours
pub struct Pipeline {
    runners: Vec<Box<dyn StageControl>>,
}

impl Pipeline {
    /// Start every stage, upstream first
    pub fn start(&mut self) -> Result<()> {
        for runner in &mut self.runners {
            runner.start()?;
        }
        Ok(())
    }

    /// Join every stage in data-flow order without stopping any of them.
    ///
    /// Each stage ends on its own: the source when its input runs out, every
    /// later stage once the queue closed by its upstream neighbour is drained.
    /// Every stage is joined even if an earlier one failed; the first error is returned.
    pub fn wait(&mut self) -> Result<()> {
        let mut first_error = None;
        for runner in &mut self.runners {
            if let Err(e) = runner.join() {
                error!("Stage '{}' failed: {}", runner.name(), e);
                first_error.get_or_insert(e);
            }
        }
        debug!("{}", self.metrics_summary());
        first_error.map_or(Ok(()), Err)
    }

    /// Stop every stage at once, then join them all
    pub fn shutdown(&mut self) -> Result<()> {
        for runner in &mut self.runners {
            runner.request_stop();
        }
        let mut first_error = None;
        for runner in &mut self.runners {
            if let Err(e) = runner.join() {
                error!("Stage '{}' failed: {}", runner.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop triggers for every stage, usable from other threads
    pub fn stop_handles(&self) -> Vec<StopHandle> {
        self.runners.iter().map(|r| r.stop_handle()).collect()
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn stage_state(&self, index: usize) -> Option<StageState> {
        self.runners.get(index).map(|r| r.state())
    }

    pub fn stage_metrics(&self, index: usize) -> Option<&StageMetrics> {
        self.runners.get(index).map(|r| r.metrics())
    }

    /// Get a summary of all stage metrics
    pub fn metrics_summary(&self) -> String {
        let mut summary = String::from("Pipeline Metrics Summary:");
        for (i, runner) in self.runners.iter().enumerate() {
            summary.push_str(&format!(
                "\n  Stage {} ({}): {}",
                i,
                runner.name(),
                runner.metrics().snapshot().format()
            ));
        }
        summary
    }
}
