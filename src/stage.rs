use crate::buffer::{BoundedBlockingQueue, QueueEnd};
use crate::error::{Interrupted, PipelineError, Result};
use crate::flag::WorkFlag;
use crate::metrics::StageMetrics;
use log::{debug, error};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Outcome of one unit of stage work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One item was moved through the stage
    Processed,
    /// A malformed item was dropped; the loop keeps going
    Skipped,
    /// The stage has nothing left to do: source exhausted, input closed and
    /// drained, or output unusable
    Finished,
}

/// Result of [`Stage::step`]. `Err(Interrupted)` ends the work loop.
pub type StepResult = std::result::Result<Step, Interrupted>;

/// A unit of pipeline work driven by a [`StageRunner`] on its own thread
pub trait Stage: Send + 'static {
    /// Do one unit of work: at most one blocking queue call per direction.
    fn step(&mut self, flag: &WorkFlag) -> StepResult;

    /// Queues the stage touches. They are woken when the stage is asked to
    /// stop and closed once its worker returns.
    fn queues(&self) -> Vec<Arc<dyn QueueEnd>>;

    /// Called on the worker thread before the first step
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called on the worker thread after the work loop ended
    fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Label used for the worker thread and in log lines
    fn name(&self) -> &str {
        "stage"
    }
}

/// Lifecycle of a [`StageRunner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Created,
    Running,
    StopRequested,
    Joined,
}

/// Cloneable stop trigger for one stage: lowers its flag, then wakes its queues.
#[derive(Clone)]
pub struct StopHandle {
    name: Arc<str>,
    flag: WorkFlag,
    queues: Arc<[Arc<dyn QueueEnd>]>,
}

impl StopHandle {
    /// Ask the stage to stop. Safe to call any number of times from any thread.
    pub fn request_stop(&self) {
        if self.flag.stop() {
            debug!("Stop requested for stage '{}'", self.name);
        }
        // The flag store happens before each wake, which takes the queue lock.
        for queue in self.queues.iter() {
            queue.wake_all();
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        !self.flag.is_live()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn close_queues(&self) {
        for queue in self.queues.iter() {
            queue.close();
        }
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("name", &self.name)
            .field("stop_requested", &self.is_stop_requested())
            .field("queues", &self.queues.len())
            .finish()
    }
}

/// Owns one stage and the worker thread that runs it.
///
/// Dropping the runner requests a stop and joins the worker.
pub struct StageRunner<S: Stage> {
    name: String,
    stage: Option<S>,
    stop: StopHandle,
    metrics: StageMetrics,
    handle: Option<JoinHandle<Result<()>>>,
    state: StageState,
}

impl<S: Stage> StageRunner<S> {
    /// Create a runner; the worker is not spawned until [`start`](Self::start)
    pub fn new(stage: S) -> Self {
        let name = stage.name().to_string();
        let stop = StopHandle {
            name: Arc::from(name.as_str()),
            flag: WorkFlag::new(),
            queues: stage.queues().into(),
        };
        Self {
            name,
            stage: Some(stage),
            stop,
            metrics: StageMetrics::new(),
            handle: None,
            state: StageState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether the worker thread has returned (joined or not)
    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => self.state != StageState::Created,
        }
    }

    /// Spawn the worker thread. No-op unless the runner is freshly created.
    pub fn start(&mut self) -> Result<()> {
        if self.state != StageState::Created {
            debug!("Stage '{}' not started from state {:?}", self.name, self.state);
            return Ok(());
        }
        let Some(stage) = self.stage.take() else {
            return Ok(());
        };

        let stop = self.stop.clone();
        let metrics = self.metrics.clone();
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_worker(stage, stop, metrics))
            .map_err(|e| {
                PipelineError::ThreadError(format!("failed to spawn stage '{}': {}", self.name, e))
            })?;

        self.handle = Some(handle);
        self.state = StageState::Running;
        Ok(())
    }

    /// Lower the work flag and wake every queue the stage touches. Idempotent.
    pub fn request_stop(&mut self) {
        self.stop.request_stop();
        if matches!(self.state, StageState::Created | StageState::Running) {
            self.state = StageState::StopRequested;
        }
    }

    /// Block until the worker thread has returned. Idempotent.
    ///
    /// Does not request a stop: a stage whose loop never ends on its own must
    /// be stopped first. A stage stopped before it ever ran closes its queues
    /// here, so its neighbours still see end-of-stream.
    pub fn join(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            if self.state != StageState::Created {
                if self.stage.take().is_some() {
                    self.stop.close_queues();
                }
                self.state = StageState::Joined;
            }
            return Ok(());
        };

        let outcome = handle.join();
        self.state = StageState::Joined;
        match outcome {
            Ok(result) => result,
            Err(_) => Err(PipelineError::ThreadError(format!(
                "stage '{}' worker panicked",
                self.name
            ))),
        }
    }
}

impl<S: Stage> Drop for StageRunner<S> {
    fn drop(&mut self) {
        if self.state == StageState::Joined {
            return;
        }
        self.request_stop();
        if let Err(e) = self.join() {
            error!("Stage '{}' failed during teardown: {}", self.name, e);
        }
    }
}

/// Closes a stage's queues when its worker returns, panics included
struct CloseOnExit(StopHandle);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close_queues();
        debug!("Stage '{}' closed its queues", self.0.name());
    }
}

fn run_worker<S: Stage>(mut stage: S, stop: StopHandle, metrics: StageMetrics) -> Result<()> {
    let flag = stop.flag.clone();
    let _close = CloseOnExit(stop);
    stage.on_start()?;
    debug!("Stage '{}' running", stage.name());

    loop {
        let started = Instant::now();
        let step = stage.step(&flag);
        metrics.record_latency(started.elapsed().as_nanos() as u64);

        match step {
            Ok(Step::Processed) => metrics.record_processed(),
            Ok(Step::Skipped) => metrics.record_skipped(),
            Ok(Step::Finished) => {
                debug!("Stage '{}' finished its work", stage.name());
                break;
            }
            Err(Interrupted) => {
                metrics.record_interrupted();
                debug!("Stage '{}' interrupted", stage.name());
                break;
            }
        }
    }

    stage.on_shutdown()
}

/// Type-erased runner control, so a pipeline can hold stages of different types
pub trait StageControl: Send {
    fn name(&self) -> &str;
    fn state(&self) -> StageState;
    fn metrics(&self) -> &StageMetrics;
    fn stop_handle(&self) -> StopHandle;
    fn start(&mut self) -> Result<()>;
    fn request_stop(&mut self);
    fn join(&mut self) -> Result<()>;
}

impl<S: Stage> StageControl for StageRunner<S> {
    fn name(&self) -> &str {
        StageRunner::name(self)
    }

    fn state(&self) -> StageState {
        StageRunner::state(self)
    }

    fn metrics(&self) -> &StageMetrics {
        StageRunner::metrics(self)
    }

    fn stop_handle(&self) -> StopHandle {
        StageRunner::stop_handle(self)
    }

    fn start(&mut self) -> Result<()> {
        StageRunner::start(self)
    }

    fn request_stop(&mut self) {
        StageRunner::request_stop(self)
    }

    fn join(&mut self) -> Result<()> {
        StageRunner::join(self)
    }
}

/// Producer over a finite iterator. `Err` items are logged and skipped.
pub struct SourceStage<T, I>
where
    T: Send + 'static,
    I: Iterator<Item = Result<T>> + Send + 'static,
{
    name: String,
    source: I,
    output: BoundedBlockingQueue<T>,
}

impl<T, I> SourceStage<T, I>
where
    T: Send + 'static,
    I: Iterator<Item = Result<T>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, source: I, output: BoundedBlockingQueue<T>) -> Self {
        Self {
            name: name.into(),
            source,
            output,
        }
    }
}

impl<T, I> Stage for SourceStage<T, I>
where
    T: Send + 'static,
    I: Iterator<Item = Result<T>> + Send + 'static,
{
    fn step(&mut self, flag: &WorkFlag) -> StepResult {
        if !flag.is_live() {
            return Err(Interrupted);
        }
        match self.source.next() {
            None => Ok(Step::Finished),
            Some(Err(e)) => {
                debug!("Stage '{}' skipping input: {}", self.name, e);
                Ok(Step::Skipped)
            }
            Some(Ok(item)) => {
                self.output.enqueue(item, flag)?;
                Ok(Step::Processed)
            }
        }
    }

    fn queues(&self) -> Vec<Arc<dyn QueueEnd>> {
        vec![Arc::new(self.output.clone()) as Arc<dyn QueueEnd>]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Transformer: dequeue one item, map it, enqueue the result downstream
pub struct MapStage<In, Out, F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: FnMut(In) -> Out + Send + 'static,
{
    name: String,
    input: BoundedBlockingQueue<In>,
    output: BoundedBlockingQueue<Out>,
    mapper: F,
}

impl<In, Out, F> MapStage<In, Out, F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: FnMut(In) -> Out + Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        input: BoundedBlockingQueue<In>,
        output: BoundedBlockingQueue<Out>,
        mapper: F,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            mapper,
        }
    }
}

impl<In, Out, F> Stage for MapStage<In, Out, F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: FnMut(In) -> Out + Send + 'static,
{
    fn step(&mut self, flag: &WorkFlag) -> StepResult {
        let Some(item) = self.input.recv(flag)? else {
            return Ok(Step::Finished);
        };
        // A drain leaves `flag` up, so only an abort of this stage or a
        // closed output (downstream gone) interrupts the hand-off.
        self.output.enqueue((self.mapper)(item), flag)?;
        Ok(Step::Processed)
    }

    fn queues(&self) -> Vec<Arc<dyn QueueEnd>> {
        vec![
            Arc::new(self.input.clone()) as Arc<dyn QueueEnd>,
            Arc::new(self.output.clone()),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }
}
