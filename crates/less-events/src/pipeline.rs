//! Sequential async emission ("waterfall").
//!
//! [`Emitter::emit_async`] calls listeners one at a time. Each one receives
//! the emission arguments plus a trailing [`Arg::Next`]; the pipeline only
//! advances when that continuation is called:
//!
//! ```text
//! emit_async(name, args, done)
//!   └─► L1(args.., next) ──next()──► L2(args.., next) ──next()──► done(None)
//!                                         │
//!                                         └─next(Some(err))──► done(Some(err))
//! ```
//!
//! A truthy error halts the pipeline and skips the remaining listeners. The
//! completion callback fires at most once; calling a continuation after that
//! is a no-op. Nothing here is concurrent: a listener that keeps `next` for
//! later (another thread, a timer) simply suspends the pipeline.
//!
//! Steps are driven by a loop rather than by recursion. A continuation called
//! while a step is running only queues the call; the outermost `call` drains
//! the queue once the running listener returns, so a pipeline of any length
//! runs in constant stack depth.

use std::collections::VecDeque;
use std::fmt;
use std::thread;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    args::{is_truthy, Arg},
    emitter::Emitter,
    error::{EmitterError, Result},
    listener::Listener,
};

/// Completion callback of an async emission.
type Completion = Box<dyn FnOnce(Option<Value>) + Send>;

struct Pipeline {
    /// Snapshot taken when the emission started.
    listeners: Vec<Listener>,
    args: Vec<Arg>,
    cursor: usize,
    /// `None` once the pipeline reached its terminal state.
    completion: Option<Completion>,
    /// Set while some `Next::call` is draining `pending`.
    running: bool,
    /// Continuation calls not yet applied, oldest first.
    pending: VecDeque<Option<Value>>,
}

enum Step {
    Run(Listener, Vec<Arg>),
    Finish(Completion, Option<Value>),
}

/// Releases the pipeline if a listener or the completion panics while it is
/// being driven, so later continuation calls are not queued forever.
struct Driving<'a> {
    pipeline: &'a Mutex<Pipeline>,
}

impl Drop for Driving<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut pipeline = self.pipeline.lock();
            pipeline.running = false;
            pipeline.pending.clear();
        }
    }
}

/// Continuation handed to each listener during async emission.
///
/// Cloneable; all clones drive the same pipeline.
#[derive(Clone)]
pub struct Next {
    pipeline: Arc<Mutex<Pipeline>>,
}

impl Next {
    /// Advance the pipeline, or halt it when `error` is truthy.
    ///
    /// Falsy errors (`null`, `false`, `0`, `""`) count as success and are not
    /// passed to the completion callback.
    pub fn call(&self, error: Option<Value>) {
        let error = error.filter(is_truthy);

        {
            let mut pipeline = self.pipeline.lock();
            if pipeline.completion.is_none() {
                return;
            }
            pipeline.pending.push_back(error);
            if pipeline.running {
                return;
            }
            pipeline.running = true;
        }

        let _driving = Driving {
            pipeline: &self.pipeline,
        };
        while let Some(step) = self.next_step() {
            // Lock released; listeners and the completion may re-enter.
            match step {
                Step::Run(listener, args) => listener.call(&args),
                Step::Finish(completion, error) => completion(error),
            }
        }
    }

    /// Take the oldest queued call and turn it into a step. Clears `running`
    /// under the same lock once nothing is left to do.
    fn next_step(&self) -> Option<Step> {
        let mut pipeline = self.pipeline.lock();
        let step = pipeline.pending.pop_front().and_then(|error| {
            let completion = pipeline.completion.take()?;
            if error.is_some() || pipeline.cursor == pipeline.listeners.len() {
                return Some(Step::Finish(completion, error));
            }
            pipeline.completion = Some(completion);
            let listener = pipeline.listeners[pipeline.cursor].clone();
            pipeline.cursor += 1;
            let mut args = pipeline.args.clone();
            args.push(Arg::Next(self.clone()));
            Some(Step::Run(listener, args))
        });
        if step.is_none() {
            pipeline.running = false;
            pipeline.pending.clear();
        }
        step
    }

    /// Report success.
    pub fn done(&self) {
        self.call(None)
    }

    /// Report failure and halt the pipeline.
    pub fn fail(&self, error: impl Into<Value>) {
        self.call(Some(error.into()))
    }

    /// Whether the completion callback has already fired.
    pub fn is_finished(&self) -> bool {
        self.pipeline.lock().completion.is_none()
    }
}

impl PartialEq for Next {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pipeline, &other.pipeline)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl Emitter {
    /// Call the listeners for `name` one at a time, each with `args` plus a
    /// trailing [`Next`]. `callback` receives the first truthy error, or
    /// `None` once every listener has advanced.
    ///
    /// With no listeners, `callback(None)` runs before this returns.
    pub fn emit_async(
        &self,
        name: &str,
        args: &[Arg],
        callback: impl FnOnce(Option<Value>) + Send + 'static,
    ) -> &Self {
        let listeners = self.listeners(name);
        if listeners.is_empty() {
            callback(None);
            return self;
        }

        let next = Next {
            pipeline: Arc::new(Mutex::new(Pipeline {
                listeners,
                args: args.to_vec(),
                cursor: 0,
                completion: Some(Box::new(callback)),
                running: false,
                pending: VecDeque::new(),
            })),
        };
        next.done();
        self
    }

    /// Dynamic form of [`emit_async`](Self::emit_async): the last element of
    /// `args` is the completion callback and must be callable. It is called
    /// with `[]` on success and `[error]` on failure.
    pub fn emit_async_args(&self, name: &str, mut args: Vec<Arg>) -> Result<&Self> {
        let invalid = || EmitterError::InvalidCallback {
            event: name.to_string(),
        };
        let last = args.pop().ok_or_else(invalid)?;
        let callback = Listener::from_arg(name, last).map_err(|_| invalid())?;

        Ok(self.emit_async(name, &args, move |error| match error {
            Some(error) => callback.call(&[Arg::Value(error)]),
            None => callback.call(&[]),
        }))
    }
}
