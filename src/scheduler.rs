//! The task graph store and its lazy, need-driven evaluation.
//!
//! Tasks are appended to a [`petgraph::Graph`] whose node indices double as
//! task ids: tasks are never removed, so the zero-based insertion index of a
//! task identifies it for the lifetime of the scheduler. Dependency edges are
//! recorded at insertion time from the handles found in the argument list.
//!
//! The graph is entirely type-erased at runtime: every cached result is an
//! [`OpaqueValue`], while [`FutureHandle<T>`] keeps the compile-time link
//! between a task and the type it produces.
//!
//! Forcing a task is a plain recursive call: resolving its arguments forces
//! every not-yet-computed dependency first, depth-first. Because a handle can
//! only be created for a task that already exists, dependencies always point
//! at earlier tasks and the recursion terminates.

use std::any::type_name;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

use petgraph::Graph;
use petgraph::graph::NodeIndex;

use crate::args::Arguments;
use crate::error::{ComputeError, MatsuError};
use crate::handle::FutureHandle;
use crate::invoke::{BoundFn, Receiver, TaskFn};
use crate::value::OpaqueValue;

/// Stable identifier of a task, equal to its zero-based insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) NodeIndex);

impl TaskId {
    /// Zero-based insertion index of the task.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl From<usize> for TaskId {
    fn from(index: usize) -> Self {
        TaskId(NodeIndex::new(index))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.index())
    }
}

/// The deferred recipe of a task: resolves the captured arguments, runs the
/// user callable and erases the result. One-shot: forcing consumes it, so a
/// callable can never run twice.
type Invoker = Box<dyn FnOnce(&Scheduler, TaskId) -> Result<OpaqueValue, MatsuError>>;

enum TaskState {
    Pending(Invoker),
    Running,
    Done(Result<OpaqueValue, MatsuError>),
}

struct TaskSlot {
    name: Cow<'static, str>,
    output_type: &'static str,
    state: TaskState,
}

/// A lazy, single-threaded task scheduler.
///
/// Tasks are registered with [`add`] or [`add_bound`] together with their
/// argument list, in which a [`FutureHandle`] obtained from [`future_result`]
/// stands in for the result of an earlier task. Nothing runs at registration
/// time; a task is forced the first time its result is demanded, either
/// directly through [`get_result`] or transitively as a dependency, and the
/// outcome (success or failure) is cached for every later request.
///
/// [`add`]: Scheduler::add
/// [`add_bound`]: Scheduler::add_bound
/// [`future_result`]: Scheduler::future_result
/// [`get_result`]: Scheduler::get_result
pub struct Scheduler {
    graph: RefCell<Graph<TaskSlot, ()>>,
}

impl Scheduler {
    /// Creates a new, empty scheduler.
    pub fn new() -> Self {
        Self {
            graph: RefCell::new(Graph::new()),
        }
    }

    /// Registers a task built from a fallible callable and its arguments.
    ///
    /// Each argument is either a literal value, captured now and passed to
    /// the callable on forcing, or a [`FutureHandle`] resolved to the result
    /// of the referenced task. Returns the id of the new task, equal to the
    /// task count just before insertion.
    ///
    /// ```rust
    /// # use matsu::Scheduler;
    /// # fn main() -> Result<(), matsu::MatsuError> {
    /// let mut scheduler = Scheduler::new();
    /// let id = scheduler.add(|v: i32| Ok(v + 1), 42);
    /// assert_eq!(scheduler.get_result_by_id::<i32>(id)?, 43);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add<F, A, Values, R>(&mut self, callable: F, args: A) -> TaskId
    where
        F: TaskFn<Values, R> + 'static,
        A: Arguments<Values> + 'static,
        R: 'static,
    {
        let mut callable = callable;

        self.insert(type_name::<F>().into(), type_name::<R>(), args, move |values| {
            callable
                .call(values)
                .map(OpaqueValue::new)
                .map_err(ComputeError::from)
        })
    }

    /// Registers a task built from a plain method and a receiver.
    ///
    /// The receiver may be an owned value, a shared `Rc`/`Arc`/`Box`, or an
    /// `Rc<RefCell<_>>`; it is captured now and accessed once, when the task
    /// is forced.
    ///
    /// ```rust
    /// # use matsu::Scheduler;
    /// struct Adder {
    ///     step: f32,
    /// }
    ///
    /// impl Adder {
    ///     fn add(&self, a: f32) -> f32 {
    ///         a + self.step
    ///     }
    /// }
    ///
    /// # fn main() -> Result<(), matsu::MatsuError> {
    /// let mut scheduler = Scheduler::new();
    /// let id = scheduler.add_bound(Adder { step: 3.0 }, Adder::add, 2.5);
    /// assert_eq!(scheduler.get_result_by_id::<f32>(id)?, 5.5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_bound<O, T, M, A, Values, R>(&mut self, receiver: O, method: M, args: A) -> TaskId
    where
        O: Receiver<T>,
        T: 'static,
        M: BoundFn<T, Values, R> + 'static,
        A: Arguments<Values> + 'static,
        R: 'static,
    {
        let mut method = method;

        self.insert(type_name::<M>().into(), type_name::<R>(), args, move |values| {
            Ok(OpaqueValue::new(
                receiver.with(|this| method.call(this, values)),
            ))
        })
    }

    /// Creates a typed handle to the future result of task `id`.
    ///
    /// Fails with [`MatsuError::NoSuchTask`] when `id` does not name an
    /// already-registered task; this is the sole guard against forward
    /// references and cycles. Never forces evaluation.
    pub fn future_result<T>(&self, id: TaskId) -> Result<FutureHandle<T>, MatsuError> {
        self.ensure_exists(id)?;
        Ok(FutureHandle::new(id))
    }

    /// Returns the result of the task referenced by `handle`, forcing it and
    /// any of its not-yet-computed dependencies first.
    ///
    /// Fails with [`MatsuError::TypeMismatch`] when `T` is not the type the
    /// task produced, and with [`MatsuError::Task`] when the task callable
    /// failed. Repeated calls are pure cache reads.
    pub fn get_result<T>(&self, handle: FutureHandle<T>) -> Result<T, MatsuError>
    where
        T: Clone + 'static,
    {
        self.ensure_exists(handle.id)?;
        let value = self.force(handle.id)?;

        value.downcast::<T>().ok_or_else(|| MatsuError::TypeMismatch {
            task: handle.id,
            requested: type_name::<T>(),
            actual: value.type_name(),
        })
    }

    /// Returns the result of task `id`, like [`get_result`] but keyed by a
    /// raw task id instead of a handle.
    ///
    /// [`get_result`]: Scheduler::get_result
    pub fn get_result_by_id<T>(&self, id: TaskId) -> Result<T, MatsuError>
    where
        T: Clone + 'static,
    {
        self.get_result(self.future_result::<T>(id)?)
    }

    /// Forces every not-yet-computed task, in ascending id order.
    ///
    /// Dependency resolution may force tasks ahead of the outer loop; after
    /// this returns without error, every task registered so far is computed.
    /// The first task failure halts the call. Tasks not reached yet stay
    /// pending and can still be forced individually.
    pub fn execute_all(&self) -> Result<(), MatsuError> {
        let count = self.graph.borrow().node_count();

        for index in 0..count {
            self.force(TaskId::from(index))?;
        }

        Ok(())
    }

    /// The number of registered tasks.
    pub fn len(&self) -> usize {
        self.graph.borrow().node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the task has already been forced (successfully or not).
    pub fn is_computed(&self, id: TaskId) -> bool {
        let graph = self.graph.borrow();

        match graph.node_weight(id.0) {
            Some(slot) => matches!(slot.state, TaskState::Done(_)),
            None => false,
        }
    }

    /// The ids of the tasks whose results `id` consumes, in ascending order.
    pub fn dependencies(&self, id: TaskId) -> Result<Vec<TaskId>, MatsuError> {
        self.ensure_exists(id)?;

        let graph = self.graph.borrow();
        let mut dependencies: Vec<TaskId> = graph
            .neighbors_directed(id.0, petgraph::Direction::Incoming)
            .map(TaskId)
            .collect();

        dependencies.sort();
        Ok(dependencies)
    }

    fn ensure_exists(&self, id: TaskId) -> Result<(), MatsuError> {
        if id.index() < self.graph.borrow().node_count() {
            Ok(())
        } else {
            Err(MatsuError::NoSuchTask(id))
        }
    }

    fn insert<A, Values>(
        &mut self,
        name: Cow<'static, str>,
        output_type: &'static str,
        args: A,
        run: impl FnOnce(Values) -> Result<OpaqueValue, ComputeError> + 'static,
    ) -> TaskId
    where
        A: Arguments<Values> + 'static,
    {
        let dependencies = args.dependencies();
        let graph = self.graph.get_mut();

        for dependency in &dependencies {
            assert!(
                dependency.index() < graph.node_count(),
                "argument references task {dependency}, which does not exist in this scheduler",
            );
        }

        let invoker: Invoker = Box::new(move |scheduler, id| {
            let values = args.resolve(scheduler)?;
            run(values).map_err(|error| MatsuError::Task(id, error))
        });

        let index = graph.add_node(TaskSlot {
            name,
            output_type,
            state: TaskState::Pending(invoker),
        });

        for dependency in &dependencies {
            graph.add_edge(dependency.0, index, ());
        }

        tracing::trace!(task = index.index(), deps = dependencies.len(), "task added");
        TaskId(index)
    }

    /// Runs the task once and caches the outcome. Cached outcomes, including
    /// failures, are cloned out on every later call.
    fn force(&self, id: TaskId) -> Result<OpaqueValue, MatsuError> {
        let invoker = {
            let mut graph = self.graph.borrow_mut();
            let slot = &mut graph[id.0];

            match std::mem::replace(&mut slot.state, TaskState::Running) {
                TaskState::Pending(invoker) => invoker,
                TaskState::Done(result) => {
                    slot.state = TaskState::Done(result.clone());
                    return result;
                }
                TaskState::Running => return Err(MatsuError::DependencyCycle(id)),
            }
        };

        tracing::debug!(task = id.index(), "forcing task");
        let result = invoker(self, id);

        if let Err(error) = &result {
            tracing::debug!(task = id.index(), %error, "task failed");
        }

        self.graph.borrow_mut()[id.0].state = TaskState::Done(result.clone());
        result
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.len())
            .finish()
    }
}

impl fmt::Display for Scheduler {
    /// Renders the dependency graph in Mermaid syntax, one node per task and
    /// one edge per handle argument, labelled with the produced type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.graph.borrow();

        writeln!(f, "graph LR")?;

        for index in graph.node_indices() {
            let name = graph[index].name.replace('"', "\\\"");
            writeln!(f, "    {}[\"{}\"]", index.index(), name)?;
        }

        for edge in graph.edge_indices() {
            let (source, target) = graph.edge_endpoints(edge).unwrap();
            let output = graph[source]
                .output_type
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            writeln!(
                f,
                "    {} -- \"{}\" --> {}",
                source.index(),
                output,
                target.index()
            )?;
        }

        Ok(())
    }
}
