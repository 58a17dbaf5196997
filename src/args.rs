use crate::error::MatsuError;
use crate::handle::FutureHandle;
use crate::scheduler::{Scheduler, TaskId};

/// A single captured argument of a task: either a literal value or a
/// reference to the future result of another task.
///
/// Most call sites never name this type, since literals and [`FutureHandle`]s
/// are accepted directly. It becomes useful when a task takes a homogeneous,
/// arbitrary-length list of arguments, where literals and handles must share
/// one element type:
///
/// ```rust
/// # use matsu::{Arg, Scheduler};
/// # fn main() -> Result<(), matsu::MatsuError> {
/// let mut scheduler = Scheduler::new();
/// let base = scheduler.add(|| Ok(30), ());
/// let base = scheduler.future_result::<i32>(base)?;
///
/// let sum = scheduler.add(
///     |terms: Vec<i32>| Ok(terms.iter().sum::<i32>()),
///     vec![Arg::Value(1), Arg::Value(2), Arg::from(base)],
/// );
/// assert_eq!(scheduler.get_result_by_id::<i32>(sum)?, 33);
/// # Ok(())
/// # }
/// ```
pub enum Arg<T> {
    /// A value captured at task-creation time.
    Value(T),
    /// The future result of an already-registered task.
    Future(FutureHandle<T>),
}

impl<T: Clone + 'static> Arg<T> {
    pub(crate) fn resolve(self, scheduler: &Scheduler) -> Result<T, MatsuError> {
        match self {
            Arg::Value(value) => Ok(value),
            Arg::Future(handle) => scheduler.get_result(handle),
        }
    }
}

impl<T> Arg<T> {
    pub(crate) fn dependency(&self) -> Option<TaskId> {
        match self {
            Arg::Value(_) => None,
            Arg::Future(handle) => Some(handle.id),
        }
    }
}

impl<T> From<T> for Arg<T> {
    fn from(value: T) -> Self {
        Arg::Value(value)
    }
}

impl<T> From<FutureHandle<T>> for Arg<T> {
    fn from(handle: FutureHandle<T>) -> Self {
        Arg::Future(handle)
    }
}

/// Things that can be passed as a single task argument.
///
/// Implemented for any `'static` value (captured as a literal), for
/// [`FutureHandle<T>`] (resolved to the referenced task's result when the
/// dependent is forced), and for [`Arg<T>`] itself. Resolution maps a literal
/// to itself and a handle to the possibly newly forced result of its task.
pub trait Argument<T>: 'static {
    /// The task this argument depends on, if any.
    fn dependency(&self) -> Option<TaskId>;

    /// Produces the concrete value, forcing the referenced task if needed.
    fn resolve(self, scheduler: &Scheduler) -> Result<T, MatsuError>;
}

impl<T: 'static> Argument<T> for T {
    fn dependency(&self) -> Option<TaskId> {
        None
    }

    fn resolve(self, _: &Scheduler) -> Result<T, MatsuError> {
        Ok(self)
    }
}

impl<T: Clone + 'static> Argument<T> for FutureHandle<T> {
    fn dependency(&self) -> Option<TaskId> {
        Some(self.id)
    }

    fn resolve(self, scheduler: &Scheduler) -> Result<T, MatsuError> {
        scheduler.get_result(self)
    }
}

impl<T: Clone + 'static> Argument<T> for Arg<T> {
    fn dependency(&self) -> Option<TaskId> {
        Arg::dependency(self)
    }

    fn resolve(self, scheduler: &Scheduler) -> Result<T, MatsuError> {
        Arg::resolve(self, scheduler)
    }
}

/// A trait that enables a collection of [`Argument`]s to be used as the
/// argument list of a task.
///
/// Implemented for `()`, for a bare [`Argument`], for tuples of up to twelve
/// mixed literal/handle arguments, and for vectors of [`Arg<T>`] or
/// [`FutureHandle<T>`] (which resolve to a single `Vec<T>` value). It
/// provides the dependency ids recorded as graph edges at task creation, and
/// the resolution logic run when the task is forced.
pub trait Arguments<Values> {
    /// Returns the [`TaskId`] for each handle in the collection.
    fn dependencies(&self) -> Vec<TaskId>;

    /// Resolves every argument into its concrete value.
    ///
    /// Forcing is need-driven: each handle argument recursively forces the
    /// task it references unless that task is already computed.
    fn resolve(self, scheduler: &Scheduler) -> Result<Values, MatsuError>;
}

impl Arguments<()> for () {
    fn dependencies(&self) -> Vec<TaskId> {
        vec![]
    }

    fn resolve(self, _: &Scheduler) -> Result<(), MatsuError> {
        Ok(())
    }
}

impl<A, V> Arguments<(V,)> for A
where
    A: Argument<V>,
{
    fn dependencies(&self) -> Vec<TaskId> {
        self.dependency().into_iter().collect()
    }

    fn resolve(self, scheduler: &Scheduler) -> Result<(V,), MatsuError> {
        Ok((Argument::resolve(self, scheduler)?,))
    }
}

impl<T: Clone + 'static> Arguments<(Vec<T>,)> for Vec<Arg<T>> {
    fn dependencies(&self) -> Vec<TaskId> {
        self.iter().filter_map(Arg::dependency).collect()
    }

    fn resolve(self, scheduler: &Scheduler) -> Result<(Vec<T>,), MatsuError> {
        let mut values = Vec::with_capacity(self.len());

        for arg in self {
            values.push(arg.resolve(scheduler)?);
        }

        Ok((values,))
    }
}

impl<T: Clone + 'static> Arguments<(Vec<T>,)> for Vec<FutureHandle<T>> {
    fn dependencies(&self) -> Vec<TaskId> {
        self.iter().map(|handle| handle.id).collect()
    }

    fn resolve(self, scheduler: &Scheduler) -> Result<(Vec<T>,), MatsuError> {
        let mut values = Vec::with_capacity(self.len());

        for handle in self {
            values.push(scheduler.get_result(handle)?);
        }

        Ok((values,))
    }
}

macro_rules! impl_args {
    ($(($A:ident, $V:ident)),*) => {
        #[allow(non_snake_case)]
        impl<$($A, $V),*> Arguments<($($V,)*)> for ($($A,)*)
        where
            $($A: Argument<$V>),*
        {
            fn dependencies(&self) -> Vec<TaskId> {
                let ($($A,)*) = self;
                [$($A.dependency()),*].into_iter().flatten().collect()
            }

            fn resolve(self, scheduler: &Scheduler) -> Result<($($V,)*), MatsuError> {
                let ($($A,)*) = self;
                Ok(($($A.resolve(scheduler)?,)*))
            }
        }
    };
}

// NOTE: arity-1 tuples are intentionally not implemented here. The blanket
// `impl<A, V> Arguments<(V,)> for A where A: Argument<V>` above already covers
// the single-argument case, and because `Argument<T>` is implemented for every
// `T`, a `impl_args!((A1, V1))` invocation would overlap with that blanket
// (conflicting-implementations error). Tuple support therefore starts at arity 2.
impl_args!((A1, V1), (A2, V2));
impl_args!((A1, V1), (A2, V2), (A3, V3));
impl_args!((A1, V1), (A2, V2), (A3, V3), (A4, V4));
impl_args!((A1, V1), (A2, V2), (A3, V3), (A4, V4), (A5, V5));
impl_args!((A1, V1), (A2, V2), (A3, V3), (A4, V4), (A5, V5), (A6, V6));
impl_args!((A1, V1), (A2, V2), (A3, V3), (A4, V4), (A5, V5), (A6, V6), (A7, V7));
impl_args!((A1, V1), (A2, V2), (A3, V3), (A4, V4), (A5, V5), (A6, V6), (A7, V7), (A8, V8));
impl_args!(
    (A1, V1),
    (A2, V2),
    (A3, V3),
    (A4, V4),
    (A5, V5),
    (A6, V6),
    (A7, V7),
    (A8, V8),
    (A9, V9)
);
impl_args!(
    (A1, V1),
    (A2, V2),
    (A3, V3),
    (A4, V4),
    (A5, V5),
    (A6, V6),
    (A7, V7),
    (A8, V8),
    (A9, V9),
    (A10, V10)
);
impl_args!(
    (A1, V1),
    (A2, V2),
    (A3, V3),
    (A4, V4),
    (A5, V5),
    (A6, V6),
    (A7, V7),
    (A8, V8),
    (A9, V9),
    (A10, V10),
    (A11, V11)
);
impl_args!(
    (A1, V1),
    (A2, V2),
    (A3, V3),
    (A4, V4),
    (A5, V5),
    (A6, V6),
    (A7, V7),
    (A8, V8),
    (A9, V9),
    (A10, V10),
    (A11, V11),
    (A12, V12)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_has_no_dependency() {
        assert_eq!(Argument::<i32>::dependency(&5), None);
        assert_eq!(Arg::Value(5).dependency(), None);
    }

    #[test]
    fn test_handle_reports_dependency() {
        let handle = FutureHandle::<i32>::new(TaskId::from(3));
        assert_eq!(Argument::<i32>::dependency(&handle), Some(TaskId::from(3)));
        assert_eq!(Arg::<i32>::from(handle).dependency(), Some(TaskId::from(3)));
    }

    #[test]
    fn test_tuple_collects_handle_dependencies_in_order() {
        let first = FutureHandle::<i32>::new(TaskId::from(0));
        let second = FutureHandle::<String>::new(TaskId::from(2));
        let args = (first, 5_i32, second);

        let deps: Vec<usize> = Arguments::<(i32, i32, String)>::dependencies(&args)
            .into_iter()
            .map(TaskId::index)
            .collect();

        assert_eq!(deps, vec![0, 2]);
    }

    #[test]
    fn test_vec_of_args_collects_dependencies() {
        let handle = FutureHandle::<i32>::new(TaskId::from(1));
        let args = vec![Arg::Value(1), Arg::from(handle), Arg::Value(3)];

        let deps = Arguments::<(Vec<i32>,)>::dependencies(&args);
        assert_eq!(deps, vec![TaskId::from(1)]);
    }

    #[test]
    fn test_unit_has_no_dependencies() {
        assert!(Arguments::<()>::dependencies(&()).is_empty());
    }
}
