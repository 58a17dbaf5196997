//! Uniform invocation of the callables a task can be built from.
//!
//! Two callable shapes exist, chosen once at task-construction time:
//!
//! * [`TaskFn`]: a free function or closure over the resolved argument
//!   values, returning `anyhow::Result`.
//! * [`BoundFn`]: a plain method invoked on a receiver reached through
//!   [`Receiver`], which unifies owned values, shared pointers and interior
//!   mutable cells behind one access operation.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// A fallible callable over a resolved argument tuple.
///
/// Implemented for `FnMut` functions and closures of up to twelve arguments.
/// Forcing a task calls this exactly once; the `FnMut` bound keeps closures
/// over mutable captured state (counters, accumulators) usable.
pub trait TaskFn<Args, Out> {
    fn call(&mut self, args: Args) -> anyhow::Result<Out>;
}

macro_rules! impl_task_fn {
    ($($V:ident),*) => {
        #[allow(non_snake_case)]
        impl<Func, Out $(,$V)*> TaskFn<($($V,)*), Out> for Func
        where
            Func: FnMut($($V),*) -> anyhow::Result<Out>,
        {
            fn call(&mut self, ($($V,)*): ($($V,)*)) -> anyhow::Result<Out> {
                self($($V),*)
            }
        }
    };
}

impl_task_fn!();
impl_task_fn!(V1);
impl_task_fn!(V1, V2);
impl_task_fn!(V1, V2, V3);
impl_task_fn!(V1, V2, V3, V4);
impl_task_fn!(V1, V2, V3, V4, V5);
impl_task_fn!(V1, V2, V3, V4, V5, V6);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7, V8);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10, V11);
impl_task_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10, V11, V12);

/// A method invoked on a receiver of type `T`, over a resolved argument
/// tuple.
///
/// Method paths work directly: `Adder::add` with signature
/// `fn add(&self, a: f32) -> f32` implements `BoundFn<Adder, (f32,), f32>`.
pub trait BoundFn<T, Args, Out> {
    fn call(&mut self, receiver: &T, args: Args) -> Out;
}

macro_rules! impl_bound_fn {
    ($($V:ident),*) => {
        #[allow(non_snake_case)]
        impl<Func, T, Out $(,$V)*> BoundFn<T, ($($V,)*), Out> for Func
        where
            Func: FnMut(&T, $($V),*) -> Out,
        {
            fn call(&mut self, receiver: &T, ($($V,)*): ($($V,)*)) -> Out {
                self(receiver $(,$V)*)
            }
        }
    };
}

impl_bound_fn!();
impl_bound_fn!(V1);
impl_bound_fn!(V1, V2);
impl_bound_fn!(V1, V2, V3);
impl_bound_fn!(V1, V2, V3, V4);
impl_bound_fn!(V1, V2, V3, V4, V5);
impl_bound_fn!(V1, V2, V3, V4, V5, V6);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7, V8);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10, V11);
impl_bound_fn!(V1, V2, V3, V4, V5, V6, V7, V8, V9, V10, V11, V12);

/// Uniform access to the receiver of a bound method.
///
/// The receiver kind is fixed when the task is constructed:
///
/// * a value of `T` itself, moved into the task;
/// * a pointer-like `Rc<T>`, `Arc<T>` or `Box<T>`, dereferenced on access;
/// * an `Rc<RefCell<T>>`, borrowed on access, for receivers the caller
///   keeps shared mutable access to.
pub trait Receiver<T>: 'static {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R;
}

impl<T: 'static> Receiver<T> for T {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R {
        access(self)
    }
}

impl<T: 'static> Receiver<T> for Rc<T> {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R {
        access(self.as_ref())
    }
}

impl<T: 'static> Receiver<T> for Arc<T> {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R {
        access(self.as_ref())
    }
}

impl<T: 'static> Receiver<T> for Box<T> {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R {
        access(self.as_ref())
    }
}

impl<T: 'static> Receiver<T> for Rc<RefCell<T>> {
    fn with<R>(&self, access: impl FnOnce(&T) -> R) -> R {
        let value = self.borrow();
        access(&value)
    }
}
