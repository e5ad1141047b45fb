//! # The Handler Protocol
//!
//! A [`Handler`] is a push-driven state machine: the driver (or a parent
//! handler) feeds it events one at a time, and it emits at most one result
//! over its lifetime.
//!
//! # Protocol
//!
//! A handler receives exactly one terminating signal per lifetime: a `Some`
//! from [`Handler::handle_input`]/[`Handler::handle_error`], or the return of
//! [`Handler::handle_end`]. `is_finished` transitions `false -> true` at most
//! once; once it returns `true`, no further `handle_*` call may be made.
//! `handle_end` is called at most once, and never after a `Some` result.
//!
//! This is the one primitive every other component in this crate is built
//! from: [`crate::splitter::Splitter`], [`crate::compound::CompoundHandler2`],
//! and [`crate::funnel::FunnelledTransformerHandler`] are all `Handler`
//! implementations composed from smaller ones.

use crate::error::FluxError;

/// A mutable, single-owner state machine driven by one event at a time.
pub trait Handler {
    /// The event type this handler consumes.
    type In;
    /// The result type this handler eventually produces.
    type Out;

    /// `true` once this handler has produced its terminal result. Monotonic:
    /// never `true` then `false` again over this handler's lifetime.
    fn is_finished(&self) -> bool;

    /// Feed one event. `Some(result)` means the handler is now finished and
    /// this is its terminal result; `None` means keep delivering events.
    fn handle_input(&mut self, input: Self::In) -> Option<Self::Out>;

    /// Report an input-level fault (e.g. a malformed token from the source).
    /// The handler may absorb it (`None`), terminate with it (`Some`), or let
    /// it propagate (the caller should treat a returned `None` as "continue";
    /// genuine protocol faults are communicated by panicking, not by this
    /// return value).
    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        let _ = error;
        None
    }

    /// Called exactly once, when the event source is exhausted and no
    /// `Some` result was produced by `handle_input`/`handle_error`.
    fn handle_end(&mut self) -> Self::Out;
}

/// Object-safe boxed handler, used throughout the kernel to erase the
/// concrete type of an inner/child handler once it is installed into a
/// composite (see [`crate::middleman::ContextMiddlemanHandler`],
/// [`crate::combinators::one_of`]).
pub type BoxHandler<In, Out> = Box<dyn Handler<In = In, Out = Out>>;

impl<H: Handler + ?Sized> Handler for Box<H> {
    type In = H::In;
    type Out = H::Out;

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn handle_input(&mut self, input: Self::In) -> Option<Self::Out> {
        (**self).handle_input(input)
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        (**self).handle_error(error)
    }

    fn handle_end(&mut self) -> Self::Out {
        (**self).handle_end()
    }
}
