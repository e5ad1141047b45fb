//! # FunnelledTransformerHandler
//!
//! Merges several [`crate::parser::Transformer`]s that share an input type
//! into one downstream handler. Each transformer is wired to a
//! [`GuardedDownstream`] proxy that forwards `handle_input`/`handle_error` but
//! swallows `handle_end` (returning [`FunnelOutcome::IgnoredEnd`]) so that one
//! funnel finishing does not prematurely end the shared downstream.
//!
//! Because N funnels must share one downstream handler, and Rust ownership
//! otherwise prevents that, the downstream lives behind a single-threaded
//! `Rc<RefCell<_>>` — the idiomatic stand-in for shared mutable state when a
//! tree is, by construction (see the crate's concurrency model), exclusively
//! driven by one thread.
//!
//! **On early funnel completion**: a transformer *may* legitimately keep
//! emitting through the shared downstream after another funnel has already
//! observed end-of-input and gone quiet — `handle_end` only reaches the real
//! downstream once every funnel has finished.

use crate::error::FluxError;
use crate::handler::{BoxHandler, Handler};
use std::cell::RefCell;
use std::rc::Rc;

/// What a funnel produced for one event: a real result from the shared
/// downstream, or a sentinel meaning "this funnel finished, but its
/// `handle_end` was swallowed rather than ending the shared downstream".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunnelOutcome<Out> {
    /// The shared downstream actually produced a result.
    Result(Out),
    /// A funnel's own `handle_end` was called and swallowed.
    IgnoredEnd,
}

/// Forwards `handle_input`/`handle_error` to the shared downstream but
/// swallows `handle_end`.
pub struct GuardedDownstream<D> {
    downstream: Rc<RefCell<D>>,
}

impl<D> GuardedDownstream<D> {
    /// Wrap a shared downstream handler.
    pub fn new(downstream: Rc<RefCell<D>>) -> Self {
        Self { downstream }
    }
}

impl<D> Handler for GuardedDownstream<D>
where
    D: Handler,
{
    type In = D::In;
    type Out = FunnelOutcome<D::Out>;

    fn is_finished(&self) -> bool {
        self.downstream.borrow().is_finished()
    }

    fn handle_input(&mut self, input: D::In) -> Option<Self::Out> {
        self.downstream
            .borrow_mut()
            .handle_input(input)
            .map(FunnelOutcome::Result)
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        self.downstream
            .borrow_mut()
            .handle_error(error)
            .map(FunnelOutcome::Result)
    }

    fn handle_end(&mut self) -> Self::Out {
        FunnelOutcome::IgnoredEnd
    }
}

/// See the module docs. `E` is the shared input event type; `D` the real
/// downstream handler every funnel ultimately feeds.
pub struct FunnelledTransformerHandler<E, D>
where
    D: Handler,
{
    funnels: Vec<BoxHandler<E, FunnelOutcome<D::Out>>>,
    downstream: Rc<RefCell<D>>,
    finished: bool,
}

impl<E, D> FunnelledTransformerHandler<E, D>
where
    D: Handler + 'static,
{
    /// Build a funnelled handler from already-wired funnel handlers (each
    /// built by calling a [`crate::parser::Transformer::make_handler`] with a
    /// [`GuardedDownstream`] cloned from `downstream`, via [`Self::share`])
    /// and the shared real downstream.
    ///
    /// `Transformer::make_handler` is generic over its downstream type, which
    /// keeps `Transformer` itself out of a trait object — so callers erase
    /// each transformer to a `BoxHandler` one at a time, here, rather than
    /// collecting `dyn Transformer`s first.
    pub fn new(funnels: Vec<BoxHandler<E, FunnelOutcome<D::Out>>>, downstream: Rc<RefCell<D>>) -> Self {
        Self {
            funnels,
            downstream,
            finished: false,
        }
    }

    /// A convenience accessor for transformer construction: a fresh, cheaply
    /// cloned handle to the shared downstream for wiring into
    /// [`GuardedDownstream`].
    pub fn share(downstream: &Rc<RefCell<D>>) -> Rc<RefCell<D>> {
        Rc::clone(downstream)
    }

    fn all_funnels_finished(&self) -> bool {
        self.funnels.iter().all(|f| f.is_finished())
    }
}

impl<E, D> Handler for FunnelledTransformerHandler<E, D>
where
    E: Clone,
    D: Handler + 'static,
{
    type In = E;
    type Out = D::Out;

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle_input(&mut self, input: E) -> Option<Self::Out> {
        for funnel in self.funnels.iter_mut() {
            if funnel.is_finished() {
                continue;
            }
            if let Some(FunnelOutcome::Result(r)) = funnel.handle_input(input.clone()) {
                self.finished = true;
                return Some(r);
            }
        }
        if self.all_funnels_finished() {
            self.finished = true;
            return Some(self.downstream.borrow_mut().handle_end());
        }
        None
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        for funnel in self.funnels.iter_mut() {
            if funnel.is_finished() {
                continue;
            }
            if let Some(FunnelOutcome::Result(r)) = funnel.handle_error(error.clone()) {
                self.finished = true;
                return Some(r);
            }
        }
        if self.all_funnels_finished() {
            self.finished = true;
            return Some(self.downstream.borrow_mut().handle_end());
        }
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        for funnel in self.funnels.iter_mut() {
            if funnel.is_finished() {
                continue;
            }
            if let FunnelOutcome::Result(r) = funnel.handle_end() {
                self.finished = true;
                return r;
            }
        }
        self.finished = true;
        self.downstream.borrow_mut().handle_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarded_downstream_swallows_end() {
        struct EndCounter(u32);
        impl Handler for EndCounter {
            type In = ();
            type Out = u32;
            fn is_finished(&self) -> bool {
                false
            }
            fn handle_input(&mut self, _input: ()) -> Option<Self::Out> {
                None
            }
            fn handle_end(&mut self) -> Self::Out {
                self.0 += 1;
                self.0
            }
        }

        let shared = Rc::new(RefCell::new(EndCounter(0)));
        let mut guarded = GuardedDownstream::new(Rc::clone(&shared));
        assert_eq!(guarded.handle_end(), FunnelOutcome::IgnoredEnd);
        // The real downstream was never actually ended.
        assert_eq!(shared.borrow().0, 0);
    }

    // Exercised end-to-end (two Splitters funnelled into one list) in
    // tests/funnel.rs using `fluxtree-formats` event fixtures.
}
