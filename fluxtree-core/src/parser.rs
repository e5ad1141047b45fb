//! Immutable handler factories: [`Parser`], [`Consumer`], [`Transformer`].
//!
//! A factory is stateless and shareable (`Clone`); each call to
//! `make_handler` produces a fresh, independently-owned [`Handler`].

use crate::handler::{BoxHandler, Handler};
use crate::outcome::Outcome;

/// A factory producing a handler that computes a single [`Outcome`] from a
/// stream of `E` events, given a context value extracted by a
/// [`crate::context::ContextMatcher`] at the point the sub-stream opened.
pub trait Parser<E, Ctx = ()> {
    /// The value this parser extracts.
    type Out;

    /// Build a fresh handler bound to `ctx`.
    fn make_handler(&self, ctx: Ctx) -> BoxHandler<E, Outcome<Self::Out>>;
}

/// A [`Parser`] that needs no context — `Parser<E, ()>`.
pub trait Consumer<E>: Parser<E, ()> {}

impl<E, T> Consumer<E> for T where T: Parser<E, ()> {}

/// A factory producing a handler that re-emits a derived stream of `A` to a
/// downstream handler, rather than computing a single result itself.
///
/// `Transformer::make_handler` takes ownership of the downstream handler and
/// returns a handler over the *input* event type whose output type is
/// whatever the downstream produces.
pub trait Transformer<E, A> {
    /// Wrap `downstream` so it receives the `A` values this transformer emits.
    fn make_handler<D>(&self, downstream: D) -> BoxHandler<E, D::Out>
    where
        D: Handler<In = A> + 'static,
        D::Out: 'static,
        E: 'static,
        A: 'static;
}
