//! # ContextMiddlemanHandler
//!
//! Installs a fresh inner handler each time a matching sub-stream begins,
//! and funnels its single result downstream. Driven entirely by explicit
//! calls from a [`crate::splitter::Splitter`] (`context_start`/`context_end`)
//! plus raw event forwarding (`handle_input`/`handle_error`) — it does not
//! implement [`crate::handler::Handler`] itself, since its lifecycle is more
//! than "one event in, maybe a result out": it also reacts to structural
//! open/close signals the Splitter computes from the context stack.

use crate::error::FluxError;
use crate::handler::{BoxHandler, Handler};
use crate::outcome::Outcome;
use crate::parser::Parser;

/// See the module docs. `E` is the event type, `Ctx` the value a matched
/// sub-stream's context extracts, `P` the parser factory bound at each
/// `context_start`, and `D` the downstream handler receiving each
/// sub-stream's [`Outcome`].
pub struct ContextMiddlemanHandler<E, Ctx, P, D>
where
    P: Parser<E, Ctx>,
    D: Handler<In = Outcome<P::Out>>,
{
    factory: P,
    downstream: D,
    inner: Option<BoxHandler<E, Outcome<P::Out>>>,
    _marker: std::marker::PhantomData<(E, Ctx)>,
}

impl<E, Ctx, P, D> ContextMiddlemanHandler<E, Ctx, P, D>
where
    P: Parser<E, Ctx>,
    D: Handler<In = Outcome<P::Out>>,
{
    /// Build a middleman funneling into `downstream`, instantiating `factory`
    /// fresh for every matched sub-stream.
    pub fn new(factory: P, downstream: D) -> Self {
        Self {
            factory,
            downstream,
            inner: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// `true` once the downstream handler itself is finished.
    pub fn is_finished(&self) -> bool {
        self.downstream.is_finished()
    }

    /// A matching sub-stream began. The Splitter guarantees this is never
    /// called while `inner` is already active (the non-nesting invariant).
    pub fn context_start(&mut self, ctx: Result<Ctx, FluxError>) -> Option<D::Out> {
        match ctx {
            Ok(c) => {
                debug_assert!(self.inner.is_none(), "context_start while inner is active");
                self.inner = Some(self.factory.make_handler(c));
                None
            }
            Err(e) => {
                self.inner = None;
                self.downstream.handle_error(e)
            }
        }
    }

    /// Forward a raw event. Dropped silently if no sub-stream is open.
    pub fn handle_input(&mut self, event: E) -> Option<D::Out> {
        let Some(inner) = self.inner.as_mut() else {
            return None;
        };
        match inner.handle_input(event) {
            Some(result) => {
                self.inner = None;
                self.downstream.handle_input(result)
            }
            None => None,
        }
    }

    /// Same rules as `handle_input`, but for a source-level fault.
    pub fn handle_error(&mut self, error: FluxError) -> Option<D::Out> {
        let Some(inner) = self.inner.as_mut() else {
            return None;
        };
        match inner.handle_error(error) {
            Some(result) => {
                self.inner = None;
                self.downstream.handle_input(result)
            }
            None => None,
        }
    }

    /// The open sub-stream closed. Finalize the inner handler (if any) and
    /// forward its result downstream.
    pub fn context_end(&mut self) -> Option<D::Out> {
        let Some(mut inner) = self.inner.take() else {
            return None;
        };
        let result = inner.handle_end();
        self.downstream.handle_input(result)
    }

    /// The whole event stream ended. Finalize any still-open sub-stream,
    /// then end the downstream handler.
    pub fn handle_end(&mut self) -> D::Out {
        if let Some(mut inner) = self.inner.take() {
            let result = inner.handle_end();
            if let Some(out) = self.downstream.handle_input(result) {
                return out;
            }
        }
        self.downstream.handle_end()
    }
}
