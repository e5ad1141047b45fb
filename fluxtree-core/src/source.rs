//! # Driving a stream
//!
//! [`EventSource`] is the minimal pull interface a concrete transport (a byte
//! reader wrapped in a tokenizer, an in-memory `Vec<Event>`, a socket) must
//! implement to be driven by [`parse`]. The driver loop itself is the one
//! place in this crate that is not a [`Handler`]: it owns the source, feeds
//! the handler one event at a time, and stops as soon as either side says to.

use crate::combinators::unwrap_safe;
use crate::error::FluxError;
use crate::handler::Handler;
use crate::outcome::Outcome;
use std::cell::Cell;
use std::error::Error;

/// A pull-based source of events. Implementations own whatever resource
/// (file handle, socket, buffer) produces events and release it in [`close`].
///
/// [`close`]: EventSource::close
pub trait EventSource {
    /// The event type this source produces.
    type Event;
    /// The error type a malformed or interrupted source can report.
    type Err: Error;

    /// Pull the next event, or `None` at end of stream.
    fn next_event(&mut self) -> Option<Result<Self::Event, Self::Err>>;

    /// Release any resource held by this source. Called at most once, even
    /// if [`parse`] returns early because the handler finished before the
    /// source was exhausted. The default does nothing.
    fn close(&mut self) {}
}

/// Ensures [`EventSource::close`] runs exactly once, however [`parse`]
/// returns — early termination, exhaustion, or (in caller code built on top
/// of this crate) a panic unwinding through the driver loop.
struct CloseGuard<'a, S: EventSource> {
    source: &'a mut S,
    closed: Cell<bool>,
}

impl<'a, S: EventSource> CloseGuard<'a, S> {
    fn new(source: &'a mut S) -> Self {
        Self {
            source,
            closed: Cell::new(false),
        }
    }

    fn next_event(&mut self) -> Option<Result<S::Event, S::Err>> {
        self.source.next_event()
    }
}

impl<'a, S: EventSource> Drop for CloseGuard<'a, S> {
    fn drop(&mut self) {
        if !self.closed.replace(true) {
            self.source.close();
        }
    }
}

/// Drive `source` through `handler` until the handler finishes or the source
/// is exhausted, whichever comes first.
///
/// Four steps per iteration: check `is_finished`, pull the next event, feed
/// it to the handler (`handle_input` for a well-formed event, `handle_error`
/// for a source-level fault), and stop as soon as that feed returns a
/// result. If the source runs dry first, `handle_end` supplies the handler's
/// terminal result.
pub fn parse<S, H>(source: &mut S, mut handler: H) -> H::Out
where
    S: EventSource,
    H: Handler<In = S::Event>,
{
    let mut guard = CloseGuard::new(source);
    loop {
        if handler.is_finished() {
            break;
        }
        match guard.next_event() {
            None => break,
            Some(Ok(event)) => {
                if let Some(result) = handler.handle_input(event) {
                    return result;
                }
            }
            Some(Err(err)) => {
                let fault = FluxError::Source(err.to_string());
                #[cfg(feature = "tracing")]
                tracing::debug!(%fault, "source fault delivered to handler");
                if let Some(result) = handler.handle_error(fault) {
                    return result;
                }
            }
        }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!("source exhausted, finalizing handler");
    handler.handle_end()
}

/// [`parse`] for handlers whose result is an [`Outcome`], surfaced as a
/// plain [`Result`] for callers who don't want to think about `Empty` —
/// built on [`unwrap_safe`].
pub fn parse_result<S, H, T>(source: &mut S, handler: H) -> Result<T, FluxError>
where
    S: EventSource,
    H: Handler<In = S::Event, Out = Outcome<T>>,
{
    unwrap_safe(parse(source, handler))
}
