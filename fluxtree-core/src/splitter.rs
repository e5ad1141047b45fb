//! # Splitter
//!
//! Slices an event stream into sub-streams keyed by a matched context,
//! driving a [`ContextMiddlemanHandler`] with `context_start`/`context_end`
//! signals. The close is purely structural (depth-based): the matcher only
//! runs on entry, so closing is immune to re-evaluation cost and to
//! nested-false-positive bugs.

use crate::context::{ContextStack, ContextMatcher, MatchOutcome};
use crate::error::FluxError;
use crate::event::{ContextChange, StreamEvent};
use crate::handler::{BoxHandler, Handler};
use crate::middleman::ContextMiddlemanHandler;
use crate::outcome::Outcome;
use crate::parser::{Parser, Transformer};

/// See the module docs. `M` is the path matcher; `P` the parser factory
/// bound to each match; `D` the downstream handler receiving each matched
/// sub-stream's [`Outcome`].
pub struct Splitter<E, M, P, D>
where
    E: StreamEvent,
    M: ContextMatcher<E::Frame>,
    P: Parser<E, M::Ctx>,
    D: Handler<In = Outcome<P::Out>>,
{
    matcher: M,
    stack: ContextStack<E::Frame>,
    open_depth: Option<usize>,
    middleman: ContextMiddlemanHandler<E, M::Ctx, P, D>,
}

impl<E, M, P, D> Splitter<E, M, P, D>
where
    E: StreamEvent,
    M: ContextMatcher<E::Frame>,
    P: Parser<E, M::Ctx>,
    D: Handler<In = Outcome<P::Out>>,
{
    /// Build a splitter matching `matcher`, instantiating `factory` for each
    /// matched sub-stream and funneling results into `downstream`.
    pub fn new(matcher: M, factory: P, downstream: D) -> Self {
        Self {
            matcher,
            stack: ContextStack::new(),
            open_depth: None,
            middleman: ContextMiddlemanHandler::new(factory, downstream),
        }
    }

    fn try_open(&mut self) -> Option<D::Out> {
        match self.matcher.try_match(self.stack.as_slice()) {
            MatchOutcome::NoMatch => None,
            MatchOutcome::Matched { ctx, .. } => {
                self.open_depth = Some(self.stack.depth());
                #[cfg(feature = "tracing")]
                tracing::trace!(depth = self.stack.depth(), "context_start");
                self.middleman.context_start(Ok(ctx))
            }
            MatchOutcome::Failed(e) => {
                self.open_depth = Some(self.stack.depth());
                self.middleman.context_start(Err(e))
            }
        }
    }

    fn maybe_close(&mut self) -> Option<D::Out> {
        let Some(d) = self.open_depth else {
            return None;
        };
        if self.stack.depth() < d {
            self.open_depth = None;
            #[cfg(feature = "tracing")]
            tracing::trace!(depth = self.stack.depth(), "context_end");
            self.middleman.context_end()
        } else {
            None
        }
    }
}

impl<E, M, P, D> Handler for Splitter<E, M, P, D>
where
    E: StreamEvent,
    M: ContextMatcher<E::Frame>,
    P: Parser<E, M::Ctx>,
    D: Handler<In = Outcome<P::Out>>,
{
    type In = E;
    type Out = D::Out;

    fn is_finished(&self) -> bool {
        self.middleman.is_finished()
    }

    fn handle_input(&mut self, event: E) -> Option<Self::Out> {
        let change = event.context_change();

        if let ContextChange::Push(frame) = &change {
            self.stack.push(frame.clone());
            if self.open_depth.is_none() {
                if let Some(r) = self.try_open() {
                    return Some(r);
                }
            }
        }

        if let Some(r) = self.middleman.handle_input(event) {
            return Some(r);
        }

        if let ContextChange::Pop = change {
            self.stack.pop();
            if let Some(r) = self.maybe_close() {
                return Some(r);
            }
        }

        None
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        self.middleman.handle_error(error)
    }

    fn handle_end(&mut self) -> Self::Out {
        self.middleman.handle_end()
    }
}

/// A [`Transformer`] that feeds each matched sub-stream to a fresh [`Parser`]
/// instance and forwards its [`Outcome`] downstream — the funnel-construction
/// counterpart to [`Splitter`], which instead owns its downstream directly.
///
/// Kept separate from `Splitter` itself because a funnel needs to build many
/// such handlers against a downstream it doesn't own yet (see
/// [`crate::funnel::FunnelledTransformerHandler`]), so `matcher`/`factory` are
/// cloned into a fresh `Splitter` per call rather than consumed once.
pub struct SplitterTransformer<M, P> {
    matcher: M,
    factory: P,
}

impl<M, P> SplitterTransformer<M, P> {
    /// Wrap a matcher and parser factory for later use as a [`Transformer`].
    pub fn new(matcher: M, factory: P) -> Self {
        Self { matcher, factory }
    }
}

impl<E, M, P> Transformer<E, Outcome<P::Out>> for SplitterTransformer<M, P>
where
    E: StreamEvent,
    M: ContextMatcher<E::Frame> + Clone,
    P: Parser<E, M::Ctx> + Clone,
{
    fn make_handler<D>(&self, downstream: D) -> BoxHandler<E, D::Out>
    where
        D: Handler<In = Outcome<P::Out>> + 'static,
        D::Out: 'static,
        E: 'static,
        Outcome<P::Out>: 'static,
    {
        Box::new(Splitter::new(
            self.matcher.clone(),
            self.factory.clone(),
            downstream,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::CollectList;

    #[derive(Clone, Debug, PartialEq)]
    enum Frame {
        Blog,
        Post,
    }

    #[derive(Clone, Debug)]
    enum Ev {
        OpenBlog,
        OpenPost(&'static str),
        ClosePost,
        CloseBlog,
    }

    impl StreamEvent for Ev {
        type Frame = Frame;

        fn context_change(&self) -> ContextChange<Frame> {
            match self {
                Ev::OpenBlog => ContextChange::Push(Frame::Blog),
                Ev::OpenPost(_) => ContextChange::Push(Frame::Post),
                Ev::ClosePost | Ev::CloseBlog => ContextChange::Pop,
            }
        }
    }

    struct DateParser;

    struct DateHandler {
        date: Option<&'static str>,
        done: bool,
    }

    impl Handler for DateHandler {
        type In = Ev;
        type Out = Outcome<&'static str>;

        fn is_finished(&self) -> bool {
            self.done
        }

        fn handle_input(&mut self, input: Ev) -> Option<Self::Out> {
            if let Ev::OpenPost(date) = input {
                self.date = Some(date);
            }
            None
        }

        fn handle_end(&mut self) -> Self::Out {
            self.done = true;
            match self.date {
                Some(d) => Outcome::Success(d),
                None => Outcome::Empty,
            }
        }
    }

    impl Parser<Ev, ()> for DateParser {
        type Out = &'static str;

        fn make_handler(&self, _ctx: ()) -> BoxHandler<Ev, Outcome<&'static str>> {
            Box::new(DateHandler {
                date: None,
                done: false,
            })
        }
    }

    use crate::context::FramePredicate;

    fn blog_post_matcher() -> impl ContextMatcher<Frame, Ctx = ()> {
        FramePredicate::new(|f: &Frame| *f == Frame::Blog)
            .then(FramePredicate::new(|f: &Frame| *f == Frame::Post))
    }

    #[test]
    fn nested_splitter_collects_in_order() {
        let mut splitter = Splitter::new(blog_post_matcher(), DateParser, CollectList::new());

        let events = [
            Ev::OpenBlog,
            Ev::OpenPost("2015-11-16"),
            Ev::ClosePost,
            Ev::OpenPost("2015-11-17"),
            Ev::ClosePost,
            Ev::CloseBlog,
        ];

        let mut result = None;
        for e in events {
            if let Some(r) = splitter.handle_input(e) {
                result = Some(r);
                break;
            }
        }
        let result = result.unwrap_or_else(|| splitter.handle_end());
        assert_eq!(result, Outcome::Success(vec!["2015-11-16", "2015-11-17"]));
    }

    #[test]
    fn splitter_balance_open_close_counts_match() {
        let mut splitter = Splitter::new(blog_post_matcher(), DateParser, CollectList::new());
        let events = [
            Ev::OpenBlog,
            Ev::OpenPost("a"),
            Ev::ClosePost,
            Ev::OpenPost("b"),
            Ev::ClosePost,
            Ev::CloseBlog,
        ];
        for e in events {
            splitter.handle_input(e);
        }
        // Both sub-streams closed cleanly: no sub-stream left dangling open.
        assert!(splitter.open_depth.is_none());
    }
}
