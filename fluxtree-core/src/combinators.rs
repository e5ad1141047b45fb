//! # Combinator Surface
//!
//! `map`, `and`/`combine` (`as` is a Rust keyword, so the finalizing-and-
//! flattening combinator is spelled `combine` here), `first`, `as_list_of`,
//! `one_of`, and the `wrap_safe`/`unwrap_safe` interop pair.

use crate::compound::CompoundHandler2;
use crate::context::ContextMatcher;
use crate::error::FluxError;
use crate::event::StreamEvent;
use crate::handler::{BoxHandler, Handler};
use crate::outcome::Outcome;
use crate::parser::Parser;
use crate::splitter::Splitter;

// ---------------------------------------------------------------------
// map
// ---------------------------------------------------------------------

/// A parser whose successful result has been transformed by `f`. Built by
/// [`ParserExt::map`].
pub struct MapParser<P, F> {
    inner: P,
    f: F,
}

struct MappedHandler<H, F> {
    inner: H,
    f: F,
}

impl<E, T, U, H, F> Handler for MappedHandler<H, F>
where
    H: Handler<In = E, Out = Outcome<T>>,
    F: Fn(T) -> U,
{
    type In = E;
    type Out = Outcome<U>;

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn handle_input(&mut self, input: E) -> Option<Self::Out> {
        self.inner
            .handle_input(input)
            .map(|o| o.map(|v| (self.f)(v)))
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        self.inner
            .handle_error(error)
            .map(|o| o.map(|v| (self.f)(v)))
    }

    fn handle_end(&mut self) -> Self::Out {
        self.inner.handle_end().map(|v| (self.f)(v))
    }
}

impl<E, Ctx, P, F, U> Parser<E, Ctx> for MapParser<P, F>
where
    P: Parser<E, Ctx>,
    F: Fn(P::Out) -> U + Clone + 'static,
    E: 'static,
    P::Out: 'static,
    U: 'static,
{
    type Out = U;

    fn make_handler(&self, ctx: Ctx) -> BoxHandler<E, Outcome<U>> {
        Box::new(MappedHandler {
            inner: self.inner.make_handler(ctx),
            f: self.f.clone(),
        })
    }
}

// ---------------------------------------------------------------------
// and / combine (the Combined1..22 replacement)
// ---------------------------------------------------------------------

/// Two parsers run in lock-step; their results are combined into a `(A, B)`
/// tuple per [`CompoundHandler2`]'s error policy. Built by [`ParserExt::and`].
pub struct AndParser<P, Q> {
    p: P,
    q: Q,
}

impl<E, Ctx, P, Q> Parser<E, Ctx> for AndParser<P, Q>
where
    Ctx: Clone,
    P: Parser<E, Ctx>,
    Q: Parser<E, Ctx>,
    E: Clone + 'static,
    P::Out: 'static,
    Q::Out: 'static,
{
    type Out = (P::Out, Q::Out);

    fn make_handler(&self, ctx: Ctx) -> BoxHandler<E, Outcome<(P::Out, Q::Out)>> {
        let h1 = self.p.make_handler(ctx.clone());
        let h2 = self.q.make_handler(ctx);
        Box::new(CompoundHandler2::new(h1, h2))
    }
}

/// Flattens a left-nested tuple of pairs — the shape `.and()` builds when
/// chained (`((A, B), C)`, `(((A, B), C), D)`, …) — into a flat tuple, ready
/// for [`ParserExt::combine`]. Hand-unrolled for the arities actually used in
/// practice (2..6); the nesting shape doesn't macro-expand as cleanly as the
/// flat-tuple families elsewhere in this crate (see
/// `crate::context::ContextMatcherExt`).
pub trait FlattenPairs {
    /// The flat tuple shape.
    type Flat;
    /// Perform the flattening.
    fn flatten(self) -> Self::Flat;
}

impl<A, B> FlattenPairs for (A, B) {
    type Flat = (A, B);
    fn flatten(self) -> Self::Flat {
        self
    }
}

impl<A, B, C> FlattenPairs for ((A, B), C) {
    type Flat = (A, B, C);
    fn flatten(self) -> Self::Flat {
        let ((a, b), c) = self;
        (a, b, c)
    }
}

impl<A, B, C, D> FlattenPairs for (((A, B), C), D) {
    type Flat = (A, B, C, D);
    fn flatten(self) -> Self::Flat {
        let (((a, b), c), d) = self;
        (a, b, c, d)
    }
}

impl<A, B, C, D, E> FlattenPairs for ((((A, B), C), D), E) {
    type Flat = (A, B, C, D, E);
    fn flatten(self) -> Self::Flat {
        let ((((a, b), c), d), e) = self;
        (a, b, c, d, e)
    }
}

impl<A, B, C, D, E, F> FlattenPairs for (((((A, B), C), D), E), F) {
    type Flat = (A, B, C, D, E, F);
    fn flatten(self) -> Self::Flat {
        let (((((a, b), c), d), e), f) = self;
        (a, b, c, d, e, f)
    }
}

// ---------------------------------------------------------------------
// ParserExt: the fluent combinator surface
// ---------------------------------------------------------------------

/// Fluent combinators available on every [`Parser`].
pub trait ParserExt<E, Ctx>: Parser<E, Ctx> + Sized {
    /// Transform a successful result. Panics inside `f` become [`Outcome::Error`].
    fn map<F, U>(self, f: F) -> MapParser<Self, F>
    where
        F: Fn(Self::Out) -> U + Clone + 'static,
    {
        MapParser { inner: self, f }
    }

    /// Run `self` and `other` in lock-step on the same sub-stream, producing
    /// a nested-tuple result (see [`FlattenPairs`]).
    fn and<Q>(self, other: Q) -> AndParser<Self, Q>
    where
        Ctx: Clone,
        Q: Parser<E, Ctx>,
    {
        AndParser { p: self, q: other }
    }

    /// Flatten a `.and()`-nested tuple result into a flat tuple.
    fn as_tuple(self) -> MapParser<Self, fn(Self::Out) -> <Self::Out as FlattenPairs>::Flat>
    where
        Self::Out: FlattenPairs + 'static,
        <Self::Out as FlattenPairs>::Flat: 'static,
    {
        fn flatten_fn<T: FlattenPairs>(nested: T) -> T::Flat {
            nested.flatten()
        }
        self.map(flatten_fn::<Self::Out> as fn(Self::Out) -> <Self::Out as FlattenPairs>::Flat)
    }

    /// Flatten and finalize in one step (`as` is a Rust keyword, hence
    /// `combine` rather than `as`).
    fn combine<F, U>(self, f: F) -> MapParser<Self, impl Fn(Self::Out) -> U + Clone>
    where
        Self::Out: FlattenPairs + 'static,
        <Self::Out as FlattenPairs>::Flat: 'static,
        F: Fn(<Self::Out as FlattenPairs>::Flat) -> U + Clone + 'static,
        U: 'static,
    {
        self.map(move |nested| f(nested.flatten()))
    }
}

impl<E, Ctx, P: Parser<E, Ctx>> ParserExt<E, Ctx> for P {}

// ---------------------------------------------------------------------
// first / as_list_of (built on Splitter, usable as ordinary Consumers)
// ---------------------------------------------------------------------

/// Terminates on the very first input it receives: the downstream for
/// [`first`].
pub struct FirstResult<T> {
    done: bool,
    _marker: std::marker::PhantomData<T>,
}

impl<T> FirstResult<T> {
    /// A fresh, unfilled slot.
    pub fn new() -> Self {
        Self {
            done: false,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Default for FirstResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Handler for FirstResult<T> {
    type In = Outcome<T>;
    type Out = Outcome<T>;

    fn is_finished(&self) -> bool {
        self.done
    }

    fn handle_input(&mut self, input: Outcome<T>) -> Option<Self::Out> {
        self.done = true;
        Some(input)
    }

    fn handle_end(&mut self) -> Self::Out {
        self.done = true;
        Outcome::Empty
    }
}

/// Collects every sub-stream's result into a list, in first-seen order. The
/// downstream for [`as_list_of`]; reuses [`Outcome::list`]'s error/empty
/// policy directly.
pub struct CollectList<T> {
    items: Vec<Outcome<T>>,
}

impl<T> CollectList<T> {
    /// A fresh, empty collector.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Default for CollectList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Handler for CollectList<T> {
    type In = Outcome<T>;
    type Out = Outcome<Vec<T>>;

    fn is_finished(&self) -> bool {
        false
    }

    fn handle_input(&mut self, input: Outcome<T>) -> Option<Self::Out> {
        self.items.push(input);
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        Outcome::list(std::mem::take(&mut self.items))
    }
}

/// Run `inner` on the *first* matched sub-stream of `matcher` only; the
/// splitter is cancelled (the produced handler finishes) immediately after.
pub struct First<M, P> {
    matcher: M,
    inner: P,
}

impl<E, M, P> Parser<E, ()> for First<M, P>
where
    E: StreamEvent + 'static,
    M: ContextMatcher<E::Frame> + Clone + 'static,
    M::Ctx: 'static,
    P: Parser<E, M::Ctx> + Clone + 'static,
    P::Out: 'static,
{
    type Out = P::Out;

    fn make_handler(&self, _ctx: ()) -> BoxHandler<E, Outcome<P::Out>> {
        Box::new(Splitter::new(
            self.matcher.clone(),
            self.inner.clone(),
            FirstResult::new(),
        ))
    }
}

/// Collect the result of `inner` across every matched sub-stream of
/// `matcher` into a list, preserving first-seen order.
pub struct AsListOf<M, P> {
    matcher: M,
    inner: P,
}

impl<E, M, P> Parser<E, ()> for AsListOf<M, P>
where
    E: StreamEvent + 'static,
    M: ContextMatcher<E::Frame> + Clone + 'static,
    M::Ctx: 'static,
    P: Parser<E, M::Ctx> + Clone + 'static,
    P::Out: 'static,
{
    type Out = Vec<P::Out>;

    fn make_handler(&self, _ctx: ()) -> BoxHandler<E, Outcome<Vec<P::Out>>> {
        Box::new(Splitter::new(
            self.matcher.clone(),
            self.inner.clone(),
            CollectList::new(),
        ))
    }
}

/// Bind a matcher to build either a [`First`] or an [`AsListOf`] parser —
/// the two ways of binding a sub-stream path to a parser.
pub struct SplitterOf<M> {
    matcher: M,
}

impl<M: Clone> SplitterOf<M> {
    /// Run `inner` on only the first matched sub-stream.
    pub fn first<P>(self, inner: P) -> First<M, P> {
        First {
            matcher: self.matcher,
            inner,
        }
    }

    /// Collect `inner`'s result across every matched sub-stream.
    pub fn as_list_of<P>(self, inner: P) -> AsListOf<M, P> {
        AsListOf {
            matcher: self.matcher,
            inner,
        }
    }
}

/// Entry point for binding a context path to a sub-stream parser, e.g.
/// `splitter(blog().then(post())).as_list_of(date())`.
pub fn splitter<M>(matcher: M) -> SplitterOf<M> {
    SplitterOf { matcher }
}

// ---------------------------------------------------------------------
// one_of
// ---------------------------------------------------------------------

/// Runs several parsers in parallel on the same sub-stream; the first to
/// emit `Success` wins (lowest index tie-break on simultaneous completion).
/// `Empty` if every child is `Empty`; an `Error` is retained only if no
/// child ever succeeds.
pub struct OneOf<E, Ctx, R> {
    parsers: Vec<Box<dyn Parser<E, Ctx, Out = R>>>,
}

/// Build a [`OneOf`] parser from a list of alternatives sharing an output type.
pub fn one_of<E, Ctx, R>(parsers: Vec<Box<dyn Parser<E, Ctx, Out = R>>>) -> OneOf<E, Ctx, R> {
    OneOf { parsers }
}

struct OneOfHandler<E, R> {
    children: Vec<BoxHandler<E, Outcome<R>>>,
    slots: Vec<Option<Outcome<R>>>,
    finished: bool,
}

impl<E, R> OneOfHandler<E, R> {
    fn finalize(&mut self) -> Option<Outcome<R>> {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|s| matches!(s, Some(Outcome::Success(_))))
        {
            self.finished = true;
            return self.slots[idx].take();
        }
        if self.slots.iter().all(|s| s.is_some()) {
            self.finished = true;
            if let Some(idx) = self
                .slots
                .iter()
                .position(|s| matches!(s, Some(Outcome::Error(_))))
            {
                return self.slots[idx].take();
            }
            return Some(Outcome::Empty);
        }
        None
    }
}

impl<E, R> Handler for OneOfHandler<E, R>
where
    E: Clone,
{
    type In = E;
    type Out = Outcome<R>;

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle_input(&mut self, input: E) -> Option<Self::Out> {
        for (i, child) in self.children.iter_mut().enumerate() {
            if self.slots[i].is_none() && !child.is_finished() {
                if let Some(r) = child.handle_input(input.clone()) {
                    self.slots[i] = Some(r);
                }
            }
        }
        self.finalize()
    }

    fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
        for (i, child) in self.children.iter_mut().enumerate() {
            if self.slots[i].is_none() && !child.is_finished() {
                if let Some(r) = child.handle_error(error.clone()) {
                    self.slots[i] = Some(r);
                }
            }
        }
        self.finalize()
    }

    fn handle_end(&mut self) -> Self::Out {
        for i in 0..self.children.len() {
            if self.slots[i].is_none() {
                self.slots[i] = Some(self.children[i].handle_end());
            }
        }
        self.finalize().unwrap_or(Outcome::Empty)
    }
}

impl<E, Ctx, R> Parser<E, Ctx> for OneOf<E, Ctx, R>
where
    Ctx: Clone,
    E: Clone + 'static,
    Ctx: 'static,
    R: 'static,
{
    type Out = R;

    fn make_handler(&self, ctx: Ctx) -> BoxHandler<E, Outcome<R>> {
        let children: Vec<_> = self
            .parsers
            .iter()
            .map(|p| p.make_handler(ctx.clone()))
            .collect();
        let n = children.len();
        Box::new(OneOfHandler {
            children,
            slots: (0..n).map(|_| None).collect(),
            finished: false,
        })
    }
}

// ---------------------------------------------------------------------
// wrap_safe / unwrap_safe
// ---------------------------------------------------------------------

/// Convert an [`Outcome`] into a plain [`std::result::Result`] for callers
/// who don't want to think about `Empty`; `Empty` becomes a
/// [`FluxError::Custom`] explaining no match was found.
pub fn unwrap_safe<T>(outcome: Outcome<T>) -> Result<T, FluxError> {
    outcome.ok_or(|| FluxError::Custom("parser produced no result (Empty)".into()))
}

/// The inverse of [`unwrap_safe`]: lift a plain `Result` into the `Outcome`
/// world.
pub fn wrap_safe<T>(result: Result<T, FluxError>) -> Outcome<T> {
    match result {
        Ok(v) => Outcome::Success(v),
        Err(e) => Outcome::Error(e),
    }
}
