//! Context stack and the matcher vocabulary over it.

use crate::error::FluxError;
use std::marker::PhantomData;
use std::ops::Div;

/// The running path of structural frames from root to the current event.
///
/// Invariant: empty at the start and end of a well-formed stream; every
/// push is matched by exactly one pop.
#[derive(Debug, Clone)]
pub struct ContextStack<Frame> {
    frames: Vec<Frame>,
}

impl<Frame> Default for ContextStack<Frame> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<Frame> ContextStack<Frame> {
    /// A fresh, empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the current frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Number of frames currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// View the stack as a slice, root-first.
    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// `true` once every push has been matched by a pop.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// The outcome of evaluating a [`ContextMatcher`] against a stack slice.
#[derive(Debug, Clone)]
pub enum MatchOutcome<Ctx> {
    /// No match at this depth.
    NoMatch,
    /// Matched, consuming `consumed` frames from the front of the slice.
    Matched {
        /// The extracted context value, handed to the bound parser factory.
        ctx: Ctx,
        /// How many frames of the slice this match consumed.
        consumed: usize,
    },
    /// The matcher attempted to compute a context value and failed.
    Failed(FluxError),
}

/// A predicate over the context stack deciding when a sub-stream is open.
///
/// Matchers compose with [`ContextMatcher::then`] (or, equivalently, the `/`
/// operator — the idiomatic Rust stand-in for a `\`-style path operator,
/// since backslash cannot be overloaded): `a.then(b)` matches iff
/// `a` matches some prefix of the stack and `b` matches the suffix
/// immediately after it. The composed context is `b`'s: earlier, purely
/// structural segments typically extract `()`.
pub trait ContextMatcher<Frame> {
    /// The context value this matcher extracts on a match.
    type Ctx;

    /// Evaluate this matcher against a stack slice (root-first).
    fn try_match(&self, frames: &[Frame]) -> MatchOutcome<Self::Ctx>;

    /// Compose this matcher with `next`, matching `self` then `next` against
    /// the remaining suffix.
    fn then<M>(self, next: M) -> PathConcat<Self, M>
    where
        Self: Sized,
        M: ContextMatcher<Frame>,
    {
        PathConcat { a: self, b: next }
    }
}

/// `a.then(b)`, spelled as an operator: `a / b`.
#[derive(Clone)]
pub struct PathConcat<A, B> {
    a: A,
    b: B,
}

impl<Frame, A, B> ContextMatcher<Frame> for PathConcat<A, B>
where
    A: ContextMatcher<Frame>,
    B: ContextMatcher<Frame>,
{
    type Ctx = B::Ctx;

    fn try_match(&self, frames: &[Frame]) -> MatchOutcome<Self::Ctx> {
        match self.a.try_match(frames) {
            MatchOutcome::NoMatch => MatchOutcome::NoMatch,
            MatchOutcome::Failed(e) => MatchOutcome::Failed(e),
            MatchOutcome::Matched { consumed: k, .. } => match self.b.try_match(&frames[k..]) {
                MatchOutcome::NoMatch => MatchOutcome::NoMatch,
                MatchOutcome::Failed(e) => MatchOutcome::Failed(e),
                MatchOutcome::Matched { ctx, consumed: j } => MatchOutcome::Matched {
                    ctx,
                    consumed: k + j,
                },
            },
        }
    }
}

impl<Frame, A, B> Div<B> for PathConcatSeed<A>
where
    A: ContextMatcher<Frame>,
    B: ContextMatcher<Frame>,
{
    type Output = PathConcat<A, B>;

    fn div(self, rhs: B) -> Self::Output {
        PathConcat { a: self.0, b: rhs }
    }
}

/// A thin wrapper so that any [`ContextMatcher`] can be composed with `/`.
///
/// `seed(matcher)` (or [`ContextMatcherExt::path`]) turns a matcher into a
/// [`PathConcatSeed`], after which `seed(a) / b / c` reads like the
/// a `a \ b \ c` path notation.
pub struct PathConcatSeed<A>(A);

/// Extension trait putting the `/`-composition spelling within reach of any
/// [`ContextMatcher`] without an orphan-rule conflict on `Div` itself.
pub trait ContextMatcherExt<Frame>: ContextMatcher<Frame> + Sized {
    /// Wrap `self` so it can be composed with `/`: `a.path() / b`.
    fn path(self) -> PathConcatSeed<Self> {
        PathConcatSeed(self)
    }
}

impl<Frame, M: ContextMatcher<Frame>> ContextMatcherExt<Frame> for M {}

/// Matches a single frame unconditionally, extracting no context.
#[derive(Clone)]
pub struct AnyFrame<Frame> {
    _marker: PhantomData<Frame>,
}

impl<Frame> Default for AnyFrame<Frame> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<Frame> ContextMatcher<Frame> for AnyFrame<Frame> {
    type Ctx = ();

    fn try_match(&self, frames: &[Frame]) -> MatchOutcome<()> {
        if frames.is_empty() {
            MatchOutcome::NoMatch
        } else {
            MatchOutcome::Matched {
                ctx: (),
                consumed: 1,
            }
        }
    }
}

/// A matcher built from a predicate over a single frame, extracting `()`.
#[derive(Clone)]
pub struct FramePredicate<Frame, F> {
    predicate: F,
    _marker: PhantomData<Frame>,
}

impl<Frame, F> FramePredicate<Frame, F>
where
    F: Fn(&Frame) -> bool,
{
    /// Build a matcher that consumes one frame satisfying `predicate`.
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _marker: PhantomData,
        }
    }
}

impl<Frame, F> ContextMatcher<Frame> for FramePredicate<Frame, F>
where
    F: Fn(&Frame) -> bool,
{
    type Ctx = ();

    fn try_match(&self, frames: &[Frame]) -> MatchOutcome<()> {
        match frames.first() {
            Some(f) if (self.predicate)(f) => MatchOutcome::Matched {
                ctx: (),
                consumed: 1,
            },
            Some(_) => MatchOutcome::NoMatch,
            None => MatchOutcome::NoMatch,
        }
    }
}
