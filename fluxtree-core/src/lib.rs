//! # fluxtree-core
//!
//! Core traits and combinators for streaming, composable parsing of
//! hierarchical event streams (XML, JSON, and anything else that can be
//! projected onto pushes and pops of structural frames).
//!
//! This crate is transport- and format-agnostic: it knows nothing about
//! bytes, tags, or braces. See `fluxtree-formats` for concrete XML-like and
//! JSON-like event types built on top of it.
//!
//! # Core Components
//!
//! fluxtree is built on a layered architecture where each component has a
//! clear responsibility:
//!
//! ## [`Handler`] - Push Kernel
//!
//! The one primitive everything else compiles down to: a state machine fed
//! one event at a time, producing at most one result.
//!
//! - **Atomic**: the indivisible unit of stream processing
//! - **Universal**: every combinator in this crate ultimately builds a `Handler`
//! - **Monotonic**: `is_finished` only ever goes `false -> true`
//!
//! ## [`Splitter`] - Sub-stream Extraction
//!
//! Slices a stream into sub-streams keyed by a matched context path,
//! installing a fresh inner handler per match via [`ContextMiddlemanHandler`].
//!
//! - **Structural close**: sub-streams close on stack depth, not re-matching
//! - **Non-nesting**: at most one sub-stream of a given `Splitter` is open at once
//!
//! ## [`Parser`] / [`Consumer`] / [`Transformer`] - Handler Factories
//!
//! Immutable, shareable factories that build a fresh `Handler` per matched
//! sub-stream — the thing combinators in [`combinators`] actually compose.
//!
//! ## [`CompoundHandler2`] / [`FunnelledTransformerHandler`] - Merging
//!
//! Fan two or more handlers that share an event type together: lock-step
//! pairwise combination for parsers computing a joint result, or a shared
//! downstream behind `Rc<RefCell<_>>` for transformers re-emitting a merged
//! stream.
//!
//! # Error Types
//!
//! - [`FluxError`] - recoverable faults, reported through [`Outcome::Error`]
//! - panics - reserved for protocol violations (driving a finished handler),
//!   caught at combinator boundaries via [`Outcome::map`]/[`Outcome::and_then`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod combinators;
mod compound;
mod context;
mod error;
mod event;
mod funnel;
mod handler;
mod middleman;
mod outcome;
mod parser;
mod source;
mod splitter;

pub use combinators::{
    one_of, splitter, unwrap_safe, wrap_safe, AndParser, AsListOf, CollectList, First,
    FirstResult, FlattenPairs, MapParser, OneOf, ParserExt, SplitterOf,
};
pub use compound::CompoundHandler2;
pub use context::{
    AnyFrame, ContextMatcher, ContextMatcherExt, ContextStack, FramePredicate, MatchOutcome,
    PathConcat, PathConcatSeed,
};
pub use error::FluxError;
pub use event::{ContextChange, StreamEvent};
pub use funnel::{FunnelOutcome, FunnelledTransformerHandler, GuardedDownstream};
pub use handler::{BoxHandler, Handler};
pub use middleman::ContextMiddlemanHandler;
pub use outcome::Outcome;
pub use parser::{Consumer, Parser, Transformer};
pub use source::{parse, parse_result, EventSource};
pub use splitter::{Splitter, SplitterTransformer};
