//! A deliberately small JSON-like event family: object fields and array
//! indices are addressable path segments in their own right, entered via
//! `FieldStart`/`IndexStart` and left via `FieldEnd`/`IndexEnd`. As with
//! [`crate::xml`], this is not a tokenizer — just the event shape a real one
//! would need to emit.

use fluxtree_core::{
    ContextChange, ContextMatcher, FluxError, Handler, MatchOutcome, Outcome, Parser, StreamEvent,
};

/// A JSON scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonScalar {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any JSON number, represented as `f64`.
    Number(f64),
    /// A JSON string.
    Str(String),
}

/// The structural path segment a JSON value sits at: an object field or an
/// array index.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonFrame {
    /// Inside the value of this object field.
    Field(String),
    /// Inside this array element.
    Index(usize),
}

/// One JSON-like event.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// Enter the value position of an object field.
    FieldStart(String),
    /// Leave the value position of an object field.
    FieldEnd,
    /// Enter the value position of an array element.
    IndexStart(usize),
    /// Leave the value position of an array element.
    IndexEnd,
    /// A scalar value at the current position.
    Scalar(JsonScalar),
}

impl StreamEvent for JsonEvent {
    type Frame = JsonFrame;

    fn context_change(&self) -> ContextChange<JsonFrame> {
        match self {
            JsonEvent::FieldStart(name) => ContextChange::Push(JsonFrame::Field(name.clone())),
            JsonEvent::IndexStart(i) => ContextChange::Push(JsonFrame::Index(*i)),
            JsonEvent::FieldEnd | JsonEvent::IndexEnd => ContextChange::Pop,
            JsonEvent::StartObject
            | JsonEvent::EndObject
            | JsonEvent::StartArray
            | JsonEvent::EndArray
            | JsonEvent::Scalar(_) => ContextChange::None,
        }
    }
}

struct FieldPredicate(String);

impl ContextMatcher<JsonFrame> for FieldPredicate {
    type Ctx = ();

    fn try_match(&self, frames: &[JsonFrame]) -> MatchOutcome<()> {
        match frames.first() {
            Some(JsonFrame::Field(name)) if *name == self.0 => {
                MatchOutcome::Matched { ctx: (), consumed: 1 }
            }
            _ => MatchOutcome::NoMatch,
        }
    }
}

/// Matches the value position of an object field with this exact name.
pub fn field(name: impl Into<String>) -> impl ContextMatcher<JsonFrame, Ctx = ()> + Clone {
    #[derive(Clone)]
    struct F(String);
    impl ContextMatcher<JsonFrame> for F {
        type Ctx = ();
        fn try_match(&self, frames: &[JsonFrame]) -> MatchOutcome<()> {
            FieldPredicate(self.0.clone()).try_match(frames)
        }
    }
    F(name.into())
}

/// Matches the value position of any object field, extracting its name.
#[derive(Clone, Copy)]
pub struct AnyField;

impl ContextMatcher<JsonFrame> for AnyField {
    type Ctx = String;

    fn try_match(&self, frames: &[JsonFrame]) -> MatchOutcome<String> {
        match frames.first() {
            Some(JsonFrame::Field(name)) => MatchOutcome::Matched {
                ctx: name.clone(),
                consumed: 1,
            },
            _ => MatchOutcome::NoMatch,
        }
    }
}

/// Build an [`AnyField`] matcher.
pub fn any_field() -> AnyField {
    AnyField
}

/// Matches the value position of any array element, extracting its index.
#[derive(Clone, Copy)]
pub struct AnyIndex;

impl ContextMatcher<JsonFrame> for AnyIndex {
    type Ctx = usize;

    fn try_match(&self, frames: &[JsonFrame]) -> MatchOutcome<usize> {
        match frames.first() {
            Some(JsonFrame::Index(i)) => MatchOutcome::Matched {
                ctx: *i,
                consumed: 1,
            },
            _ => MatchOutcome::NoMatch,
        }
    }
}

/// Build an [`AnyIndex`] matcher.
pub fn any_index() -> AnyIndex {
    AnyIndex
}

/// A leaf parser reading the scalar value at the current position —
/// `Empty` if the position holds an object or array instead.
#[derive(Clone, Copy)]
pub struct Scalar;

/// Build a [`Scalar`] parser.
pub fn scalar() -> Scalar {
    Scalar
}

struct ScalarHandler {
    result: Option<JsonScalar>,
    done: bool,
}

impl Handler for ScalarHandler {
    type In = JsonEvent;
    type Out = Outcome<JsonScalar>;

    fn is_finished(&self) -> bool {
        self.done
    }

    fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
        if let JsonEvent::Scalar(v) = input {
            self.result = Some(v);
        }
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        self.done = true;
        match self.result.take() {
            Some(v) => Outcome::Success(v),
            None => Outcome::Empty,
        }
    }
}

impl<Ctx> Parser<JsonEvent, Ctx> for Scalar {
    type Out = JsonScalar;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<JsonScalar>> {
        Box::new(ScalarHandler {
            result: None,
            done: false,
        })
    }
}

/// Turn a missing [`scalar`] into a [`FluxError::MissingField`] instead of
/// an [`Outcome::Empty`], naming the field this parser was bound under.
pub fn required_field(
    name: impl Into<String>,
) -> impl Parser<JsonEvent, (), Out = JsonScalar> + Clone {
    #[derive(Clone)]
    struct Required(String);

    impl Parser<JsonEvent, ()> for Required {
        type Out = JsonScalar;

        fn make_handler(
            &self,
            ctx: (),
        ) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<JsonScalar>> {
            let inner = Scalar.make_handler(ctx);
            Box::new(RequiredHandler {
                inner,
                name: self.0.clone(),
            })
        }
    }

    struct RequiredHandler {
        inner: fluxtree_core::BoxHandler<JsonEvent, Outcome<JsonScalar>>,
        name: String,
    }

    impl Handler for RequiredHandler {
        type In = JsonEvent;
        type Out = Outcome<JsonScalar>;

        fn is_finished(&self) -> bool {
            self.inner.is_finished()
        }

        fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
            self.inner.handle_input(input)
        }

        fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
            self.inner.handle_error(error)
        }

        fn handle_end(&mut self) -> Self::Out {
            match self.inner.handle_end() {
                Outcome::Empty => Outcome::Error(FluxError::missing_field(self.name.clone())),
                other => other,
            }
        }
    }

    Required(name.into())
}
