//! A deliberately small XML-like event family and a handful of leaf parsers
//! (`attr`, `text`) and matcher constructors (`tag`, `any_tag`) over it.
//!
//! This is not a tokenizer: nothing here reads bytes. `XmlEvent` is the shape
//! a real tokenizer would need to emit to drive the kernel in
//! `fluxtree-core`; building one is out of scope here.

use fluxtree_core::{
    AnyFrame, ContextChange, ContextMatcher, FluxError, FramePredicate, Handler, MatchOutcome,
    Outcome, Parser, StreamEvent,
};
use std::marker::PhantomData;

/// One XML-like event: a start tag (with attributes), an end tag, or a run
/// of character content.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// `<tag attr="value" ...>`
    StartElement {
        /// The element's tag name.
        name: String,
        /// Attributes in document order.
        attrs: Vec<(String, String)>,
    },
    /// `</tag>`
    EndElement,
    /// Character content between tags.
    Text(String),
}

impl StreamEvent for XmlEvent {
    type Frame = String;

    fn context_change(&self) -> ContextChange<String> {
        match self {
            XmlEvent::StartElement { name, .. } => ContextChange::Push(name.clone()),
            XmlEvent::EndElement => ContextChange::Pop,
            XmlEvent::Text(_) => ContextChange::None,
        }
    }
}

/// Matches a start tag with exactly this name.
pub fn tag(name: impl Into<String>) -> FramePredicate<String, impl Fn(&String) -> bool> {
    let name = name.into();
    FramePredicate::new(move |frame: &String| *frame == name)
}

/// Matches any start tag, regardless of name.
pub fn any_tag() -> AnyFrame<String> {
    AnyFrame::default()
}

/// A leaf parser reading one attribute off the element that opened the
/// current sub-stream. `Empty` if the attribute is absent — pair with
/// `.recover` or a required-field wrapper to turn that into an error.
#[derive(Clone)]
pub struct Attr {
    name: String,
}

/// Build an [`Attr`] parser for the named attribute.
pub fn attr(name: impl Into<String>) -> Attr {
    Attr { name: name.into() }
}

struct AttrHandler {
    name: String,
    result: Option<String>,
    done: bool,
}

impl Handler for AttrHandler {
    type In = XmlEvent;
    type Out = Outcome<String>;

    fn is_finished(&self) -> bool {
        self.done
    }

    fn handle_input(&mut self, input: XmlEvent) -> Option<Self::Out> {
        if let XmlEvent::StartElement { attrs, .. } = &input {
            self.result = attrs
                .iter()
                .find(|(k, _)| *k == self.name)
                .map(|(_, v)| v.clone());
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

impl<Ctx> Parser<XmlEvent, Ctx> for Attr {
    type Out = String;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<XmlEvent, Outcome<String>> {
        Box::new(AttrHandler {
            name: self.name.clone(),
            result: None,
            done: false,
        })
    }
}

/// A leaf parser concatenating every `Text` event seen directly within the
/// current sub-stream.
#[derive(Clone)]
pub struct Text {
    _marker: PhantomData<()>,
}

/// Build a [`Text`] parser.
pub fn text() -> Text {
    Text {
        _marker: PhantomData,
    }
}

struct TextHandler {
    buf: String,
    done: bool,
}

impl Handler for TextHandler {
    type In = XmlEvent;
    type Out = Outcome<String>;

    fn is_finished(&self) -> bool {
        self.done
    }

    fn handle_input(&mut self, input: XmlEvent) -> Option<Self::Out> {
        if let XmlEvent::Text(s) = input {
            self.buf.push_str(&s);
        }
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        self.done = true;
        if self.buf.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Success(std::mem::take(&mut self.buf))
        }
    }
}

impl<Ctx> Parser<XmlEvent, Ctx> for Text {
    type Out = String;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<XmlEvent, Outcome<String>> {
        Box::new(TextHandler {
            buf: String::new(),
            done: false,
        })
    }
}

/// Turn a missing [`attr`] into a [`FluxError::MissingAttribute`] instead of
/// an [`Outcome::Empty`].
pub fn required_attr(name: impl Into<String>) -> impl Parser<XmlEvent, (), Out = String> + Clone {
    #[derive(Clone)]
    struct Required(String);

    impl Parser<XmlEvent, ()> for Required {
        type Out = String;

        fn make_handler(&self, ctx: ()) -> fluxtree_core::BoxHandler<XmlEvent, Outcome<String>> {
            let inner = Attr { name: self.0.clone() }.make_handler(ctx);
            Box::new(RequiredHandler {
                inner,
                name: self.0.clone(),
            })
        }
    }

    struct RequiredHandler {
        inner: fluxtree_core::BoxHandler<XmlEvent, Outcome<String>>,
        name: String,
    }

    impl Handler for RequiredHandler {
        type In = XmlEvent;
        type Out = Outcome<String>;

        fn is_finished(&self) -> bool {
            self.inner.is_finished()
        }

        fn handle_input(&mut self, input: XmlEvent) -> Option<Self::Out> {
            self.inner.handle_input(input)
        }

        fn handle_error(&mut self, error: FluxError) -> Option<Self::Out> {
            self.inner.handle_error(error)
        }

        fn handle_end(&mut self) -> Self::Out {
            match self.inner.handle_end() {
                Outcome::Empty => Outcome::Error(FluxError::missing_attribute(self.name.clone())),
                other => other,
            }
        }
    }

    Required(name.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxtree_core::{parse_result, ContextMatcherExt, EventSource, ParserExt};
    use std::convert::Infallible;

    struct VecSource(std::vec::IntoIter<XmlEvent>);

    impl EventSource for VecSource {
        type Event = XmlEvent;
        type Err = Infallible;

        fn next_event(&mut self) -> Option<Result<XmlEvent, Infallible>> {
            self.0.next().map(Ok)
        }
    }

    fn events() -> Vec<XmlEvent> {
        vec![
            XmlEvent::StartElement {
                name: "post".into(),
                attrs: vec![("date".into(), "2015-11-16".into())],
            },
            XmlEvent::Text("hello".into()),
            XmlEvent::EndElement,
        ]
    }

    #[test]
    fn attr_and_text_combine_into_tuple() {
        let parser = attr("date").and(text());
        let mut handler = Parser::<XmlEvent, ()>::make_handler(&parser, ());
        let mut result = None;
        for e in events() {
            if let Some(r) = handler.handle_input(e) {
                result = Some(r);
                break;
            }
        }
        let result = result.unwrap_or_else(|| handler.handle_end());
        assert_eq!(
            result,
            Outcome::Success(("2015-11-16".to_string(), "hello".to_string()))
        );
    }

    #[test]
    fn required_attr_errors_when_absent() {
        let parser = required_attr("missing");
        let mut source = VecSource(events().into_iter());
        let handler = parser.make_handler(());
        let result = parse_result(&mut source, handler);
        assert!(result.is_err());
    }

    #[test]
    fn tag_path_composes() {
        let matcher = tag("blog").then(tag("post"));
        match matcher.try_match(&["blog".to_string(), "post".to_string()]) {
            MatchOutcome::Matched { consumed, .. } => assert_eq!(consumed, 2),
            other => panic!("expected match, got {other:?}"),
        }
        let _ = matcher.path();
    }
}
