//! End-to-end scenarios combining `fluxtree-core`'s combinators with the
//! XML-like and JSON-like event families in this crate.

use fluxtree_core::{parse_result, splitter, EventSource, Handler, Outcome, Parser, ParserExt};
use fluxtree_formats::json::{any_index, field, required_field, scalar, JsonEvent, JsonScalar};
use fluxtree_formats::xml::{attr, required_attr, tag, text, XmlEvent};
use std::convert::Infallible;

struct VecXmlSource(std::vec::IntoIter<XmlEvent>);

impl EventSource for VecXmlSource {
    type Event = XmlEvent;
    type Err = Infallible;

    fn next_event(&mut self) -> Option<Result<XmlEvent, Infallible>> {
        self.0.next().map(Ok)
    }
}

struct VecJsonSource(std::vec::IntoIter<JsonEvent>);

impl EventSource for VecJsonSource {
    type Event = JsonEvent;
    type Err = Infallible;

    fn next_event(&mut self) -> Option<Result<JsonEvent, Infallible>> {
        self.0.next().map(Ok)
    }
}

fn open_post(date: &str) -> XmlEvent {
    XmlEvent::StartElement {
        name: "post".into(),
        attrs: vec![("date".into(), date.into())],
    }
}

fn open_post_no_date() -> XmlEvent {
    XmlEvent::StartElement {
        name: "post".into(),
        attrs: vec![],
    }
}

fn blog_with_posts(posts: Vec<XmlEvent>) -> Vec<XmlEvent> {
    let mut events = vec![XmlEvent::StartElement {
        name: "blog".into(),
        attrs: vec![],
    }];
    events.extend(posts);
    events.push(XmlEvent::EndElement);
    events
}

#[test]
fn scenario_flat_attribute_and_text_combine() {
    let events = blog_with_posts(vec![
        open_post("2015-11-16"),
        XmlEvent::Text("hello world".into()),
        XmlEvent::EndElement,
    ]);
    let mut source = VecXmlSource(events.into_iter());

    let parser = splitter(tag("blog").then(tag("post"))).first(attr("date").and(text()));
    let handler = Parser::<XmlEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(result, ("2015-11-16".to_string(), "hello world".to_string()));
}

#[test]
fn scenario_missing_mandatory_attribute_is_an_error() {
    let events = blog_with_posts(vec![
        open_post_no_date(),
        XmlEvent::Text("no date here".into()),
        XmlEvent::EndElement,
    ]);
    let mut source = VecXmlSource(events.into_iter());

    let parser = splitter(tag("blog").then(tag("post"))).first(required_attr("date"));
    let handler = Parser::<XmlEvent, ()>::make_handler(&parser, ());
    let err = parse_result(&mut source, handler).unwrap_err();
    assert_eq!(err.to_string(), "missing attribute: date");
}

#[test]
fn scenario_nested_splitter_collects_dates_in_order() {
    let events = blog_with_posts(vec![
        open_post("2015-11-16"),
        XmlEvent::EndElement,
        open_post("2015-11-17"),
        XmlEvent::EndElement,
        open_post("2015-11-18"),
        XmlEvent::EndElement,
    ]);
    let mut source = VecXmlSource(events.into_iter());

    let parser = splitter(tag("blog").then(tag("post"))).as_list_of(attr("date"));
    let handler = Parser::<XmlEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(
        result,
        vec![
            "2015-11-16".to_string(),
            "2015-11-17".to_string(),
            "2015-11-18".to_string(),
        ]
    );
}

#[test]
fn scenario_first_short_circuits_over_many_posts() {
    let post_count = 1000;
    let mut posts = Vec::new();
    for i in 0..post_count {
        posts.push(open_post(&format!("2020-01-{i:03}")));
        posts.push(XmlEvent::EndElement);
    }
    let events = blog_with_posts(posts);
    let mut source = VecXmlSource(events.into_iter());

    let parser = splitter(tag("blog").then(tag("post"))).first(attr("date"));
    let handler = Parser::<XmlEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(result, "2020-01-000");
}

#[test]
fn scenario_funnel_merges_two_xml_splitters() {
    let events = vec![
        XmlEvent::StartElement {
            name: "root".into(),
            attrs: vec![],
        },
        open_post("2015-11-16"),
        XmlEvent::EndElement,
        XmlEvent::StartElement {
            name: "comment".into(),
            attrs: vec![("author".into(), "ada".into())],
        },
        XmlEvent::EndElement,
        XmlEvent::EndElement,
    ];

    use fluxtree_core::{
        FunnelledTransformerHandler, GuardedDownstream, Handler, SplitterTransformer, Transformer,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CollectStrings(Vec<Outcome<String>>);
    impl Handler for CollectStrings {
        type In = Outcome<String>;
        type Out = Outcome<Vec<String>>;
        fn is_finished(&self) -> bool {
            false
        }
        fn handle_input(&mut self, input: Outcome<String>) -> Option<Self::Out> {
            self.0.push(input);
            None
        }
        fn handle_end(&mut self) -> Self::Out {
            Outcome::list(std::mem::take(&mut self.0))
        }
    }

    let shared = Rc::new(RefCell::new(CollectStrings(Vec::new())));

    let post_funnel = SplitterTransformer::new(tag("post"), attr("date"))
        .make_handler(GuardedDownstream::new(Rc::clone(&shared)));
    let comment_funnel = SplitterTransformer::new(tag("comment"), attr("author"))
        .make_handler(GuardedDownstream::new(Rc::clone(&shared)));

    let mut combined =
        FunnelledTransformerHandler::new(vec![post_funnel, comment_funnel], shared);

    let mut result = None;
    for e in events {
        if let Some(r) = combined.handle_input(e) {
            result = Some(r);
            break;
        }
    }
    let result = result.unwrap_or_else(|| combined.handle_end());
    assert_eq!(
        result,
        Outcome::Success(vec!["2015-11-16".to_string(), "ada".to_string()])
    );
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle(f64),
    Square(f64),
}

#[test]
fn scenario_one_of_over_heterogeneous_shapes() {
    fn circle_parser() -> Box<dyn Parser<JsonEvent, (), Out = Shape>> {
        Box::new(required_field("radius").map(|v| match v {
            JsonScalar::Number(r) => Shape::Circle(r),
            other => panic!("unexpected radius value: {other:?}"),
        }))
    }
    fn square_parser() -> Box<dyn Parser<JsonEvent, (), Out = Shape>> {
        Box::new(required_field("side").map(|v| match v {
            JsonScalar::Number(s) => Shape::Square(s),
            other => panic!("unexpected side value: {other:?}"),
        }))
    }

    let circle_events = vec![
        JsonEvent::StartObject,
        JsonEvent::FieldStart("radius".into()),
        JsonEvent::Scalar(JsonScalar::Number(3.0)),
        JsonEvent::FieldEnd,
        JsonEvent::EndObject,
    ];
    let mut source = VecJsonSource(circle_events.into_iter());
    let parser = fluxtree_core::one_of(vec![circle_parser(), square_parser()]);
    let handler = Parser::<JsonEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(result, Shape::Circle(3.0));

    let square_events = vec![
        JsonEvent::StartObject,
        JsonEvent::FieldStart("side".into()),
        JsonEvent::Scalar(JsonScalar::Number(5.0)),
        JsonEvent::FieldEnd,
        JsonEvent::EndObject,
    ];
    let mut source = VecJsonSource(square_events.into_iter());
    let parser = fluxtree_core::one_of(vec![circle_parser(), square_parser()]);
    let handler = Parser::<JsonEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(result, Shape::Square(5.0));
}

#[derive(Debug, Clone, PartialEq)]
enum HelloItem {
    A(i64),
    Str(String),
    Arr(Vec<i64>),
    Bool(bool),
}

// Each of the four candidates below sees the full per-index sub-stream
// (`IndexStart(i) .. IndexEnd(i)`, wrapping whatever shape sits at that
// index) and decides at `handle_end` whether that shape was its own —
// written as a plain `Handler`, not a `Splitter`, since a matcher's stack
// starts fresh at `Index(i)` and the candidates need to look *through* that
// wrapping frame rather than match on it.

#[derive(Clone, Copy, PartialEq)]
enum APhase {
    Start,
    Object,
    FieldA,
    Value,
    FieldEnd,
    ObjectEnd,
    Mismatch,
}

struct AParser;
struct AHandler {
    phase: APhase,
    value: i64,
}

impl Handler for AHandler {
    type In = JsonEvent;
    type Out = Outcome<i64>;

    fn is_finished(&self) -> bool {
        false
    }

    fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
        use APhase::*;
        self.phase = match (self.phase, input) {
            (Start, JsonEvent::IndexStart(_)) => Object,
            (Object, JsonEvent::StartObject) => FieldA,
            (FieldA, JsonEvent::FieldStart(name)) if name == "a" => Value,
            (Value, JsonEvent::Scalar(JsonScalar::Number(n))) => {
                self.value = n as i64;
                FieldEnd
            }
            (FieldEnd, JsonEvent::FieldEnd) => ObjectEnd,
            (ObjectEnd, JsonEvent::EndObject) => ObjectEnd,
            (ObjectEnd, JsonEvent::IndexEnd) => ObjectEnd,
            (Mismatch, _) => Mismatch,
            _ => Mismatch,
        };
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        if self.phase == APhase::ObjectEnd {
            Outcome::Success(self.value)
        } else {
            Outcome::Empty
        }
    }
}

impl<Ctx> Parser<JsonEvent, Ctx> for AParser {
    type Out = i64;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<i64>> {
        Box::new(AHandler {
            phase: APhase::Start,
            value: 0,
        })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ScalarPhase {
    Start,
    Matched,
    Mismatch,
}

struct StrParser;
struct StrHandler {
    phase: ScalarPhase,
    value: String,
}

impl Handler for StrHandler {
    type In = JsonEvent;
    type Out = Outcome<String>;

    fn is_finished(&self) -> bool {
        false
    }

    fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
        self.phase = match (self.phase, input) {
            (ScalarPhase::Start, JsonEvent::IndexStart(_)) => ScalarPhase::Start,
            (ScalarPhase::Start, JsonEvent::Scalar(JsonScalar::Str(s))) => {
                self.value = s;
                ScalarPhase::Matched
            }
            (ScalarPhase::Matched, JsonEvent::IndexEnd) => ScalarPhase::Matched,
            (ScalarPhase::Mismatch, _) => ScalarPhase::Mismatch,
            _ => ScalarPhase::Mismatch,
        };
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        if self.phase == ScalarPhase::Matched {
            Outcome::Success(std::mem::take(&mut self.value))
        } else {
            Outcome::Empty
        }
    }
}

impl<Ctx> Parser<JsonEvent, Ctx> for StrParser {
    type Out = String;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<String>> {
        Box::new(StrHandler {
            phase: ScalarPhase::Start,
            value: String::new(),
        })
    }
}

struct BoolParser;
struct BoolHandler {
    phase: ScalarPhase,
    value: bool,
}

impl Handler for BoolHandler {
    type In = JsonEvent;
    type Out = Outcome<bool>;

    fn is_finished(&self) -> bool {
        false
    }

    fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
        self.phase = match (self.phase, input) {
            (ScalarPhase::Start, JsonEvent::IndexStart(_)) => ScalarPhase::Start,
            (ScalarPhase::Start, JsonEvent::Scalar(JsonScalar::Bool(b))) => {
                self.value = b;
                ScalarPhase::Matched
            }
            (ScalarPhase::Matched, JsonEvent::IndexEnd) => ScalarPhase::Matched,
            (ScalarPhase::Mismatch, _) => ScalarPhase::Mismatch,
            _ => ScalarPhase::Mismatch,
        };
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        if self.phase == ScalarPhase::Matched {
            Outcome::Success(self.value)
        } else {
            Outcome::Empty
        }
    }
}

impl<Ctx> Parser<JsonEvent, Ctx> for BoolParser {
    type Out = bool;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<bool>> {
        Box::new(BoolHandler {
            phase: ScalarPhase::Start,
            value: false,
        })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ArrPhase {
    Start,
    Array,
    ElemOrEnd,
    ElemValue,
    ElemEnd,
    Done,
    Mismatch,
}

struct ArrParser;
struct ArrHandler {
    phase: ArrPhase,
    values: Vec<i64>,
}

impl Handler for ArrHandler {
    type In = JsonEvent;
    type Out = Outcome<Vec<i64>>;

    fn is_finished(&self) -> bool {
        false
    }

    fn handle_input(&mut self, input: JsonEvent) -> Option<Self::Out> {
        use ArrPhase::*;
        self.phase = match (self.phase, input) {
            (Start, JsonEvent::IndexStart(_)) => Array,
            (Array, JsonEvent::StartArray) => ElemOrEnd,
            (ElemOrEnd, JsonEvent::IndexStart(_)) => ElemValue,
            (ElemOrEnd, JsonEvent::EndArray) => Done,
            (ElemValue, JsonEvent::Scalar(JsonScalar::Number(n))) => {
                self.values.push(n as i64);
                ElemEnd
            }
            (ElemEnd, JsonEvent::IndexEnd) => ElemOrEnd,
            (Done, JsonEvent::IndexEnd) => Done,
            (Mismatch, _) => Mismatch,
            _ => Mismatch,
        };
        None
    }

    fn handle_end(&mut self) -> Self::Out {
        if self.phase == ArrPhase::Done {
            Outcome::Success(std::mem::take(&mut self.values))
        } else {
            Outcome::Empty
        }
    }
}

impl<Ctx> Parser<JsonEvent, Ctx> for ArrParser {
    type Out = Vec<i64>;

    fn make_handler(&self, _ctx: Ctx) -> fluxtree_core::BoxHandler<JsonEvent, Outcome<Vec<i64>>> {
        Box::new(ArrHandler {
            phase: ArrPhase::Start,
            values: Vec::new(),
        })
    }
}

#[test]
fn scenario_json_one_of_over_heterogeneous_hello_array() {
    // `Ctx = usize` here, not `()`: these candidates are bound under
    // `any_index()`'s extracted index rather than parsed standalone.
    fn a_parser() -> Box<dyn Parser<JsonEvent, usize, Out = HelloItem>> {
        Box::new(AParser.map(HelloItem::A))
    }
    fn str_parser() -> Box<dyn Parser<JsonEvent, usize, Out = HelloItem>> {
        Box::new(StrParser.map(HelloItem::Str))
    }
    fn arr_parser() -> Box<dyn Parser<JsonEvent, usize, Out = HelloItem>> {
        Box::new(ArrParser.map(HelloItem::Arr))
    }
    fn bool_parser() -> Box<dyn Parser<JsonEvent, usize, Out = HelloItem>> {
        Box::new(BoolParser.map(HelloItem::Bool))
    }

    // {"hello": [{"a": 1}, "str", [1, 2, 3], true]}
    let events = vec![
        JsonEvent::StartObject,
        JsonEvent::FieldStart("hello".into()),
        JsonEvent::StartArray,
        JsonEvent::IndexStart(0),
        JsonEvent::StartObject,
        JsonEvent::FieldStart("a".into()),
        JsonEvent::Scalar(JsonScalar::Number(1.0)),
        JsonEvent::FieldEnd,
        JsonEvent::EndObject,
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(1),
        JsonEvent::Scalar(JsonScalar::Str("str".into())),
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(2),
        JsonEvent::StartArray,
        JsonEvent::IndexStart(0),
        JsonEvent::Scalar(JsonScalar::Number(1.0)),
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(1),
        JsonEvent::Scalar(JsonScalar::Number(2.0)),
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(2),
        JsonEvent::Scalar(JsonScalar::Number(3.0)),
        JsonEvent::IndexEnd,
        JsonEvent::EndArray,
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(3),
        JsonEvent::Scalar(JsonScalar::Bool(true)),
        JsonEvent::IndexEnd,
        JsonEvent::EndArray,
        JsonEvent::FieldEnd,
        JsonEvent::EndObject,
    ];
    let mut source = VecJsonSource(events.into_iter());

    // Built directly as a `Splitter` rather than through `.as_list_of()`:
    // `one_of`'s boxed trait-object children make it non-`Clone`, and
    // `.as_list_of()` needs to clone its inner parser once into place.
    let item = fluxtree_core::one_of(vec![a_parser(), str_parser(), arr_parser(), bool_parser()]);
    let handler = fluxtree_core::Splitter::new(
        field("hello").then(any_index()),
        item,
        fluxtree_core::CollectList::new(),
    );
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(
        result,
        vec![
            HelloItem::A(1),
            HelloItem::Str("str".to_string()),
            HelloItem::Arr(vec![1, 2, 3]),
            HelloItem::Bool(true),
        ]
    );
}

#[test]
fn scenario_json_path_addresses_field_and_index() {
    let events = vec![
        JsonEvent::StartObject,
        JsonEvent::FieldStart("items".into()),
        JsonEvent::StartArray,
        JsonEvent::IndexStart(0),
        JsonEvent::Scalar(JsonScalar::Str("first".into())),
        JsonEvent::IndexEnd,
        JsonEvent::IndexStart(1),
        JsonEvent::Scalar(JsonScalar::Str("second".into())),
        JsonEvent::IndexEnd,
        JsonEvent::EndArray,
        JsonEvent::FieldEnd,
        JsonEvent::EndObject,
    ];
    let mut source = VecJsonSource(events.into_iter());

    let parser = splitter(field("items").then(any_index())).as_list_of(scalar());
    let handler = Parser::<JsonEvent, ()>::make_handler(&parser, ());
    let result = parse_result(&mut source, handler).unwrap();
    assert_eq!(
        result,
        vec![
            JsonScalar::Str("first".into()),
            JsonScalar::Str("second".into())
        ]
    );
}
