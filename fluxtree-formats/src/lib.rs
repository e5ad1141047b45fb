//! # fluxtree-formats
//!
//! Concrete event families for [`fluxtree_core`]: an XML-like shape
//! ([`xml::XmlEvent`], tags and attributes) and a JSON-like shape
//! ([`json::JsonEvent`], fields and array indices), plus the matcher
//! constructors and leaf parsers that go with each.
//!
//! Neither format here is a byte-level tokenizer — there is no reader, no
//! lexer, no incremental parse-from-bytes support. These event families are
//! the shape a real tokenizer would need to emit to drive
//! [`fluxtree_core::parse`]; wiring one up is left to the caller.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod json;
pub mod xml;
