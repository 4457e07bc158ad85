//! Selective streaming JSON visitor.
//!
//! `jsonsieve` incrementally parses a potentially unbounded JSON text that
//! arrives as an asynchronous sequence of arbitrarily sized chunks, and
//! dispatches selected substructures to user callbacks without materializing
//! the whole document. Only the subtrees selected by the [`Schema`] ever
//! occupy memory; everything else is skipped in O(1) space.
//!
//! The engine has two layers: a chunk-spanning [`Scanner`] that classifies
//! JSON tokens across arbitrary chunk boundaries, and a [`visit`] driver that
//! walks a user-described schema in lockstep with the token stream, buffering
//! and decoding exactly the values the schema asks for.
//!
//! # Examples
//!
//! Extract one field from every element of a large array:
//!
//! ```
//! use std::cell::RefCell;
//!
//! use jsonsieve::{array, leaf, object, text_stream, visit};
//!
//! # fn main() -> Result<(), jsonsieve::VisitError> {
//! let names = RefCell::new(Vec::new());
//! let schema = object([(
//!     "items",
//!     array(object([("name", leaf(|v| names.borrow_mut().push(v)))])),
//! )]);
//!
//! let chunks = text_stream([
//!     r#"{"items":[{"name":"a","size":1},"#,
//!     r#"{"name":"b","size":2}]}"#,
//! ]);
//! futures::executor::block_on(visit(chunks, &schema))?;
//!
//! assert_eq!(*names.borrow(), vec!["a".into(), "b".into()]);
//! # Ok(())
//! # }
//! ```

mod chunk_utils;
mod error;
mod scanner;
mod schema;
mod stream;
mod visitor;

pub use chunk_utils::{split_chunks, split_prefixes};
pub use error::{BoxError, SyntaxError, VisitError};
pub use scanner::{Scanner, Token, TokenKind};
pub use schema::{array, leaf, leaf_async, object, try_leaf, typed_leaf, Schema};
pub use stream::{text_stream, TokenStream};
pub use visitor::visit;

#[cfg(test)]
mod tests;
