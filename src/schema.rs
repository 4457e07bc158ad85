//! Visitor schemas: a recursive description of what to descend into and what
//! to materialize.
//!
//! A schema is one of three shapes: a leaf callback (materialize the value
//! here and hand it to user code), an array descent (apply an inner schema to
//! every element), or an object descent (a key → schema mapping; keys not in
//! the mapping are skipped without buffering). Schemas are borrowed read-only
//! by [`visit`](crate::visit) and may be shared across visits, so callbacks
//! are `Fn`; accumulate through interior mutability.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::{self, Future, FutureExt, LocalBoxFuture};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BoxError, VisitError};

/// Future returned by a leaf invocation; resolved before the next token is
/// pulled.
pub(crate) type LeafFuture<'cb> = LocalBoxFuture<'cb, Result<(), VisitError>>;

/// Internal leaf shape: takes the flushed raw text of a complete value,
/// decodes it, and runs the user callback.
pub(crate) type LeafFn<'cb> = Box<dyn Fn(String) -> LeafFuture<'cb> + 'cb>;

pub(crate) type SchemaMap<'cb> = BTreeMap<String, Schema<'cb>>;

/// A recursive selection pattern driven by [`visit`](crate::visit).
///
/// Build one from [`leaf`], [`try_leaf`], [`leaf_async`], [`typed_leaf`],
/// [`array`], and [`object`].
pub struct Schema<'cb> {
    pub(crate) node: Node<'cb>,
}

pub(crate) enum Node<'cb> {
    Leaf(LeafFn<'cb>),
    Array(Box<Schema<'cb>>),
    Object(SchemaMap<'cb>),
}

impl fmt::Debug for Schema<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Leaf(_) => f.write_str("Leaf"),
            Node::Array(inner) => f.debug_tuple("Array").field(inner).finish(),
            Node::Object(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

/// Leaf callback: the selected value is decoded and handed to `callback`.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
///
/// use jsonsieve::{array, leaf, text_stream, visit};
///
/// let acc = RefCell::new(Vec::new());
/// let schema = array(leaf(|v| acc.borrow_mut().push(v)));
/// futures::executor::block_on(visit(text_stream(["[10,20,30]"]), &schema)).unwrap();
/// assert_eq!(*acc.borrow(), vec![10.into(), 20.into(), 30.into()]);
/// ```
pub fn leaf<'cb, F>(callback: F) -> Schema<'cb>
where
    F: Fn(Value) + 'cb,
{
    try_leaf(move |value| {
        callback(value);
        Ok(())
    })
}

/// Fallible leaf callback; an `Err` ends the visit as
/// [`VisitError::Callback`].
pub fn try_leaf<'cb, F>(callback: F) -> Schema<'cb>
where
    F: Fn(Value) -> Result<(), BoxError> + 'cb,
{
    Schema {
        node: Node::Leaf(Box::new(move |text| {
            let result = serde_json::from_str(&text)
                .map_err(VisitError::Parse)
                .and_then(|value| callback(value).map_err(VisitError::Callback));
            future::ready(result).boxed_local()
        })),
    }
}

/// Leaf callback returning a future; the visit awaits it before requesting
/// the next token, so callbacks run strictly in document order.
pub fn leaf_async<'cb, F, Fut>(callback: F) -> Schema<'cb>
where
    F: Fn(Value) -> Fut + 'cb,
    Fut: Future<Output = Result<(), BoxError>> + 'cb,
{
    Schema {
        node: Node::Leaf(Box::new(move |text| match serde_json::from_str(&text) {
            Ok(value) => {
                let pending = callback(value);
                async move { pending.await.map_err(VisitError::Callback) }.boxed_local()
            }
            Err(err) => future::ready(Err(VisitError::Parse(err))).boxed_local(),
        })),
    }
}

/// Typed leaf callback: the selected value is decoded straight into `T`.
///
/// This is the typed variant of the untyped [`leaf`]: the driver behaves
/// identically at runtime; only the final decode differs. A value that does
/// not fit `T` ends the visit as [`VisitError::Parse`].
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
///
/// use jsonsieve::{array, text_stream, typed_leaf, visit};
///
/// let sum = RefCell::new(0u64);
/// let schema = array(typed_leaf(|n: u64| *sum.borrow_mut() += n));
/// futures::executor::block_on(visit(text_stream(["[1,2,3]"]), &schema)).unwrap();
/// assert_eq!(*sum.borrow(), 6);
/// ```
pub fn typed_leaf<'cb, T, F>(callback: F) -> Schema<'cb>
where
    T: DeserializeOwned,
    F: Fn(T) + 'cb,
{
    Schema {
        node: Node::Leaf(Box::new(move |text| {
            let result = serde_json::from_str::<T>(&text)
                .map_err(VisitError::Parse)
                .map(&callback);
            future::ready(result).boxed_local()
        })),
    }
}

/// Array descent: applies `inner` to every element.
#[must_use]
pub fn array(inner: Schema<'_>) -> Schema<'_> {
    Schema {
        node: Node::Array(Box::new(inner)),
    }
}

/// Object descent from `(key, schema)` pairs. Keys absent from the mapping
/// are skipped without buffering their values.
pub fn object<'cb, K, I>(entries: I) -> Schema<'cb>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Schema<'cb>)>,
{
    Schema {
        node: Node::Object(
            entries
                .into_iter()
                .map(|(key, schema)| (key.into(), schema))
                .collect(),
        ),
    }
}

impl<'cb> From<BTreeMap<String, Schema<'cb>>> for Schema<'cb> {
    fn from(map: BTreeMap<String, Schema<'cb>>) -> Self {
        Schema {
            node: Node::Object(map),
        }
    }
}
