//! Push-down visitor driver.
//!
//! [`visit`] walks a [`Schema`] in lockstep with the token stream. The stack
//! encodes the expected shape at each schema level; a separate depth counter
//! tracks nesting inside the one value currently being buffered or skipped.
//! The two are independent: a single token can close a buffered sub-value
//! while the frame beneath it handles the separator that follows.
//!
//! Buffering is requested exactly when a leaf value's first token arrives and
//! flushed exactly when that value completes, so only selected subtrees (plus
//! at most one pending object key) ever occupy memory.

use futures::Stream;

use crate::{
    error::{BoxError, SyntaxError, VisitError},
    scanner::TokenKind,
    schema::{LeafFn, Node, Schema, SchemaMap},
    stream::TokenStream,
};

/// Immutable start-state template derived from a schema node. Array element
/// templates are copied on every push so elements never share frame state.
#[derive(Clone, Copy)]
enum Start<'s, 'cb> {
    /// Materialize the next value and hand it to the leaf.
    Buffer(&'s LeafFn<'cb>),
    /// Discard the next value.
    Skip,
    /// Expect an array and apply the element schema to each entry.
    EnterArray(&'s Schema<'cb>),
    /// Expect an object and select members through the mapping.
    EnterObject(&'s SchemaMap<'cb>),
}

impl<'s, 'cb> Start<'s, 'cb> {
    fn of(schema: &'s Schema<'cb>) -> Self {
        match &schema.node {
            Node::Leaf(callback) => Start::Buffer(callback),
            Node::Array(inner) => Start::EnterArray(inner),
            Node::Object(map) => Start::EnterObject(map),
        }
    }

    fn into_frame(self) -> Frame<'s, 'cb> {
        match self {
            Start::Buffer(callback) => Frame::ValueBuffering(callback),
            Start::Skip => Frame::ValueSkipping,
            Start::EnterArray(inner) => Frame::ArrayPreBegin(inner),
            Start::EnterObject(map) => Frame::ObjectPreBegin(map),
        }
    }
}

/// One element of the visitor stack: what the driver expects next at this
/// level of the schema.
#[derive(Clone, Copy)]
enum Frame<'s, 'cb> {
    ValueBuffering(&'s LeafFn<'cb>),
    ValueSkipping,
    ArrayPreBegin(&'s Schema<'cb>),
    ArrayPostBegin(Start<'s, 'cb>),
    ArrayPostValue(Start<'s, 'cb>),
    ArrayPreEnd,
    ObjectPreBegin(&'s SchemaMap<'cb>),
    ObjectPostBegin(&'s SchemaMap<'cb>),
    ObjectPreKey(&'s SchemaMap<'cb>),
    ObjectPostKey(Start<'s, 'cb>),
    ObjectPostValue(&'s SchemaMap<'cb>),
}

/// Drives `schema` over the chunk stream until the top-level value has been
/// fully processed or the token source is exhausted.
///
/// Callbacks returning futures are awaited before the next token is
/// requested, so they run strictly in document order with no interleaving.
/// The first error terminates the visit; side effects of earlier callbacks
/// remain observable.
///
/// A top-level value whose shape contradicts the schema (for example a
/// primitive where an array or object descent was given) fails with
/// [`VisitError::Syntax`] at its first token.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
///
/// use jsonsieve::{leaf, object, text_stream, visit};
///
/// let acc = RefCell::new(Vec::new());
/// let schema = object([("foo", leaf(|v| acc.borrow_mut().push(v)))]);
/// let chunks = text_stream([r#"{"foo":"bar","baz":42}"#]);
/// futures::executor::block_on(visit(chunks, &schema)).unwrap();
/// assert_eq!(*acc.borrow(), vec!["bar".into()]);
/// ```
pub async fn visit<S>(chunks: S, schema: &Schema<'_>) -> Result<(), VisitError>
where
    S: Stream<Item = Result<String, BoxError>> + Unpin,
{
    let mut tokens = TokenStream::new(chunks);
    let mut stack = vec![Start::of(schema).into_frame()];
    // Nesting inside the value currently being buffered or skipped; zero
    // while the driver is operating at schema level.
    let mut depth: usize = 0;

    while !stack.is_empty() {
        let Some(result) = tokens.next().await else {
            break;
        };
        let kind = result?;

        // An open array either closes on this token or gains a fresh element
        // frame for it; the main dispatch then sees the rewritten top.
        if let Some(&Frame::ArrayPostBegin(element)) = stack.last() {
            let top = stack.last_mut().expect("array frame on stack");
            if kind == TokenKind::EndArray {
                *top = Frame::ArrayPreEnd;
            } else {
                *top = Frame::ArrayPostValue(element);
                stack.push(element.into_frame());
            }
        }

        match *stack.last().expect("stack is non-empty") {
            Frame::ValueBuffering(callback) => {
                if depth == 0 {
                    tokens.buffer();
                }
                apply_depth(&mut depth, kind)?;
                if depth == 0 {
                    let text = tokens.flush();
                    callback(text).await?;
                    stack.pop();
                }
            }
            Frame::ValueSkipping => {
                apply_depth(&mut depth, kind)?;
                if depth == 0 {
                    stack.pop();
                }
            }
            Frame::ArrayPreBegin(inner) => {
                if kind != TokenKind::BeginArray {
                    return Err(SyntaxError::ExpectedArrayStart(kind).into());
                }
                *stack.last_mut().expect("array frame on stack") =
                    Frame::ArrayPostBegin(Start::of(inner));
            }
            Frame::ArrayPostBegin(_) => unreachable!("rewritten before dispatch"),
            Frame::ArrayPostValue(element) => match kind {
                TokenKind::EndArray => {
                    stack.pop();
                }
                TokenKind::ValueSeparator => stack.push(element.into_frame()),
                _ => return Err(SyntaxError::ExpectedArrayContinuation(kind).into()),
            },
            Frame::ArrayPreEnd => {
                stack.pop();
            }
            Frame::ObjectPreBegin(map) => {
                if kind != TokenKind::BeginObject {
                    return Err(SyntaxError::ExpectedObjectStart(kind).into());
                }
                *stack.last_mut().expect("object frame on stack") = Frame::ObjectPostBegin(map);
            }
            Frame::ObjectPostBegin(map) => match kind {
                TokenKind::EndObject => {
                    stack.pop();
                }
                TokenKind::Atom => select_member(map, &mut stack, &mut tokens)?,
                _ => return Err(SyntaxError::ExpectedKey(kind).into()),
            },
            Frame::ObjectPreKey(map) => {
                if kind != TokenKind::Atom {
                    return Err(SyntaxError::ExpectedKey(kind).into());
                }
                select_member(map, &mut stack, &mut tokens)?;
            }
            Frame::ObjectPostKey(start) => {
                if kind != TokenKind::NameSeparator {
                    return Err(SyntaxError::ExpectedNameSeparator(kind).into());
                }
                *stack.last_mut().expect("key frame on stack") = start.into_frame();
            }
            Frame::ObjectPostValue(map) => match kind {
                TokenKind::EndObject => {
                    stack.pop();
                }
                TokenKind::ValueSeparator => {
                    *stack.last_mut().expect("object frame on stack") = Frame::ObjectPreKey(map);
                }
                _ => return Err(SyntaxError::ExpectedObjectContinuation(kind).into()),
            },
        }
    }

    Ok(())
}

/// Applies a token's effect to the local nesting depth.
fn apply_depth(depth: &mut usize, kind: TokenKind) -> Result<(), SyntaxError> {
    match kind {
        TokenKind::BeginObject | TokenKind::BeginArray => *depth += 1,
        TokenKind::EndObject | TokenKind::EndArray => {
            if *depth == 0 {
                return Err(SyntaxError::UnbalancedClose(kind));
            }
            *depth -= 1;
        }
        _ => {}
    }
    Ok(())
}

/// Decodes the key atom just yielded and pushes the member's start state:
/// the mapped schema's, or a skip for keys the mapping does not name.
///
/// Keys ride the same buffer/flush path as leaf values, with depth never
/// leaving zero.
fn select_member<'s, 'cb, S>(
    map: &'s SchemaMap<'cb>,
    stack: &mut Vec<Frame<'s, 'cb>>,
    tokens: &mut TokenStream<S>,
) -> Result<(), VisitError> {
    tokens.buffer();
    let text = tokens.flush();
    let key: String = serde_json::from_str(&text)?;
    let start = map.get(&key).map_or(Start::Skip, Start::of);
    *stack.last_mut().expect("object frame on stack") = Frame::ObjectPostValue(map);
    stack.push(Frame::ObjectPostKey(start));
    Ok(())
}
