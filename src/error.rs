//! Error types reported by the token stream and the visitor driver.

use thiserror::Error;

use crate::scanner::TokenKind;

/// Boxed error object for user-supplied failures (chunk sources, callbacks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The document does not match the token the schema expects at the current
/// position.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// An array descent saw something other than `[`.
    #[error("expected '[', found {0}")]
    ExpectedArrayStart(TokenKind),
    /// An object descent saw something other than `{`.
    #[error("expected '{{', found {0}")]
    ExpectedObjectStart(TokenKind),
    /// An object member position held no key atom.
    #[error("expected object key, found {0}")]
    ExpectedKey(TokenKind),
    /// An object key was not followed by `:`.
    #[error("expected ':' after object key, found {0}")]
    ExpectedNameSeparator(TokenKind),
    /// An array element was followed by neither `,` nor `]`.
    #[error("expected ',' or ']', found {0}")]
    ExpectedArrayContinuation(TokenKind),
    /// An object member was followed by neither `,` nor `}`.
    #[error("expected ',' or '}}', found {0}")]
    ExpectedObjectContinuation(TokenKind),
    /// A close delimiter appeared with no matching open inside a buffered or
    /// skipped value.
    #[error("unbalanced {0} inside value")]
    UnbalancedClose(TokenKind),
}

/// Terminal error raised by [`visit`](crate::visit) or
/// [`TokenStream`](crate::TokenStream). The first error ends the visit;
/// engine state afterwards is undefined and must be discarded.
#[derive(Debug, Error)]
pub enum VisitError {
    /// The document shape does not match the schema.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// Buffered material was not a valid JSON value.
    #[error("invalid JSON value: {0}")]
    Parse(#[from] serde_json::Error),
    /// The upstream chunk source failed; propagated verbatim.
    #[error("chunk stream error: {0}")]
    Upstream(#[source] BoxError),
    /// A user callback failed; propagated verbatim.
    #[error("callback error: {0}")]
    Callback(#[source] BoxError),
}
