//! Asynchronous token stream with a selectable capture window.
//!
//! [`TokenStream`] pulls chunks from an upstream source on demand, runs them
//! through the [`Scanner`], and yields token kinds one at a time. On request
//! it retains the raw chunk text spanned by yielded tokens, so a consumer can
//! recover the exact original text of any token range, however many chunk
//! boundaries it crosses, via [`buffer`](TokenStream::buffer) and
//! [`flush`](TokenStream::flush).
//!
//! Token yields are strictly serialized with chunk consumption: a yielded
//! token (and any `buffer()` call the consumer makes in response) is observed
//! before the window advances or the scanner sees another chunk. In this pull
//! model the post-yield window bookkeeping runs at entry to the following
//! [`next`](TokenStream::next) call, which is what lets a `buffer()` issued
//! between two yields freeze the window at the end of the token yielded
//! immediately before it.

use std::collections::VecDeque;

use futures::{stream, Stream, StreamExt};

use crate::{
    error::{BoxError, VisitError},
    scanner::{Scanner, Token, TokenKind},
};

/// Builds an infallible chunk stream from an iterator of text parts.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use jsonsieve::{TokenStream, TokenKind, text_stream};
///
/// let mut tokens = TokenStream::new(text_stream(["[1,", "2]"]));
/// block_on(async {
///     assert_eq!(tokens.next().await.unwrap().unwrap(), TokenKind::BeginArray);
/// });
/// ```
pub fn text_stream<I>(parts: I) -> impl Stream<Item = Result<String, BoxError>> + Unpin
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    stream::iter(
        parts
            .into_iter()
            .map(|part| Ok(part.into()))
            .collect::<Vec<_>>(),
    )
}

/// Async producer of token kinds over a chunk source, with transparent
/// capture of the raw text behind a `buffer()`/`flush()` window.
///
/// Not safe for concurrent use; a single visit owns it exclusively.
#[derive(Debug)]
pub struct TokenStream<S> {
    source: S,
    scanner: Scanner,
    /// Tokens completed by the current chunk, not yet yielded.
    queue: VecDeque<Token>,
    /// Suffixes of earlier chunks belonging to the current window.
    saved: Vec<String>,
    /// Most recent chunk.
    chunk: String,
    /// First byte of the window in the oldest retained text.
    start: usize,
    /// One past the end of the most recently yielded token.
    end: usize,
    buffering: bool,
    exhausted: bool,
}

impl<S> TokenStream<S> {
    /// Wraps a chunk source. No chunk is pulled until the first
    /// [`next`](Self::next) call.
    pub fn new(source: S) -> Self {
        Self {
            source,
            scanner: Scanner::new(),
            queue: VecDeque::new(),
            saved: Vec::new(),
            chunk: String::new(),
            start: 0,
            end: 0,
            buffering: false,
            exhausted: false,
        }
    }

    /// Starts retaining the raw chunk text spanned by yielded tokens.
    ///
    /// The window opens at the end of the token yielded immediately before
    /// this call (or at the start of the stream), so the next yielded token
    /// is captured from its first byte, including any whitespace before it.
    pub fn buffer(&mut self) {
        self.buffering = true;
    }

    /// Returns the retained text from the start of the window through the
    /// most recently yielded token, clears the window, and stops buffering.
    #[must_use]
    pub fn flush(&mut self) -> String {
        let tail = &self.chunk[self.start..self.end];
        let mut text =
            String::with_capacity(self.saved.iter().map(String::len).sum::<usize>() + tail.len());
        for part in self.saved.drain(..) {
            text.push_str(&part);
        }
        text.push_str(tail);
        self.start = self.end;
        self.buffering = false;
        text
    }

    /// Bytes currently retained for the window (earlier-chunk suffixes plus
    /// the windowed span of the current chunk).
    #[cfg(test)]
    pub(crate) fn retained_len(&self) -> usize {
        self.saved.iter().map(String::len).sum::<usize>() + self.end.saturating_sub(self.start)
    }
}

impl<S> TokenStream<S>
where
    S: Stream<Item = Result<String, BoxError>> + Unpin,
{
    /// Yields the next token kind, pulling upstream chunks as needed.
    ///
    /// Returns `None` once the source and the scanner are both drained.
    /// Upstream failures propagate verbatim as
    /// [`VisitError::Upstream`]; after any error the stream must be
    /// discarded.
    pub async fn next(&mut self) -> Option<Result<TokenKind, VisitError>> {
        if !self.buffering {
            self.saved.clear();
            self.start = self.end;
        }
        loop {
            if let Some(token) = self.queue.pop_front() {
                self.end = token.end;
                return Some(Ok(token.kind));
            }
            if self.exhausted {
                return None;
            }
            match self.source.next().await {
                Some(Ok(chunk)) => {
                    // Keep the tail of the outgoing chunk: it may belong to
                    // the window or to a token still pending in the scanner.
                    if self.start < self.chunk.len() {
                        self.saved.push(self.chunk[self.start..].to_owned());
                    }
                    self.queue.extend(self.scanner.feed(&chunk));
                    self.chunk = chunk;
                    self.start = 0;
                    self.end = 0;
                }
                Some(Err(source)) => {
                    self.exhausted = true;
                    return Some(Err(VisitError::Upstream(source)));
                }
                None => {
                    self.exhausted = true;
                    self.queue.extend(self.scanner.finish());
                }
            }
        }
    }
}
