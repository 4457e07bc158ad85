use futures::executor::block_on;

use crate::{text_stream, TokenKind, TokenStream};

async fn take<S>(tokens: &mut TokenStream<S>, n: usize) -> Vec<TokenKind>
where
    S: futures::Stream<Item = Result<String, crate::BoxError>> + Unpin,
{
    let mut kinds = Vec::with_capacity(n);
    for _ in 0..n {
        kinds.push(tokens.next().await.expect("token available").unwrap());
    }
    kinds
}

#[test]
fn window_spans_chunk_boundary() {
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(["{\"foo\":", "\"bar\"}"]));
        tokens.buffer();
        let kinds = take(&mut tokens, 5).await;
        assert_eq!(
            kinds,
            vec![
                TokenKind::BeginObject,
                TokenKind::Atom,
                TokenKind::NameSeparator,
                TokenKind::Atom,
                TokenKind::EndObject,
            ]
        );
        assert_eq!(tokens.flush(), "{\"foo\":\"bar\"}");
        assert!(tokens.next().await.is_none());
    });
}

#[test]
fn window_opens_after_last_yielded_token() {
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(["{\"foo\":\"bar\"}"]));
        // Consume '{' before buffering; the window then excludes it.
        take(&mut tokens, 1).await;
        tokens.buffer();
        take(&mut tokens, 4).await;
        assert_eq!(tokens.flush(), "\"foo\":\"bar\"}");
    });
}

#[test]
fn flush_resets_the_window() {
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(["[1,2]"]));
        tokens.buffer();
        take(&mut tokens, 2).await;
        assert_eq!(tokens.flush(), "[1");
        tokens.buffer();
        take(&mut tokens, 2).await;
        assert_eq!(tokens.flush(), ",2");
    });
}

#[test]
fn window_includes_whitespace_between_tokens() {
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(["[ 1 , 2 ]"]));
        take(&mut tokens, 2).await;
        tokens.buffer();
        take(&mut tokens, 2).await;
        assert_eq!(tokens.flush(), " , 2");
    });
}

#[test]
fn window_survives_many_tiny_chunks() {
    let doc = "{\"key\": [null, true, \"gl\\u00fcck\", 3.14]}";
    for parts in 1..=doc.len() {
        let chunks = crate::split_chunks(doc, parts);
        block_on(async {
            let mut tokens = TokenStream::new(text_stream(chunks));
            tokens.buffer();
            while let Some(result) = tokens.next().await {
                result.unwrap();
            }
            assert_eq!(tokens.flush(), doc, "parts={parts}");
        });
    }
}

#[test]
fn retained_material_stays_bounded_while_not_buffering() {
    // 200 single-digit elements, delivered in 3-byte chunks.
    let doc = format!(
        "[{}]",
        (0..200).map(|i| (i % 10).to_string()).collect::<Vec<_>>().join(",")
    );
    let chunks: Vec<String> = crate::split_chunks(&doc, doc.len().div_ceil(3))
        .into_iter()
        .map(str::to_owned)
        .collect();
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(chunks));
        while let Some(result) = tokens.next().await {
            result.unwrap();
            // Nothing is selected, so the window never accumulates more
            // than a token straddling one chunk boundary.
            assert!(tokens.retained_len() <= 8, "window grew unbounded");
        }
    });
}

#[test]
fn upstream_error_propagates_verbatim() {
    block_on(async {
        let source = futures::stream::iter(vec![
            Ok("[1,".to_owned()),
            Err::<String, crate::BoxError>("connection reset".into()),
        ]);
        let mut tokens = TokenStream::new(source);
        take(&mut tokens, 2).await;
        let err = tokens.next().await.unwrap().unwrap_err();
        assert!(matches!(err, crate::VisitError::Upstream(_)));
        assert!(err.to_string().contains("connection reset"));
    });
}

#[test]
fn sentinel_flushes_trailing_atom() {
    block_on(async {
        let mut tokens = TokenStream::new(text_stream(["nu", "ll"]));
        tokens.buffer();
        assert_eq!(tokens.next().await.unwrap().unwrap(), TokenKind::Atom);
        assert_eq!(tokens.flush(), "null");
        assert!(tokens.next().await.is_none());
    });
}
