use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::executor::block_on;
use serde_json::json;

use crate::{array, leaf, leaf_async, object, text_stream, visit, BoxError, VisitError};

/// Future that is pending on its first poll and ready on the second.
#[derive(Default)]
struct YieldOnce {
    polled: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.polled {
            Poll::Ready(())
        } else {
            self.polled = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test]
fn pending_callback_resolves_before_next_value_is_processed() {
    let log = RefCell::new(Vec::new());
    let schema = array(leaf_async(|value| {
        log.borrow_mut().push(format!("enter {value}"));
        let log = &log;
        async move {
            YieldOnce::default().await;
            log.borrow_mut().push(format!("settle {value}"));
            Ok(())
        }
    }));
    block_on(visit(text_stream(["[1,2,3]"]), &schema)).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            "enter 1", "settle 1", "enter 2", "settle 2", "enter 3", "settle 3",
        ]
    );
}

#[test]
fn async_callback_error_propagates() {
    let schema = array(leaf_async(|value| async move {
        if value == json!(2) {
            Err(BoxError::from("two is right out"))
        } else {
            Ok(())
        }
    }));
    let err = block_on(visit(text_stream(["[1,2,3]"]), &schema)).unwrap_err();
    assert!(matches!(err, VisitError::Callback(_)));
    assert!(err.to_string().contains("two is right out"));
}

#[test]
fn visit_drains_a_channel_fed_source() {
    let (tx, rx) = mpsc::unbounded::<Result<String, BoxError>>();
    let doc = r#"{"rows":[{"id":1},{"id":2},{"id":3}]}"#;
    for chunk in crate::split_chunks(doc, 7) {
        tx.unbounded_send(Ok(chunk.to_owned())).unwrap();
    }
    drop(tx);

    let ids = RefCell::new(Vec::new());
    let schema = object([(
        "rows",
        array(object([("id", leaf(|v| ids.borrow_mut().push(v)))])),
    )]);
    block_on(visit(rx, &schema)).unwrap();
    assert_eq!(*ids.borrow(), vec![json!(1), json!(2), json!(3)]);
}
