//! Cancellable futures for in-flight operations, and the completion handlers
//! notified alongside them.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::error;

use crate::client::error::{XmsError, XmsResult};

/// Completion handler notified when an operation finishes.
///
/// Exactly one of the three methods is called per operation.
pub trait Callback<T>: Send + Sync {
    fn completed(&self, value: &T);
    fn failed(&self, error: &XmsError);
    fn cancelled(&self);
}

pub type CallbackRef<T> = Arc<dyn Callback<T>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Policy applied to every completion handler passed to a connection.
pub enum CallbackWrapper {
    /// Use handlers as given; a panicking handler unwinds into the caller of
    /// the signal.
    Identity,
    /// Catch and log panics raised by a handler, then drop them.
    #[default]
    DropPanics,
}

impl CallbackWrapper {
    /// Apply this policy. `None` stays `None`.
    pub fn wrap<T: 'static>(self, callback: Option<CallbackRef<T>>) -> Option<CallbackRef<T>> {
        let callback = callback?;
        Some(match self {
            Self::Identity => callback,
            Self::DropPanics => Arc::new(PanicDropping { inner: callback }),
        })
    }
}

struct PanicDropping<T> {
    inner: CallbackRef<T>,
}

impl<T> Callback<T> for PanicDropping<T> {
    fn completed(&self, value: &T) {
        guard("completed", || self.inner.completed(value));
    }

    fn failed(&self, error: &XmsError) {
        guard("failed", || self.inner.failed(error));
    }

    fn cancelled(&self) {
        guard("cancelled", || self.inner.cancelled());
    }
}

fn guard(signal: &'static str, notify: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(notify)) {
        error!(
            signal,
            panic = panic_message(payload.as_ref()),
            "completion handler panicked; notification dropped"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

struct Shared<T> {
    state: AtomicU8,
    abort: AbortHandle,
    callback: Option<CallbackRef<T>>,
}

impl<T> Shared<T> {
    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn state(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }
}

trait Cancel: Send + Sync {
    fn cancel(&self) -> bool;
    fn is_cancelled(&self) -> bool;
}

impl<T> Cancel for Shared<T> {
    fn cancel(&self) -> bool {
        if !self.transition(CANCELLED) {
            return false;
        }
        self.abort.abort();
        if let Some(callback) = &self.callback {
            callback.cancelled();
        }
        true
    }

    fn is_cancelled(&self) -> bool {
        self.state() == CANCELLED
    }
}

/// Sends the result when dropped, so a panicking handler cannot swallow it.
struct Delivery<T> {
    tx: Option<oneshot::Sender<XmsResult<T>>>,
    result: Option<XmsResult<T>>,
}

impl<T> Delivery<T> {
    fn notify(&self, callback: Option<&dyn Callback<T>>) {
        match (callback, &self.result) {
            (Some(callback), Some(Ok(value))) => callback.completed(value),
            (Some(callback), Some(Err(err))) => callback.failed(err),
            _ => {}
        }
    }
}

impl<T> Drop for Delivery<T> {
    fn drop(&mut self) {
        if let (Some(tx), Some(result)) = (self.tx.take(), self.result.take()) {
            let _ = tx.send(result);
        }
    }
}

/// Owned by the spawned task. Settles a still pending operation as
/// [`XmsError::Closed`] when the task is dropped unfinished, e.g. because the
/// runtime it was spawned on shut down.
struct Completion<T> {
    shared: Arc<Shared<T>>,
    tx: Option<oneshot::Sender<XmsResult<T>>>,
}

impl<T> Completion<T> {
    fn finish(mut self, result: XmsResult<T>) {
        if self.shared.transition(COMPLETED) {
            let delivery = Delivery {
                tx: self.tx.take(),
                result: Some(result),
            };
            delivery.notify(self.shared.callback.as_deref());
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if self.tx.is_some() && self.shared.transition(COMPLETED) {
            if let Some(callback) = &self.shared.callback {
                callback.failed(&XmsError::Closed);
            }
        }
    }
}

/// Result of an in-flight operation.
///
/// Resolves once the response has been decoded. The operation runs whether
/// or not this future is polled; dropping it does not cancel the request.
/// If the runtime running the operation shuts down first, the future
/// resolves to [`XmsError::Closed`] and the handler's `failed` signal fires.
pub struct XmsFuture<T> {
    shared: Arc<Shared<T>>,
    rx: oneshot::Receiver<XmsResult<T>>,
}

pub(crate) fn spawn<T, W>(runtime: &Handle, callback: Option<CallbackRef<T>>, work: W) -> XmsFuture<T>
where
    T: Send + 'static,
    W: Future<Output = XmsResult<T>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let (abort, registration) = AbortHandle::new_pair();
    let shared = Arc::new(Shared {
        state: AtomicU8::new(PENDING),
        abort,
        callback,
    });

    let completion = Completion {
        shared: Arc::clone(&shared),
        tx: Some(tx),
    };
    runtime.spawn(Abortable::new(
        async move {
            let result = work.await;
            completion.finish(result);
        },
        registration,
    ));

    XmsFuture { shared, rx }
}

impl<T: 'static> XmsFuture<T> {
    /// Cancel the operation.
    ///
    /// Returns `false` and changes nothing if the operation already completed
    /// or was already cancelled. Otherwise the request is aborted, the
    /// handler's `cancelled` signal fires, and the future resolves to
    /// [`XmsError::Cancelled`].
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Returns `true` once the operation has completed or was cancelled.
    pub fn is_done(&self) -> bool {
        self.shared.state() != PENDING
    }

    /// A handle that can cancel this operation from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            inner: Arc::clone(&self.shared) as Arc<dyn Cancel>,
        }
    }

    /// Block the current thread until the operation finishes.
    ///
    /// Must not be called from an async context.
    pub fn wait(self) -> XmsResult<T> {
        futures::executor::block_on(self)
    }
}

impl<T> Future for XmsFuture<T> {
    type Output = XmsResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) if this.shared.is_cancelled() => {
                Poll::Ready(Err(XmsError::Cancelled))
            }
            Poll::Ready(Err(_)) => Poll::Ready(Err(XmsError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for XmsFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.shared.state() {
            PENDING => "pending",
            COMPLETED => "completed",
            _ => "cancelled",
        };
        f.debug_struct("XmsFuture").field("state", &state).finish()
    }
}

#[derive(Clone)]
/// Cancels the operation of an [`XmsFuture`] without owning it.
pub struct CancelHandle {
    inner: Arc<dyn Cancel>,
}

impl CancelHandle {
    /// See [`XmsFuture::cancel`].
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        signals: Mutex<Vec<String>>,
        panic_on_completed: bool,
    }

    impl Recorder {
        fn panicking() -> Self {
            Self {
                panic_on_completed: true,
                ..Self::default()
            }
        }

        fn signals(&self) -> Vec<String> {
            self.signals.lock().unwrap().clone()
        }
    }

    impl Callback<u32> for Recorder {
        fn completed(&self, value: &u32) {
            self.signals.lock().unwrap().push(format!("completed:{value}"));
            if self.panic_on_completed {
                panic!("handler exploded");
            }
        }

        fn failed(&self, error: &XmsError) {
            self.signals.lock().unwrap().push(format!("failed:{error}"));
        }

        fn cancelled(&self) {
            self.signals.lock().unwrap().push("cancelled".to_owned());
        }
    }

    #[test]
    fn wrap_none_is_none() {
        assert!(CallbackWrapper::DropPanics.wrap::<u32>(None).is_none());
        assert!(CallbackWrapper::Identity.wrap::<u32>(None).is_none());
    }

    #[test]
    fn identity_returns_same_handler() {
        let recorder: CallbackRef<u32> = Arc::new(Recorder::default());
        let wrapped = CallbackWrapper::Identity.wrap(Some(Arc::clone(&recorder))).unwrap();
        assert!(Arc::ptr_eq(&recorder, &wrapped));
    }

    #[test]
    fn drop_panics_suppresses_handler_panic() {
        let recorder = Arc::new(Recorder::panicking());
        let wrapped = CallbackWrapper::DropPanics
            .wrap(Some(Arc::clone(&recorder) as CallbackRef<u32>))
            .unwrap();
        wrapped.completed(&7);
        assert_eq!(recorder.signals(), vec!["completed:7"]);
    }

    #[tokio::test]
    async fn resolves_and_notifies_once() {
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            &Handle::current(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            async { Ok(42) },
        );
        assert_eq!(future.await.unwrap(), 42);
        assert_eq!(recorder.signals(), vec!["completed:42"]);
    }

    #[tokio::test]
    async fn failure_reaches_future_and_handler() {
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            &Handle::current(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            async { Err(XmsError::Unauthorized) },
        );
        assert!(matches!(future.await, Err(XmsError::Unauthorized)));
        assert_eq!(recorder.signals(), vec!["failed:unauthorized"]);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            &Handle::current(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            futures::future::pending::<XmsResult<u32>>(),
        );
        let handle = future.cancel_handle();

        assert!(future.cancel());
        assert!(!future.cancel());
        assert!(!handle.cancel());
        assert!(future.is_cancelled());
        assert!(future.is_done());
        assert!(matches!(future.await, Err(XmsError::Cancelled)));
        assert_eq!(recorder.signals(), vec!["cancelled"]);
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_no_op() {
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let future = spawn(&Handle::current(), None, async move {
            let _ = release_rx.await;
            Ok(5u32)
        });
        let handle = future.cancel_handle();
        release_tx.send(()).unwrap();

        let value = future.await.unwrap();
        assert_eq!(value, 5);
        assert!(!handle.cancel());
        assert!(!handle.is_cancelled());
    }

    #[tokio::test]
    async fn value_is_delivered_when_identity_handler_panics() {
        let recorder = Arc::new(Recorder::panicking());
        let callback = CallbackWrapper::Identity.wrap(Some(recorder.clone() as CallbackRef<u32>));
        let future = spawn(&Handle::current(), callback, async { Ok(9) });
        assert_eq!(future.await.unwrap(), 9);
        assert_eq!(recorder.signals(), vec!["completed:9"]);
    }

    #[tokio::test]
    async fn cancel_before_consuming_a_resolved_future_keeps_its_value() {
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            &Handle::current(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            async { Ok(5) },
        );
        while !future.is_done() {
            tokio::task::yield_now().await;
        }

        assert!(!future.cancel());
        assert!(!future.is_cancelled());
        assert_eq!(future.await.unwrap(), 5);
        assert_eq!(recorder.signals(), vec!["completed:5"]);
    }

    #[test]
    fn dropped_runtime_resolves_to_closed() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let future = spawn(
            runtime.handle(),
            None,
            futures::future::pending::<XmsResult<u32>>(),
        );
        drop(runtime);
        assert!(matches!(future.wait(), Err(XmsError::Closed)));
    }

    #[test]
    fn runtime_shutdown_fails_pending_work_once() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            runtime.handle(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            futures::future::pending::<XmsResult<u32>>(),
        );
        runtime.shutdown_background();

        assert!(matches!(future.wait(), Err(XmsError::Closed)));
        assert_eq!(recorder.signals(), vec!["failed:connection is closed"]);
    }

    #[test]
    fn runtime_shutdown_after_cancel_adds_no_signal() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let recorder = Arc::new(Recorder::default());
        let future = spawn(
            runtime.handle(),
            Some(Arc::clone(&recorder) as CallbackRef<u32>),
            futures::future::pending::<XmsResult<u32>>(),
        );
        assert!(future.cancel());
        runtime.shutdown_background();

        assert!(matches!(future.wait(), Err(XmsError::Cancelled)));
        assert_eq!(recorder.signals(), vec!["cancelled"]);
    }
}
