use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

/// Future returned by an invoked hook.
pub type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A compiled hook, ready to be invoked once with a [`Resume`] handle.
pub type BoxedHook = Box<dyn FnOnce(Resume) -> HookFuture + Send>;

/// Capability that compiles a hook snippet into a callable hook.
///
/// This is the typed replacement for the original `(_) => eval(_)` runtime
/// callback: instead of pattern-matching the callback's stringified source,
/// the contract is carried by the trait. Implementations typically hand the
/// snippet to an embedded script engine and wrap the resulting function
/// value.
pub trait EvalCallback: Send + 'static {
    /// Compile `snippet` (a parenthesized function expression) into a hook.
    fn eval(&mut self, snippet: &str) -> anyhow::Result<BoxedHook>;
}

impl<F> EvalCallback for F
where
    F: FnMut(&str) -> anyhow::Result<BoxedHook> + Send + 'static,
{
    fn eval(&mut self, snippet: &str) -> anyhow::Result<BoxedHook> {
        self(snippet)
    }
}

struct ResumeInner {
    tx: Mutex<Option<oneshot::Sender<()>>>,
    resolved: AtomicBool,
}

/// Externally invocable resolve handle for a [`Deferred`].
///
/// Cloneable and `Send`: invoking any clone from any task or thread resolves
/// the same instance. The first call wins; every later call is a no-op by
/// construction (the sender is consumed), and `is_resolved` stays sticky
/// true.
#[derive(Clone)]
pub struct Resume {
    inner: Arc<ResumeInner>,
}

impl Resume {
    /// Resolve the associated [`Deferred`]. No-op after the first call.
    pub fn resume(&self) {
        if self.inner.resolved.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut tx) = self.inner.tx.lock()
            && let Some(tx) = tx.take()
        {
            let _ = tx.send(());
        }
    }

    /// Whether [`Resume::resume`] has been called on any clone.
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.load(Ordering::SeqCst)
    }
}

/// One-shot suspend/resume primitive bridging an external resume signal to a
/// suspended asynchronous wait.
pub struct Deferred {
    rx: oneshot::Receiver<()>,
    resume: Resume,
}

impl Deferred {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Deferred {
            rx,
            resume: Resume {
                inner: Arc::new(ResumeInner {
                    tx: Mutex::new(Some(tx)),
                    resolved: AtomicBool::new(false),
                }),
            },
        }
    }

    /// A resolve handle for this deferred. Safe to hand to unrelated callers.
    pub fn resume(&self) -> Resume {
        self.resume.clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.resume.is_resolved()
    }

    /// Wait until resolved. Also completes if every [`Resume`] clone has been
    /// dropped unresolved — at that point resolution has become unreachable
    /// and blocking forever would be a deadlock, not a pause.
    pub async fn wait(self) {
        let Deferred { rx, resume } = self;
        // Drop our own handle so outstanding clones alone keep the channel open.
        drop(resume);
        let _ = rx.await;
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}
