//! Live-editable debug hooks for embedded JavaScript/TypeScript.
//!
//! A host process executing a JS/TS script can pause inside a "debug hook"
//! declared in that script:
//!
//! ```js
//! dbgr(function (resume) { /* paused — edit me */ }, (_) => eval(_));
//! ```
//!
//! [`run`] extracts the hook function's exact source text from the script
//! file (tree-sitter locates the `dbgr(...)` call; the parse is
//! error-recovering, so mid-edit saves are fine), invokes the host-supplied
//! hook with a [`Resume`] handle, and — while the hook stays unresolved —
//! watches the file for edits. Each save that changes the hook body is
//! re-extracted and handed to the host's [`EvalCallback`] capability, which
//! compiles the snippet into a new hook; the new hook runs immediately with
//! the same resume handle. The developer edits a paused hook on disk and the
//! edit takes effect without restarting the process.
//!
//! The snippet-to-callable step is a hot-swap boundary owned by the caller:
//! this crate never executes script code itself. Only the most recent snippet
//! is tracked, in memory; nothing is persisted.
//!
//! ```no_run
//! use dbgr::{BoxedHook, CallerContext, Resume};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dbgr::DbgrError> {
//!     let caller = CallerContext::new("scripts/session.js")?;
//!     dbgr::run(
//!         caller,
//!         |resume: Resume| async move {
//!             // Behavior of the script's original hook.
//!             resume.resume();
//!         },
//!         |snippet: &str| -> anyhow::Result<BoxedHook> {
//!             // Hand the snippet to the embedded script engine.
//!             todo!("compile {snippet} into a hook")
//!         },
//!     )
//!     .await
//! }
//! ```

pub mod caller;
pub mod error;
pub mod extract;
pub mod hook;
pub mod parse;
pub mod transpile;
mod watcher;

use std::future::Future;

pub use caller::{CallerContext, Dialect};
pub use error::DbgrError;
pub use hook::{BoxedHook, Deferred, EvalCallback, HookFuture, Resume};

/// Run a debug-hook session against the script named by `caller`.
///
/// 1. Loads the script and extracts the initial hook snippet (all failures
///    here propagate before any watch is registered).
/// 2. Invokes `hook` with a [`Resume`] handle and awaits it — hooks may
///    complete synchronously or suspend.
/// 3. If the hook already resolved, returns without ever watching the file.
/// 4. Otherwise watches the script: every save that changes the hook body is
///    compiled through `eval_callback` and the resulting hook is invoked with
///    the same resume handle.
/// 5. Blocks until resolution; the watch subscription is released on every
///    exit path when the handle drops.
///
/// Must be called within a tokio runtime.
///
/// # Errors
/// See [`DbgrError`]. Only startup-phase failures surface here; failures
/// during change handling are logged to stderr and the event is skipped.
pub async fn run<H, Fut, E>(
    caller: CallerContext,
    hook: H,
    eval_callback: E,
) -> Result<(), DbgrError>
where
    H: FnOnce(Resume) -> Fut,
    Fut: Future<Output = ()>,
    E: EvalCallback,
{
    let last_code = extract::load_source(caller.path())?;
    let last_snippet = extract::extract_hook(&last_code, caller.dialect())?;

    let deferred = Deferred::new();
    let resume = deferred.resume();

    hook(resume.clone()).await;

    // A hook that resolved synchronously never needs a watcher.
    let _watch = if deferred.is_resolved() {
        None
    } else {
        let (handle, events) = watcher::start_watcher(caller.path())?;
        tokio::spawn(watcher::change_loop(
            events,
            caller.clone(),
            eval_callback,
            last_code,
            last_snippet,
            resume,
        ));
        Some(handle)
    };

    deferred.wait().await;
    Ok(())
    // `_watch` drops here, releasing the subscription.
}
