//! Display-only execution-context tags.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_SEQ: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TAG: String =
        format!("thread-{}", NEXT_THREAD_SEQ.fetch_add(1, Ordering::Relaxed));
}

/// Tag identifying the calling thread, e.g. `thread-3`.
///
/// Sequence numbers are assigned on first use per thread. Not stable across
/// runs; meant for eyeballing interleaved output only.
pub fn execution_context_tag() -> String {
    THREAD_TAG.with(Clone::clone)
}
