//! Speech capability boundary

use crate::NarrationError;
use std::future::Future;

/// External text-to-speech engine.
///
/// `speak` resolves when the utterance completes (or the engine rejects
/// it); `cancel` drops the current utterance and anything the engine has
/// queued. Both are best-effort: a failing engine degrades narration, it
/// never crashes a loop.
pub trait SpeechSink: Send + Sync + 'static {
    fn speak(&self, text: String) -> impl Future<Output = Result<(), NarrationError>> + Send;

    fn cancel(&self);
}
