//! Wraps a streaming model response so the post-response sequence runs
//! exactly once, after the stream completes, without delaying any chunk.

use futures::Stream;
use tokio::sync::OnceCell;

use crate::context::LifecycleContext;
use crate::error::Result;
use crate::executor::LifecycleExecutor;
use crate::sequences::LLM_POST_RESPONSE;

/// The outcome of the deferred post-response sequence, available once the
/// wrapped stream has been fully drained.
pub struct StreamVerdict(OnceCell<Result<()>>);

impl StreamVerdict {
    fn new() -> Self {
        Self(OnceCell::new())
    }

    /// Reads the post-response sequence's result.
    ///
    /// Returns `None` if the stream has not been fully drained yet; chunks
    /// pass through untouched, so this only resolves once the underlying
    /// stream is exhausted.
    #[must_use]
    pub fn get(&self) -> Option<&Result<()>> {
        self.0.get()
    }
}

/// Wraps `chunks` so every item passes through untouched while text is
/// accumulated via `extract_text`; once `chunks` ends, the accumulated
/// text is placed into `context` and [`LLM_POST_RESPONSE`] is evaluated
/// exactly once against `executor`.
///
/// The returned [`StreamVerdict`] is populated only after the stream is
/// fully drained; a denial or escalation raised this late cannot unsend
/// chunks already yielded to the caller, so a caller that needs to veto a
/// response before any of it reaches the user should not use streaming.
pub fn wrap_stream<'a, R, S, T>(
    executor: &'a LifecycleExecutor<'a>,
    mut context: LifecycleContext<R>,
    extract_text: impl Fn(&T) -> &str + 'a,
    mut chunks: S,
) -> (impl Stream<Item = T> + 'a, std::sync::Arc<StreamVerdict>)
where
    S: Stream<Item = T> + Unpin + 'a,
    T: 'a,
{
    let verdict = std::sync::Arc::new(StreamVerdict::new());
    let verdict_handle = verdict.clone();

    let stream = async_stream::stream! {
        let mut accumulated = String::new();
        while let Some(chunk) = futures::StreamExt::next(&mut chunks).await {
            accumulated.push_str(extract_text(&chunk));
            yield chunk;
        }

        context.response_text = Some(accumulated);
        let result = executor.run_sequence(LLM_POST_RESPONSE, &mut context).await;
        let _ = verdict_handle.0.set(result);
    };

    (stream, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apl_layer::{CompositionConfig, PolicyLayer};
    use apl_types::SessionMetadata;
    use futures::StreamExt;
    use serde_json::Value;

    #[tokio::test]
    async fn chunks_pass_through_and_the_post_sequence_runs_once_at_the_end() {
        let layer = PolicyLayer::new(CompositionConfig::default());
        let executor = LifecycleExecutor::new(&layer, SessionMetadata::new("s1"));
        let context = LifecycleContext::<()>::new(Value::Null);

        let source = futures::stream::iter(vec!["hello ".to_owned(), "world".to_owned()]);
        let (stream, verdict) = wrap_stream(&executor, context, |chunk: &String| chunk.as_str(), source);

        let collected: Vec<String> = stream.collect().await;
        assert_eq!(collected, vec!["hello ".to_owned(), "world".to_owned()]);
        assert!(verdict.get().unwrap().is_ok());
    }
}
