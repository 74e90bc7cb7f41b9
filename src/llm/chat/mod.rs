pub mod dial;
pub mod sse;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

use self::dial::DialChatClient;
use crate::config::ClientConfig;
use crate::llm::LlmError;
use crate::models::chat::Message;

/// Receives assistant text as it is decoded: the whole reply on the
/// synchronous path, every non-empty delta on the streaming path.
pub type ContentObserver = Arc<dyn Fn(&str) + Send + Sync>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the full history and waits for the whole reply.
    async fn get_completion(&self, messages: &[Message]) -> Result<Message, LlmError>;

    /// Starts a streamed completion on a background task and returns at once.
    ///
    /// Must be called from within a tokio runtime.
    fn stream_completion(&self, messages: Vec<Message>) -> PendingCompletion;
}

/// Handle to a completion running on a background task. The result is
/// delivered once, when the whole stream has been read.
#[derive(Debug)]
pub struct PendingCompletion {
    handle: JoinHandle<Result<Message, LlmError>>,
}

impl PendingCompletion {
    pub fn spawn<F>(task: F) -> Self
        where F: std::future::Future<Output = Result<Message, LlmError>> + Send + 'static
    {
        Self {
            handle: tokio::spawn(task),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<Message, LlmError> {
        self.handle.await?
    }
}

pub fn new_client(
    config: &ClientConfig,
    observer: Option<ContentObserver>
) -> Result<Arc<dyn ChatClient>, LlmError> {
    let mut client = DialChatClient::new(config.clone())?;
    if let Some(observer) = observer {
        client = client.with_observer(observer);
    }
    Ok(Arc::new(client))
}
