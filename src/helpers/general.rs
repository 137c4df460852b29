//! General helper: the fallback chat strategy.

use tracing::debug;

use crate::blackboard::Blackboard;
use crate::error::AppError;
use crate::llm::LlmClient;

pub struct GeneralHelper {
    llm: LlmClient,
}

impl GeneralHelper {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Forward the flattened conversation plus the message to the
    /// completion client, unconditionally. Failures only come from the
    /// client, which itself fails soft.
    pub async fn handle(&self, message: &str, board: &mut Blackboard) -> Result<String, AppError> {
        debug!("general helper handling message");
        let prompt = format!("{}\nUser: {message}\nAssistant:", board.flatten_history());
        Ok(self.llm.complete_soft(&prompt, None).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::Role;
    use crate::llm::providers::dummy::DummyProvider;

    #[tokio::test]
    async fn prompt_carries_history_and_message() {
        let helper = GeneralHelper::new(LlmClient::Dummy(DummyProvider));
        let mut board = Blackboard::new();
        board.push(Role::User, "earlier question");

        let reply = helper.handle("new question", &mut board).await.unwrap();
        assert!(reply.starts_with("[echo] "));
        assert!(reply.contains("User: earlier question"));
        assert!(reply.contains("User: new question"));
        assert!(reply.ends_with("Assistant:"));
    }
}
