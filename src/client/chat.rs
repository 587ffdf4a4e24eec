use serde_json::Value;
use tracing::info;

use super::core::StudioClient;
use crate::request::ChatOptions;
use crate::types::{ChatReply, ChatTurn, Citation, OperationOutcome};

impl StudioClient {
    /// One chat turn with the configured system instruction and web search.
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatTurn],
        reference_image: Option<&str>,
    ) -> OperationOutcome<ChatReply> {
        let options = self.default_chat_options();
        self.chat_with_options(message, history, reference_image, &options)
            .await
    }

    /// Empty reply text is a valid success; only provider failures yield `Failure`.
    pub async fn chat_with_options(
        &self,
        message: &str,
        history: &[ChatTurn],
        reference_image: Option<&str>,
        options: &ChatOptions,
    ) -> OperationOutcome<ChatReply> {
        let credential = match self.credential("chat") {
            Ok(c) => c,
            Err(kind) => return OperationOutcome::Failure(kind),
        };
        let request = self
            .requests
            .build_chat(message, history, reference_image, options);

        match self.provider.generate_content(&request, &credential).await {
            Ok(body) => {
                let reply = parse_chat_reply(&body);
                info!(
                    model = %request.model,
                    chars = reply.text.len(),
                    citations = reply.citations.len(),
                    "chat reply received"
                );
                OperationOutcome::Success(reply)
            }
            Err(e) => OperationOutcome::Failure(self.settle("chat", e)),
        }
    }
}

/// Text of the first candidate plus its web grounding sources.
pub(crate) fn parse_chat_reply(body: &Value) -> ChatReply {
    let candidate = body.pointer("/candidates/0");

    let text = candidate
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p.get("thought").and_then(|t| t.as_bool()).unwrap_or(false))
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();

    let citations = candidate
        .and_then(|c| c.pointer("/groundingMetadata/groundingChunks"))
        .and_then(|g| g.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    let uri = web.get("uri")?.as_str()?.to_string();
                    let title = web.get("title").and_then(|t| t.as_str()).map(String::from);
                    Some(Citation { uri, title })
                })
                .collect()
        })
        .unwrap_or_default();

    ChatReply { text, citations }
}
