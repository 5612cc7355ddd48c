//! OpenAI Chat Completions streaming provider.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::error::CodexError;
use crate::types::{Message, Role, StreamChunk, SHELL_TOOL_NAME};

use super::http::{bearer_headers, parse_sse_data, shared_client, SseData};
use super::{ChunkStream, ModelProvider, ProviderRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.instructions.is_empty() {
            messages.push(message_to_openai(&Message::system(
                request.instructions.as_str(),
            )));
        }
        messages.extend(request.messages.iter().map(message_to_openai));

        serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": true,
            "tools": [shell_tool_definition()],
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn open_stream(&self, request: &ProviderRequest) -> Result<ChunkStream, CodexError> {
        if self.api_key.trim().is_empty() {
            return Err(CodexError::Configuration("Missing OPENAI_API_KEY".into()));
        }

        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        debug!(model = %request.model, messages = request.messages.len(), "OpenAI open_stream");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = LineBuffer::default();
            let mut decoder = ChunkDecoder::default();
            let mut done = false;
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        yield Err(CodexError::Network(e));
                        return;
                    }
                };

                lines.push(&bytes);
                while let Some(line) = lines.next_line() {
                    match decode_line(&line, &mut decoder) {
                        LineEvent::Done => {
                            done = true;
                            break 'read;
                        }
                        LineEvent::Chunks(chunks) => {
                            for chunk in chunks {
                                yield Ok(chunk);
                            }
                        }
                    }
                }
            }

            // A final event may arrive without a trailing newline.
            if !done {
                if let LineEvent::Chunks(chunks) = decode_line(&lines.take_rest(), &mut decoder) {
                    for chunk in chunks {
                        yield Ok(chunk);
                    }
                }
            }

            for chunk in decoder.finish() {
                yield Ok(chunk);
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Splits the response body into lines on raw bytes, so a multi-byte
/// character cut across two network reads is only decoded once whole.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Next complete line, without its `\n`.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.bytes.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    fn take_rest(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

enum LineEvent {
    Chunks(Vec<StreamChunk>),
    Done,
}

fn decode_line(line: &[u8], decoder: &mut ChunkDecoder) -> LineEvent {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line.trim(),
        Err(e) => {
            debug!(error = %e, "skipping SSE line with invalid UTF-8");
            return LineEvent::Chunks(Vec::new());
        }
    };
    if line.is_empty() || line.starts_with(':') {
        return LineEvent::Chunks(Vec::new());
    }

    match parse_sse_data(line) {
        Some(SseData::Done) => LineEvent::Done,
        Some(SseData::Json(data)) => match serde_json::from_str::<serde_json::Value>(data) {
            Ok(raw) => LineEvent::Chunks(decoder.push(raw)),
            Err(e) => {
                debug!(error = %e, "skipping unparseable SSE data");
                LineEvent::Chunks(Vec::new())
            }
        },
        None => LineEvent::Chunks(Vec::new()),
    }
}

/// Translates Chat Completions stream payloads into [`StreamChunk`]s.
///
/// Tool-call arguments arrive in fragments keyed by index; they are buffered
/// and emitted as whole `ToolCall` chunks once a finish reason arrives (or on
/// [`ChunkDecoder::finish`]).
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: BTreeMap<u32, PartialToolCall>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl ChunkDecoder {
    /// Decode one raw payload.
    pub fn push(&mut self, raw: serde_json::Value) -> Vec<StreamChunk> {
        let parsed = match serde_json::from_value::<OpenAiStreamChunk>(raw.clone()) {
            Ok(parsed) => parsed,
            Err(_) => return vec![StreamChunk::other(raw)],
        };
        let Some(choice) = parsed.choices.into_iter().next() else {
            return vec![StreamChunk::other(raw)];
        };

        let mut out = Vec::new();
        let mut consumed = false;

        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            out.push(StreamChunk::text(text));
            consumed = true;
        }

        for fragment in choice.delta.tool_calls.unwrap_or_default() {
            let entry = self.pending.entry(fragment.index).or_default();
            if fragment.id.is_some() {
                entry.id = fragment.id;
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name {
                    entry.name.push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    entry.arguments.push_str(&arguments);
                }
            }
            consumed = true;
        }

        if choice.finish_reason.is_some() {
            out.extend(self.finish());
        }
        if !consumed {
            out.push(StreamChunk::other(raw));
        }
        out
    }

    /// Flush buffered tool calls in index order.
    pub fn finish(&mut self) -> Vec<StreamChunk> {
        std::mem::take(&mut self.pending)
            .into_values()
            .map(|call| {
                let arguments = if call.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&call.arguments)
                        .unwrap_or(serde_json::Value::String(call.arguments))
                };
                StreamChunk::ToolCall {
                    id: call.id,
                    name: call.name,
                    arguments,
                }
            })
            .collect()
    }
}

fn shell_tool_definition() -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": SHELL_TOOL_NAME,
            "description": "Run a shell command on the user's machine.",
            "parameters": {
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The command line to run.",
                    }
                },
                "required": ["command"],
            }
        }
    })
}

fn message_to_openai(msg: &Message) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    serde_json::json!({ "role": role, "content": msg.content })
}

// OpenAI API stream types (internal)

#[derive(Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiStreamChoice>,
}

#[derive(Deserialize)]
struct OpenAiStreamChoice {
    #[serde(default)]
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct OpenAiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCallFragment>>,
}

#[derive(Deserialize)]
struct OpenAiToolCallFragment {
    #[serde(default)]
    index: u32,
    id: Option<String>,
    function: Option<OpenAiFunctionFragment>,
}

#[derive(Deserialize)]
struct OpenAiFunctionFragment {
    name: Option<String>,
    arguments: Option<String>,
}
