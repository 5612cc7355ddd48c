//! Shared test helpers: a scripted provider and a callback recorder.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;

use codex::agent_loop::{ApprovalDecision, ApprovalRequest, LoopCallbacks};
use codex::error::CodexError;
use codex::provider::{ChunkStream, ModelProvider, ProviderRequest};
use codex::safety::Command;
use codex::types::StreamChunk;

/// One element of a scripted stream.
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(StreamChunk),
    Fail(String),
}

/// What the provider does for one `open_stream` call.
#[derive(Debug, Clone)]
pub enum Attempt {
    /// Opening the stream fails with a transport error.
    FailOpen(String),
    /// Opening the stream fails with a configuration error.
    Misconfigured(String),
    /// The stream opens and yields these steps.
    Stream(Vec<Step>),
}

impl Attempt {
    pub fn chunks(chunks: impl IntoIterator<Item = StreamChunk>) -> Self {
        Self::Stream(chunks.into_iter().map(Step::Chunk).collect())
    }
}

/// A provider that replays scripted attempts in order.
pub struct ScriptedProvider {
    attempts: Mutex<VecDeque<Attempt>>,
    /// Used once the script runs out.
    fallback: Attempt,
    calls: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(attempts: impl IntoIterator<Item = Attempt>) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(attempts.into_iter().collect()),
            fallback: Attempt::chunks([]),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(attempt: Attempt) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(VecDeque::new()),
            fallback: attempt,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn open_stream(&self, request: &ProviderRequest) -> Result<ChunkStream, CodexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let attempt = self
            .attempts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match attempt {
            Attempt::FailOpen(message) => Err(CodexError::Stream(message)),
            Attempt::Misconfigured(message) => Err(CodexError::Configuration(message)),
            Attempt::Stream(steps) => {
                let items = steps.into_iter().map(|step| match step {
                    Step::Chunk(chunk) => Ok(chunk),
                    Step::Fail(message) => Err(CodexError::Stream(message)),
                });
                Ok(Box::pin(futures::stream::iter(items)))
            }
        }
    }
}

/// Something a callback observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Item(StreamChunk),
    Loading(bool),
    Approval(Command),
}

/// Records every callback invocation and answers approvals from a script.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    answers: Arc<Mutex<VecDeque<bool>>>,
}

impl Recorder {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            events: Arc::default(),
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
        }
    }

    pub fn callbacks(&self) -> LoopCallbacks {
        let items = self.events.clone();
        let loading = self.events.clone();
        let approvals = self.events.clone();
        let answers = self.answers.clone();
        LoopCallbacks::new()
            .with_item_sink(move |chunk| items.lock().unwrap().push(Event::Item(chunk)))
            .with_loading_sink(move |flag| loading.lock().unwrap().push(Event::Loading(flag)))
            .with_approval_handler(Arc::new(move |request: ApprovalRequest| {
                approvals
                    .lock()
                    .unwrap()
                    .push(Event::Approval(request.command.clone()));
                let accepted = answers.lock().unwrap().pop_front().unwrap_or(false);
                futures::future::ready(ApprovalDecision::from(accepted)).boxed()
            }))
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<StreamChunk> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Item(chunk) => Some(chunk),
                _ => None,
            })
            .collect()
    }

    pub fn loading(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Loading(flag) => Some(flag),
                _ => None,
            })
            .collect()
    }

    pub fn approvals(&self) -> Vec<Command> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Approval(command) => Some(command),
                _ => None,
            })
            .collect()
    }
}

pub fn cmd(line: &str) -> Command {
    Command::from_whitespace(line).unwrap()
}
