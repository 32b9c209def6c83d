//! In-process doubles for the collaborators of the core: a memory-backed
//! inventory, recording sinks and prompts, and a scripted HTTP transport.

use crate::capacity::CapacityMonitor;
use crate::commands::CmdMessage;
use crate::feedback::{ConfirmPrompt, StatusSink};
use crate::fetch::{FetchRequest, FetchResponse, Sleeper, Transport, TransportError};
use crate::inventory::Inventory;
use crate::store::durable::DurableStore;
use crate::store::memory::MemBackend;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

pub fn mem_inventory() -> Inventory<MemBackend> {
    mem_inventory_with(MemBackend::new())
}

pub fn mem_inventory_with(backend: MemBackend) -> Inventory<MemBackend> {
    Inventory::open(
        DurableStore::new(backend),
        "inventory",
        CapacityMonitor::default(),
    )
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: RefCell<Vec<CmdMessage>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<CmdMessage> {
        self.messages.borrow().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }
}

impl StatusSink for RecordingSink {
    fn notify(&self, message: &CmdMessage) {
        self.messages.borrow_mut().push(message.clone());
    }
}

/// Answers every prompt with a fixed reply and remembers the titles asked.
#[derive(Debug)]
pub struct ScriptedPrompt {
    answer: Cell<bool>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: Cell::new(answer),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.set(answer);
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, title: &str, _message: &str) -> bool {
        self.asked.borrow_mut().push(title.to_string());
        self.answer.get()
    }
}

/// Replays a fixed list of outcomes, one per call. `Err` strings become
/// transport failures; running past the end of the script is also a failure.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Result<FetchResponse, String>>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<FetchResponse, String>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> {
        self.requests.borrow_mut().push(request.clone());
        let outcome = match self.script.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(TransportError::Other(e)),
            None => Err(TransportError::Other("script exhausted".to_string())),
        };
        std::future::ready(outcome)
    }
}

/// Records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        self.delays.borrow_mut().push(duration);
        std::future::ready(())
    }
}
