//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for every stockroom operation, whatever UI drives it.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to the matching `commands::*::run`
//! - **Normalizes inputs** (id prefixes are resolved to full ids)
//! - **Asks** the [`ConfirmPrompt`] before delete, clear and import
//! - **Forwards** every message a command produced to the [`StatusSink`]
//!
//! It still returns the full `Result<CmdResult>` so callers can render listings,
//! settings, or usage however they like.
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that lives in `commands/*.rs`
//! - **Terminal I/O**: the sink and prompt are supplied by the caller
//!
//! ## Generic Over Collaborators
//!
//! `StockroomApi<B, S, P>` is generic over the storage backend, the status sink and
//! the prompt:
//! - Production: `StockroomApi<FsBackend, TerminalSink, StdinPrompt>`
//! - Testing: `StockroomApi<MemBackend, RecordingSink, ScriptedPrompt>`

use crate::commands::{self, helpers, CmdMessage, CmdResult};
use crate::error::{Result, StockroomError};
use crate::feedback::{ConfirmPrompt, StatusSink};
use crate::fetch::{Sleeper, Transport};
use crate::inventory::Inventory;
use crate::model::ImportedItem;
use crate::store::KvBackend;
use crate::sync::{SyncCoordinator, SyncError};
use std::path::Path;

pub use crate::commands::config::ConfigAction;

const CANCELLED: &str = "Operation cancelled.";

pub struct StockroomApi<B: KvBackend, S: StatusSink, P: ConfirmPrompt> {
    inventory: Inventory<B>,
    sink: S,
    prompt: P,
}

impl<B: KvBackend, S: StatusSink, P: ConfirmPrompt> StockroomApi<B, S, P> {
    pub fn new(inventory: Inventory<B>, sink: S, prompt: P) -> Self {
        if !inventory.storage_available() {
            sink.notify(&CmdMessage::warning(
                "Storage is unavailable; changes will only last for this session.",
            ));
        }
        Self {
            inventory,
            sink,
            prompt,
        }
    }

    pub fn inventory(&self) -> &Inventory<B> {
        &self.inventory
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn add_item(
        &mut self,
        name: String,
        quantity: u32,
        image: Option<String>,
    ) -> Result<CmdResult> {
        let result = commands::add::run(&mut self.inventory, name, quantity, image)?;
        Ok(self.report(result))
    }

    pub fn list_items(&self) -> Result<CmdResult> {
        let result = commands::list::run(&self.inventory)?;
        Ok(self.report(result))
    }

    pub fn adjust_quantity(&mut self, id: &str, delta: i64) -> Result<CmdResult> {
        let id = self.resolve_id(id)?;
        let result = commands::adjust::run(&mut self.inventory, &id, delta)?;
        Ok(self.report(result))
    }

    pub fn remove_item(&mut self, id: &str) -> Result<CmdResult> {
        let id = self.resolve_id(id)?;
        if let Some(item) = self.inventory.collection().get(&id) {
            let question = format!("Delete \"{}\"? This cannot be undone.", item.name);
            if !self.prompt.confirm("Delete item", &question) {
                return Ok(self.cancelled());
            }
        }
        let result = commands::remove::run(&mut self.inventory, &id)?;
        Ok(self.report(result))
    }

    pub fn clear(&mut self) -> Result<CmdResult> {
        let question = format!(
            "Delete all {} items? This cannot be undone.",
            self.inventory.collection().len()
        );
        if !self.prompt.confirm("Clear inventory", &question) {
            return Ok(self.cancelled());
        }
        let result = commands::clear::run(&mut self.inventory)?;
        Ok(self.report(result))
    }

    pub fn import_items(&mut self, items: Vec<ImportedItem>) -> Result<CmdResult> {
        let question = format!("Add {} items to the inventory?", items.len());
        if !self.prompt.confirm("Import items", &question) {
            return Ok(self.cancelled());
        }
        let result = commands::import::run(&mut self.inventory, items)?;
        Ok(self.report(result))
    }

    pub fn import_json(&mut self, json: &str) -> Result<CmdResult> {
        let items = commands::import::parse_payload(json)?;
        self.import_items(items)
    }

    pub fn import_file(&mut self, path: &Path) -> Result<CmdResult> {
        let items = commands::import::read_file(path)?;
        self.import_items(items)
    }

    pub fn export(&self, dir: &Path) -> Result<CmdResult> {
        let result = commands::export::run(&self.inventory, dir)?;
        Ok(self.report(result))
    }

    pub fn usage(&self) -> Result<CmdResult> {
        let result = commands::usage::run(&self.inventory)?;
        Ok(self.report(result))
    }

    pub fn config(&self, home: &Path, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(home, action)?;
        Ok(self.report(result))
    }

    /// Push the collection. The sink sees a begin notice, then success or error;
    /// a failure is also returned as `Err`.
    pub async fn sync_now<T: Transport, Sl: Sleeper>(
        &self,
        coordinator: &SyncCoordinator<T, Sl>,
    ) -> Result<CmdResult> {
        self.sink.notify(&CmdMessage::info(format!(
            "Syncing {} items to {}...",
            self.inventory.collection().len(),
            coordinator.endpoint()
        )));

        match commands::sync::run(&self.inventory, coordinator).await {
            Ok(result) => Ok(self.report(result)),
            Err(e) => {
                self.sink.notify(&CmdMessage::error(sync_failure_message(&e)));
                Err(e)
            }
        }
    }

    fn resolve_id(&self, input: &str) -> Result<String> {
        match helpers::resolve_item(self.inventory.collection(), input) {
            Ok(item) => Ok(item.id.clone()),
            // Unknown ids go through to the command, which reports a no-op.
            Err(StockroomError::ItemNotFound(_)) => Ok(input.trim().to_string()),
            Err(e) => Err(e),
        }
    }

    fn report(&self, result: CmdResult) -> CmdResult {
        for message in &result.messages {
            self.sink.notify(message);
        }
        result
    }

    fn cancelled(&self) -> CmdResult {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(CANCELLED));
        self.report(result)
    }
}

fn sync_failure_message(error: &StockroomError) -> String {
    match error {
        StockroomError::Sync(SyncError::Rejected(message)) => message.clone(),
        StockroomError::Sync(inner) => format!("Sync failed: {}", inner),
        other => format!("Sync failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::fetch::{FetchResponse, RetryPolicy, RetryingFetch};
    use crate::store::memory::MemBackend;
    use crate::test_utils::{
        mem_inventory, mem_inventory_with, RecordingSink, RecordingSleeper, ScriptedPrompt,
        ScriptedTransport,
    };

    type TestApi = StockroomApi<MemBackend, RecordingSink, ScriptedPrompt>;

    fn api(confirm: bool) -> TestApi {
        StockroomApi::new(
            mem_inventory(),
            RecordingSink::default(),
            ScriptedPrompt::new(confirm),
        )
    }

    fn coordinator(
        script: Vec<std::result::Result<FetchResponse, String>>,
    ) -> SyncCoordinator<ScriptedTransport, RecordingSleeper> {
        SyncCoordinator::new(
            RetryingFetch::with_sleeper(
                ScriptedTransport::new(script),
                RecordingSleeper::default(),
                RetryPolicy::default(),
            ),
            "https://example.test/sync",
        )
    }

    #[test]
    fn messages_reach_the_sink() {
        let mut api = api(true);
        api.add_item("Rope".into(), 10, None).unwrap();
        assert_eq!(api.sink().contents(), vec!["Item added: Rope (qty 10)"]);
    }

    #[test]
    fn adjust_accepts_id_prefix() {
        let mut api = api(true);
        let id = api.add_item("Rope".into(), 10, None).unwrap().affected_items[0]
            .id
            .clone();

        api.adjust_quantity(&id[..6], -3).unwrap();
        assert_eq!(api.inventory().collection().items()[0].quantity, 7);
    }

    #[test]
    fn declined_remove_changes_nothing() {
        let mut api = api(false);
        let id = api.add_item("Rope".into(), 10, None).unwrap().affected_items[0]
            .id
            .clone();

        let result = api.remove_item(&id).unwrap();
        assert_eq!(result.messages[0].content, "Operation cancelled.");
        assert_eq!(api.inventory().collection().len(), 1);
        assert_eq!(api.prompt().asked(), vec!["Delete item"]);
    }

    #[test]
    fn confirmed_clear_empties_inventory() {
        let mut api = api(true);
        api.add_item("Rope".into(), 10, None).unwrap();
        api.add_item("Pegs".into(), 30, None).unwrap();

        api.clear().unwrap();
        assert!(api.inventory().collection().is_empty());
        assert_eq!(api.prompt().asked(), vec!["Clear inventory"]);
    }

    #[test]
    fn remove_of_unknown_id_skips_prompt() {
        let mut api = api(true);
        let result = api.remove_item("ghost").unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(api.prompt().asked().is_empty());
    }

    #[test]
    fn import_is_confirmed_before_merging() {
        let mut api = api(false);
        api.import_json(r#"[{"name":"Tent"}]"#).unwrap();
        assert!(api.inventory().collection().is_empty());

        api.prompt().set_answer(true);
        api.import_json(r#"[{"name":"Tent"}]"#).unwrap();
        assert_eq!(api.inventory().collection().len(), 1);
    }

    #[test]
    fn malformed_import_fails_before_prompting() {
        let mut api = api(true);
        assert!(matches!(
            api.import_json(r#"{"name":"Tent"}"#),
            Err(StockroomError::Format(_))
        ));
        assert!(api.prompt().asked().is_empty());
    }

    #[test]
    fn unavailable_storage_warns_once_at_startup() {
        let backend = MemBackend::new();
        backend.set_disabled(true);
        let mut api = StockroomApi::new(
            mem_inventory_with(backend),
            RecordingSink::default(),
            ScriptedPrompt::new(true),
        );
        api.add_item("Rope".into(), 1, None).unwrap();

        let messages = api.sink().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, MessageLevel::Warning);
        assert_eq!(messages[1].level, MessageLevel::Success);
        assert_eq!(api.inventory().collection().len(), 1);
    }

    #[test]
    fn failed_save_is_reported_and_mutation_kept() {
        let backend = MemBackend::new();
        let mut api = StockroomApi::new(
            mem_inventory_with(backend),
            RecordingSink::default(),
            ScriptedPrompt::new(true),
        );
        api.inventory().store().backend().set_simulate_write_error(true);

        api.add_item("Rope".into(), 1, None).unwrap();
        let levels: Vec<_> = api.sink().messages().iter().map(|m| m.level).collect();
        assert_eq!(levels, vec![MessageLevel::Success, MessageLevel::Error]);
        assert_eq!(api.inventory().collection().len(), 1);
    }

    #[tokio::test]
    async fn sync_notifies_begin_and_success() {
        let api = api(true);
        let sync = coordinator(vec![Ok(FetchResponse::new(200, r#"{"success":true}"#))]);

        api.sync_now(&sync).await.unwrap();
        let messages = api.sink().messages();
        assert_eq!(messages[0].level, MessageLevel::Info);
        assert_eq!(messages[1].level, MessageLevel::Success);
        assert_eq!(messages[1].content, "Inventory synced");
    }

    #[tokio::test]
    async fn sync_failure_notifies_error_and_returns_err() {
        let api = api(true);
        let sync = coordinator(vec![Ok(FetchResponse::new(
            200,
            r#"{"success":false,"message":"Server full"}"#,
        ))]);

        assert!(api.sync_now(&sync).await.is_err());
        let messages = api.sink().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].level, MessageLevel::Error);
        assert_eq!(messages[1].content, "Server full");
    }
}
