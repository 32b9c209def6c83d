use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::fetch::{Sleeper, Transport};
use crate::inventory::Inventory;
use crate::store::KvBackend;
use crate::sync::SyncCoordinator;

const DEFAULT_SUCCESS: &str = "Inventory synced";

/// Push the current collection. Failures come back as `Err`; the collection
/// is read, never modified.
pub async fn run<B, T, S>(
    inv: &Inventory<B>,
    coordinator: &SyncCoordinator<T, S>,
) -> Result<CmdResult>
where
    B: KvBackend,
    T: Transport,
    S: Sleeper,
{
    let items = inv.collection().items();
    let ack = coordinator.sync_now(items).await?;

    let message = ack
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SUCCESS.to_string());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(message));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::add;
    use crate::error::StockroomError;
    use crate::fetch::{FetchResponse, RetryPolicy, RetryingFetch};
    use crate::sync::SyncError;
    use crate::test_utils::{mem_inventory, RecordingSleeper, ScriptedTransport};

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

    #[tokio::test]
    async fn success_uses_server_message_or_default() {
        let mut inv = mem_inventory();
        add::run(&mut inv, "Pliers".into(), 1, None).unwrap();

        let sync = coordinator(vec![Ok(FetchResponse::new(
            200,
            r#"{"success":true,"message":"Saved 1 item"}"#,
        ))]);
        let result = run(&inv, &sync).await.unwrap();
        assert_eq!(result.messages[0].content, "Saved 1 item");

        let sync = coordinator(vec![Ok(FetchResponse::new(200, r#"{"success":true}"#))]);
        let result = run(&inv, &sync).await.unwrap();
        assert_eq!(result.messages[0].content, "Inventory synced");
    }

    #[tokio::test]
    async fn failure_leaves_collection_untouched() {
        let mut inv = mem_inventory();
        add::run(&mut inv, "Pliers".into(), 1, None).unwrap();
        let before = inv.collection().items().to_vec();

        let sync = coordinator(vec![Ok(FetchResponse::new(
            200,
            r#"{"success":false,"message":"nope"}"#,
        ))]);
        let err = run(&inv, &sync).await.unwrap_err();
        assert!(matches!(err, StockroomError::Sync(SyncError::Rejected(_))));
        assert_eq!(inv.collection().items(), before.as_slice());
    }
}
