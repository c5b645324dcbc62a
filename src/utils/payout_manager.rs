use crate::sheets::client::SheetsClient;
use crate::sheets::models::{MemberEarnings, PayoutRecord};
use crate::sheets::queries;
use crate::utils::earnings::{member_earnings, weekly_earnings};
use crate::utils::time::{format_timestamp, get_current_datetime};
use anyhow::Result;
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// `pay_all` reports progress after every this many members, and after the last one.
pub const PROGRESS_INTERVAL: usize = 3;

#[derive(Debug)]
pub enum PayoutOutcome {
    /// The payout was recorded. `archived` is false when removing the paid
    /// logs from `Logs` failed afterwards.
    Paid {
        earnings: MemberEarnings,
        archived: bool,
    },
    NothingOwed,
}

#[derive(Debug, Default)]
pub struct PayAllReport {
    pub paid: Vec<MemberEarnings>,
    pub failed: Vec<String>,
    pub total_cents: i64,
}

/// Runs every operation that deletes `Logs` rows behind one lock, so row
/// numbers read inside the lock stay valid until the delete is sent.
#[derive(Clone)]
pub struct PayoutManager {
    sheets: Arc<SheetsClient>,
    lock: Arc<Mutex<()>>,
}

impl PayoutManager {
    pub fn new(sheets: Arc<SheetsClient>) -> Self {
        Self {
            sheets,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn pay_member(&self, user_id: &str, week: &str, admin: &str) -> Result<PayoutOutcome> {
        let _guard = self.lock.lock().await;

        let rows = queries::fetch_log_rows(&self.sheets).await?;
        let earnings = member_earnings(&rows, user_id, week);
        if earnings.rows.is_empty() {
            tracing::info!("Nothing owed to {} for {}", user_id, week);
            return Ok(PayoutOutcome::NothingOwed);
        }

        let now = get_current_datetime();
        let record = PayoutRecord {
            timestamp: format_timestamp(now),
            week: week.to_string(),
            username: earnings.username.clone(),
            user_id: earnings.user_id.clone(),
            amount_cents: earnings.total_cents,
            log_count: earnings.log_count,
            admin: admin.to_string(),
        };
        queries::save_payout(&self.sheets, &record).await?;

        let archived = match queries::archive_rows(&self.sheets, &earnings.rows, now).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    "Payout to {} recorded but archiving rows {:?} failed: {:?}",
                    earnings.username,
                    earnings.row_numbers(),
                    e
                );
                false
            }
        };

        tracing::info!(
            "{} paid {} cents to {} for {}",
            admin,
            earnings.total_cents,
            earnings.username,
            week
        );
        Ok(PayoutOutcome::Paid { earnings, archived })
    }

    /// Pays every member with open logs in `week`, one after another.
    ///
    /// `on_progress(done, total)` is awaited every [`PROGRESS_INTERVAL`] members and once at the end.
    pub async fn pay_all<F, Fut>(&self, week: &str, admin: &str, mut on_progress: F) -> Result<PayAllReport>
    where
        F: FnMut(usize, usize) -> Fut,
        Fut: Future<Output = ()>,
    {
        let rows = queries::fetch_log_rows(&self.sheets).await?;
        let members = weekly_earnings(&rows, week);
        let total = members.len();
        let mut report = PayAllReport::default();

        for (index, member) in members.iter().enumerate() {
            match self.pay_member(&member.user_id, week, admin).await {
                Ok(PayoutOutcome::Paid { earnings, .. }) => {
                    report.total_cents += earnings.total_cents;
                    report.paid.push(earnings);
                }
                Ok(PayoutOutcome::NothingOwed) => {}
                Err(e) => {
                    tracing::error!("Payout to {} failed: {:?}", member.username, e);
                    report.failed.push(member.username.clone());
                }
            }

            let done = index + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                on_progress(done, total).await;
            }
        }

        Ok(report)
    }

    pub async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let _guard = self.lock.lock().await;
        queries::delete_logs_before(&self.sheets, cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::client::tests::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    const LOGS_PATH: &str = "/v4/spreadsheets/sheet-123/values/Logs!A2:H";

    fn log(user: &str, id: &str, action: &str, amount: f64) -> serde_json::Value {
        json!([
            "07.03.2026 10:00:00",
            "KW10/2026",
            user,
            id,
            action,
            "done",
            amount.to_string(),
            "https://cdn.example/p.png"
        ])
    }

    fn manager(server: &MockServer) -> PayoutManager {
        PayoutManager::new(Arc::new(test_client(server)))
    }

    /// Accepts every write of a payout; returns the mock for `Payouts` appends.
    fn write_mocks(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123");
            then.status(200).json_body(json!({
                "sheets": [{ "properties": { "sheetId": 0, "title": "Logs" } }]
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Archive!A:I:append");
            then.status(200).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123:batchUpdate");
            then.status(200).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append");
            then.status(200).json_body(json!({}));
        })
    }

    #[tokio::test]
    async fn second_payout_of_same_week_owes_nothing() {
        let server = MockServer::start();
        let mut logs = server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({
                "values": [log("alice", "1", "Repair", 8.0), log("bob", "2", "Fertilize", 5.0), log("alice", "1", "Fertilize", 5.0)]
            }));
        });
        let payouts = write_mocks(&server);
        let manager = manager(&server);

        match manager.pay_member("1", "KW10/2026", "admin").await.unwrap() {
            PayoutOutcome::Paid { earnings, archived } => {
                assert_eq!(earnings.total_cents, 1300);
                assert_eq!(earnings.row_numbers(), vec![2, 4]);
                assert!(archived);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        // the sheet no longer holds alice's rows once they are archived
        logs.delete();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200)
                .json_body(json!({ "values": [log("bob", "2", "Fertilize", 5.0)] }));
        });

        let second = manager.pay_member("1", "KW10/2026", "admin").await.unwrap();
        assert!(matches!(second, PayoutOutcome::NothingOwed));
        payouts.assert_hits(1);
    }

    #[tokio::test]
    async fn nothing_owed_writes_nothing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({ "values": [log("bob", "2", "Repair", 8.0)] }));
        });
        let payouts = write_mocks(&server);

        let outcome = manager(&server).pay_member("1", "KW10/2026", "admin").await.unwrap();
        assert!(matches!(outcome, PayoutOutcome::NothingOwed));
        payouts.assert_hits(0);
    }

    #[tokio::test]
    async fn failed_payout_record_leaves_logs_alone() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({ "values": [log("alice", "1", "Repair", 8.0)] }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append");
            then.status(500).body("backend error");
        });
        let archive = server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Archive!A:I:append");
            then.status(200).json_body(json!({}));
        });

        assert!(manager(&server).pay_member("1", "KW10/2026", "admin").await.is_err());
        archive.assert_hits(0);
    }

    #[tokio::test]
    async fn pay_all_pays_everyone_and_reports_progress() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({
                "values": [log("alice", "1", "Repair", 8.0), log("bob", "2", "Panel placed", 12.0)]
            }));
        });
        let payouts = write_mocks(&server);

        let mut progress = Vec::new();
        let report = manager(&server)
            .pay_all("KW10/2026", "admin", |done, total| {
                progress.push((done, total));
                async {}
            })
            .await
            .unwrap();

        assert_eq!(report.paid.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(report.total_cents, 2000);
        assert_eq!(report.paid[0].username, "bob");
        assert_eq!(progress, vec![(2, 2)]);
        payouts.assert_hits(2);
    }

    #[tokio::test]
    async fn failed_archive_still_counts_as_paid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({ "values": [log("alice", "1", "Repair", 8.0)] }));
        });
        let payouts = server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append");
            then.status(200).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Archive!A:I:append");
            then.status(500).body("backend error");
        });
        let delete = server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123:batchUpdate");
            then.status(200).json_body(json!({}));
        });

        match manager(&server).pay_member("1", "KW10/2026", "admin").await.unwrap() {
            PayoutOutcome::Paid { earnings, archived } => {
                assert_eq!(earnings.total_cents, 800);
                assert!(!archived);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        payouts.assert_hits(1);
        delete.assert_hits(0);
    }

    #[tokio::test]
    async fn pay_all_reports_failed_members_and_keeps_going() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({
                "values": [log("alice", "1", "Repair", 8.0), log("bob", "2", "Panel placed", 12.0)]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123");
            then.status(200).json_body(json!({
                "sheets": [{ "properties": { "sheetId": 0, "title": "Logs" } }]
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123/values/Archive!A:I:append");
            then.status(200).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123:batchUpdate");
            then.status(200).json_body(json!({}));
        });
        let bob_paid = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append")
                .body_contains("\"bob\"");
            then.status(200).json_body(json!({}));
        });
        let alice_failed = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append")
                .body_contains("\"alice\"");
            then.status(500).body("backend error");
        });

        let mut progress = Vec::new();
        let report = manager(&server)
            .pay_all("KW10/2026", "admin", |done, total| {
                progress.push((done, total));
                async {}
            })
            .await
            .unwrap();

        assert_eq!(report.paid.len(), 1);
        assert_eq!(report.paid[0].username, "bob");
        assert_eq!(report.failed, vec!["alice".to_string()]);
        assert_eq!(report.total_cents, 1200);
        assert_eq!(progress, vec![(2, 2)]);
        bob_paid.assert_hits(1);
        alice_failed.assert_hits(1);
    }

    #[tokio::test]
    async fn purge_deletes_old_rows_in_one_batch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(200).json_body(json!({
                "values": [
                    ["03.01.2026 09:00:00", "KW1/2026", "alice", "1", "Repair"],
                    ["04.01.2026 09:00:00", "KW1/2026", "bob", "2", "Repair", "d", "", "https://cdn.example/p.png"],
                    ["07.03.2026 10:00:00", "KW10/2026", "carol", "3", "Repair", "d", "8", "https://cdn.example/p.png"],
                    ["05.01.2026 09:00:00", "KW1/2026", "dave", "4", "Repair", "d", "8", "https://cdn.example/p.png"]
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123");
            then.status(200).json_body(json!({
                "sheets": [{ "properties": { "sheetId": 7, "title": "Logs" } }]
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet-123:batchUpdate")
                .json_body(json!({
                    "requests": [
                        { "deleteDimension": { "range": { "sheetId": 7, "dimension": "ROWS", "startIndex": 4, "endIndex": 5 } } },
                        { "deleteDimension": { "range": { "sheetId": 7, "dimension": "ROWS", "startIndex": 1, "endIndex": 3 } } }
                    ]
                }));
            then.status(200).json_body(json!({}));
        });

        let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let deleted = manager(&server).purge_before(cutoff).await.unwrap();

        assert_eq!(deleted, 3);
        delete.assert_hits(1);
    }
}
