//! Concurrent transfers: atomicity, conservation and deadlock freedom.

use std::sync::Arc;
use std::time::Duration;

use simple_bank::account::{Account, CreateAccountParams};
use simple_bank::core_types::{Currency, Role};
use simple_bank::store::{MemoryStore, Store, TransferTx};
use simple_bank::transfer::{TransferOrchestrator, TransferRequest, TransferTxResult};
use simple_bank::user_auth::CreateUserParams;
use tokio::task::JoinSet;

const OPENING_BALANCE: i64 = 1_000;
const DEADLINE: Duration = Duration::from_secs(10);

async fn setup(owners: &[&str]) -> (TransferOrchestrator, Arc<MemoryStore>, Vec<Account>) {
    let store = Arc::new(MemoryStore::new());
    let mut accounts = Vec::new();
    for owner in owners {
        store
            .create_user(CreateUserParams {
                username: owner.to_string(),
                role: Role::Depositor,
                hashed_password: "hash".to_string(),
                full_name: "Test User".to_string(),
                email: format!("{}@example.com", owner),
            })
            .await
            .unwrap();
        accounts.push(
            store
                .create_account(CreateAccountParams {
                    owner: owner.to_string(),
                    balance: OPENING_BALANCE,
                    currency: Currency::USD,
                })
                .await
                .unwrap(),
        );
    }
    (TransferOrchestrator::new(store.clone()), store, accounts)
}

fn request(from: &Account, to: &Account, amount: i64) -> TransferRequest {
    TransferRequest {
        from_account_id: from.id,
        to_account_id: to.id,
        amount,
        currency: Currency::USD,
    }
}

async fn run_all(
    orchestrator: &TransferOrchestrator,
    requests: Vec<TransferRequest>,
) -> Vec<TransferTxResult> {
    let mut set = JoinSet::new();
    for req in requests {
        let orchestrator = orchestrator.clone();
        set.spawn(async move { orchestrator.transfer(req).await });
    }

    let joined = tokio::time::timeout(DEADLINE, async {
        let mut results = Vec::new();
        while let Some(outcome) = set.join_next().await {
            results.push(outcome.unwrap().unwrap());
        }
        results
    })
    .await;
    joined.expect("transfers did not finish: possible deadlock")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_same_direction() {
    let (orchestrator, store, accounts) = setup(&["alice", "bob"]).await;
    let (alice, bob) = (&accounts[0], &accounts[1]);
    let n = 10;
    let amount = 10;

    let results = run_all(
        &orchestrator,
        (0..n).map(|_| request(alice, bob, amount)).collect(),
    )
    .await;
    assert_eq!(results.len(), n);

    let mut seen_from = Vec::new();
    for result in &results {
        assert!(result.is_zero_sum());
        assert_eq!(result.transfer.amount, amount);
        // Each commit observes a distinct sender balance
        let spent = OPENING_BALANCE - result.from_account.balance;
        assert_eq!(spent % amount, 0);
        assert!((1..=n as i64).contains(&(spent / amount)));
        assert!(!seen_from.contains(&spent));
        seen_from.push(spent);
        assert_eq!(
            result.to_account.balance - OPENING_BALANCE,
            spent,
            "receiver must mirror the sender at the commit point"
        );
    }

    let total = amount * n as i64;
    assert_eq!(
        store.get_account(alice.id).await.unwrap().balance,
        OPENING_BALANCE - total
    );
    assert_eq!(
        store.get_account(bob.id).await.unwrap().balance,
        OPENING_BALANCE + total
    );
    assert_eq!(store.list_entries(alice.id).await.unwrap().len(), n);
    assert_eq!(store.list_entries(bob.id).await.unwrap().len(), n);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_directions_do_not_deadlock() {
    let (orchestrator, store, accounts) = setup(&["alice", "bob"]).await;
    let (alice, bob) = (&accounts[0], &accounts[1]);

    let requests = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                request(alice, bob, 10)
            } else {
                request(bob, alice, 10)
            }
        })
        .collect();
    run_all(&orchestrator, requests).await;

    // Ten each way nets out
    assert_eq!(store.get_account(alice.id).await.unwrap().balance, OPENING_BALANCE);
    assert_eq!(store.get_account(bob.id).await.unwrap().balance, OPENING_BALANCE);
    assert_eq!(store.list_entries(alice.id).await.unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ring_of_transfers_conserves_money() {
    let owners = ["alice", "bob", "carol", "dave"];
    let (orchestrator, store, accounts) = setup(&owners).await;

    let mut requests = Vec::new();
    for round in 0..5 {
        for i in 0..accounts.len() {
            let from = &accounts[i];
            let to = &accounts[(i + 1 + round % 3) % accounts.len()];
            requests.push(request(from, to, 7 + i as i64));
        }
    }
    let results = run_all(&orchestrator, requests).await;
    assert_eq!(results.len(), 20);

    let mut total = 0;
    for account in &accounts {
        let current = store.get_account(account.id).await.unwrap();
        let entries: i64 = store
            .list_entries(account.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum();
        // Balance equals the opening balance plus the entry sum
        assert_eq!(current.balance, OPENING_BALANCE + entries);
        total += current.balance;
    }
    assert_eq!(total, OPENING_BALANCE * owners.len() as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_transfer_leaves_no_trace() {
    let (orchestrator, store, accounts) = setup(&["alice", "bob"]).await;
    let (alice, bob) = (&accounts[0], &accounts[1]);

    // Hold bob's row so the next transfer parks inside its transaction
    let mut holder = store.begin().await.unwrap();
    holder.lock_account(bob.id).await.unwrap();

    let pending = orchestrator.transfer(request(alice, bob, 10));
    assert!(
        tokio::time::timeout(Duration::from_millis(100), pending)
            .await
            .is_err()
    );
    holder.rollback().await.unwrap();

    assert_eq!(store.get_account(alice.id).await.unwrap().balance, OPENING_BALANCE);
    assert!(store.list_entries(alice.id).await.unwrap().is_empty());

    // Locks from the cancelled attempt are released
    let done = tokio::time::timeout(DEADLINE, orchestrator.transfer(request(alice, bob, 10)))
        .await
        .expect("row locks leaked")
        .unwrap();
    assert_eq!(done.from_account.balance, OPENING_BALANCE - 10);
}
