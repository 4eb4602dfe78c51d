use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use proptest::prelude::*;
use sea_orm::Database;

use engine::{AccountCmd, Domain, Engine, EngineError, FundCmd, Money};
use migration::MigratorTrait;

async fn engine_with_timeout(timeout: Duration) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .lock_timeout(timeout)
        .build()
        .await
        .unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn withdrawal(units: i64) -> FundCmd {
    FundCmd::new(Domain::Medicine, "clerk", Money::new(units * 100), "payout", day())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_never_both_succeed() {
    let engine = Arc::new(engine_with_timeout(Duration::from_secs(5)).await);
    engine
        .add_fund(FundCmd::new(
            Domain::Medicine,
            "clerk",
            Money::new(100_000),
            "seed",
            day(),
        ))
        .await
        .unwrap();

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.withdraw_fund(withdrawal(600)).await }
    });
    let second = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.withdraw_fund(withdrawal(600)).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(EngineError::InsufficientBalance { .. } | EngineError::ConcurrencyConflict(_))
    )));
    assert_eq!(
        engine.balance(Domain::Medicine).await.unwrap(),
        Money::new(40_000)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_debits_never_overdraw() {
    let engine = Arc::new(engine_with_timeout(Duration::from_secs(5)).await);
    engine
        .add_fund(FundCmd::new(
            Domain::Operation,
            "clerk",
            Money::new(1_000),
            "seed",
            day(),
        ))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..20 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .add_expense(
                    AccountCmd::new(Domain::Operation, "clerk", Money::new(150), day())
                        .category(format!("batch {}", n % 3)),
                )
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 6);
    assert_eq!(
        engine.balance(Domain::Operation).await.unwrap(),
        Money::new(100)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lock_timeout_surfaces_as_conflict_and_writes_nothing_partial() {
    let engine = Arc::new(engine_with_timeout(Duration::ZERO).await);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .add_fund(FundCmd::new(
                    Domain::HouseSecurity,
                    "clerk",
                    Money::new(100),
                    "seed",
                    day(),
                ))
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::ConcurrencyConflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(accepted >= 1);
    assert_eq!(
        engine.balance(Domain::HouseSecurity).await.unwrap(),
        Money::new(100 * accepted)
    );
}

#[derive(Clone, Debug)]
enum Op {
    FundIn(i64),
    FundOut(i64),
    Income(i64),
    Expense(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..5_000).prop_map(Op::FundIn),
        (1i64..5_000).prop_map(Op::FundOut),
        (1i64..5_000).prop_map(Op::Income),
        (1i64..5_000).prop_map(Op::Expense),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn accepted_operations_conserve_a_non_negative_balance(
        ops in prop::collection::vec(op_strategy(), 1..24)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let engine = engine_with_timeout(Duration::from_secs(5)).await;
            let domain = Domain::Medicine;
            let mut expected = Money::ZERO;

            for op in ops {
                let result = match op {
                    Op::FundIn(m) => engine
                        .add_fund(FundCmd::new(domain, "clerk", Money::new(m), "in", day()))
                        .await
                        .map(|_| Money::new(m)),
                    Op::FundOut(m) => engine
                        .withdraw_fund(FundCmd::new(domain, "clerk", Money::new(m), "out", day()))
                        .await
                        .map(|_| -Money::new(m)),
                    Op::Income(m) => engine
                        .add_income(
                            AccountCmd::new(domain, "clerk", Money::new(m), day()).category("fees"),
                        )
                        .await
                        .map(|_| Money::new(m)),
                    Op::Expense(m) => engine
                        .add_expense(
                            AccountCmd::new(domain, "clerk", Money::new(m), day()).category("drugs"),
                        )
                        .await
                        .map(|_| -Money::new(m)),
                };

                match result {
                    Ok(delta) => expected += delta,
                    Err(EngineError::InsufficientBalance { requested, available }) => {
                        assert!(requested > available);
                        assert_eq!(available, expected);
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }

                let balance = engine.balance(domain).await.unwrap();
                assert_eq!(balance, expected);
                assert!(!balance.is_negative());
            }
        });
    }
}
