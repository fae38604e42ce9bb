use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;

use futures_flow::future::{all_settled, all_settled_reject, first_success, Outcome};
use futures_flow::task::wait;
use futures_flow::time::Duration;

type Job<'a> = Pin<Box<dyn Future<Output = Result<u32, String>> + 'a>>;

fn after<'a>(ms: u64, result: Result<u32, String>, done: &'a Cell<u32>) -> Job<'a> {
    Box::pin(async move {
        wait(Duration::from_millis(ms)).await;
        done.set(done.get() + 1);
        result
    })
}

#[futures_flow::test]
async fn all_settled_reports_every_outcome() -> anyhow::Result<()> {
    let done = Cell::new(0);
    let outcomes = all_settled(vec![
        after(20, Ok(1), &done),
        after(5, Err("nope".into()), &done),
    ])
    .await;
    assert_eq!(
        outcomes,
        vec![Outcome::Fulfilled(1), Outcome::Rejected("nope".to_string())]
    );
    assert_eq!(done.get(), 2);
    Ok(())
}

#[futures_flow::test]
async fn fast_rejection_wins_but_slow_work_finishes() -> anyhow::Result<()> {
    let done = Cell::new(0);
    let res = all_settled_reject(vec![
        after(5, Err("fast".into()), &done),
        after(30, Ok(2), &done),
    ])
    .await;
    assert_eq!(res, Err("fast".to_string()));
    assert_eq!(done.get(), 2);
    Ok(())
}

#[futures_flow::test]
async fn first_success_skips_failures() -> anyhow::Result<()> {
    let done = Cell::new(0);
    let value = first_success(vec![
        after(1, Err("a".into()), &done),
        after(15, Ok(3), &done),
        after(60, Ok(4), &done),
    ])
    .await?;
    assert_eq!(value, 3);
    Ok(())
}

#[futures_flow::test]
async fn first_success_aggregates_when_all_fail() -> anyhow::Result<()> {
    let done = Cell::new(0);
    let err = first_success(vec![
        after(10, Err("a".into()), &done),
        after(1, Err("b".into()), &done),
    ])
    .await
    .unwrap_err();
    assert_eq!(err.errors(), ["a".to_string(), "b".to_string()]);
    Ok(())
}
