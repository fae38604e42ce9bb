use futures_flow::future::{run_with_timeout, run_with_timeout_with, Task};
use futures_flow::prelude::*;
use futures_flow::runtime::block_on;
use futures_flow::task::{timeout_in, wait};
use futures_flow::time::{Duration, Instant};
use futures_flow::Error;

#[futures_flow::test]
async fn wait_resolves_after_its_delay() -> anyhow::Result<()> {
    let start = Instant::now();
    wait(Duration::from_millis(50)).await;
    assert!(start.elapsed() >= Duration::from_millis(50));
    Ok(())
}

#[futures_flow::test]
async fn canceled_wait_resolves_early() -> anyhow::Result<()> {
    let start = Instant::now();
    let sleeper = wait(Duration::from_secs(5));
    sleeper.cancel();
    sleeper.await;
    assert!(start.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[futures_flow::test]
async fn timeout_in_rejects() -> anyhow::Result<()> {
    let err = timeout_in(Duration::from_millis(10)).await.unwrap_err();
    assert!(err.to_string().contains("timed out"));
    Ok(())
}

#[futures_flow::test]
async fn canceled_timeout_in_resolves_silently() -> anyhow::Result<()> {
    let deadline = timeout_in(Duration::from_millis(20));
    let handle = deadline.cancel_handle();
    handle.cancel();
    deadline.await?;
    Ok(())
}

#[test_log::test]
fn task_settling_first_wins() -> anyhow::Result<()> {
    let value = block_on(run_with_timeout(
        Task::factory(|| async {
            wait(Duration::from_millis(10)).await;
            Ok::<_, Error>(7)
        }),
        Duration::from_millis(500),
    ))?;
    assert_eq!(value, 7);
    Ok(())
}

#[test_log::test]
fn slow_task_times_out() -> anyhow::Result<()> {
    let start = Instant::now();
    let res = block_on(
        async {
            wait(Duration::from_secs(5)).await;
            Ok::<_, Error>(7)
        }
        .timeout(Duration::from_millis(30)),
    );
    assert_eq!(res, Err(Error::Timeout("timed out after 30ms".into())));
    assert!(start.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[derive(Debug, PartialEq)]
enum FetchError {
    TooSlow,
}

#[test_log::test]
fn timeout_with_a_custom_error() -> anyhow::Result<()> {
    let res = block_on(run_with_timeout_with(
        Task::running(async {
            wait(Duration::from_secs(5)).await;
            Ok("body")
        }),
        Duration::from_millis(10),
        || FetchError::TooSlow,
    ));
    assert_eq!(res, Err(FetchError::TooSlow));
    Ok(())
}
