use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashboard_engine::PollLoop;
use tokio::runtime::Handle;
use tokio::time::sleep;

fn counting_op(
    counter: Arc<AtomicUsize>,
) -> impl FnMut() -> std::future::Ready<Result<(), String>> + Send + 'static {
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    }
}

#[tokio::test(start_paused = true)]
async fn invokes_immediately_then_every_interval() {
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = PollLoop::new("test", Duration::from_secs(30))
        .spawn(&Handle::current(), counting_op(counter.clone()));

    sleep(Duration::from_millis(1)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    drop(handle);
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_invocations() {
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = PollLoop::new("test", Duration::from_secs(30))
        .spawn(&Handle::current(), counting_op(counter.clone()));

    sleep(Duration::from_millis(1)).await;
    handle.stop();
    assert!(handle.is_stopped());

    sleep(Duration::from_secs(300)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_loop() {
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = PollLoop::new("test", Duration::from_secs(60))
        .spawn(&Handle::current(), counting_op(counter.clone()));
    sleep(Duration::from_millis(1)).await;
    drop(handle);

    sleep(Duration::from_secs(600)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_invocations_do_not_stop_the_loop() {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = counter.clone();
    let handle = PollLoop::new("failing", Duration::from_secs(30)).spawn(&Handle::current(), move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err::<(), _>("service unavailable".to_string()))
    });

    sleep(Duration::from_millis(1)).await;
    sleep(Duration::from_secs(60)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn slow_invocations_overlap_with_later_ticks() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let (s, f) = (started.clone(), finished.clone());
    let handle = PollLoop::new("slow", Duration::from_secs(30)).spawn(&Handle::current(), move || {
        s.fetch_add(1, Ordering::SeqCst);
        let f = f.clone();
        async move {
            sleep(Duration::from_secs(100)).await;
            f.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        }
    });

    sleep(Duration::from_millis(1)).await;
    sleep(Duration::from_secs(61)).await;
    assert_eq!(started.load(Ordering::SeqCst), 3);
    assert_eq!(finished.load(Ordering::SeqCst), 0);

    // In-flight invocations still complete after stop.
    handle.stop();
    sleep(Duration::from_secs(200)).await;
    assert_eq!(started.load(Ordering::SeqCst), 3);
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}

#[test]
fn zero_interval_is_clamped() {
    assert_eq!(
        PollLoop::new("zero", Duration::ZERO).interval(),
        Duration::from_millis(1)
    );
}
