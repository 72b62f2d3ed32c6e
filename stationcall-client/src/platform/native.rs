/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Native (desktop / test) platform primitives.
//!
//! These implementations use `std::time` and `tokio`. Tasks are spawned with
//! `tokio::task::spawn_local`, so a [`tokio::task::LocalSet`] must be driving
//! the calling future.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current time in milliseconds since the Unix epoch.
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

pub(super) fn spawn_detached<F: Future<Output = ()> + 'static>(future: F) {
    let _ = tokio::task::spawn_local(future);
}

/// Sleep for `duration` on the tokio timer.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::super::{spawn_local, with_deadline, Elapsed};
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_now_ms_returns_reasonable_value() {
        let ms = now_ms();
        // Should be well past year 2020 (1577836800000 ms)
        assert!(ms > 1_577_836_800_000.0, "now_ms() returned {ms}");
        // Should be before year 2100
        assert!(ms < 4_102_444_800_000.0, "now_ms() returned {ms}");
    }

    #[tokio::test]
    async fn test_spawn_local_executes_future() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let flag = Rc::new(Cell::new(false));
                let flag_clone = flag.clone();

                let _handle = spawn_local(async move {
                    flag_clone.set(true);
                });

                sleep(Duration::from_millis(10)).await;
                assert!(flag.get(), "spawned future should have run");
            })
            .await;
    }

    #[tokio::test]
    async fn test_dropping_handle_aborts_task() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let flag = Rc::new(Cell::new(false));
                let flag_clone = flag.clone();

                let handle = spawn_local(async move {
                    sleep(Duration::from_millis(20)).await;
                    flag_clone.set(true);
                });
                drop(handle);

                sleep(Duration::from_millis(40)).await;
                assert!(!flag.get(), "aborted task must not complete");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline() {
        let fast = with_deadline(Some(Duration::from_secs(1)), async { 7 }).await;
        assert_eq!(fast, Ok(7));

        let slow = with_deadline(
            Some(Duration::from_secs(1)),
            sleep(Duration::from_secs(5)),
        )
        .await;
        assert_eq!(slow, Err(Elapsed(Duration::from_secs(1))));

        let unbounded = with_deadline(None, async { "done" }).await;
        assert_eq!(unbounded, Ok("done"));
    }
}
