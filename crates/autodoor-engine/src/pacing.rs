//! 협조적 대기.
//!
//! 긴 대기를 청크로 나눠 각 청크 앞뒤에서 실행 플래그를 다시 확인한다.
//! 정지 지연은 청크 하나를 넘지 않는다.

use std::time::Duration;

use tokio::time::Instant;

/// 더하면 넘치는 대기의 상한 (30년)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + wait`. 넘치면 `start`에서 30년 뒤로 자른다.
pub fn deadline_after(start: Instant, wait: Duration) -> Instant {
    start
        .checked_add(wait)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// `total` 동안 최대 `chunk` 단위로 나눠 대기한다.
///
/// 각 청크 앞뒤로 `should_run`을 확인하며, 중간에 `false`가 되면 즉시
/// `false`를 반환한다. 끝까지 대기했으면 `true`.
pub async fn cooperative_sleep<F>(total: Duration, chunk: Duration, should_run: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = deadline_after(Instant::now(), total);
    // 0 청크는 무한 루프가 되므로 전체를 한 번에 잔다
    let chunk = if chunk.is_zero() { total } else { chunk };

    loop {
        if !should_run() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let step = (deadline - now).min(chunk);
        tokio::time::sleep(step).await;
        if !should_run() {
            return false;
        }
    }
}

/// 쿨다운 청크 크기: `min(remaining, 10 × poll)`
pub fn cooldown_chunk(remaining: Duration, poll_interval: Duration) -> Duration {
    remaining.min(poll_interval.saturating_mul(10))
}

/// 마지막 액션 이후 남은 쿨다운 (없으면 `None`)
pub fn cooldown_remaining(
    last_action: Option<Instant>,
    cooldown: Duration,
    now: Instant,
) -> Option<Duration> {
    let last = last_action?;
    let elapsed = now.saturating_duration_since(last);
    if elapsed < cooldown {
        Some(cooldown - elapsed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn sleeps_full_duration_when_running() {
        let start = Instant::now();
        let done = cooperative_sleep(
            Duration::from_secs(25),
            Duration::from_secs(10),
            || true,
        )
        .await;
        assert!(done);
        assert_eq!(start.elapsed(), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_within_one_chunk() {
        let checks = Arc::new(AtomicUsize::new(0));
        let c = checks.clone();
        let start = Instant::now();
        // 세 번째 확인부터 정지
        let done = cooperative_sleep(
            Duration::from_secs(100),
            Duration::from_secs(10),
            move || c.fetch_add(1, Ordering::SeqCst) < 2,
        )
        .await;
        assert!(!done);
        assert!(start.elapsed() <= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn not_running_returns_immediately() {
        let start = Instant::now();
        let done = cooperative_sleep(Duration::from_secs(5), Duration::from_secs(1), || false);
        assert!(!done.await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_total_does_not_overflow() {
        let checks = Arc::new(AtomicUsize::new(0));
        let c = checks.clone();
        let start = Instant::now();
        let done = cooperative_sleep(Duration::MAX, Duration::from_secs(10), move || {
            c.fetch_add(1, Ordering::SeqCst) < 4
        })
        .await;
        assert!(!done);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_saturates_far_ahead() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, Duration::from_secs(5)), now + Duration::from_secs(5));
        let capped = deadline_after(now, Duration::MAX);
        assert!(capped > now + Duration::from_secs(86_400 * 365));
    }

    #[test]
    fn chunk_is_capped_at_ten_polls() {
        let poll = Duration::from_secs(1);
        assert_eq!(cooldown_chunk(Duration::from_secs(179), poll), Duration::from_secs(10));
        assert_eq!(cooldown_chunk(Duration::from_secs(3), poll), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_cooldown() {
        let now = Instant::now();
        let cooldown = Duration::from_secs(180);
        assert_eq!(cooldown_remaining(None, cooldown, now), None);
        let later = now + Duration::from_secs(60);
        assert_eq!(
            cooldown_remaining(Some(now), cooldown, later),
            Some(Duration::from_secs(120))
        );
        let done = now + Duration::from_secs(180);
        assert_eq!(cooldown_remaining(Some(now), cooldown, done), None);
        assert_eq!(cooldown_remaining(Some(now), Duration::ZERO, now), None);
    }
}
