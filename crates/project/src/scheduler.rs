//! Deterministic one-shot timers.
//! 可預測的一次性計時器。
//!
//! The queue owns its own clock. The host advances it from its timer
//! callback; tests advance it by hand.

use std::time::Duration;

use tokio_util::sync::CancellationToken as SharedToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle that prevents a scheduled task from firing once cancelled.
/// Clones share the same cancellation state; equality is by task id.
/// 取消後可阻止排程工作執行的代符；複本共用取消狀態，以工作編號比較。
#[derive(Debug, Clone)]
pub struct CancellationToken {
    id: TaskId,
    inner: SharedToken,
}

impl CancellationToken {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

impl PartialEq for CancellationToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CancellationToken {}

#[derive(Debug)]
struct ScheduledTask<T> {
    due: Duration,
    token: CancellationToken,
    payload: T,
}

/// Queue of delayed tasks keyed on a manually advanced clock.
/// 以手動推進時鐘為準的延遲工作佇列。
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            tasks: Vec::new(),
        }
    }

    /// Current clock value, measured from queue creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `payload` to fire `delay` after the current clock value.
    /// 排程於目前時間 `delay` 之後執行。
    pub fn schedule(&mut self, delay: Duration, payload: T) -> CancellationToken {
        let token = CancellationToken {
            id: TaskId(self.next_id),
            inner: SharedToken::new(),
        };
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            due: self.now + delay,
            token: token.clone(),
            payload,
        });
        token
    }

    /// Number of tasks that are neither cancelled nor fired.
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.token.is_cancelled())
            .count()
    }

    /// Due time of the earliest live task.
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks
            .iter()
            .filter(|task| !task.token.is_cancelled())
            .map(|task| task.due)
            .min()
    }

    /// Cancels every pending task and returns how many were live.
    /// 取消所有待執行工作並回傳實際取消的數量。
    pub fn cancel_all(&mut self) -> usize {
        let live = self.pending();
        for task in self.tasks.drain(..) {
            task.token.cancel();
        }
        live
    }

    /// Advances the clock and returns the payloads that became due, in due
    /// order. Cancelled tasks are discarded.
    /// 推進時鐘並依到期順序回傳到期的工作；已取消者直接捨棄。
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .tasks
            .drain(..)
            .filter(|task| !task.token.is_cancelled())
            .partition(|task| task.due <= now);
        self.tasks = waiting;

        due.sort_by_key(|task| (task.due, task.token.id));
        due.into_iter().map(|task| task.payload).collect()
    }
}
