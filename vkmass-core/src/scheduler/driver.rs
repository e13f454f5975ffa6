// File: src/scheduler/driver.rs

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tokio::sync::watch;
use tracing::{debug, info};
use vkmass_ai::{AiClient, CommentRequest, CommentSource};
use vkmass_common::models::{Account, AccountStatus, AutomationSettings, AutomationStep, LogKind, TaskStatus};

use crate::logs::truncate_for_display;
use crate::scheduler::clock::Clock;
use crate::scheduler::delay::DelaySource;
use crate::state::SharedState;

/// Characters of a generated comment kept in the event log.
pub const COMMENT_DISPLAY_CHARS: usize = 60;

const DEFAULT_TOPICS: [&str; 5] = [
    "Neural networks are changing marketing",
    "How to start a business with no budget",
    "Weekly crypto market review",
    "Top 10 productivity tools for founders",
    "Why short videos win the feed",
];

/// Value carried by the run-flag channel.
///
/// `generation` moves on every start and every stop, so a stop followed by a
/// start is still visible to a reader that only sees the latest value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSignal {
    pub running: bool,
    pub generation: u64,
}

impl RunSignal {
    /// Flips `running` to `on`. Returns false when it already had that value.
    pub fn set(&mut self, on: bool) -> bool {
        if self.running == on {
            return false;
        }
        self.running = on;
        self.generation += 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    fire_at: Duration,
    seq: u64,
    account_id: String,
}

/// Drives every account through [`AutomationStep::CYCLE`].
///
/// One pending firing per account lives in a min-heap keyed by fire time.
/// [`run_due`](CycleDriver::run_due) fires everything due at the moment of the
/// call; firings it schedules wait for the next call, even with a zero delay.
pub struct CycleDriver {
    ai: Arc<AiClient>,
    clock: Arc<dyn Clock>,
    delays: Box<dyn DelaySource>,
    control: Option<watch::Receiver<RunSignal>>,
    /// Generation of the run signal this run was started under.
    generation: u64,
    topics: Vec<String>,
    queue: BinaryHeap<Reverse<Scheduled>>,
    /// account id -> seq of its live entry in `queue`
    pending: HashMap<String, u64>,
    next_seq: u64,
    running: bool,
}

impl CycleDriver {
    pub fn new(ai: Arc<AiClient>, clock: Arc<dyn Clock>, delays: Box<dyn DelaySource>) -> Self {
        Self {
            ai,
            clock,
            delays,
            control: None,
            generation: 0,
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            queue: BinaryHeap::new(),
            pending: HashMap::new(),
            next_seq: 0,
            running: false,
        }
    }

    /// Watch the global run flag. A stop, or a restart under a newer
    /// generation, halts firing even mid-round.
    pub fn with_control(mut self, control: watch::Receiver<RunSignal>) -> Self {
        self.control = Some(control);
        self
    }

    /// Post topics handed to the comment generator.
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        if !topics.is_empty() {
            self.topics = topics;
        }
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of accounts with a firing scheduled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, account_id: &str) -> bool {
        self.pending.contains_key(account_id)
    }

    /// Earliest scheduled fire time, on the driver's clock.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(s)| s.fire_at)
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Starts a fresh run: drops anything left from a previous run, then
    /// schedules one firing per online account. Returns how many were scheduled.
    ///
    /// Nothing starts while a mass fill owns the accounts.
    pub async fn start(&mut self, state: &SharedState) -> usize {
        self.clear_timers();

        let mut st = state.lock().await;
        if st.is_filling() {
            self.running = false;
            st.log_system(LogKind::Warning, "Step 0 is in progress; automation cycle not started");
            return 0;
        }
        self.running = true;
        if let Some(rx) = &self.control {
            self.generation = rx.borrow().generation;
        }
        let settings = st.settings().clone();
        st.set_status(TaskStatus::Running);
        st.log_system(
            LogKind::Warning,
            format!(
                "Automation cycle started (delay {}-{}s, AI: {})",
                settings.min_delay,
                settings.max_delay,
                settings.active_ai_provider.as_str().to_uppercase()
            ),
        );

        let mut scheduled = 0;
        for account in st.accounts().snapshot() {
            if account.status != AccountStatus::Online {
                st.log_account(
                    LogKind::Warning,
                    &account,
                    format!("Skipped: account is {}", account.status),
                );
                continue;
            }
            self.schedule(&account.id, &settings);
            scheduled += 1;
        }
        drop(st);

        info!("Cycle driver started with {} account(s)", scheduled);
        scheduled
    }

    /// Cancels every pending firing.
    pub async fn stop(&mut self, state: &SharedState) {
        let was_running = self.running;
        self.running = false;
        self.clear_timers();

        if was_running {
            let mut st = state.lock().await;
            if st.status() == TaskStatus::Running {
                st.set_status(TaskStatus::Idle);
            }
            st.log_system(LogKind::Info, "Automation cycle stopped");
            info!("Cycle driver stopped");
        }
    }

    /// Fires every firing due now. Returns how many fired.
    pub async fn run_due(&mut self, state: &SharedState) -> usize {
        if self.halted() {
            return 0;
        }
        let now = self.clock.now();
        let mut batch = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.fire_at > now {
                break;
            }
            let Some(Reverse(entry)) = self.queue.pop() else {
                break;
            };
            if self.pending.get(&entry.account_id) == Some(&entry.seq) {
                self.pending.remove(&entry.account_id);
                batch.push(entry);
            }
        }

        let mut fired = 0;
        let mut remaining = batch.into_iter();
        for entry in remaining.by_ref() {
            if self.halted() {
                // Put it back untouched; a stop will clear it.
                self.requeue(entry);
                break;
            }
            if self.fire(state, &entry.account_id).await {
                fired += 1;
            }
        }
        for entry in remaining {
            self.requeue(entry);
        }
        fired
    }

    /// Runs the next step for one account and reschedules it.
    async fn fire(&mut self, state: &SharedState, account_id: &str) -> bool {
        let (account, settings) = {
            let st = state.lock().await;
            match st.account(account_id) {
                Some(account) => (account, st.settings().clone()),
                None => return false,
            }
        };
        if account.status != AccountStatus::Online {
            debug!("Account {} went {}; dropping it from the cycle", account.id, account.status);
            return false;
        }

        let step = account.current_step.next_in_cycle();
        state
            .lock()
            .await
            .log_account(LogKind::Info, &account, describe_step(step, &settings));

        let comment = if step == AutomationStep::Monitoring {
            let topic = self.pick_topic();
            let config = settings.ai_configs.get(&settings.active_ai_provider);
            let request = CommentRequest::new(&topic, &settings.keywords, &settings.comment_template).via(
                settings.active_ai_provider,
                config.map(|c| c.model.as_str()),
                config.is_some_and(|c| c.enabled),
            );
            let ai = self.ai.clone();
            let outcome = ai.comment(request).await;
            Some((topic, outcome))
        } else {
            None
        };

        // A stop that landed while the comment was generating wins.
        if self.halted() {
            return false;
        }

        {
            let mut st = state.lock().await;
            if let Some((topic, outcome)) = &comment {
                match &outcome.source {
                    CommentSource::Generated(provider) => st.record_ai_usage(*provider),
                    CommentSource::Fallback(reason) if reason.is_failure() => {
                        st.log_account(
                            LogKind::Error,
                            &account,
                            format!("Comment generation failed ({:?}); using a stock comment", reason),
                        );
                    }
                    CommentSource::Fallback(_) => {}
                }
                st.log_account(
                    LogKind::Ai,
                    &account,
                    format!(
                        "Comment on \"{}\": {}",
                        topic,
                        truncate_for_display(&outcome.text, COMMENT_DISPLAY_CHARS)
                    ),
                );
            }

            let mut blocked = None;
            st.update_account(account_id, |a| {
                blocked = apply_step(a, step);
                a.current_step = step;
            });
            if let Some(counter) = blocked {
                st.log_account(
                    LogKind::Warning,
                    &account,
                    format!("Daily {} limit reached; step skipped", counter),
                );
            }
        }

        self.schedule(account_id, &settings);
        true
    }

    fn schedule(&mut self, account_id: &str, settings: &AutomationSettings) {
        let delay = self.delays.next_delay(settings.min_delay, settings.max_delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            fire_at: self.clock.now() + delay,
            seq,
            account_id: account_id.to_string(),
        }));
        self.pending.insert(account_id.to_string(), seq);
        debug!("Next firing for {} in {:?}", account_id, delay);
    }

    fn requeue(&mut self, entry: Scheduled) {
        self.pending.insert(entry.account_id.clone(), entry.seq);
        self.queue.push(Reverse(entry));
    }

    fn clear_timers(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }

    fn halted(&self) -> bool {
        if !self.running {
            return true;
        }
        self.control.as_ref().is_some_and(|rx| {
            let signal = rx.borrow();
            !signal.running || signal.generation != self.generation
        })
    }

    fn pick_topic(&self) -> String {
        self.topics
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOPICS[0].to_string())
    }
}

/// Applies the counter change for `step`. Returns the counter name when its
/// daily limit blocked the increment.
pub fn apply_step(account: &mut Account, step: AutomationStep) -> Option<&'static str> {
    let limits = account.limits;
    let stats = &mut account.stats;
    let (counter, value, limit) = match step {
        AutomationStep::Searching => ("friends", &mut stats.friends_added, limits.friends),
        AutomationStep::Subscribing => ("groups", &mut stats.groups_joined, limits.groups),
        AutomationStep::Monitoring => ("comments", &mut stats.comments_posted, limits.comments),
        AutomationStep::Clips => ("clips", &mut stats.clips_commented, limits.clips),
        AutomationStep::Profiling | AutomationStep::Idle | AutomationStep::Step0Filling => return None,
    };
    if *value >= limit {
        return Some(counter);
    }
    *value += 1;
    None
}

fn describe_step(step: AutomationStep, settings: &AutomationSettings) -> String {
    match step {
        AutomationStep::Profiling => "Profile check: avatar, bio, privacy".to_string(),
        AutomationStep::Searching if settings.keywords.is_empty() => {
            "Searching targets; adding a friend".to_string()
        }
        AutomationStep::Searching => format!(
            "Searching targets by keywords ({}); adding a friend",
            settings.keywords.join(", ")
        ),
        AutomationStep::Subscribing => "Joining a thematic group".to_string(),
        AutomationStep::Monitoring => "Monitoring the feed for fresh posts".to_string(),
        AutomationStep::Clips => "Commenting short videos".to_string(),
        AutomationStep::Idle | AutomationStep::Step0Filling => step.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkmass_common::models::AccountLimits;

    #[test]
    fn counters_follow_the_canonical_mapping() {
        let mut account = Account::new("a", "A", "127.0.0.1:1");
        for step in AutomationStep::CYCLE {
            assert_eq!(apply_step(&mut account, step), None);
        }
        assert_eq!(account.stats.friends_added, 1);
        assert_eq!(account.stats.groups_joined, 1);
        assert_eq!(account.stats.comments_posted, 1);
        assert_eq!(account.stats.clips_commented, 1);
    }

    #[test]
    fn limits_block_increments() {
        let mut account = Account::new("a", "A", "127.0.0.1:1");
        account.limits = AccountLimits { friends: 0, groups: 1, comments: 1, clips: 1 };
        assert_eq!(apply_step(&mut account, AutomationStep::Searching), Some("friends"));
        assert_eq!(account.stats.friends_added, 0);
        assert_eq!(apply_step(&mut account, AutomationStep::Subscribing), None);
        assert_eq!(apply_step(&mut account, AutomationStep::Subscribing), Some("groups"));
        assert_eq!(account.stats.groups_joined, 1);
    }

    #[test]
    fn run_signal_counts_only_real_changes() {
        let mut signal = RunSignal::default();
        assert!(signal.set(true));
        assert!(!signal.set(true));
        assert!(signal.set(false));
        assert_eq!(signal, RunSignal { running: false, generation: 2 });
    }

    #[test]
    fn heap_orders_by_time_then_sequence() {
        let mut heap = BinaryHeap::new();
        for (ms, seq, id) in [(50, 0, "b"), (10, 2, "c"), (10, 1, "a")] {
            heap.push(Reverse(Scheduled {
                fire_at: Duration::from_millis(ms),
                seq,
                account_id: id.to_string(),
            }));
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|Reverse(s)| s.account_id)).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }
}
