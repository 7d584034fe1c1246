//! `lru`：决定**什么时候**学习。
//!
//! 约定：
//! - span 在 `TextChanges` 里等待（pending），学习后或被丢弃时移除
//! - 最近修改的那个 span 永远不按时间过期：光标很可能还在里面
//! - 有待学习内容时才启动低频轮询，`TextChanges` 清空后轮询自行停止
use std::time::{Duration, Instant};

use crate::{
    changes::TextChanges, learn_strategy::LearnStrategy, span::TextSpan, tokenizer::Tokenizer,
};

/// 默认：span 最后一次修改后 60 秒才学习。
pub const LEARN_DELAY: Duration = Duration::from_secs(60);
/// 默认：每 2 秒检查一次过期 span。
pub const POLLING_TIME: Duration = Duration::from_secs(2);

/// 学习端：把一行文本喂给自动学习模型。
pub trait Learner: Tokenizer {
    fn learn_text(&mut self, text: &str, allow_new_words: bool);
}

/// 可取消的重复任务（不依赖真实定时器，由宿主循环调用 `due` 驱动）。
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// 到点了没有（未启动时永远为 false）。
    pub fn due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|t| now >= t)
    }

    /// 从 `now` 起再等一个周期。
    pub fn reschedule(&mut self, now: Instant) {
        if self.is_running() {
            self.start(now);
        }
    }
}

/// 按“最近最少使用”延迟学习的调度策略。
#[derive(Debug, Clone)]
pub struct LruLearnStrategy {
    learn_delay: Duration,
    timer: PollTimer,
}

impl Default for LruLearnStrategy {
    fn default() -> Self {
        Self::new(LEARN_DELAY, POLLING_TIME)
    }
}

impl LruLearnStrategy {
    pub fn new(learn_delay: Duration, poll_interval: Duration) -> Self {
        Self {
            learn_delay,
            timer: PollTimer::new(poll_interval),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_running()
    }

    /// 学习全部待学习的 span 并清空（焦点离开/会话结束时调用）。
    pub fn commit_changes<L>(&mut self, changes: &mut TextChanges, learner: &mut L)
    where
        L: Learner + ?Sized,
    {
        if !changes.is_empty() {
            tracing::info!(spans = changes.len(), "提交全部编辑");
            learn_spans(changes.spans(), learner);
            changes.clear();
        }
        self.timer.stop();
    }

    /// 只学习已过期的 span（最近修改的那个除外），返回仍在等待的 span。
    pub fn commit_expired_changes<'c, L>(
        &mut self,
        changes: &'c mut TextChanges,
        learner: &mut L,
        now: Instant,
    ) -> &'c [TextSpan]
    where
        L: Learner + ?Sized,
    {
        let most_recent = changes.most_recent().map(|s| (s.begin(), s.end()));
        let expired: Vec<TextSpan> = changes
            .spans()
            .iter()
            .filter(|s| Some((s.begin(), s.end())) != most_recent)
            .filter(|s| now.saturating_duration_since(s.last_modified()) >= self.learn_delay)
            .cloned()
            .collect();

        if !expired.is_empty() {
            tracing::info!(
                expired = expired.len(),
                pending = changes.len() - expired.len(),
                "学习过期编辑"
            );
            learn_spans(&expired, learner);
            for span in &expired {
                changes.remove_span(span);
            }
        }
        changes.spans()
    }

    /// 丢弃全部待学习内容，不学习。
    pub fn discard_changes(&mut self, changes: &mut TextChanges) {
        if !changes.is_empty() {
            tracing::debug!(spans = changes.len(), "丢弃编辑");
        }
        changes.clear();
        self.timer.stop();
    }

    /// 有新的待学习内容：需要时启动轮询。
    pub fn on_text_context_changed(&mut self, changes: &TextChanges, now: Instant) {
        if !changes.is_empty() && !self.timer.is_running() {
            self.timer.start(now);
        }
    }

    /// 轮询一次：到点就学习过期 span；仍有剩余则续期，否则停止。返回轮询是否仍在运行。
    pub fn poll<L>(&mut self, changes: &mut TextChanges, learner: &mut L, now: Instant) -> bool
    where
        L: Learner + ?Sized,
    {
        if !self.timer.due(now) {
            return self.timer.is_running();
        }
        if self.commit_expired_changes(changes, learner, now).is_empty() {
            self.timer.stop();
        } else {
            self.timer.reschedule(now);
        }
        self.timer.is_running()
    }
}

/// 扩展到词边界后逐行学习（允许新词）。
fn learn_spans<L>(spans: &[TextSpan], learner: &mut L)
where
    L: Learner + ?Sized,
{
    let spans = disjoint_spans(spans);
    let lines = LearnStrategy::new(&mut *learner).get_learn_lines(&spans);
    for line in lines {
        tracing::debug!(line = %line, "学习");
        learner.learn_text(&line, true);
    }
}

/// 重叠的 span 违反 `TextChanges` 的不变量：debug 构建直接断言，release 构建记日志并跳过。
fn disjoint_spans(spans: &[TextSpan]) -> Vec<TextSpan> {
    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| (s.begin(), s.end()));
    let mut out: Vec<TextSpan> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if out.last().is_some_and(|last| last.end() > span.begin()) {
            debug_assert!(false, "TextChanges 中出现重叠 span");
            tracing::error!(
                begin = span.begin(),
                end = span.end(),
                "TextChanges 中出现重叠 span，跳过"
            );
            continue;
        }
        out.push(span.clone());
    }
    out
}
