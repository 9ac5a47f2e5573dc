//! 规则注册表
//!
//! 持有有序、只增不减的规则序列和注入的渲染上下文。每个到达的事件
//! 按自带的延迟安排一个一次性定时任务，到期后按注册顺序对全部规则
//! 做一次派发。多个定时任务可以同时在途，按到期顺序而不是事件到达
//! 顺序落地——延迟不同的事件相互超车是演出里刻意使用的听画错位
//! 手法，这里必须原样保留。

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::event::PlayEvent;
use crate::rule::Rule;

/// 注册返回的规则句柄
///
/// 目前只是注册顺序下标；保留显式身份是为将来可能的注销操作
/// 留出余地。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle(usize);

impl RuleHandle {
    /// 注册顺序下标
    pub fn index(&self) -> usize {
        self.0
    }
}

struct RegistryInner<S> {
    rules: Vec<Rule<S>>,
    context: S,
}

/// 规则注册表
pub struct TriggerRegistry<S> {
    inner: Arc<Mutex<RegistryInner<S>>>,
}

impl<S> Clone for TriggerRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Send + 'static> TriggerRegistry<S> {
    /// 创建注册表并接管渲染上下文
    pub fn new(context: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                rules: Vec::new(),
                context,
            })),
        }
    }

    /// 当前注册的规则数量
    pub fn len(&self) -> usize {
        self.inner.lock().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().rules.is_empty()
    }

    /// 注册规则，追加到序列末尾
    ///
    /// 不做去重：同一条规则注册两次就会在每个事件上评估两次。
    #[instrument(skip(self, rule), fields(subject = %rule.bound_subject()))]
    pub fn register(&self, rule: Rule<S>) -> RuleHandle {
        let mut guard = self.inner.lock();
        guard.rules.push(rule);
        let handle = RuleHandle(guard.rules.len() - 1);
        info!(index = handle.index(), "规则已注册");
        handle
    }

    /// 对全部规则按注册顺序做一次派发
    ///
    /// 某条规则的动作出错会中断本次派发里剩余规则的评估；
    /// 其他已安排或将来的派发不受影响。
    #[instrument(skip(self))]
    pub fn dispatch(&self, subject: &str) -> Result<()> {
        let mut guard = self.inner.lock();
        let RegistryInner { rules, context } = &mut *guard;

        for rule in rules.iter_mut() {
            rule.dispatch(subject, context)?;
        }

        Ok(())
    }

    /// 按事件的延迟安排一次派发
    ///
    /// 延迟为 0 时在下一个调度点派发。任务一旦安排就无法取消；
    /// 派发失败只记录日志，不影响其他在途任务。
    pub fn schedule(&self, event: PlayEvent) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            // PlayEvent 构造时已拒绝负值和非有限值，这里兜底为 0
            let delay = Duration::try_from_secs_f64(event.delay).unwrap_or(Duration::ZERO);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = registry.dispatch(&event.subject) {
                warn!(subject = %event.subject, error = %e, "派发过程中断");
            }
        })
    }

    /// 消费事件流，为每个事件安排延迟派发
    ///
    /// 发送端全部关闭后返回。
    pub async fn run(&self, mut events: mpsc::Receiver<PlayEvent>) {
        while let Some(event) = events.recv().await {
            debug!(subject = %event.subject, delay = event.delay, "收到事件");
            self.schedule(event);
        }
        info!("事件流已关闭");
    }

    /// 访问渲染上下文（测试里用来检查录制到的调用）
    pub fn with_context<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_rule(subject: &str, label: &'static str) -> Rule<Vec<&'static str>> {
        Rule::new(subject, move |ctx: &mut Vec<&'static str>, _snapshot| {
            ctx.push(label);
            Ok(())
        })
    }

    #[test]
    fn test_register_returns_sequential_handles() {
        let registry = TriggerRegistry::new(Vec::new());

        let h1 = registry.register(marker_rule("bd", "r1"));
        let h2 = registry.register(marker_rule("sn", "r2"));
        let h3 = registry.register(marker_rule("hh", "r3"));

        assert_eq!(h1.index(), 0);
        assert_eq!(h2.index(), 1);
        assert_eq!(h3.index(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("bd", "r1"));
        registry.register(marker_rule("bd", "r2"));
        registry.register(marker_rule("bd", "r3"));

        registry.dispatch("bd").unwrap();

        registry.with_context(|calls| {
            assert_eq!(*calls, vec!["r1", "r2", "r3"]);
        });
    }

    #[test]
    fn test_duplicate_registration_duplicates_evaluation() {
        let registry = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("bd", "r1"));
        registry.register(marker_rule("bd", "r1"));

        registry.dispatch("bd").unwrap();

        registry.with_context(|calls| {
            assert_eq!(*calls, vec!["r1", "r1"]);
        });
    }

    #[test]
    fn test_action_error_aborts_remaining_rules() {
        let registry: TriggerRegistry<Vec<&'static str>> = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("bd", "first"));
        registry.register(Rule::new("bd", |_: &mut Vec<&'static str>, _| {
            anyhow::bail!("boom")
        }));
        registry.register(marker_rule("bd", "after_error"));

        let result = registry.dispatch("bd");
        assert!(result.is_err());

        registry.with_context(|calls| {
            // 出错动作之后的规则在本次派发里没有被评估
            assert_eq!(*calls, vec!["first"]);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_zero_delay_dispatches_next_tick() {
        let registry = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("bd", "r1"));

        let event = PlayEvent::new("bd", 0.0).unwrap();
        registry.schedule(event).await.unwrap();

        registry.with_context(|calls| {
            assert_eq!(*calls, vec!["r1"]);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_orders_by_expiration_not_arrival() {
        let registry = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("slow", "slow"));
        registry.register(marker_rule("fast", "fast"));

        // 先到达的事件延迟更长：短延迟事件应当先落地
        let h1 = registry.schedule(PlayEvent::new("slow", 0.5).unwrap());
        let h2 = registry.schedule(PlayEvent::new("fast", 0.1).unwrap());

        h1.await.unwrap();
        h2.await.unwrap();

        registry.with_context(|calls| {
            assert_eq!(*calls, vec!["fast", "slow"]);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pass_leaves_other_passes_intact() {
        #[derive(Default)]
        struct Ctx {
            armed: bool,
            fired: usize,
        }

        let registry = TriggerRegistry::new(Ctx {
            armed: true,
            fired: 0,
        });
        registry.register(Rule::new("bd", |ctx: &mut Ctx, _snapshot| {
            if ctx.armed {
                ctx.armed = false;
                anyhow::bail!("transient failure");
            }
            ctx.fired += 1;
            Ok(())
        }));

        // 第一次派发失败，第二次独立进行且成功
        registry
            .schedule(PlayEvent::new("bd", 0.1).unwrap())
            .await
            .unwrap();
        registry
            .schedule(PlayEvent::new("bd", 0.1).unwrap())
            .await
            .unwrap();

        registry.with_context(|ctx| {
            assert_eq!(ctx.fired, 1);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_consumes_event_stream() {
        let registry = TriggerRegistry::new(Vec::new());
        registry.register(marker_rule("bd", "r1"));

        let (tx, rx) = mpsc::channel(8);
        let runner = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.run(rx).await })
        };

        tx.send(PlayEvent::new("bd", 0.0).unwrap()).await.unwrap();
        tx.send(PlayEvent::new("bd", 0.0).unwrap()).await.unwrap();
        drop(tx);
        runner.await.unwrap();

        // run 返回后在途的派发任务可能还没执行完，推进一下虚拟时间
        tokio::time::sleep(Duration::from_millis(10)).await;

        registry.with_context(|calls| {
            assert_eq!(*calls, vec!["r1", "r1"]);
        });
    }
}
