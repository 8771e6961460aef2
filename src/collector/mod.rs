//! 定时抓取上游资源，把每次成功的结果发到通道里。
//!
//! 启动后立即抓取一次，之后每个周期抓取一次。抓取失败只记录日志，
//! 循环继续。收到停止信号后关闭通道并退出，不会再发起新的抓取。

mod fetch;

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

pub use fetch::{Fetch, HttpFetcher, host_label};

use crate::cache::Item;

/// 通道只容纳一个结果，消费端跟不上时发送会等待
const CHANNEL_CAPACITY: usize = 1;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Fetching,
    Waiting,
    Stopped,
}

pub struct Collector<F> {
    fetcher: F,
    period: Duration,
}

pub struct CollectorHandle {
    stop_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<CollectorState>,
    task: JoinHandle<()>,
}

impl CollectorHandle {
    pub fn state(&self) -> CollectorState {
        *self.state_rx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 发出停止信号并等待抓取循环退出
    pub async fn stop(self) -> CollectorState {
        self.stop_tx.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!("Collector task failed: {}", e);
        }
        *self.state_rx.borrow()
    }
}

impl<F: Fetch> Collector<F> {
    pub fn new(fetcher: F, period: Duration) -> Self {
        Self {
            fetcher,
            period: period.max(MIN_PERIOD),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn spawn(self) -> (CollectorHandle, mpsc::Receiver<Item>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(CollectorState::Idle);

        let span = tracing::info_span!("collector", host = %host_label(self.fetcher.target()));
        let task = tokio::spawn(self.run(tx, stop_rx, state_tx).instrument(span));

        let handle = CollectorHandle {
            stop_tx,
            state_rx,
            task,
        };
        (handle, rx)
    }

    async fn run(
        self,
        tx: mpsc::Sender<Item>,
        mut stop_rx: watch::Receiver<bool>,
        state_tx: watch::Sender<CollectorState>,
    ) {
        let url = self.fetcher.target().to_string();
        tracing::info!("Collecting {} every {:?}", url, self.period);

        // interval 的第一次 tick 立即完成，即启动时的首次抓取
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            state_tx.send_replace(CollectorState::Waiting);
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                _ = tx.closed() => {
                    tracing::info!("Item receiver closed");
                    break;
                }
                _ = ticker.tick() => {}
            }
            if *stop_rx.borrow() {
                break;
            }

            state_tx.send_replace(CollectorState::Fetching);
            tracing::info!("GET {}", url);
            let payload = match self.fetcher.fetch().await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Fetch of {} failed: {}", url, e);
                    continue;
                }
            };

            let item = Item::now(payload);
            tokio::select! {
                biased;
                _ = stop_rx.changed() => {
                    tracing::debug!("Stopped while publishing, discarding item from {}", url);
                    break;
                }
                sent = tx.send(item) => {
                    if sent.is_err() {
                        tracing::info!("Item receiver closed");
                        break;
                    }
                }
            }
        }

        state_tx.send_replace(CollectorState::Stopped);
        tracing::info!("Collector for {} stopped", url);
    }
}
