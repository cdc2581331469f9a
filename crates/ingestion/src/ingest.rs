//! Cane Ingest 主入口

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{CanePacket, DropPolicy, PacketCallback, PacketSource};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{BackpressureConfig, LinkMetrics};
use crate::mock::epoch_ms;

/// Cane Ingest
///
/// 把 `PacketSource` 的回调流桥接到一个有界异步通道，供管道任务消费。
/// 同一时间只有一根手杖在配对，但接口保持与数据源解耦。
pub struct CaneIngest {
    /// 已注册的数据源
    source: Option<Arc<dyn PacketSource>>,

    /// 桥接是否在运行
    bridging: Arc<AtomicBool>,

    /// 共享的链路指标
    metrics: Arc<LinkMetrics>,

    /// 数据发送端
    tx: Sender<CanePacket>,

    /// 数据接收端
    rx: Option<Receiver<CanePacket>>,

    /// 内部持有的接收端克隆，供 DropOldest 背压策略腾出队首位置
    internal_rx: Receiver<CanePacket>,

    /// 背压配置
    config: BackpressureConfig,
}

impl CaneIngest {
    /// 创建新的 Cane Ingest
    ///
    /// # Arguments
    /// * `channel_capacity` - 通道容量
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// 使用自定义背压配置创建
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);
        let internal_rx = rx.clone();

        Self {
            source: None,
            bridging: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(LinkMetrics::new()),
            tx,
            rx: Some(rx),
            internal_rx,
            config,
        }
    }

    /// 注册数据源
    ///
    /// 重复注册会替换旧数据源（旧源先停止）。
    #[instrument(name = "ingest_register_source", skip(self, source), fields(source = %source.source_name()))]
    pub fn register_source(&mut self, source: Box<dyn PacketSource>) {
        if let Some(old) = self.source.take() {
            warn!(source = %old.source_name(), "replacing registered source");
            old.stop();
        }
        debug!(source = %source.source_name(), "registered packet source");
        self.source = Some(Arc::from(source));
    }

    /// 启动数据桥接
    #[instrument(name = "ingest_start", skip(self))]
    pub fn start(&self) {
        let Some(source) = &self.source else {
            warn!("start called with no registered source");
            return;
        };

        if self.bridging.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(source = %source.source_name(), "starting packet bridge");

        let tx = self.tx.clone();
        let rx = self.internal_rx.clone();
        let metrics = self.metrics.clone();
        let bridging = self.bridging.clone();
        let drop_policy = self.config.drop_policy;
        let source_name = source.source_name().to_string();

        let callback: PacketCallback = Arc::new(move |packet| {
            if !bridging.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_bridged(epoch_ms());
            metrics.note_queue_depth(tx.len());
            trace!(source = %source_name, timestamp = packet.timestamp_ms, "packet bridged");
            send_packet(&tx, &rx, packet, &metrics, &source_name, drop_policy);
        });

        source.listen(callback);
    }

    /// 停止数据桥接
    #[instrument(name = "ingest_stop", skip(self))]
    pub fn stop(&self) {
        if self.bridging.swap(false, Ordering::SeqCst) {
            if let Some(source) = &self.source {
                info!(source = %source.source_name(), "stopping packet bridge");
                source.stop();
            }
        }
    }

    /// 获取数据流接收端
    ///
    /// 注意：只能调用一次，后续调用返回 None
    pub fn take_receiver(&mut self) -> Option<Receiver<CanePacket>> {
        self.rx.take()
    }

    /// 获取链路指标引用
    pub fn metrics(&self) -> Arc<LinkMetrics> {
        self.metrics.clone()
    }

    /// 是否正在桥接
    pub fn is_running(&self) -> bool {
        self.bridging.load(Ordering::Relaxed)
            && self.source.as_ref().map(|s| s.is_listening()).unwrap_or(false)
    }
}

impl Drop for CaneIngest {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 发送数据包，处理背压策略
#[inline]
fn send_packet(
    tx: &Sender<CanePacket>,
    rx: &Receiver<CanePacket>,
    packet: CanePacket,
    metrics: &Arc<LinkMetrics>,
    source_name: &str,
    drop_policy: DropPolicy,
) {
    match tx.try_send(packet) {
        Ok(_) => {}
        Err(TrySendError::Full(packet)) => match drop_policy {
            DropPolicy::DropNewest => {
                metrics.record_shed();
                trace!(source = %source_name, "packet shed (newest)");
            }
            DropPolicy::DropOldest => {
                // 腾出最旧的一个位置再重试一次；并发下可能再次满，此时退化为丢新
                let _ = rx.try_recv();
                metrics.record_shed();
                if tx.try_send(packet).is_err() {
                    trace!(source = %source_name, "packet shed (oldest fallback)");
                }
            }
        },
        Err(TrySendError::Closed(_)) => {
            warn!(source = %source_name, "ingest channel closed");
        }
    }
}
