//! 序列器传输层
//!
//! 薄 IO 包装：监听一个 UDP 端口，把指定通道上的数据包解码成
//! `PlayEvent` 后推进注册表的事件队列。数据包格式是以空白分隔的
//! token 列表，第一个 token 是通道地址，其余是键值交替的事件字段。
//! 边界处保持宽松：格式错误的数据包记日志后丢弃，不影响后续事件。

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::event::PlayEvent;

const MAX_DATAGRAM: usize = 8192;

/// 序列器事件监听器
pub struct SequencerListener {
    socket: UdpSocket,
    channel: String,
}

impl SequencerListener {
    /// 绑定监听地址并订阅指定通道
    pub async fn bind(host: &str, port: u16, channel: impl Into<String>) -> Result<Self> {
        let socket = UdpSocket::bind((host, port)).await?;
        let channel = channel.into();
        info!(addr = %socket.local_addr()?, channel = %channel, "序列器监听器已绑定");
        Ok(Self { socket, channel })
    }

    /// 实际绑定到的地址（端口传 0 时由系统分配）
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// 接收循环：解码事件并发送到注册表的队列
    ///
    /// 接收端关闭后返回。
    pub async fn run(self, tx: mpsc::Sender<PlayEvent>) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;

            let Ok(text) = std::str::from_utf8(&buf[..len]) else {
                warn!(%peer, "丢弃非 UTF-8 数据包");
                continue;
            };

            let tokens: Vec<&str> = text.split_whitespace().collect();
            let Some((address, fields)) = tokens.split_first() else {
                continue;
            };

            if *address != self.channel {
                debug!(%peer, channel = %address, "忽略其他通道的消息");
                continue;
            }

            match PlayEvent::decode(fields) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        info!("事件队列已关闭, 监听器退出");
                        return Ok(());
                    }
                }
                Err(e) => warn!(%peer, error = %e, "丢弃格式错误的事件"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_decodes_matching_channel() {
        let listener = SequencerListener::bind("127.0.0.1", 0, "/play2").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(async move {
            let _ = listener.run(tx).await;
        });

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(b"/play2 s kick delay 0.25", addr)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.subject, "kick");
        assert_eq!(event.delay, 0.25);
    }

    #[tokio::test]
    async fn test_listener_skips_other_channels_and_malformed() {
        let listener = SequencerListener::bind("127.0.0.1", 0, "/play2").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(async move {
            let _ = listener.run(tx).await;
        });

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        // 其他通道、缺字段、负延迟都应被丢弃
        sender.send_to(b"/dirt s kick", addr).await.unwrap();
        sender.send_to(b"/play2 delay 0.5", addr).await.unwrap();
        sender
            .send_to(b"/play2 s bd delay -1", addr)
            .await
            .unwrap();
        // 最后一个合法事件作为哨兵
        sender.send_to(b"/play2 s sn", addr).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.subject, "sn");
        assert_eq!(event.delay, 0.0);
    }
}
