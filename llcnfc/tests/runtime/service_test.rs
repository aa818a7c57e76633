#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use common::fixtures::{info, rr, rset, ua};
use llcnfc::config::LinkConfig;
use llcnfc::protocol::Frame;
use llcnfc::runtime::{LinkChannel, LlcService};
use llcnfc::Error;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// The controller side of the byte stream, driven by the test.
struct Peer {
    stream: DuplexStream,
}

impl Peer {
    async fn read_frame(&mut self) -> Result<Frame> {
        let len = self.stream.read_u8().await?;
        let mut raw = vec![len; 1 + len as usize];
        self.stream.read_exact(&mut raw[1..]).await?;
        Ok(Frame::decode(&raw)?)
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.stream.write_all(&frame.encode()?).await?;
        Ok(())
    }

    /// Answer the RSET that opens the link.
    async fn accept(&mut self) -> Result<()> {
        assert_eq!(self.read_frame().await?, rset(4));
        self.write_frame(&ua()).await
    }
}

fn link(config: LinkConfig) -> (llcnfc::runtime::LlcHandle, Peer) {
    common::init_logging();
    let (client, controller) = tokio::io::duplex(256);
    let handle = LlcService::spawn(client, config).expect("spawn link");
    (handle, Peer { stream: controller })
}

#[tokio::test]
async fn exchange_over_a_duplex_stream() -> Result<()> {
    let (handle, mut peer) = link(LinkConfig::default());

    let opener = handle.clone();
    let init = tokio::spawn(async move { opener.init().await });
    peer.accept().await?;
    init.await??;

    let sender = handle.clone();
    let send = tokio::spawn(async move { sender.send(b"hello").await });
    assert_eq!(peer.read_frame().await?, info(0, 0, b"hello"));
    peer.write_frame(&rr(1)).await?;
    send.await??;

    peer.write_frame(&info(0, 1, b"world")).await?;
    assert_eq!(handle.receive().await?, b"world".to_vec());
    assert_eq!(peer.read_frame().await?, rr(1));

    handle.release().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn init_fails_when_the_peer_stays_silent() -> Result<()> {
    let config = LinkConfig::builder()
        .connection_timeout(Duration::from_millis(20))
        .max_reset_attempts(2)
        .build()?;
    let (handle, _peer) = link(config);
    assert_eq!(handle.init().await, Err(Error::InitFailed));
    assert_eq!(handle.send(b"x").await, Err(Error::LinkDown));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn lost_frame_is_retransmitted_after_the_guard_expires() -> Result<()> {
    let config = LinkConfig::builder()
        .guard_timeout(Duration::from_millis(30))
        .build()?;
    let (handle, mut peer) = link(config);
    let opener = handle.clone();
    let init = tokio::spawn(async move { opener.init().await });
    peer.accept().await?;
    init.await??;

    let sender = handle.clone();
    let send = tokio::spawn(async move { sender.send(b"again").await });
    // first copy is dropped on the floor
    assert_eq!(peer.read_frame().await?, info(0, 0, b"again"));
    assert_eq!(peer.read_frame().await?, info(0, 0, b"again"));
    peer.write_frame(&rr(1)).await?;
    send.await??;

    let status = handle.status().await?;
    assert_eq!(status.outstanding, 0);
    Ok(())
}

#[tokio::test]
async fn unsolicited_payloads_wait_in_the_inbox() -> Result<()> {
    let (handle, mut peer) = link(LinkConfig::default());
    let opener = handle.clone();
    let init = tokio::spawn(async move { opener.init().await });
    peer.accept().await?;
    init.await??;

    peer.write_frame(&info(0, 0, b"first")).await?;
    peer.write_frame(&info(1, 0, b"second")).await?;
    assert_eq!(peer.read_frame().await?, rr(1));
    assert_eq!(peer.read_frame().await?, rr(2));

    assert_eq!(handle.receive().await?, b"first".to_vec());
    assert_eq!(handle.receive().await?, b"second".to_vec());
    Ok(())
}

#[tokio::test]
async fn release_fails_pending_receive() -> Result<()> {
    let (handle, mut peer) = link(LinkConfig::default());
    let opener = handle.clone();
    let init = tokio::spawn(async move { opener.init().await });
    peer.accept().await?;
    init.await??;

    let receiver = handle.clone();
    let pending = tokio::spawn(async move { receiver.receive().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.release().await?;
    assert_eq!(pending.await?, Err(Error::Released));
    Ok(())
}
