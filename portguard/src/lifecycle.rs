//! Startup and shutdown sequencing for the control plane.

use std::future::Future;
use std::io::Write;

use aya::programs::XdpFlags;
use log::info;
use tokio::io::AsyncBufRead;

use crate::attach::{AttachmentManager, XdpHook};
use crate::publish::{self, ConfigStore};
use crate::trace;
use crate::Result;

/// Drive the control plane from config publication through detach.
///
/// The config record is written before the attach request is issued, so
/// the kernel side never observes traffic without it. Once attached,
/// trace messages flow to `out` until `shutdown` resolves or the trace
/// channel ends, then the program is detached exactly once. A fatal
/// error propagates out after best-effort detach; detach only happens if
/// attach succeeded.
pub async fn run<D, R, W, F>(
    datapath: &mut D,
    iface: &str,
    flags: XdpFlags,
    local_address: u32,
    reader: R,
    out: &mut W,
    shutdown: F,
) -> Result<()>
where
    D: ConfigStore + XdpHook,
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = ()>,
{
    publish::publish_local_address(datapath, local_address)?;

    let mut attachment = AttachmentManager::new();
    attachment.attach(datapath, iface, flags)?;
    info!("XDP program attached on {iface}");

    info!("waiting for Ctrl-C...");
    let forwarded = trace::forward(reader, out, shutdown).await;

    info!("detaching XDP program from {iface}");
    let detached = attachment.detach(datapath);

    forwarded.and(detached)
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use portguard_common::FilterConfig;
    use tokio::io::{AsyncRead, BufReader, ReadBuf};

    use super::*;
    use crate::publish::CONFIG_INDEX;
    use crate::Error;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Write(u32, u32),
        Attach,
        Detach,
    }

    #[derive(Default)]
    struct FakeDatapath {
        events: Vec<Event>,
        fail_write: bool,
        fail_attach: bool,
    }

    impl ConfigStore for FakeDatapath {
        fn write(&mut self, key: u32, value: FilterConfig) -> crate::Result<()> {
            if self.fail_write {
                return Err(Error::MapNotFound("config_map"));
            }
            self.events.push(Event::Write(key, value.local_address));
            Ok(())
        }
    }

    impl XdpHook for FakeDatapath {
        fn attach(&mut self, _iface: &str, _flags: XdpFlags) -> crate::Result<()> {
            if self.fail_attach {
                return Err(Error::ProgramNotFound("xdp_kernel"));
            }
            self.events.push(Event::Attach);
            Ok(())
        }

        fn detach(&mut self) -> crate::Result<()> {
            self.events.push(Event::Detach);
            Ok(())
        }
    }

    /// Read half that never yields, standing in for an idle trace channel.
    struct Idle;

    impl AsyncRead for Idle {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn config_is_written_before_attach() {
        let mut datapath = FakeDatapath::default();
        let mut out = Vec::new();
        run(
            &mut datapath,
            "eth0",
            XdpFlags::default(),
            0x0A01_A8C0,
            BufReader::new(&b""[..]),
            &mut out,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(
            datapath.events,
            vec![
                Event::Write(CONFIG_INDEX, 0x0A01_A8C0),
                Event::Attach,
                Event::Detach
            ]
        );
    }

    #[tokio::test]
    async fn shutdown_detaches_exactly_once() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();
        let shutdown = async move {
            let _ = rx.await;
        };

        let mut datapath = FakeDatapath::default();
        let mut out = Vec::new();
        run(
            &mut datapath,
            "eth0",
            XdpFlags::default(),
            0,
            BufReader::new(Idle),
            &mut out,
            shutdown,
        )
        .await
        .unwrap();

        let detaches = datapath
            .events
            .iter()
            .filter(|e| **e == Event::Detach)
            .count();
        assert_eq!(detaches, 1);
    }

    #[tokio::test]
    async fn config_failure_skips_attach_and_detach() {
        let mut datapath = FakeDatapath {
            fail_write: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let result = run(
            &mut datapath,
            "eth0",
            XdpFlags::default(),
            0,
            BufReader::new(&b""[..]),
            &mut out,
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(Error::MapNotFound(_))));
        assert!(datapath.events.is_empty());
    }

    #[tokio::test]
    async fn attach_failure_skips_detach() {
        let mut datapath = FakeDatapath {
            fail_attach: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let result = run(
            &mut datapath,
            "eth0",
            XdpFlags::default(),
            0,
            BufReader::new(&b""[..]),
            &mut out,
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(Error::ProgramNotFound(_))));
        assert_eq!(datapath.events, vec![Event::Write(CONFIG_INDEX, 0)]);
    }
}
