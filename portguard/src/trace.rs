//! Forwarding of the kernel trace channel to the operator.

use std::future::Future;
use std::io::Write;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::Result;

/// Kernel trace channel the loaded program writes diagnostics to.
pub const TRACE_PIPE: &str = "/sys/kernel/debug/tracing/trace_pipe";

/// Open the kernel trace channel for reading.
pub async fn open_trace_pipe() -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(TRACE_PIPE).await?))
}

/// Pull the free-form message out of a trace line.
///
/// Lines carry a fixed prefix: a 16-column comm field, then
/// `-pid [cpu] flags timestamp:`, then a symbol-or-address field
/// terminated by `: `. The message is whatever follows.
pub fn message_field(line: &str) -> Option<&str> {
    let rest = line.get(17..)?;
    let ts_end = rest.find(':')?;
    if rest[..ts_end].split_whitespace().count() != 4 {
        return None;
    }
    let rest = &rest[ts_end + 1..];
    let sym_end = rest.find(':')?;
    Some(rest.get(sym_end + 2..).unwrap_or(""))
}

/// Forward trace messages to `out` until `shutdown` resolves or the
/// channel reaches end of input.
///
/// One line at a time, arrival order, nothing beyond field selection.
/// Unparseable lines and `CPU:` lost-event markers are skipped.
pub async fn forward<R, W, F>(reader: R, out: &mut W, shutdown: F) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            line = lines.next_line() => match line? {
                Some(line) => {
                    if line.starts_with("CPU:") {
                        continue;
                    }
                    if let Some(msg) = message_field(&line) {
                        writeln!(out, "{msg}")?;
                    }
                }
                None => return Ok(()),
            },
        }
    }
}
