use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Reads a yes/no answer from `input`. A cancel signal while waiting, end of
/// input, or anything but `y`/`yes` counts as no.
pub async fn read_retry_answer<R>(
    input: &mut R,
    cancel_rx: &mut mpsc::UnboundedReceiver<()>,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut answer = String::new();
    tokio::select! {
        biased;
        Some(()) = cancel_rx.recv() => Ok(false),
        read = input.read_line(&mut answer) => {
            let read = read?;
            Ok(read > 0 && matches!(answer.trim(), "y" | "Y" | "yes"))
        }
    }
}
