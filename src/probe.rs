use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::command::Command;
use crate::device::DeviceLink;

pub const BANNER: &str = "F or D for fan or door, q to quit";
const QUIT: &str = "q";

/// Forward operator lines to the device until `q`, EOF or cancellation.
/// Returns how many lines reached the transport.
pub async fn run_probe<R, W>(
    link: &DeviceLink,
    input: R,
    mut prompt: W,
    cancel: CancellationToken,
) -> usize
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut sent = 0;

    write_prompt(&mut prompt, &format!("{BANNER}\n")).await;

    loop {
        write_prompt(&mut prompt, "> ").await;

        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        let cmd = line.trim();
        if cmd == QUIT {
            break;
        }

        if let Err(e) = cmd.parse::<Command>() {
            warn!("{}, sending anyway", e);
        }

        match link.send_line(cmd).await {
            Ok(()) => sent += 1,
            Err(e) => error!("{}", e),
        }
    }

    sent
}

async fn write_prompt<W: AsyncWrite + Unpin>(out: &mut W, text: &str) {
    // Prompt output is cosmetic; a closed terminal must not stop the probe.
    let _ = out.write_all(text.as_bytes()).await;
    let _ = out.flush().await;
}
