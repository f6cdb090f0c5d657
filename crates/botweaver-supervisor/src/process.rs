//! Child process plumbing: spawning in its own process group, capturing
//! output line by line, and terminating with escalation.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::logs::{LogBuffer, LogKind};

/// Build a command from `argv` running in `cwd` with piped output.
pub(crate) fn command(argv: &[String], cwd: &Path) -> io::Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so the whole tree (npm -> node, shells) can be signalled.
    #[cfg(unix)]
    cmd.process_group(0);

    Ok(cmd)
}

/// Forward stdout (as info) and stderr (as error) into `logs` and tracing.
pub(crate) fn capture_output(child: &mut Child, bot_id: &str, logs: &LogBuffer) -> Vec<JoinHandle<()>> {
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(tokio::spawn(forward_lines(stdout, bot_id.to_string(), logs.clone(), LogKind::Info)));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(tokio::spawn(forward_lines(stderr, bot_id.to_string(), logs.clone(), LogKind::Error)));
    }
    readers
}

async fn forward_lines<R>(reader: R, bot_id: String, logs: LogBuffer, kind: LogKind)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                match kind {
                    LogKind::Info => info!(bot = %bot_id, "{line}"),
                    LogKind::Error => error!(bot = %bot_id, "{line}"),
                }
                logs.push(kind, line);
            }
            Ok(None) => break,
            Err(e) => {
                debug!(bot = %bot_id, error = %e, "Output stream closed with error");
                break;
            }
        }
    }
}

/// Wait (bounded) for output readers to drain after the process exits.
pub(crate) async fn drain(readers: Vec<JoinHandle<()>>, limit: Duration) {
    for reader in readers {
        if tokio::time::timeout(limit, reader).await.is_err() {
            debug!("Output reader still busy after exit; detaching");
        }
    }
}

/// SIGTERM the process group, then SIGKILL once `grace` has passed.
#[cfg(unix)]
pub(crate) async fn terminate(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        let pgid = Pid::from_raw(pid as i32);
        if let Err(e) = killpg(pgid, Signal::SIGTERM) {
            debug!(pid, error = %e, "SIGTERM failed");
        }

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => return status,
            Err(_) => {
                warn!(pid, grace_secs = grace.as_secs(), "Process ignored SIGTERM; sending SIGKILL");
                if let Err(e) = killpg(pgid, Signal::SIGKILL) {
                    debug!(pid, error = %e, "SIGKILL failed");
                }
            }
        }
    }
    child.wait().await
}

/// SIGKILL whatever is left in the group led by `pid`.
#[cfg(unix)]
pub(crate) fn kill_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => debug!(pid, "Killed leftover processes in group"),
        Err(Errno::ESRCH) => {}
        Err(e) => debug!(pid, error = %e, "Group SIGKILL failed"),
    }
}

#[cfg(not(unix))]
pub(crate) fn kill_group(_pid: u32) {}

#[cfg(not(unix))]
pub(crate) async fn terminate(child: &mut Child, _grace: Duration) -> io::Result<ExitStatus> {
    child.kill().await?;
    child.wait().await
}

/// `code N` or `signal N` for log lines.
pub(crate) fn describe_exit(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal {signal}");
        }
    }
    "unknown status".to_string()
}
