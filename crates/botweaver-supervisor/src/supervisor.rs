//! The process supervisor: registry of hosted bots and their lifecycle.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use botweaver_codegen::render::env::TOKEN_VAR;
use botweaver_common::models::BotConfig;
use tokio::process::Child;
use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::handle::{BotHandle, BotState, BotStatus, BotSummary, BulkStopReport};
use crate::logs::LogBuffer;
use crate::{process, staging};

/// How long output readers get to flush once a process has exited.
const DRAIN_LIMIT: Duration = Duration::from_secs(2);

/// Owns every hosted bot process. Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct ProcessSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    config: SupervisorConfig,
    bots: RwLock<HashMap<String, BotHandle>>,
    /// Signalled whenever a handle leaves the registry.
    drained: Notify,
    /// Staging dirs of exited bots still waiting out `cleanup_delay`.
    lingering: Mutex<HashSet<PathBuf>>,
    shutting_down: AtomicBool,
}

enum InstallOutcome {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl ProcessSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                bots: RwLock::new(HashMap::new()),
                drained: Notify::new(),
                lingering: Mutex::new(HashSet::new()),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.inner.config
    }

    /// Stage, install and launch `config`, returning the bot id.
    ///
    /// The handle is registered before any I/O, so a second start for the same
    /// id fails with [`SupervisorError::AlreadyRunning`] while this one is
    /// still staging or installing.
    #[instrument(skip_all, fields(bot = %config.slug()))]
    pub async fn start(&self, config: &BotConfig) -> Result<String, SupervisorError> {
        if !config.has_name() {
            return Err(SupervisorError::MissingName);
        }
        if !config.has_token() {
            return Err(SupervisorError::MissingToken);
        }

        let id = config.slug();
        let (run_id, logs, mut stop_rx) = {
            let mut bots = self.inner.bots.write().await;
            if bots.contains_key(&id) {
                return Err(SupervisorError::AlreadyRunning(id));
            }
            let (handle, stop_rx) = BotHandle::new(id.clone(), config, self.inner.config.log_capacity);
            let registered = (handle.run_id, handle.logs.clone(), stop_rx);
            bots.insert(id.clone(), handle);
            registered
        };
        info!(%run_id, "Starting bot");

        let dir = staging::run_dir(&self.inner.config.staging_root, &id);
        match self.launch(&id, run_id, config, &dir, &logs, &mut stop_rx).await {
            Ok((child, readers)) => {
                tokio::spawn(self.clone().watch_exit(id.clone(), run_id, child, readers, stop_rx, dir));
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "Bot start failed");
                self.remove_handle(&id, run_id).await;
                staging::remove(&dir).await;
                Err(e)
            }
        }
    }

    async fn launch(
        &self,
        id: &str,
        run_id: Uuid,
        config: &BotConfig,
        dir: &Path,
        logs: &LogBuffer,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> Result<(Child, Vec<JoinHandle<()>>), SupervisorError> {
        // The staged .env gets the placeholder; the token only travels via the child's env.
        let artifact = botweaver_codegen::generate(&config.redacted())?;

        staging::write_project(dir, &artifact).await.map_err(SupervisorError::Staging)?;
        logs.info("Project generated");

        if stop_pending(stop_rx) {
            return Err(SupervisorError::Cancelled);
        }
        self.update(id, run_id, |h| {
            h.transition(BotState::Installing);
        })
        .await;
        self.install(id, dir, logs, stop_rx).await?;

        if stop_pending(stop_rx) {
            return Err(SupervisorError::Cancelled);
        }
        let mut cmd = process::command(&self.inner.config.runtime_command, dir)
            .map_err(SupervisorError::Spawn)?;
        cmd.env(TOKEN_VAR, config.token.trim());
        let mut child = cmd.spawn().map_err(SupervisorError::Spawn)?;
        let readers = process::capture_output(&mut child, id, logs);

        let pid = child.id();
        self.update(id, run_id, |h| {
            h.pid = pid;
            h.transition(BotState::Running);
        })
        .await;
        logs.info("Bot process started");
        info!(?pid, "Bot running");

        Ok((child, readers))
    }

    async fn install(
        &self,
        id: &str,
        dir: &Path,
        logs: &LogBuffer,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> Result<(), SupervisorError> {
        let argv = &self.inner.config.install_command;
        if argv.is_empty() {
            return Ok(());
        }

        logs.info("Installing dependencies...");
        let mut child = process::command(argv, dir)
            .and_then(|mut cmd| cmd.spawn())
            .map_err(SupervisorError::InstallSpawn)?;
        let readers = process::capture_output(&mut child, id, logs);

        let limit = self.inner.config.install_timeout;
        let outcome = tokio::select! {
            waited = tokio::time::timeout(limit, child.wait()) => match waited {
                Ok(status) => InstallOutcome::Exited(status),
                Err(_) => InstallOutcome::TimedOut,
            },
            () = stop_requested(stop_rx) => InstallOutcome::Cancelled,
        };

        let result = match outcome {
            InstallOutcome::Exited(Ok(status)) if status.success() => Ok(()),
            InstallOutcome::Exited(Ok(status)) => {
                Err(SupervisorError::InstallFailed { code: status.code() })
            }
            InstallOutcome::Exited(Err(e)) => Err(SupervisorError::InstallSpawn(e)),
            InstallOutcome::TimedOut => {
                let _ = process::terminate(&mut child, self.inner.config.stop_grace).await;
                Err(SupervisorError::InstallTimeout(limit.as_secs()))
            }
            InstallOutcome::Cancelled => {
                let _ = process::terminate(&mut child, self.inner.config.stop_grace).await;
                Err(SupervisorError::Cancelled)
            }
        };
        process::drain(readers, DRAIN_LIMIT).await;

        match &result {
            Ok(()) => logs.info("Dependencies installed"),
            Err(e) => logs.error(e.to_string()),
        }
        result
    }

    /// Exit handler for a running bot; fires whether it was stopped or exited by itself.
    ///
    /// The handle leaves the registry as soon as the process is reaped. Output
    /// draining and staging cleanup happen afterwards.
    async fn watch_exit(
        self,
        id: String,
        run_id: Uuid,
        mut child: Child,
        readers: Vec<JoinHandle<()>>,
        mut stop_rx: watch::Receiver<bool>,
        dir: PathBuf,
    ) {
        let pid = child.id();
        let status = tokio::select! {
            status = child.wait() => {
                // Background children can outlive the leader and keep the pipes open.
                if let Some(pid) = pid {
                    process::kill_group(pid);
                }
                status
            }
            () = stop_requested(&mut stop_rx) => {
                debug!(bot = %id, "Terminating bot process");
                process::terminate(&mut child, self.inner.config.stop_grace).await
            }
        };

        let line = match &status {
            Ok(status) => format!("Bot process exited with {}", process::describe_exit(status)),
            Err(e) => format!("Failed to wait for bot process: {e}"),
        };
        info!(bot = %id, "{line}");

        self.inner.lingering.lock().await.insert(dir.clone());
        {
            let mut bots = self.inner.bots.write().await;
            if let Some(handle) = bots.get_mut(&id) {
                if handle.run_id == run_id {
                    handle.logs.info(line);
                    handle.transition(BotState::Exited);
                    bots.remove(&id);
                }
            }
        }
        self.inner.drained.notify_waiters();

        process::drain(readers, DRAIN_LIMIT).await;
        if !self.inner.shutting_down.load(Ordering::SeqCst) {
            tokio::time::sleep(self.inner.config.cleanup_delay).await;
        }
        staging::remove(&dir).await;
        self.inner.lingering.lock().await.remove(&dir);
    }

    /// Request a graceful stop. Returns once the request is recorded; the exit
    /// handler removes the handle when the process is gone.
    #[instrument(skip(self))]
    pub async fn stop(&self, id: &str) -> Result<(), SupervisorError> {
        let mut bots = self.inner.bots.write().await;
        let handle = bots
            .get_mut(id)
            .ok_or_else(|| SupervisorError::NotFound(id.to_string()))?;

        if handle.transition(BotState::Stopping) {
            handle.logs.info("Bot stopped by user");
            info!(state = %handle.state, "Stop requested");
        }
        handle.stop_tx.send_replace(true);
        Ok(())
    }

    /// Stop each id independently.
    pub async fn bulk_stop(&self, ids: &[String]) -> BulkStopReport {
        let mut report = BulkStopReport::default();
        for id in ids {
            match self.stop(id).await {
                Ok(()) => report.stopped.push(id.clone()),
                Err(e) => {
                    warn!(bot = %id, error = %e, "Bulk stop skipped bot");
                    report.failed.push(id.clone());
                }
            }
        }
        report
    }

    pub async fn status(&self, id: &str) -> BotStatus {
        let bots = self.inner.bots.read().await;
        match bots.get(id) {
            Some(handle) => handle.status(self.inner.config.status_tail),
            None => BotStatus::not_running(),
        }
    }

    /// Every registered bot, oldest first. Stale entries are pruned, not shown.
    pub async fn list(&self) -> Vec<BotSummary> {
        let mut bots = self.inner.bots.write().await;
        let stale: Vec<String> = bots
            .values()
            .filter(|h| h.is_stale())
            .map(|h| h.id.clone())
            .collect();
        for id in &stale {
            warn!(bot = %id, "Removing stale registry entry");
            bots.remove(id);
        }

        let mut summaries: Vec<BotSummary> = bots.values().map(BotHandle::summary).collect();
        summaries.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    pub async fn running_count(&self) -> usize {
        self.inner.bots.read().await.len()
    }

    /// Stop everything, wait (bounded) for the registry to drain, then remove
    /// every staging dir still waiting for its delayed cleanup.
    pub async fn shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);

        let ids: Vec<String> = self.inner.bots.read().await.keys().cloned().collect();
        if !ids.is_empty() {
            info!(count = ids.len(), "Stopping hosted bots");
            self.bulk_stop(&ids).await;
            self.wait_drained().await;
        }

        let lingering: Vec<PathBuf> = self.inner.lingering.lock().await.drain().collect();
        for dir in &lingering {
            staging::remove(dir).await;
        }
        if !lingering.is_empty() {
            debug!(count = lingering.len(), "Removed staging dirs of exited bots");
        }
    }

    async fn wait_drained(&self) {
        let deadline = tokio::time::Instant::now() + self.inner.config.stop_grace + DRAIN_LIMIT * 2;
        loop {
            let drained = self.inner.drained.notified();
            let remaining = self.inner.bots.read().await.len();
            if remaining == 0 {
                break;
            }
            if tokio::time::timeout_at(deadline, drained).await.is_err() {
                warn!(remaining, "Hosted bots still registered at shutdown deadline");
                break;
            }
        }
    }

    async fn update(&self, id: &str, run_id: Uuid, f: impl FnOnce(&mut BotHandle)) {
        let mut bots = self.inner.bots.write().await;
        if let Some(handle) = bots.get_mut(id) {
            if handle.run_id == run_id {
                f(handle);
            }
        }
    }

    async fn remove_handle(&self, id: &str, run_id: Uuid) {
        {
            let mut bots = self.inner.bots.write().await;
            if bots.get(id).is_some_and(|h| h.run_id == run_id) {
                bots.remove(id);
            }
        }
        self.inner.drained.notify_waiters();
    }
}

fn stop_pending(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow()
}

/// Resolves once a stop has been requested; never resolves if the handle is gone.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
