use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

type Process = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type Closer = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Cancels the token on SIGTERM/SIGINT. Spawned before any long-running
/// startup work so shutdown can interrupt even the connector's retry loop.
pub fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Failed to listen for shutdown signals");
            return;
        }
        info!("Shutdown signal received");
        token.cancel();
    });
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Runs named long-lived processes concurrently until one fails or the
/// shutdown token is cancelled, then runs closers within a bounded timeout.
pub struct Supervisor {
    processes: Vec<(String, Process)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    token: CancellationToken,
}

impl Supervisor {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            token,
        }
    }

    pub fn with_process<F, Fut>(mut self, name: &str, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let future = process(self.token.clone());
        self.processes.push((name.to_string(), Box::pin(future)));
        self
    }

    pub fn with_closer<Fut>(mut self, closer: Fut) -> Self
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.closers.push(Box::pin(closer));
        self
    }

    pub async fn run(self) {
        let mut set = JoinSet::new();
        for (name, future) in self.processes {
            set.spawn(async move {
                let result = future.await;
                (name, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    info!(process = %name, "Process completed");
                }
                Ok((name, Err(e))) => {
                    error!(process = %name, error = %e, "Process failed, shutting down");
                    self.token.cancel();
                }
                Err(e) => {
                    error!(error = %e, "Process panicked, shutting down");
                    self.token.cancel();
                }
            }
        }

        let closers = async {
            for closer in self.closers {
                if let Err(e) = closer.await {
                    error!(error = %e, "Closer failed");
                }
            }
        };
        if tokio::time::timeout(self.closer_timeout, closers)
            .await
            .is_err()
        {
            error!("Closers timed out");
        }

        info!("Supervisor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn a_failing_process_cancels_the_others() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let observed = cancelled.clone();

        Supervisor::new(CancellationToken::new())
            .with_process("failing", |_ctx| async { anyhow::bail!("boom") })
            .with_process("waiting", move |ctx| async move {
                ctx.cancelled().await;
                observed.store(true, Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn closers_run_after_processes_stop() {
        let closed = Arc::new(AtomicBool::new(false));
        let observed = closed.clone();

        let token = CancellationToken::new();
        token.cancel();
        Supervisor::new(token)
            .with_process("noop", |ctx| async move {
                ctx.cancelled().await;
                Ok(())
            })
            .with_closer(async move {
                observed.store(true, Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(closed.load(Ordering::SeqCst));
    }
}
