use log::{debug, info};
use tokio::sync::{mpsc, oneshot};

use super::Engine;
use crate::error::EngineError;

type Job<E> = Box<dyn FnOnce(&mut E) + Send + 'static>;

/// Single background task that owns the engine and serializes every mutation.
///
/// Jobs run in submission order; after each job the engine is iterated so
/// queued notifications reach listeners on this same task.
pub struct CoreContext<E> {
    jobs: mpsc::UnboundedSender<Job<E>>,
}

impl<E> Clone for CoreContext<E> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
        }
    }
}

impl<E: Engine + 'static> CoreContext<E> {
    /// Spawn the core task on the current tokio runtime.
    pub fn start(mut engine: E) -> Self {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job<E>>();

        tokio::spawn(async move {
            info!("Core context started");
            while let Some(job) = rx.recv().await {
                job(&mut engine);
                engine.iterate();
            }
            info!("Core context stopped");
        });

        Self { jobs }
    }

    /// Queue a job without waiting for it.
    pub fn post<F>(&self, job: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        self.jobs
            .send(Box::new(job))
            .map_err(|_| EngineError::CoreStopped)
    }

    /// Queue a job and wait for its result.
    pub async fn call<F, R>(&self, job: F) -> Result<R, EngineError>
    where
        F: FnOnce(&mut E) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(move |engine| {
            if tx.send(job(engine)).is_err() {
                debug!("Caller went away before core job completed");
            }
        })?;
        rx.await.map_err(|_| EngineError::CoreStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.jobs.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AuthInfo, LocalEngine};

    #[tokio::test]
    async fn jobs_run_in_order_on_one_task() {
        let core = CoreContext::start(LocalEngine::default());

        for name in ["first", "second", "third"] {
            core.post(move |engine: &mut LocalEngine| {
                engine.add_auth_info(AuthInfo::new(name, None, None, None, "example.org"));
            })
            .unwrap();
        }

        let names = core
            .call(|engine| {
                engine
                    .auth_infos()
                    .into_iter()
                    .map(|info| info.username)
                    .collect::<Vec<_>>()
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert!(core.is_running());
    }
}
