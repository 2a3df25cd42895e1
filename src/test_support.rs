//! Scripted request executor and runtime helpers shared by unit tests.
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{HttpResponse, RequestTemplate};
use crate::error::TransportError;
use crate::http::RequestExecutor;

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Like [`run_async_test`] with the tokio clock paused, so sleeps and
/// timeouts auto-advance instantly and deterministically.
pub(crate) fn run_paused_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

#[derive(Debug, Clone)]
pub(crate) enum Step {
    Respond(u16, &'static str),
    Fail(TransportError),
    Hang,
}

/// Answers from, in order: the per-URL route, the script queue, the fallback.
pub(crate) struct ScriptedExecutor {
    latency: Duration,
    fallback: Step,
    routes: HashMap<String, Step>,
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedExecutor {
    pub(crate) fn new(fallback: Step) -> Self {
        Self {
            latency: Duration::ZERO,
            fallback,
            routes: HashMap::new(),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(crate) fn status(code: u16) -> Self {
        Self::new(Step::Respond(code, ""))
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn route(mut self, url: &str, step: Step) -> Self {
        self.routes.insert(url.to_owned(), step);
        self
    }

    pub(crate) fn script(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(steps);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn next_step(&self, url: &str) -> Step {
        if let Some(step) = self.routes.get(url) {
            return step.clone();
        }
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

struct FlightGuard<'exec>(&'exec AtomicUsize);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        request: &RequestTemplate,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = FlightGuard(&self.in_flight);

        let step = self.next_step(&request.url);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match step {
            Step::Respond(status_code, body) => Ok(HttpResponse {
                status_code,
                status_text: String::new(),
                headers: BTreeMap::from([(
                    "content-type".to_owned(),
                    "application/json".to_owned(),
                )]),
                body: body.to_owned(),
                duration: self.latency,
            }),
            Step::Fail(err) => Err(err),
            Step::Hang => std::future::pending().await,
        }
    }
}
