use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{HttpResponse, RequestTemplate, Variables};
use crate::error::TransportError;

/// Performs a single HTTP call.
///
/// Implementations report network, DNS and timeout failures as
/// `TransportError`; any response that arrived, whatever its status, is `Ok`.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(
        &self,
        request: &RequestTemplate,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Turns a case's request template plus suite variables into the request
/// that is actually sent.
pub trait RequestResolver: Send + Sync {
    fn resolve<'req>(
        &self,
        request: &'req RequestTemplate,
        variables: &Variables,
    ) -> Cow<'req, RequestTemplate>;
}

/// Sends templates unchanged; substitution happens before the runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimResolver;

impl RequestResolver for VerbatimResolver {
    fn resolve<'req>(
        &self,
        request: &'req RequestTemplate,
        _variables: &Variables,
    ) -> Cow<'req, RequestTemplate> {
        Cow::Borrowed(request)
    }
}
