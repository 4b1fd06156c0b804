//! Turns slow requests, panics and layer failures into the site's error page.

use std::any::Any;
use std::future::ready;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const GENERIC_FAILURE: &str = "Something went wrong on our side";

/// Request deadline applied in front of every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a page may take before the visitor gets the error page.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(DEFAULT_TIMEOUT_SECS)
    }
}

impl RecoveryConfig {
    pub fn with_timeout_secs(request_timeout: u64) -> Self {
        Self { request_timeout }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Adds the recovery stack to a [`Router`].
pub trait RouterRecoveryExt<S> {
    /// Outermost layer of the site: deadline, panic capture, error page.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    /// [`with_recovery`](Self::with_recovery) with a 30 second deadline.
    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        // HandleErrorLayer must wrap the timeout so `Elapsed` becomes a page.
        let stack = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(render_layer_error))
            .layer(CatchPanicLayer::custom(render_panic))
            .layer(TimeoutLayer::new(config.request_timeout()));

        self.layer(stack)
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

fn render_layer_error(err: tower::BoxError) -> BoxFuture<'static, Response> {
    let page = if err.is::<Elapsed>() {
        tracing::error!(
            target: tracing_targets::RECOVERY_ERROR,
            "page exceeded the request deadline"
        );
        ErrorKind::InternalServerError
            .with_message("The page took too long to load")
            .with_context("request deadline")
    } else {
        tracing::error!(
            target: tracing_targets::RECOVERY_ERROR,
            error = %err,
            "middleware layer failed"
        );
        ErrorKind::InternalServerError
            .with_message(GENERIC_FAILURE)
            .with_context(err.to_string())
    };

    ready(page.into_response()).boxed()
}

fn render_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    // Handlers may panic with a ready-made page.
    if let Some(page) = payload.downcast_ref::<Error<'static>>() {
        tracing::error!(
            target: tracing_targets::RECOVERY_PANIC,
            error = %page,
            "handler panicked with an error page"
        );
        return page.clone().into_response();
    }

    let detail = match (
        payload.downcast_ref::<String>(),
        payload.downcast_ref::<&'static str>(),
    ) {
        (Some(text), _) => text.as_str(),
        (None, Some(text)) => text,
        (None, None) => "non-string payload",
    };
    tracing::error!(
        target: tracing_targets::RECOVERY_PANIC,
        detail,
        "handler panicked"
    );

    ErrorKind::InternalServerError
        .with_message(GENERIC_FAILURE)
        .into_response()
}
