use crate::metrics::{self, MetricsSetupError};
use crate::service::TopicService;
use axum::extract::FromRef;
use error_stack::Report;
use metrics_exporter_prometheus::PrometheusHandle;
use topics_core::TopicEngine;

#[derive(Clone)]
pub struct TopicAppState<T: TopicEngine> {
    pub service: TopicService<T>,
    pub metrics: Option<PrometheusHandle>,
}

impl<T: TopicEngine> TopicAppState<T> {
    /// Installs the global Prometheus recorder, so this can only succeed once per process.
    pub fn new_with_metrics(engine: T) -> Result<Self, Report<MetricsSetupError>> {
        Ok(Self {
            service: TopicService::new(engine),
            metrics: Some(metrics::setup_recorder()?),
        })
    }

    pub fn new_without_metrics(engine: T) -> Self {
        Self {
            service: TopicService::new(engine),
            metrics: None,
        }
    }
}

impl<T: TopicEngine + Clone> FromRef<TopicAppState<T>> for TopicService<T> {
    fn from_ref(input: &TopicAppState<T>) -> Self {
        input.service.clone()
    }
}
