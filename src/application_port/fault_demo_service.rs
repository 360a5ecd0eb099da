use crate::application_port::ServiceError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    #[serde(rename = "Worked")]
    pub worked: bool,
}

/// Stand-in for an unreliable dependency.
#[async_trait::async_trait]
pub trait FaultDemoService: Send + Sync {
    async fn run(&self) -> Result<DemoReport, ServiceError>;
}
