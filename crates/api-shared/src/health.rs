use crate::types::HealthRes;

/// Simple health service shared by the REST API and the main binary.
///
/// This service provides a standardised way to check the health status of the dashboard.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// Liveness only. The chain connector is not probed.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "AgentDNA dashboard is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_alive() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(res.message.contains("alive"));
    }
}
