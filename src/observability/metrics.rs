use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub requests_created_total: IntCounter,
    pub claims_total: IntCounterVec,
    pub handoffs_total: IntCounterVec,
    pub open_requests: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_created_total = IntCounter::new(
            "requests_created_total",
            "Total delivery requests created",
        )
        .expect("valid requests_created_total metric");

        let claims_total = IntCounterVec::new(
            Opts::new("claims_total", "Claim attempts by outcome"),
            &["outcome"],
        )
        .expect("valid claims_total metric");

        let handoffs_total = IntCounterVec::new(
            Opts::new("handoffs_total", "Completion attempts by outcome"),
            &["outcome"],
        )
        .expect("valid handoffs_total metric");

        let open_requests = IntGauge::new(
            "open_requests",
            "Requests currently pending or in progress",
        )
        .expect("valid open_requests metric");

        registry
            .register(Box::new(requests_created_total.clone()))
            .expect("register requests_created_total");
        registry
            .register(Box::new(claims_total.clone()))
            .expect("register claims_total");
        registry
            .register(Box::new(handoffs_total.clone()))
            .expect("register handoffs_total");
        registry
            .register(Box::new(open_requests.clone()))
            .expect("register open_requests");

        Self {
            registry,
            requests_created_total,
            claims_total,
            handoffs_total,
            open_requests,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
