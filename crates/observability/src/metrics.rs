//! Relay metric recorders
//!
//! Thin wrappers over the `metrics` facade so metric names and labels live
//! in one place. Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};

/// Record a payload taken from the source
pub fn record_record_received() {
    counter!("tsdb_relay_records_received_total").increment(1);
}

/// Record a payload discarded by a route's sampler
pub fn record_sampled_out(route: &str) {
    counter!(
        "tsdb_relay_records_sampled_out_total",
        "route" => route.to_string()
    )
    .increment(1);
}

/// Record the outcome of one delivery to a destination
pub fn record_delivery(route: &str, destination: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "tsdb_relay_deliveries_total",
        "route" => route.to_string(),
        "destination" => destination.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record how many endpoints a delivery touched
pub fn record_delivery_attempts(destination: &str, attempts: u32) {
    histogram!(
        "tsdb_relay_delivery_attempts",
        "destination" => destination.to_string()
    )
    .record(f64::from(attempts));
}

/// Record wall time of one delivery
pub fn record_delivery_latency_ms(destination: &str, latency_ms: f64) {
    histogram!(
        "tsdb_relay_delivery_latency_ms",
        "destination" => destination.to_string()
    )
    .record(latency_ms);
}

/// Record an error reported by the message source
pub fn record_source_error(fatal: bool) {
    counter!(
        "tsdb_relay_source_errors_total",
        "fatal" => if fatal { "true" } else { "false" }
    )
    .increment(1);
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
