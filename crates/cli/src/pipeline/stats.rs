//! Run statistics.

use std::time::Duration;

use dispatcher::DispatchSummary;

/// Statistics from a relay run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Dispatcher report
    pub summary: DispatchSummary,

    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    /// Records consumed per second
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.summary.records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Deliveries that failed, as a percentage of attempted deliveries
    pub fn failure_rate(&self) -> f64 {
        let (delivered, failed) = self
            .summary
            .routes
            .iter()
            .fold((0, 0), |(d, f), (_, m)| (d + m.delivered, f + m.failed));
        let total = delivered + failed;
        if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Relay Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Stopped: {:?}", self.summary.stop_reason);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records: {}", self.summary.records);
        println!("   ├─ Rate: {:.2}/s", self.records_per_second());
        println!("   ├─ Source errors: {}", self.summary.source_errors);
        println!("   ├─ Failed deliveries: {:.2}%", self.failure_rate());
        println!("   └─ Delivery latency (ms): {}", self.summary.delivery_latency_ms);

        println!("\n📈 Routes");
        for (name, m) in &self.summary.routes {
            println!(
                "   ├─ {}: seen={} forwarded={} sampled_out={} delivered={} failed={}",
                name, m.seen, m.forwarded, m.sampled_out, m.delivered, m.failed
            );
        }

        println!();
    }
}
