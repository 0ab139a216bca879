use crate::shared::error::CollectionError;
use log::debug;
use std::time::Duration;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

/// An OS rate counter. Each call reports the rate observed since the
/// previous call, so the first value after opening carries no meaning.
pub trait RateCounter: Send {
    fn next_value(&mut self) -> Result<f32, CollectionError>;
}

/// Hands out counter handles. Dropping a handle releases it.
pub trait CounterProvider: Send + Sync {
    fn aggregate(&self) -> Result<Box<dyn RateCounter>, CollectionError>;
    fn core(&self, index: usize) -> Result<Box<dyn RateCounter>, CollectionError>;

    /// Shortest gap between two reads that yields a fresh value.
    fn minimum_interval(&self) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
enum CounterTarget {
    Total,
    Core(usize),
}

/// Counter backed by its own `sysinfo::System`. Nothing is read on open,
/// so the priming read is the first refresh this `System` sees.
pub struct SysinfoCounter {
    sys: System,
    target: CounterTarget,
}

impl SysinfoCounter {
    fn open(target: CounterTarget, cpu_count: usize) -> Result<Self, CollectionError> {
        if cpu_count == 0 {
            return Err(CollectionError::CounterUnavailable(
                "no CPU information available".to_string(),
            ));
        }
        if let CounterTarget::Core(index) = target {
            if index >= cpu_count {
                return Err(CollectionError::CounterUnavailable(format!(
                    "core {} not present ({} cores visible)",
                    index, cpu_count
                )));
            }
        }

        debug!("Opened CPU counter {:?}", target);
        Ok(Self {
            sys: System::new(),
            target,
        })
    }
}

impl RateCounter for SysinfoCounter {
    fn next_value(&mut self) -> Result<f32, CollectionError> {
        self.sys.refresh_cpu_usage();
        match self.target {
            CounterTarget::Total => Ok(self.sys.global_cpu_usage()),
            CounterTarget::Core(index) => self
                .sys
                .cpus()
                .get(index)
                .map(|cpu| cpu.cpu_usage())
                .ok_or_else(|| CollectionError::CounterUnavailable(format!("core {} disappeared", index))),
        }
    }
}

impl Drop for SysinfoCounter {
    fn drop(&mut self) {
        debug!("Released CPU counter {:?}", self.target);
    }
}

fn visible_cpu_count() -> usize {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    sys.cpus().len()
}

#[derive(Debug, Clone, Copy)]
pub struct SysinfoCounterProvider {
    cpu_count: usize,
}

impl SysinfoCounterProvider {
    pub fn new() -> Self {
        Self {
            cpu_count: visible_cpu_count(),
        }
    }
}

impl Default for SysinfoCounterProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterProvider for SysinfoCounterProvider {
    fn aggregate(&self) -> Result<Box<dyn RateCounter>, CollectionError> {
        Ok(Box::new(SysinfoCounter::open(CounterTarget::Total, self.cpu_count)?))
    }

    fn core(&self, index: usize) -> Result<Box<dyn RateCounter>, CollectionError> {
        Ok(Box::new(SysinfoCounter::open(CounterTarget::Core(index), self.cpu_count)?))
    }

    // sysinfo ignores CPU refreshes that come sooner than this after the previous one.
    fn minimum_interval(&self) -> Duration {
        MINIMUM_CPU_UPDATE_INTERVAL
    }
}

/// Number of logical processors visible to this process.
pub fn logical_processor_count() -> usize {
    match visible_cpu_count() {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        count => count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cpu::CpuSampler;
    use crate::shared::config::DEFAULT_SETTLE_INTERVAL;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn processor_count_is_positive() {
        assert!(logical_processor_count() >= 1);
    }

    #[test]
    fn core_beyond_processor_count_is_unavailable() {
        let provider = SysinfoCounterProvider::new();
        let result = provider.core(logical_processor_count() + 64);
        assert!(matches!(result, Err(CollectionError::CounterUnavailable(_))));
    }

    #[test]
    fn sysinfo_provider_reports_refresh_floor() {
        assert_eq!(SysinfoCounterProvider::new().minimum_interval(), MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[tokio::test]
    async fn busy_cores_read_as_busy() {
        let cores = logical_processor_count();
        let stop = Arc::new(AtomicBool::new(false));
        let spinners: Vec<_> = (0..cores)
            .map(|_| {
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    let mut n: u64 = 0;
                    while !stop.load(Ordering::Relaxed) {
                        n = std::hint::black_box(n.wrapping_add(1));
                    }
                })
            })
            .collect();
        thread::sleep(Duration::from_millis(50));

        let sampler = CpuSampler::new(Arc::new(SysinfoCounterProvider::new()), cores, DEFAULT_SETTLE_INTERVAL);
        let reading = sampler.sample().await;

        stop.store(true, Ordering::Relaxed);
        for spinner in spinners {
            spinner.join().unwrap();
        }

        let reading = reading.unwrap();
        assert!(reading.total_usage > 50.0, "total {}", reading.total_usage);
        let available: Vec<f64> = reading.cores.iter().filter(|c| c.is_available()).map(|c| c.usage).collect();
        assert!(!available.is_empty());
        let mean = available.iter().sum::<f64>() / available.len() as f64;
        assert!(mean > 50.0, "per-core usage {:?}", available);
    }
}
