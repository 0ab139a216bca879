use crate::features::cpu::counters::{CounterProvider, RateCounter};
use crate::features::cpu::models::{CoreUsage, CpuReading};
use crate::shared::error::CollectionError;
use crate::shared::traits::AsyncDataCollector;
use crate::shared::units::round2;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

type CounterSlot = Option<Box<dyn RateCounter>>;
type SlotRead = (CounterSlot, Option<Result<f32, CollectionError>>);

/// Samples aggregate and per-core usage: acquire, prime, settle, read.
pub struct CpuSampler {
    provider: Arc<dyn CounterProvider>,
    processor_count: usize,
    settle_interval: Duration,
}

/// Handles acquired, nothing read yet. A `None` slot is a core whose
/// counter could not be opened.
pub struct AcquiredCounters {
    total: Box<dyn RateCounter>,
    cores: Vec<CounterSlot>,
}

/// Baseline read done on every handle.
pub struct PrimedCounters {
    total: Box<dyn RateCounter>,
    cores: Vec<CounterSlot>,
}

/// Settle interval elapsed; the next read is meaningful.
pub struct SettledCounters {
    total: Box<dyn RateCounter>,
    cores: Vec<CounterSlot>,
}

impl CpuSampler {
    pub fn new(provider: Arc<dyn CounterProvider>, processor_count: usize, settle_interval: Duration) -> Self {
        Self {
            provider,
            processor_count,
            settle_interval,
        }
    }

    pub async fn acquire(&self) -> Result<AcquiredCounters, CollectionError> {
        let provider = Arc::clone(&self.provider);
        let processor_count = self.processor_count;

        task::spawn_blocking(move || -> Result<AcquiredCounters, CollectionError> {
            let total = provider.aggregate()?;
            let cores = (0..processor_count)
                .map(|index| match provider.core(index) {
                    Ok(counter) => Some(counter),
                    Err(e) => {
                        warn!("CPU counter for core {} unavailable: {}", index, e);
                        None
                    }
                })
                .collect();
            Ok(AcquiredCounters { total, cores })
        })
        .await?
    }

    /// Settle interval actually waited: the configured one, raised to the
    /// provider's minimum when it is shorter.
    pub fn effective_settle_interval(&self) -> Duration {
        let minimum = self.provider.minimum_interval();
        if self.settle_interval < minimum {
            debug!(
                "Settle interval {:?} is below the counter minimum, waiting {:?}",
                self.settle_interval, minimum
            );
            minimum
        } else {
            self.settle_interval
        }
    }

    pub async fn sample(&self) -> Result<CpuReading, CollectionError> {
        let settle_interval = self.effective_settle_interval();
        let reading = self
            .acquire()
            .await?
            .prime()
            .await?
            .settle(settle_interval)
            .await
            .read()
            .await?;

        info!(
            "Sampled CPU usage {}% across {} cores",
            reading.total_usage,
            reading.cores.len()
        );
        Ok(reading)
    }
}

impl AcquiredCounters {
    /// Takes the discarded baseline read. Cores that fail here are released
    /// and later reported as unavailable.
    pub async fn prime(self) -> Result<PrimedCounters, CollectionError> {
        let ((total, total_outcome), cores) = tokio::join!(read_counter(self.total), read_slots(self.cores));

        let cores = cores
            .into_iter()
            .enumerate()
            .map(|(index, (slot, outcome))| match outcome {
                Some(Err(e)) => {
                    warn!("Priming read for core {} failed: {}", index, e);
                    None
                }
                _ => slot,
            })
            .collect();

        total_outcome?;
        let total = total.ok_or_else(|| CollectionError::CounterUnavailable("aggregate counter lost".to_string()))?;

        debug!("CPU counters primed");
        Ok(PrimedCounters { total, cores })
    }
}

impl PrimedCounters {
    pub async fn settle(self, interval: Duration) -> SettledCounters {
        tokio::time::sleep(interval).await;
        SettledCounters {
            total: self.total,
            cores: self.cores,
        }
    }
}

impl SettledCounters {
    /// Final read. All handles are released when this returns.
    pub async fn read(self) -> Result<CpuReading, CollectionError> {
        let ((_total, total_outcome), cores) = tokio::join!(read_counter(self.total), read_slots(self.cores));

        let cores = cores
            .into_iter()
            .enumerate()
            .map(|(index, (_slot, outcome))| match outcome {
                Some(Ok(value)) => CoreUsage {
                    core_id: index,
                    usage: normalize_usage(value),
                },
                Some(Err(e)) => {
                    warn!("Reading core {} failed: {}", index, e);
                    CoreUsage::unavailable(index)
                }
                None => CoreUsage::unavailable(index),
            })
            .collect();

        Ok(CpuReading {
            total_usage: normalize_usage(total_outcome?),
            cores,
        })
    }
}

/// Reads one handle on a blocking thread and hands it back. If the read
/// panics the handle is dropped with the task.
async fn read_counter(counter: Box<dyn RateCounter>) -> (CounterSlot, Result<f32, CollectionError>) {
    let joined = task::spawn_blocking(move || {
        let mut counter = counter;
        let value = counter.next_value();
        (counter, value)
    })
    .await;

    match joined {
        Ok((counter, value)) => (Some(counter), value),
        Err(e) => (None, Err(e.into())),
    }
}

async fn read_slots(slots: Vec<CounterSlot>) -> Vec<SlotRead> {
    join_all(slots.into_iter().map(|slot| async move {
        match slot {
            Some(counter) => {
                let (counter, value) = read_counter(counter).await;
                (counter, Some(value))
            }
            None => (None, None),
        }
    }))
    .await
}

fn normalize_usage(value: f32) -> f64 {
    let value = f64::from(value);
    if !value.is_finite() {
        return 0.0;
    }
    round2(value.clamp(0.0, 100.0))
}

#[async_trait::async_trait]
impl AsyncDataCollector<CpuReading> for CpuSampler {
    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn collect(&self) -> Result<CpuReading, CollectionError> {
        self.sample().await
    }
}
