//! tripflow entrypoint: trip events flow from the simulator through the bus
//! into the sliding-window aggregator, whose closed windows land in the
//! append-only store; the foreground loop augments a feature vector with the
//! latest count and, when an endpoint is configured, requests a prediction.

use tripflow::{
    bus::EventBus,
    config::PipelineConfig,
    features::{AugmentError, FeatureAugmenter, FeatureVector},
    logging::{LogEvent, StructuredLogger},
    predict::PredictionClient,
    source::TripGenerator,
    store::AggregateStore,
    window::SlidingWindowAggregator,
};

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

static STOP: AtomicBool = AtomicBool::new(false);

fn run_one_cycle(
    augmenter: &FeatureAugmenter,
    client: Option<&PredictionClient>,
    config: &PipelineConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut features = FeatureVector::from_map(config.predictor.base_features.clone());

    let record = match augmenter.augment(&mut features) {
        Ok(record) => {
            info!(
                window_end = %record.window_end,
                trip_count = record.count,
                feature_key = augmenter.feature_key(),
                "features augmented"
            );
            record
        }
        Err(e @ AugmentError::NoAggregate) => {
            // Fatal for this request only; the next cycle retries.
            warn!(error = %e, "prediction request rejected");
            return Ok(());
        }
        Err(e) => return Err(Box::new(e)),
    };

    if let Some(c) = client {
        match c.predict(&features) {
            Ok(p) => {
                // One ndjson result line per prediction, outside the tracing
                // stream, for downstream ingestion.
                let window_end = record.window_end.to_rfc3339();
                StructuredLogger::emit_json(
                    &LogEvent {
                        ts: Utc::now().to_rfc3339(),
                        level: "info",
                        target: "tripflow",
                        message: "prediction received",
                        window_end: Some(&window_end),
                        trip_count: Some(record.count),
                        prediction: Some(p),
                        error: None,
                    },
                    &mut std::io::stdout(),
                );
            }
            Err(e) => warn!(error = %e, "prediction request failed"),
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("TRIPFLOW_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = PipelineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(data_dir = ?config.data_dir, topic = %config.bus.topic, "tripflow starting");

    std::fs::create_dir_all(&config.data_dir)?;
    let store_path = config.data_dir.join("aggregates.db");
    let store = Arc::new(AggregateStore::open(&store_path, &config.store.table)?);
    info!(rows = store.len()?, "aggregate store opened");

    let bus = Arc::new(EventBus::new(&config.bus));
    // Built before the tasks spawn so bad window geometry fails at startup.
    let mut aggregator = SlidingWindowAggregator::new(&config.window)?;
    let generator = TripGenerator::new(config.source.clone());
    let augmenter = FeatureAugmenter::new(store.clone(), config.predictor.feature_key.clone());
    let client = PredictionClient::new(&config.predictor);

    let _ = ctrlc::set_handler(|| {
        STOP.store(true, Ordering::Relaxed);
    });

    let rt = tokio::runtime::Runtime::new()?;

    // Subscribe before the generator starts: the broadcast channel only
    // delivers to receivers that exist at send time, so spawning the
    // producer first would lose the opening batch outright.
    let mut rx = bus.subscribe();
    let agg_store = store.clone();
    let agg_handle = rt.spawn(async move {
        loop {
            if STOP.load(Ordering::Relaxed) {
                break;
            }
            match tokio::time::timeout(Duration::from_millis(250), rx.recv()).await {
                Ok(Ok(event)) => {
                    for record in aggregator.observe(&event) {
                        // Fire-and-forget append: log and move on, no retry.
                        match agg_store.append(&record) {
                            Ok(()) => info!(
                                window_end = %record.window_end,
                                trip_count = record.count,
                                "window closed"
                            ),
                            Err(e) => warn!(error = %e, "aggregate append failed"),
                        }
                    }
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "aggregator lagged behind the bus");
                }
                Ok(Err(RecvError::Closed)) => break,
                Err(_) => {} // idle; check STOP again
            }
        }
        for record in aggregator.flush() {
            if let Err(e) = agg_store.append(&record) {
                warn!(error = %e, "aggregate append failed during flush");
            }
        }
        info!(
            dropped_late = aggregator.dropped_late(),
            "aggregator stopped"
        );
    });

    let gen_bus = bus.clone();
    let batch_interval = config.source.batch_interval_secs.max(1);
    let gen_handle = rt.spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(batch_interval));
        while !STOP.load(Ordering::Relaxed) {
            tick.tick().await;
            let batch = generator.next_batch(Utc::now());
            debug!(count = batch.len(), topic = %gen_bus.topic(), "batch published");
            for event in batch {
                gen_bus.publish(event);
            }
        }
    });

    let interval_secs = config.predictor.interval_secs;
    let run_daemon = interval_secs > 0;

    if run_daemon {
        info!(interval_secs, "daemon mode (Ctrl+C to stop)");
        let mut cycle: u64 = 0;
        while !STOP.load(Ordering::Relaxed) {
            for _ in 0..(interval_secs as u32) {
                if STOP.load(Ordering::Relaxed) {
                    break;
                }
                std::thread::sleep(Duration::from_secs(1));
            }
            if STOP.load(Ordering::Relaxed) {
                break;
            }
            cycle += 1;
            if let Err(e) = run_one_cycle(&augmenter, client.as_ref(), &config) {
                warn!(cycle, error = %e, "cycle failed");
            }
        }
        info!("tripflow stopping");
    } else {
        run_one_cycle(&augmenter, client.as_ref(), &config)?;
        info!("tripflow cycle complete");
    }

    STOP.store(true, Ordering::Relaxed);
    rt.block_on(async {
        let _ = tokio::time::timeout(Duration::from_secs(5), async {
            let _ = gen_handle.await;
            let _ = agg_handle.await;
        })
        .await;
    });

    Ok(())
}
