//! statistics-service binary.
//!
//! Wires configuration, tracing, the event store, the bus subscriber and the
//! gRPC (and optionally HTTP) transports. Stops on Ctrl-C.
//!
//! Events arrive from Kafka/Redpanda when `KAFKA_BROKERS` is set (feature
//! `kafka`), and through `POST /events/:topic` when `HTTP_ADDR` is set
//! (feature `http`).

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

#[cfg(feature = "kafka")]
use statistics_service::bus::KafkaBus;
use statistics_service::service::{self, StatisticsService};
#[cfg(feature = "kafka")]
use statistics_service::EventSubscriber;
use statistics_service::{
    init_tracing, Config, EventStore, FileEventStore, InMemoryEventStore, SubscriberError,
    SubscriptionStats,
};
use tracing::{info, warn};

type SharedStore = Arc<dyn EventStore>;

/// Where events come from, chosen at startup.
enum Ingestion {
    #[cfg(feature = "kafka")]
    Kafka(EventSubscriber<KafkaBus, SharedStore>),
    /// No bus subscription; only the HTTP ingest route writes events.
    Direct,
}

impl Ingestion {
    #[cfg_attr(not(feature = "kafka"), allow(unused_variables))]
    fn start(config: &Config, store: &SharedStore) -> Result<Self, Box<dyn Error>> {
        match &config.kafka_brokers {
            #[cfg(feature = "kafka")]
            Some(brokers) => {
                let bus = KafkaBus::new(brokers.clone(), config.kafka_group_id.clone())
                    .with_auto_offset_reset(config.kafka_auto_offset_reset.clone());
                let mut subscriber =
                    EventSubscriber::new(bus, Arc::clone(store), config.subscriber_config());
                subscriber.start()?;
                Ok(Ingestion::Kafka(subscriber))
            }
            #[cfg(not(feature = "kafka"))]
            Some(_) => Err("KAFKA_BROKERS is set but this build lacks the `kafka` feature".into()),
            None => {
                if config.http_addr.is_none() || !cfg!(feature = "http") {
                    warn!("no KAFKA_BROKERS and no HTTP ingest route: no events will be ingested");
                } else {
                    info!("KAFKA_BROKERS not set, ingesting through POST /events/:topic only");
                }
                Ok(Ingestion::Direct)
            }
        }
    }

    fn stop(self) -> Result<Option<SubscriptionStats>, SubscriberError> {
        match self {
            #[cfg(feature = "kafka")]
            Ingestion::Kafka(mut subscriber) => subscriber.stop().map(Some),
            Ingestion::Direct => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let config = Config::from_env();
    info!(?config, "starting statistics-service");

    let store: SharedStore = match &config.data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using file event store");
            Arc::new(FileEventStore::open(dir.clone())?)
        }
        None => {
            info!("DATA_DIR not set, using in-memory event store");
            Arc::new(InMemoryEventStore::new())
        }
    };

    let ingestion = Ingestion::start(&config, &store)?;
    let service = Arc::new(StatisticsService::new(store));

    #[cfg(feature = "http")]
    if let Some(addr) = config.http_addr.clone() {
        let http_service = Arc::clone(&service);
        info!(%addr, "serving HTTP");
        tokio::spawn(async move {
            if let Err(e) = service::http::serve(http_service, &addr).await {
                tracing::error!(error = %e, "HTTP transport stopped");
            }
        });
    }

    let grpc_addr: SocketAddr = config.grpc_addr.parse()?;
    info!(addr = %grpc_addr, "serving gRPC");
    service::serve_grpc_with_shutdown(service, grpc_addr, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await?;

    let stats = tokio::task::spawn_blocking(move || ingestion.stop()).await??;
    info!(?stats, "statistics-service stopped");
    Ok(())
}
