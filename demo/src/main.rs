use std::sync::Arc;
use std::thread;

use dotenv::dotenv;
use rotating_logger::{info, warning, Logger, LoggerError};

mod config;

fn main() -> Result<(), LoggerError> {
    dotenv().ok();

    let cfg = config::Config::load()?;
    let logger = Arc::new(Logger::new(cfg.logging)?);

    info!(logger, "logging to {}", logger.directory().display());

    let producers: Vec<_> = (0..cfg.producers)
        .map(|id| {
            let logger = logger.clone();
            let records = cfg.records_per_producer;
            thread::spawn(move || {
                for n in 0..records {
                    if n % 500 == 499 {
                        warning!(logger, "producer {} passed {} records", id, n + 1);
                    } else {
                        logger.debug("producer {} record {}", &[&id, &n]);
                    }
                }
                info!(logger, "producer {} done", id);
            })
        })
        .collect();

    for producer in producers {
        if producer.join().is_err() {
            logger.error("a producer thread panicked", &[]);
        }
    }

    println!(
        "{} records queued, writing to {}",
        logger.submitted(),
        logger.directory().display()
    );
    logger.shutdown()
}
