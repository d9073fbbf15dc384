//! Main streaming loop
//!
//! Polls the provider, walks the cursor from history up to the live tip,
//! extracts each block's transactions and publishes one result per height,
//! in height order, on a bounded channel.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::Level;

use crate::config::StreamConfig;
use crate::cursor::{Cursor, Step, TipChange};
use crate::decoder::Decoder;
use crate::diagnostics::{DiagnosticContext, DiagnosticSink};
use crate::error::{ProviderError, StreamError};
use crate::extract::extract;
use crate::provider::ChainProvider;
use crate::publish::{publish, BlockResult, Delivery};
use crate::shutdown::Shutdown;
use crate::types::{Block, Height};

/// What to do after a tick.
enum Tick {
    /// Wait this long, then run the next tick.
    Wait(Duration),
    Stop,
}

/// Block/transaction streaming engine.
pub struct Streamer<P, D> {
    provider: P,
    decoder: D,
    config: StreamConfig,
    sink: Arc<dyn DiagnosticSink>,
    context: DiagnosticContext,
}

impl<P: ChainProvider, D: Decoder> Streamer<P, D> {
    /// Create a new streamer.
    ///
    /// `context` is the caller's base diagnostic context; every result and
    /// notice produced by this streamer extends it.
    pub fn new(
        provider: P,
        decoder: D,
        config: StreamConfig,
        sink: Arc<dyn DiagnosticSink>,
        context: DiagnosticContext,
    ) -> Self {
        Self {
            provider,
            decoder,
            config,
            sink,
            context,
        }
    }

    /// Run until shutdown.
    ///
    /// Fails only when the configuration is invalid or the initial tip
    /// cannot be fetched. Shutdown, and the consumer dropping its receiver,
    /// return `Ok(())`. The channel is closed when this returns.
    pub async fn run(
        self,
        mut shutdown: Shutdown,
        output: mpsc::Sender<BlockResult>,
    ) -> Result<(), StreamError> {
        self.config.validate()?;

        let tip = match shutdown.race(self.provider.latest_block()).await {
            None => return Ok(()),
            Some(result) => result.map_err(StreamError::Startup)?,
        };

        self.sink.emit(
            Level::INFO,
            &self
                .context
                .clone()
                .with("tip", tip.height)
                .with("start_height", self.config.start_height),
            "Starting streamer",
        );

        let mut cursor = Cursor::new(tip, self.config.start_height);
        let mut wait = Duration::ZERO;

        loop {
            if !shutdown.sleep(wait).await {
                break;
            }

            match self.tick(&mut cursor, &mut shutdown, &output).await {
                Tick::Wait(next_wait) => wait = next_wait,
                Tick::Stop => break,
            }
        }

        let last = cursor
            .last_processed()
            .map_or_else(|| "none".to_string(), |h| h.to_string());
        self.sink.emit(
            Level::INFO,
            &self.context.clone().with("last_processed", last),
            "Streamer stopped",
        );
        Ok(())
    }

    /// Evaluate the cursor once.
    async fn tick(
        &self,
        cursor: &mut Cursor,
        shutdown: &mut Shutdown,
        output: &mpsc::Sender<BlockResult>,
    ) -> Tick {
        let started_at = Instant::now();
        let next = cursor.next_height();
        let context = self
            .context
            .clone()
            .with("height", next)
            .with("tip", cursor.tip().height);

        match cursor.step() {
            Step::CatchUp(height) => {
                let block = match shutdown.race(self.provider.block_at_height(height)).await {
                    None => return Tick::Stop,
                    Some(Ok(block)) => block,
                    Some(Err(e)) => {
                        self.report_fetch_error(&context, &e, "Failed to fetch historical block");
                        return Tick::Wait(self.config.poll_interval);
                    }
                };
                if block.height != height {
                    let e = ProviderError::Malformed(format!(
                        "requested block at height {}, got height {}",
                        height, block.height
                    ));
                    self.report_fetch_error(&context, &e, "Failed to fetch historical block");
                    return Tick::Wait(self.config.poll_interval);
                }
                self.process(block, next, cursor, shutdown, output, context, started_at)
                    .await
            }
            Step::RefreshTip => {
                let latest = match shutdown.race(self.provider.latest_block()).await {
                    None => return Tick::Stop,
                    Some(Ok(block)) => block,
                    Some(Err(e)) => {
                        self.report_fetch_error(&context, &e, "Failed to refresh tip");
                        return Tick::Wait(self.config.poll_interval);
                    }
                };
                let height = latest.height;
                match cursor.observe_tip(latest) {
                    TipChange::Advanced => {
                        self.sink.emit(
                            Level::DEBUG,
                            &context.with("new_tip", height),
                            "Tip advanced",
                        );
                        Tick::Wait(self.config.retry_interval)
                    }
                    TipChange::Unchanged => Tick::Wait(self.config.poll_interval),
                }
            }
            Step::Process(block) => {
                self.process(block, next, cursor, shutdown, output, context, started_at)
                    .await
            }
        }
    }

    /// Extract and publish the block at `next`, then advance the cursor to it.
    #[allow(clippy::too_many_arguments)]
    async fn process(
        &self,
        block: Block,
        next: Height,
        cursor: &mut Cursor,
        shutdown: &mut Shutdown,
        output: &mpsc::Sender<BlockResult>,
        context: DiagnosticContext,
        started_at: Instant,
    ) -> Tick {
        let extraction = extract(
            &self.provider,
            &self.decoder,
            block.id,
            &context,
            self.sink.as_ref(),
        );

        let result = match shutdown.race(extraction).await {
            None => return Tick::Stop,
            Some(Ok(transactions)) => {
                BlockResult::success(block, transactions, context, started_at)
            }
            Some(Err(e)) if e.is_transient() => {
                self.report_fetch_error(&context, &e, "Block transactions not available yet");
                return Tick::Wait(self.config.poll_interval);
            }
            Some(Err(e)) => {
                self.sink.emit(
                    Level::ERROR,
                    &context.clone().with("error", &e),
                    "Failed to fetch block transactions",
                );
                BlockResult::failure(block, e, context, started_at)
            }
        };

        let published = result.context.clone();
        match publish(shutdown, output, result).await {
            Delivery::Delivered => {
                cursor.advance(next);
                self.sink.emit(Level::DEBUG, &published, "Published block");
                Tick::Wait(self.config.poll_interval)
            }
            Delivery::Stopped => Tick::Stop,
        }
    }

    fn report_fetch_error(&self, context: &DiagnosticContext, error: &ProviderError, message: &str) {
        let level = if error.is_transient() {
            Level::WARN
        } else {
            Level::ERROR
        };
        self.sink
            .emit(level, &context.clone().with("error", error), message);
    }
}
