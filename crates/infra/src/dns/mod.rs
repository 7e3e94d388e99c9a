//! Parallel host-resolution race over a set of domain suffixes
//!
//! For one regional prefix, [`DnsResolver::resolve`] looks up
//! `<prefix>.<suffix>` for every suffix concurrently and returns the first
//! suffix whose lookup succeeds. The race is over resolvability, not
//! latency ranking.
//!
//! Workers publish on a channel sized to the number of suffixes with
//! `try_send`, so late winners never block. Each worker owns a sender; once
//! every worker has finished the channel closes, which plays the role of
//! the "all done" signal. Selection priority:
//! 1. context done: the context error
//! 2. a published suffix: that suffix
//! 3. channel closed with nothing published: [`RestError::DnsExhausted`]

use std::io;
use std::net::IpAddr;
use std::sync::Arc;

use agora_rest_common::{Context, Logger};
use agora_rest_domain::{RestError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

const MODULE: &str = "dns";

/// Host lookup seam; swap in a fake for tests.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to its addresses.
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system resolver via `tokio::net::lookup_host`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostResolver;

#[async_trait]
impl HostResolver for SystemHostResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 443)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Races lookups of one regional prefix across several suffixes.
#[derive(Clone)]
pub struct DnsResolver {
    resolver: Arc<dyn HostResolver>,
    logger: Arc<dyn Logger>,
}

impl DnsResolver {
    pub fn new(resolver: Arc<dyn HostResolver>, logger: Arc<dyn Logger>) -> Self {
        Self { resolver, logger }
    }

    /// Return the first suffix for which `<region_prefix>.<suffix>`
    /// resolves.
    ///
    /// Failed lookups are logged, never surfaced individually. There is no
    /// internal timeout: the caller's context bounds the race.
    pub async fn resolve(
        &self,
        ctx: &Context,
        suffixes: &[&str],
        region_prefix: &str,
    ) -> Result<String> {
        let (tx, mut rx) = mpsc::channel::<String>(suffixes.len().max(1));

        for suffix in suffixes {
            let host = format!("{region_prefix}.{suffix}");
            let suffix = (*suffix).to_string();
            let tx = tx.clone();
            let ctx = ctx.clone();
            let resolver = Arc::clone(&self.resolver);
            let logger = Arc::clone(&self.logger);

            tokio::spawn(async move {
                let started = Instant::now();
                match ctx.run(resolver.lookup(&host)).await {
                    Ok(Ok(addrs)) if !addrs.is_empty() => {
                        logger.debugf(
                            &ctx,
                            MODULE,
                            format_args!(
                                "resolved {host} to {addrs:?} in {:?}",
                                started.elapsed()
                            ),
                        );
                        // A full channel means a winner was already published.
                        let _ = tx.try_send(suffix);
                    }
                    Ok(Ok(_)) => {
                        logger.warnf(&ctx, MODULE, format_args!("{host} resolved to no addresses"));
                    }
                    Ok(Err(err)) => {
                        logger.warnf(
                            &ctx,
                            MODULE,
                            format_args!(
                                "lookup {host} failed after {:?}: {err}",
                                started.elapsed()
                            ),
                        );
                    }
                    Err(err) => {
                        logger.debugf(&ctx, MODULE, format_args!("lookup {host} abandoned: {err}"));
                    }
                }
            });
        }
        drop(tx);

        tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            winner = rx.recv() => winner.ok_or(RestError::DnsExhausted),
        }
    }
}
