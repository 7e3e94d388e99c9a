//! Stateful selector of `(regional prefix, domain suffix)` for one area
//!
//! The pool keeps the suffix chosen by the last DNS race and a rotating
//! view of the area's regional prefixes. The driver reads the current base
//! URL for every attempt and rotates to the next prefix after every failed
//! attempt.
//!
//! ## Locking
//! - Pool state sits behind a `parking_lot::Mutex` that is never held
//!   across an `.await`, so URL reads and rotations never wait on DNS.
//! - Refreshes are serialised by an async refresh gate. The staleness check
//!   is repeated under the gate, so concurrent callers trigger at most one
//!   DNS race per refresh window.
//! - Only [`DomainPool::select_best_domain`] writes `current_domain` and
//!   `last_update`; only [`DomainPool::next_region`] rotates prefixes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use agora_rest_common::{Context, Logger};
use agora_rest_domain::constants::DOMAIN_REFRESH_INTERVAL;
use agora_rest_domain::{RegionArea, Result};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::dns::{DnsResolver, HostResolver, SystemHostResolver};

const MODULE: &str = "domain_pool";

#[derive(Debug)]
struct PoolState {
    current_region_prefixes: VecDeque<&'static str>,
    current_domain: &'static str,
    last_update: Option<Instant>,
}

impl PoolState {
    fn head(&self, fallback: &'static str) -> &'static str {
        self.current_region_prefixes.front().copied().unwrap_or(fallback)
    }
}

/// Domain selection state shared by every call of one client.
pub struct DomainPool {
    area: RegionArea,
    suffixes: &'static [&'static str],
    region_prefixes: &'static [&'static str],
    refresh_interval: Duration,
    state: Mutex<PoolState>,
    refresh_gate: tokio::sync::Mutex<()>,
    resolver: DnsResolver,
    logger: Arc<dyn Logger>,
}

impl DomainPool {
    /// Pool for `area` using the system DNS resolver.
    pub fn new(area: RegionArea, logger: Arc<dyn Logger>) -> Self {
        Self::with_resolver(area, logger, Arc::new(SystemHostResolver))
    }

    /// Pool for `area` resolving hosts through `resolver`.
    pub fn with_resolver(
        area: RegionArea,
        logger: Arc<dyn Logger>,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        let suffixes = area.domain_suffixes();
        let region_prefixes = area.region_prefixes();
        let state = PoolState {
            current_region_prefixes: region_prefixes.iter().copied().collect(),
            current_domain: suffixes[0],
            last_update: None,
        };

        Self {
            area,
            suffixes,
            region_prefixes,
            refresh_interval: DOMAIN_REFRESH_INTERVAL,
            state: Mutex::new(state),
            refresh_gate: tokio::sync::Mutex::new(()),
            resolver: DnsResolver::new(resolver, Arc::clone(&logger)),
            logger,
        }
    }

    pub fn area(&self) -> RegionArea {
        self.area
    }

    pub fn suffixes(&self) -> &'static [&'static str] {
        self.suffixes
    }

    pub fn region_prefixes(&self) -> &'static [&'static str] {
        self.region_prefixes
    }

    /// Make sure the selected suffix is fresh, racing DNS if it is not.
    ///
    /// A no-op inside the refresh window. On resolver failure the selected
    /// suffix is left unchanged and the error is returned.
    pub async fn select_best_domain(&self, ctx: &Context) -> Result<()> {
        if self.is_fresh() {
            return Ok(());
        }

        let _gate = ctx.run(self.refresh_gate.lock()).await?;
        if self.is_fresh() {
            return Ok(());
        }

        let region_prefix = self.current_region_prefix();
        let winner = match self.resolver.resolve(ctx, self.suffixes, region_prefix).await {
            Ok(winner) => winner,
            Err(err) => {
                self.logger.warnf(
                    ctx,
                    MODULE,
                    format_args!("domain selection for {region_prefix} failed: {err}"),
                );
                return Err(err);
            }
        };

        match self.suffixes.iter().copied().find(|suffix| *suffix == winner) {
            Some(suffix) => {
                let mut state = self.state.lock();
                state.current_domain = suffix;
                state.last_update = Some(Instant::now());
                drop(state);
                self.logger.infof(
                    ctx,
                    MODULE,
                    format_args!("selected domain {suffix} via {region_prefix}"),
                );
            }
            None => {
                self.logger.warnf(
                    ctx,
                    MODULE,
                    format_args!("resolver returned unknown suffix {winner}, keeping current"),
                );
            }
        }
        Ok(())
    }

    /// Drop the head prefix; start over from the full list once exhausted.
    pub fn next_region(&self) {
        let mut state = self.state.lock();
        state.current_region_prefixes.pop_front();
        if state.current_region_prefixes.is_empty() {
            state.current_region_prefixes.extend(self.region_prefixes.iter().copied());
        }
    }

    /// `https://<head prefix>.<current domain>`
    pub fn current_url(&self) -> String {
        let (prefix, domain) = self.current_endpoint();
        format!("https://{prefix}.{domain}")
    }

    /// Consistent snapshot of `(head prefix, current domain)`.
    pub fn current_endpoint(&self) -> (&'static str, &'static str) {
        let state = self.state.lock();
        (state.head(self.region_prefixes[0]), state.current_domain)
    }

    pub fn current_region_prefix(&self) -> &'static str {
        self.current_endpoint().0
    }

    pub fn current_domain(&self) -> &'static str {
        self.current_endpoint().1
    }

    /// Remaining rotation, head first.
    pub fn current_region_prefixes(&self) -> Vec<&'static str> {
        self.state.lock().current_region_prefixes.iter().copied().collect()
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.state.lock().last_update
    }

    fn is_fresh(&self) -> bool {
        self.state
            .lock()
            .last_update
            .is_some_and(|updated| Instant::now().duration_since(updated) <= self.refresh_interval)
    }
}

impl std::fmt::Debug for DomainPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DomainPool")
            .field("area", &self.area)
            .field("current_region_prefixes", &state.current_region_prefixes)
            .field("current_domain", &state.current_domain)
            .field("last_update", &state.last_update)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use agora_rest_common::DiscardLogger;
    use agora_rest_domain::RestError;
    use async_trait::async_trait;

    use super::*;

    /// Resolves only hosts ending in `ok_suffix`; counts every lookup.
    struct CountingResolver {
        ok_suffix: Option<&'static str>,
        lookups: AtomicUsize,
        delay: Duration,
    }

    impl CountingResolver {
        fn new(ok_suffix: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self { ok_suffix, lookups: AtomicUsize::new(0), delay: Duration::ZERO })
        }

        fn slow(ok_suffix: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self { ok_suffix: Some(ok_suffix), lookups: AtomicUsize::new(0), delay })
        }
    }

    #[async_trait]
    impl HostResolver for CountingResolver {
        async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.ok_suffix {
                Some(suffix) if host.ends_with(suffix) => Ok(vec![IpAddr::from([127, 0, 0, 1])]),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "nxdomain")),
            }
        }
    }

    fn pool(area: RegionArea, resolver: Arc<CountingResolver>) -> DomainPool {
        DomainPool::with_resolver(area, Arc::new(DiscardLogger::new()), resolver)
    }

    #[test]
    fn starts_on_first_suffix_and_full_prefix_list() {
        let pool = pool(RegionArea::CN, CountingResolver::new(None));
        assert_eq!(pool.current_domain(), "sd-rtn.com");
        assert_eq!(pool.current_region_prefixes(), vec!["api-cn-east-1", "api-cn-north-1"]);
        assert_eq!(pool.current_url(), "https://api-cn-east-1.sd-rtn.com");
        assert!(pool.last_update().is_none());
    }

    #[test]
    fn next_region_cycles_with_period_of_prefix_count() {
        for area in RegionArea::ALL {
            let pool = pool(area, CountingResolver::new(None));
            let prefixes = area.region_prefixes();
            for step in 0..(prefixes.len() * 3) {
                assert_eq!(pool.current_region_prefix(), prefixes[step % prefixes.len()]);
                pool.next_region();
            }
            assert!(!pool.current_region_prefixes().is_empty());
        }
    }

    #[tokio::test]
    async fn selects_resolvable_suffix() {
        let resolver = CountingResolver::new(Some("agora.io"));
        let pool = pool(RegionArea::CN, Arc::clone(&resolver));

        pool.select_best_domain(&Context::background()).await.unwrap();

        assert_eq!(pool.current_domain(), "agora.io");
        assert_eq!(pool.current_url(), "https://api-cn-east-1.agora.io");
        assert!(pool.last_update().is_some());
        assert_eq!(resolver.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolves_against_head_prefix() {
        let pool = pool(RegionArea::EU, CountingResolver::new(Some("sd-rtn.com")));
        pool.next_region();
        pool.select_best_domain(&Context::background()).await.unwrap();
        assert_eq!(pool.current_url(), "https://api-eu-central-1.sd-rtn.com");
    }

    #[tokio::test]
    async fn dns_failure_keeps_current_domain() {
        let resolver = CountingResolver::new(None);
        let pool = pool(RegionArea::US, Arc::clone(&resolver));

        let err = pool.select_best_domain(&Context::background()).await.unwrap_err();

        assert!(matches!(err, RestError::DnsExhausted));
        assert_eq!(err.to_string(), "query all dns is failed");
        assert_eq!(pool.current_domain(), "agora.io");
        assert!(pool.last_update().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_window_suppresses_lookups() {
        let resolver = CountingResolver::new(Some("agora.io"));
        let pool = pool(RegionArea::AP, Arc::clone(&resolver));
        let ctx = Context::background();

        pool.select_best_domain(&ctx).await.unwrap();
        let after_first = resolver.lookups.load(Ordering::SeqCst);

        tokio::time::advance(Duration::from_secs(29)).await;
        pool.select_best_domain(&ctx).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        pool.select_best_domain(&ctx).await.unwrap();
        assert_eq!(resolver.lookups.load(Ordering::SeqCst), after_first);

        tokio::time::advance(Duration::from_millis(1)).await;
        pool.select_best_domain(&ctx).await.unwrap();
        assert_eq!(resolver.lookups.load(Ordering::SeqCst), after_first * 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_refreshes_run_one_race() {
        let resolver = CountingResolver::slow("agora.io", Duration::from_millis(50));
        let pool = Arc::new(pool(RegionArea::US, Arc::clone(&resolver)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                pool.select_best_domain(&Context::background()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // One race = one lookup per suffix.
        assert_eq!(resolver.lookups.load(Ordering::SeqCst), pool.suffixes().len());
    }

    #[tokio::test]
    async fn cancelled_context_fails_stale_refresh() {
        let resolver = CountingResolver::new(Some("agora.io"));
        let pool = pool(RegionArea::US, Arc::clone(&resolver));
        let ctx = Context::background();
        ctx.cancel();

        let err = pool.select_best_domain(&ctx).await.unwrap_err();
        assert!(matches!(err, RestError::Cancelled));
        assert_eq!(pool.current_domain(), "agora.io");
        assert!(pool.last_update().is_none());
    }
}
