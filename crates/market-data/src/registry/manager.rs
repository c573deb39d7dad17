//! Fallback orchestrator.
//!
//! The manager owns every piece of session state (cache, breakers, rate
//! limiter, unavailable set, counters, probe memo) and walks the provider
//! tiers in list order for each ticker the cache cannot serve:
//!
//! ```text
//! CacheCheck ──hit──> Done
//!     │
//!     └─miss─> Tier(1) ─> Tier(2) ─> ... ─> AllTiersExhausted (ticker absent)
//! ```
//!
//! Nothing in a walk is ever surfaced to the caller as an error. A ticker
//! either appears in the result or it does not.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, DEFAULT_EXHAUSTION_THRESHOLD};
use super::preload::PreloadGroup;
use super::rate_limiter::{retry_backoff, RateLimiter};
use super::skip_reason::{FetchDiagnostics, SkipReason};
use super::validator::FrameValidator;
use crate::cache::{BatchKey, CacheStore, SingleKey};
use crate::config::FeedConfig;
use crate::diagnostics::{
    CacheDiagnostics, DiagnosticsSnapshot, ProviderDiagnostics, ProviderStats, ProviderStatus,
};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{
    CanonicalFrame, InfoSource, PriceTable, ProviderSymbol, RequestWindow, Ticker, TickerInfo,
};
use crate::normalizer::{info_from_frame, normalize, normalize_info};
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::eastmoney::EastmoneyProvider;
use crate::provider::fred::FredProvider;
use crate::provider::google_finance::GoogleFinanceProvider;
use crate::provider::stock_analysis::StockAnalysisProvider;
use crate::provider::yahoo::YahooProvider;
use crate::provider::{FetchOutcome, MarketDataProvider};
use crate::resolver::{display_name, SymbolMapping, SymbolTranslator};

/// Window used when info has to be derived from a fresh price fetch.
const INFO_FALLBACK_PERIOD: &str = "3mo";
const DAILY_INTERVAL: &str = "1d";

/// Runtime knobs for one manager.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerSettings {
    /// Consecutive exhaustion signals that open a provider's circuit.
    pub exhaustion_threshold: u32,
    /// Base wait before the single rate-limit retry.
    pub retry_backoff: Duration,
    /// Uniform jitter added to `retry_backoff`.
    pub retry_jitter: (Duration, Duration),
    /// Multiplier on every provider's minimum spacing.
    pub spacing_scale: f64,
    /// Overrides each provider's own request timeout.
    pub call_timeout: Option<Duration>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            exhaustion_threshold: DEFAULT_EXHAUSTION_THRESHOLD,
            retry_backoff: Duration::from_secs(12),
            retry_jitter: (Duration::from_secs(1), Duration::from_secs(3)),
            spacing_scale: 1.0,
            call_timeout: None,
        }
    }
}

impl ManagerSettings {
    /// No spacing and no retry backoff. Meant for tests and offline replays.
    pub fn immediate() -> Self {
        Self {
            retry_backoff: Duration::ZERO,
            retry_jitter: (Duration::ZERO, Duration::ZERO),
            spacing_scale: 0.0,
            ..Self::default()
        }
    }
}

/// What a single adapter call asks for.
#[derive(Clone, Copy)]
enum FetchRequest<'a> {
    Series(&'a ProviderSymbol, &'a RequestWindow),
    Info(&'a ProviderSymbol),
}

impl fmt::Display for FetchRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series(symbol, window) => write!(f, "series {} [{}]", symbol, window),
            Self::Info(symbol) => write!(f, "info {}", symbol),
        }
    }
}

/// Multi-provider market data manager for one reporting run.
///
/// Mutating operations take `&mut self`; share one manager between tasks by
/// wrapping it in a `tokio::sync::Mutex`, or build one per worker.
pub struct MarketDataManager {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    enrichment: Option<Arc<dyn MarketDataProvider>>,
    translator: SymbolTranslator,
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    validator: FrameValidator,
    cache: CacheStore,
    /// Provider id -> reason it was marked unavailable.
    unavailable: HashMap<String, String>,
    stats: HashMap<String, ProviderStats>,
    total_cache_hits: u64,
    traces: HashMap<Ticker, FetchDiagnostics>,
    settings: ManagerSettings,
}

impl MarketDataManager {
    /// Create a manager over `providers`, walked in the given order.
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self::with_settings(providers, ManagerSettings::default())
    }

    pub fn with_settings(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        settings: ManagerSettings,
    ) -> Self {
        let rate_limiter = RateLimiter::with_scale(settings.spacing_scale);
        for provider in &providers {
            rate_limiter.configure(provider.id(), provider.rate_limit().min_interval);
        }

        Self {
            providers,
            enrichment: None,
            translator: SymbolTranslator::new(),
            rate_limiter,
            circuit_breaker: CircuitBreaker::with_config(CircuitBreakerConfig {
                exhaustion_threshold: settings.exhaustion_threshold,
            }),
            validator: FrameValidator::new(),
            cache: CacheStore::new(),
            unavailable: HashMap::new(),
            stats: HashMap::new(),
            total_cache_hits: 0,
            traces: HashMap::new(),
            settings,
        }
    }

    /// Provider consulted to fill fundamentals on price-only info results.
    pub fn with_enrichment(mut self, provider: Arc<dyn MarketDataProvider>) -> Self {
        self.rate_limiter
            .configure(provider.id(), provider.rate_limit().min_interval);
        self.enrichment = Some(provider);
        self
    }

    pub fn with_translator(mut self, translator: SymbolTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_validator(mut self, validator: FrameValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Build the default tier list from configuration.
    ///
    /// Tier order: Alpha Vantage, Yahoo, FRED, Eastmoney, CoinGecko,
    /// Google Finance. stockanalysis is used for enrichment only.
    pub fn from_config(config: &FeedConfig) -> Result<Self, MarketDataError> {
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(AlphaVantageProvider::new(config.alpha_vantage_key.clone())?),
            Arc::new(YahooProvider::new()?),
            Arc::new(FredProvider::new(config.fred_api_key.clone())?),
            Arc::new(EastmoneyProvider::new()?),
            Arc::new(CoinGeckoProvider::new()?),
            Arc::new(GoogleFinanceProvider::new()?),
        ];
        let enrichment: Arc<dyn MarketDataProvider> = Arc::new(StockAnalysisProvider::new()?);

        info!(
            "Market data manager created with {} tiers: {}",
            providers.len(),
            providers
                .iter()
                .map(|p| p.id())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self::with_settings(providers, config.to_settings()).with_enrichment(enrichment))
    }

    pub fn providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    /// Read-only view of the session cache.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    // ========================================================================
    // Prices
    // ========================================================================

    /// Fetch OHLCV frames for `tickers` over `(period, interval)`.
    ///
    /// Lookup order: exact batch entry, superset batch entry, per-ticker
    /// entries, then the tier walk for whatever is still missing. Tickers
    /// that no tier can serve are absent from the result.
    pub async fn get_prices<T: AsRef<str>>(
        &mut self,
        tickers: &[T],
        period: &str,
        interval: &str,
    ) -> PriceTable {
        let window = RequestWindow::new(period, interval);
        let requested: Vec<Ticker> = tickers
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(Ticker::from)
            .collect();

        if requested.is_empty() {
            return PriceTable::new();
        }

        let key = BatchKey::new(requested.iter().cloned(), window.clone());
        if let Some(table) = self.cache.get_exact(&key).cloned() {
            debug!("Exact cache hit for {:?} [{}]", key.tickers(), window);
            self.record_table_hits(&table);
            return table;
        }
        if let Some(table) = self.cache.get_subset(&requested, &window) {
            self.record_table_hits(&table);
            return table;
        }

        let mut result = PriceTable::new();
        let mut fetched = 0usize;
        for ticker in &requested {
            if let Some(frame) = self.cache.get_single(ticker, &window).cloned() {
                self.record_hit(ticker, &frame);
                result.insert(ticker.clone(), frame);
                continue;
            }

            if let Some(frame) = self.walk_prices(ticker, &window).await {
                self.cache
                    .put_single(SingleKey::new(ticker.clone(), window.clone()), &frame);
                result.insert(ticker.clone(), frame);
                fetched += 1;
            }
        }

        if result.len() < requested.len() {
            let missing: Vec<&str> = requested
                .iter()
                .filter(|t| !result.contains(t))
                .map(|t| t.as_ref())
                .collect();
            warn!(
                "No provider could serve {:?} [{}]; returning {} of {} tickers",
                missing,
                window,
                result.len(),
                requested.len()
            );
        }

        if !result.is_empty() {
            // Keyed by what resolved so a later request retries the failures.
            let stored = BatchKey::new(result.tickers().cloned(), window.clone());
            self.cache.put(stored, &result);
            debug!(
                "Cached batch of {} tickers [{}] ({} fetched)",
                result.len(),
                window,
                fetched
            );
        }

        result
    }

    /// Fetch the union of the groups' tickers as one batch.
    pub async fn preload(
        &mut self,
        groups: &[PreloadGroup],
        period: &str,
        interval: &str,
    ) -> PriceTable {
        let tickers: BTreeSet<&str> = groups
            .iter()
            .flat_map(|g| g.tickers.iter().map(String::as_str))
            .collect();
        let tickers: Vec<&str> = tickers.into_iter().collect();

        info!(
            "Preloading {} tickers from {} groups [{}/{}]",
            tickers.len(),
            groups.len(),
            period,
            interval
        );
        let table = self.get_prices(&tickers, period, interval).await;
        info!("Preload resolved {} of {} tickers", table.len(), tickers.len());
        table
    }

    /// Walk the tiers for one ticker.
    async fn walk_prices(
        &mut self,
        ticker: &Ticker,
        window: &RequestWindow,
    ) -> Option<CanonicalFrame> {
        let mut trace = FetchDiagnostics::new();
        let mut found = None;

        for provider in self.providers.clone() {
            let id = provider.id();
            let caps = provider.capabilities();
            let unsupported = (!caps.supports_history || !caps.supports_interval(&window.interval))
                .then_some(SkipReason::IntervalNotSupported);
            if let Some(reason) = self.skip_reason(provider.as_ref(), unsupported) {
                trace.record_skip(Cow::Borrowed(id), reason);
                continue;
            }

            let (candidates, probing) = match self.translator.translate(id, ticker) {
                SymbolMapping::NoMapping => {
                    trace.record_skip(Cow::Borrowed(id), SkipReason::NoMapping);
                    continue;
                }
                SymbolMapping::Symbol(symbol) => (vec![symbol], false),
                SymbolMapping::Probe(candidates) => (candidates, true),
            };

            if let Some(frame) = self
                .fetch_series_from(&provider, ticker, window, candidates, probing, &mut trace)
                .await
            {
                found = Some(frame);
                break;
            }
        }

        debug!("{} [{}]: {}", ticker, window, trace.summary());
        self.traces.insert(ticker.clone(), trace);
        found
    }

    /// Try one tier. Probe candidates are tried in order until one returns
    /// rows; any failure other than "nothing here" ends the tier.
    async fn fetch_series_from(
        &mut self,
        provider: &Arc<dyn MarketDataProvider>,
        ticker: &Ticker,
        window: &RequestWindow,
        candidates: Vec<ProviderSymbol>,
        probing: bool,
        trace: &mut FetchDiagnostics,
    ) -> Option<CanonicalFrame> {
        let id = provider.id();

        for symbol in candidates {
            let outcome = self
                .call_with_retry(provider, FetchRequest::Series(&symbol, window))
                .await;

            let payload = match outcome {
                FetchOutcome::Success(payload) => payload,
                FetchOutcome::Empty | FetchOutcome::Malformed(_) if probing => {
                    debug!("Probe candidate {} on '{}' had no data", symbol, id);
                    continue;
                }
                other => {
                    trace.record_error(Cow::Borrowed(id), other.to_string());
                    return None;
                }
            };

            let frame = match normalize(Cow::Borrowed(id), &payload) {
                Ok(Some(frame)) => frame,
                Ok(None) if probing => continue,
                Ok(None) => {
                    trace.record_error(Cow::Borrowed(id), FetchOutcome::Empty.to_string());
                    return None;
                }
                Err(e) => {
                    warn!("Provider '{}' returned an unusable payload for {}: {}", id, ticker, e);
                    self.count_error(id);
                    trace.record_error(Cow::Borrowed(id), e.to_string());
                    return None;
                }
            };

            if let Err(e) = self.validator.validate(ticker, &frame) {
                warn!("Rejected {} rows from '{}' for {}: {}", frame.len(), id, ticker, e);
                self.count_error(id);
                trace.record_error(Cow::Borrowed(id), e.to_string());
                return None;
            }

            if probing {
                self.translator.remember_probe(id, ticker, symbol);
            }
            info!("Fetched {} rows for {} from '{}'", frame.len(), ticker, id);
            trace.record_success(Cow::Borrowed(id));
            return Some(frame);
        }

        trace.record_error(Cow::Borrowed(id), FetchOutcome::Empty.to_string());
        None
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Descriptive and fundamental attributes for `ticker`.
    ///
    /// Lookup order: info cache, the primary tier, a daily frame already in
    /// the price cache, the remaining tiers, and finally a fresh price fetch
    /// to derive from. Price-only results are enriched with fundamentals
    /// when an enrichment provider is set.
    pub async fn get_info(&mut self, ticker: &str) -> Option<TickerInfo> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.get_info(ticker) {
            self.total_cache_hits += 1;
            if let Some(InfoSource::Provider(id)) = &cached.source {
                self.stats.entry(id.clone()).or_default().cache_hits += 1;
            }
            return Some(cached.as_ref().clone());
        }

        let mut trace = FetchDiagnostics::new();
        let mut found = self.walk_info(ticker, 0..1, &mut trace).await;
        if found.is_none() {
            found = self.cached_price_info(ticker);
        }
        if found.is_none() {
            found = self
                .walk_info(ticker, 1..self.providers.len(), &mut trace)
                .await;
        }
        debug!("{} [info]: {}", ticker, trace.summary());
        self.traces.insert(Ticker::from(ticker), trace);

        let mut info = match found {
            Some(info) => info,
            None => self.fetched_price_info(ticker).await?,
        };

        if info.has_price() && !info.has_fundamentals() {
            self.enrich(&mut info).await;
        }

        Some(self.cache.put_info(info).as_ref().clone())
    }

    /// Info for several tickers. Only tickers that resolved are present.
    pub async fn batch_get_info<T: AsRef<str>>(
        &mut self,
        tickers: &[T],
    ) -> BTreeMap<Ticker, TickerInfo> {
        let unique: BTreeSet<&str> = tickers
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();

        let mut result = BTreeMap::new();
        for ticker in unique {
            if let Some(info) = self.get_info(ticker).await {
                result.insert(Ticker::from(ticker), info);
            }
        }
        result
    }

    /// Walk the info-capable providers in `tiers`.
    async fn walk_info(
        &mut self,
        ticker: &str,
        tiers: Range<usize>,
        trace: &mut FetchDiagnostics,
    ) -> Option<TickerInfo> {
        let providers = self
            .providers
            .get(tiers)
            .map(<[_]>::to_vec)
            .unwrap_or_default();

        for provider in providers {
            let id = provider.id();
            let unsupported =
                (!provider.capabilities().supports_info).then_some(SkipReason::InfoNotSupported);
            if let Some(reason) = self.skip_reason(provider.as_ref(), unsupported) {
                trace.record_skip(Cow::Borrowed(id), reason);
                continue;
            }

            // Probing is for price series only.
            let symbol = match self.translator.translate(id, ticker) {
                SymbolMapping::Symbol(symbol) => symbol,
                SymbolMapping::Probe(_) | SymbolMapping::NoMapping => {
                    trace.record_skip(Cow::Borrowed(id), SkipReason::NoMapping);
                    continue;
                }
            };

            if let Some(info) = self.fetch_info_from(&provider, ticker, &symbol, trace).await {
                return Some(info);
            }
        }
        None
    }

    async fn fetch_info_from(
        &mut self,
        provider: &Arc<dyn MarketDataProvider>,
        ticker: &str,
        symbol: &ProviderSymbol,
        trace: &mut FetchDiagnostics,
    ) -> Option<TickerInfo> {
        let id = provider.id();
        let payload = match self.call_with_retry(provider, FetchRequest::Info(symbol)).await {
            FetchOutcome::Success(payload) => payload,
            other => {
                trace.record_error(Cow::Borrowed(id), other.to_string());
                return None;
            }
        };

        let info = match normalize_info(ticker, &payload) {
            Ok(Some(info)) => info,
            Ok(None) => {
                trace.record_error(Cow::Borrowed(id), FetchOutcome::Empty.to_string());
                return None;
            }
            Err(e) => {
                self.count_error(id);
                trace.record_error(Cow::Borrowed(id), e.to_string());
                return None;
            }
        };

        if let Err(e) = self.validator.validate_info(id, &info) {
            warn!("Rejected info from '{}' for {}: {}", id, ticker, e);
            self.count_error(id);
            trace.record_error(Cow::Borrowed(id), e.to_string());
            return None;
        }

        trace.record_success(Cow::Borrowed(id));
        Some(info)
    }

    /// Price fields derived from a daily frame already in the cache.
    fn cached_price_info(&self, ticker: &str) -> Option<TickerInfo> {
        let info = self
            .cache
            .daily_frame(ticker)
            .and_then(|frame| info_from_frame(ticker, frame, display_name(ticker)))?;
        debug!("Derived info for {} from cached prices", ticker);
        Some(info)
    }

    /// Price fields derived from a fresh daily fetch through the price walk.
    async fn fetched_price_info(&mut self, ticker: &str) -> Option<TickerInfo> {
        let table = self
            .get_prices(&[ticker], INFO_FALLBACK_PERIOD, DAILY_INTERVAL)
            .await;
        let info = table
            .get(ticker)
            .and_then(|frame| info_from_frame(ticker, frame, display_name(ticker)));
        if info.is_none() {
            debug!("No info source could serve {}", ticker);
        }
        info
    }

    async fn enrich(&mut self, info: &mut TickerInfo) {
        let Some(provider) = self.enrichment.clone() else {
            return;
        };
        let id = provider.id();
        let unsupported =
            (!provider.capabilities().supports_info).then_some(SkipReason::InfoNotSupported);
        if let Some(reason) = self.skip_reason(provider.as_ref(), unsupported) {
            debug!("Skipping enrichment from '{}': {}", id, reason);
            return;
        }

        let ticker = info.symbol.clone();
        let SymbolMapping::Symbol(symbol) = self.translator.translate(id, &ticker) else {
            return;
        };

        let mut trace = FetchDiagnostics::new();
        match self.fetch_info_from(&provider, &ticker, &symbol, &mut trace).await {
            Some(extra) => {
                info.merge_fundamentals(&extra);
                if info.source == Some(InfoSource::PriceFrame) {
                    info.source = Some(InfoSource::PriceFrameEnriched);
                }
                debug!("Enriched {} with fundamentals from '{}'", ticker, id);
            }
            None => debug!("Enrichment for {}: {}", ticker, trace.summary()),
        }
    }

    // ========================================================================
    // Adapter calls
    // ========================================================================

    /// One call plus, on a rate-limit signal, a single retry after backoff.
    /// The final outcome updates the breaker and the unavailable set.
    async fn call_with_retry(
        &mut self,
        provider: &Arc<dyn MarketDataProvider>,
        request: FetchRequest<'_>,
    ) -> FetchOutcome {
        let id = provider.id();
        let mut outcome = self.call_once(provider, request).await;

        if outcome.retry_class() == RetryClass::RetryThenPenalty {
            let backoff = retry_backoff(self.settings.retry_backoff, self.settings.retry_jitter);
            info!("Provider '{}' rate limited, retrying once in {:?}", id, backoff);
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            outcome = self.call_once(provider, request).await;
        }

        self.circuit_breaker.record_outcome(id, &outcome);
        match outcome.retry_class() {
            RetryClass::DisableProvider => {
                if let FetchOutcome::Unavailable(reason) = &outcome {
                    self.mark_unavailable(id, reason);
                }
            }
            RetryClass::TripCircuit | RetryClass::RetryThenPenalty => {
                warn!("Provider '{}' signalled exhaustion: {}", id, outcome);
            }
            RetryClass::Done | RetryClass::NextProvider => {}
        }
        outcome
    }

    async fn call_once(
        &mut self,
        provider: &Arc<dyn MarketDataProvider>,
        request: FetchRequest<'_>,
    ) -> FetchOutcome {
        let id = provider.id();
        self.rate_limiter.await_slot(id).await;

        let timeout = self
            .settings
            .call_timeout
            .unwrap_or_else(|| provider.rate_limit().timeout);
        debug!("Fetching {} from provider '{}'", request, id);

        let call = async {
            match request {
                FetchRequest::Series(symbol, window) => provider.fetch_series(symbol, window).await,
                FetchRequest::Info(symbol) => provider.fetch_info(symbol).await,
            }
        };
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::Unavailable(format!("timed out after {:?}", timeout)),
        };

        let stats = self.stats.entry(id.to_string()).or_default();
        stats.calls += 1;
        if outcome.is_error() {
            stats.errors += 1;
        }
        outcome
    }

    fn skip_reason(
        &self,
        provider: &dyn MarketDataProvider,
        unsupported: Option<SkipReason>,
    ) -> Option<SkipReason> {
        let id = provider.id();
        if !provider.is_configured() {
            Some(SkipReason::NotConfigured)
        } else if unsupported.is_some() {
            unsupported
        } else if self.circuit_breaker.is_open(id) {
            Some(SkipReason::CircuitBreakerOpen)
        } else if self.unavailable.contains_key(id) {
            Some(SkipReason::Unavailable)
        } else {
            None
        }
    }

    fn mark_unavailable(&mut self, id: &str, reason: &str) {
        if !self.unavailable.contains_key(id) {
            warn!(
                "Provider '{}' unavailable for the rest of the session: {}",
                id, reason
            );
            self.unavailable.insert(id.to_string(), reason.to_string());
        }
    }

    fn count_error(&mut self, id: &str) {
        self.stats.entry(id.to_string()).or_default().errors += 1;
    }

    fn record_hit(&mut self, ticker: &Ticker, frame: &CanonicalFrame) {
        self.total_cache_hits += 1;
        self.stats
            .entry(frame.source().to_string())
            .or_default()
            .cache_hits += 1;

        let mut trace = FetchDiagnostics::new();
        trace.record_cache_hit(frame.source().clone());
        self.traces.insert(ticker.clone(), trace);
    }

    fn record_table_hits(&mut self, table: &PriceTable) {
        for (ticker, frame) in table.iter() {
            self.record_hit(ticker, frame);
        }
    }

    // ========================================================================
    // Session state
    // ========================================================================

    /// Most recent attempt trail for `ticker`.
    pub fn last_trace(&self, ticker: &str) -> Option<&FetchDiagnostics> {
        self.traces.get(ticker)
    }

    /// Whether the provider has been marked unavailable this session.
    pub fn is_unavailable(&self, provider: &str) -> bool {
        self.unavailable.contains_key(provider)
    }

    pub fn is_circuit_open(&self, provider: &str) -> bool {
        self.circuit_breaker.is_open(provider)
    }

    /// Point-in-time copy of counters, breaker state and cache sizes.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        let tiers = self
            .providers
            .iter()
            .enumerate()
            .map(|(i, p)| (Some(i), p));
        let enrichment = self.enrichment.iter().map(|p| (None, p));

        let providers = tiers
            .chain(enrichment)
            .map(|(tier, provider)| {
                let id = provider.id();
                let configured = provider.is_configured();
                let breaker = self.circuit_breaker.state(id);
                let unavailable = self.unavailable.get(id).cloned();
                ProviderDiagnostics {
                    provider: Cow::Borrowed(id),
                    tier,
                    configured,
                    status: ProviderStatus::resolve(configured, unavailable.is_some(), &breaker),
                    stats: self.stats.get(id).copied().unwrap_or_default(),
                    breaker,
                    unavailable,
                }
            })
            .collect();

        DiagnosticsSnapshot {
            providers,
            cache: CacheDiagnostics {
                single_entries: self.cache.single_len(),
                batch_entries: self.cache.batch_len(),
                info_entries: self.cache.info_len(),
                total_hits: self.total_cache_hits,
            },
        }
    }

    /// Return the manager to its freshly constructed state.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.circuit_breaker.reset_all();
        self.rate_limiter.reset();
        self.translator.clear_probes();
        self.unavailable.clear();
        self.stats.clear();
        self.total_cache_hits = 0;
        self.traces.clear();
        info!("Market data manager reset");
    }
}
