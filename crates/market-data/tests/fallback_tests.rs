//! End-to-end behaviour of the tier walk against scripted providers.

mod common;

use std::sync::Arc;

use reportdesk_market_data::{
    FetchOutcome, InfoSource, MarketDataProvider, PreloadGroup, ProviderStatus, SkipReason,
};

use common::{manager, ratios_page, yahoo_chart, yahoo_summary, ScriptedProvider, CLOSES};

fn chart() -> FetchOutcome {
    yahoo_chart(&CLOSES)
}

#[tokio::test]
async fn test_ticker_order_does_not_change_cache_slot() {
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&yahoo]);

    let first = mgr.get_prices(&["AAPL", "MSFT"], "5d", "1d").await;
    assert_eq!(first.len(), 2);
    assert_eq!(yahoo.series_calls(), 2);

    let second = mgr.get_prices(&["MSFT", "AAPL"], "5d", "1d").await;
    assert_eq!(second, first);
    assert_eq!(yahoo.series_calls(), 2);
    assert_eq!(mgr.cache().batch_len(), 1);
}

#[tokio::test]
async fn test_subset_served_from_superset_batch() {
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&yahoo]);

    let full = mgr.get_prices(&["AAPL", "MSFT", "GOOG"], "5d", "1d").await;
    assert_eq!(full.len(), 3);
    let calls = yahoo.series_calls();

    let narrow = mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert_eq!(yahoo.series_calls(), calls);
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow.get("AAPL"), full.get("AAPL"));

    let diag = mgr.diagnostics();
    assert_eq!(diag.cache.total_hits, 1);
    assert_eq!(diag.provider("YAHOO").unwrap().stats.cache_hits, 1);
    assert_eq!(
        mgr.last_trace("AAPL").unwrap().summary(),
        "CACHE: HIT (YAHOO)"
    );
}

#[tokio::test]
async fn test_different_window_is_a_miss() {
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&yahoo]);

    mgr.get_prices(&["AAPL", "MSFT"], "5d", "1d").await;
    mgr.get_prices(&["AAPL"], "1mo", "1d").await;
    assert_eq!(yahoo.series_calls(), 3);
}

#[tokio::test]
async fn test_rewriting_a_batch_leaves_other_hit_counters_alone() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .series(|symbol, _| {
            if symbol.to_string() == "NOPE" {
                FetchOutcome::Empty
            } else {
                yahoo_chart(&CLOSES)
            }
        })
        .build();
    let yahoo = ScriptedProvider::new("YAHOO")
        .series(|symbol, _| {
            if symbol.to_string() == "NOPE" {
                FetchOutcome::Empty
            } else {
                yahoo_chart(&[35.1, 35.4, 34.9, 36.2, 36.0])
            }
        })
        .build();
    let mut mgr = manager(&[&av, &yahoo]);

    // Batch A resolves on Alpha Vantage, batch B only on Yahoo
    let batch_a = mgr.get_prices(&["AAPL", "MSFT"], "5d", "1d").await;
    mgr.get_prices(&["AVAX-USD"], "5d", "1d").await;
    let before = mgr.diagnostics();
    assert_eq!(before.cache.total_hits, 0);
    assert_eq!(before.cache.batch_entries, 2);

    // Resolves to the same key as batch A, so the batch is written again
    let widened = mgr.get_prices(&["AAPL", "MSFT", "NOPE"], "5d", "1d").await;
    assert_eq!(widened, batch_a);

    let again = mgr.get_prices(&["MSFT", "AAPL"], "5d", "1d").await;
    assert_eq!(again, batch_a);

    let after = mgr.diagnostics();
    assert_eq!(after.cache.batch_entries, before.cache.batch_entries);
    assert_eq!(after.cache.single_entries, before.cache.single_entries);
    assert_eq!(after.cache.total_hits, 4);
    assert_eq!(after.provider("ALPHA_VANTAGE").unwrap().stats.cache_hits, 4);
    assert_eq!(
        after.provider("YAHOO").unwrap().stats.cache_hits,
        before.provider("YAHOO").unwrap().stats.cache_hits
    );
    assert_eq!(av.series_calls(), 3);
}

#[tokio::test]
async fn test_repeated_rate_limits_open_the_circuit() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(FetchOutcome::RateLimited)
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    // Each ticker costs one call plus one retry until the circuit opens
    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert_eq!(av.series_calls(), 2);
    assert!(!mgr.is_circuit_open("ALPHA_VANTAGE"));

    mgr.get_prices(&["MSFT"], "5d", "1d").await;
    assert_eq!(av.series_calls(), 4);
    assert!(mgr.is_circuit_open("ALPHA_VANTAGE"));

    let table = mgr.get_prices(&["GOOG"], "5d", "1d").await;
    assert!(table.contains("GOOG"));
    assert_eq!(av.series_calls(), 4);
    assert_eq!(yahoo.series_calls(), 3);

    let trace = mgr.last_trace("GOOG").unwrap();
    assert_eq!(
        trace.skip_reasons()[0].1,
        &SkipReason::CircuitBreakerOpen
    );

    let diag = mgr.diagnostics();
    let av_diag = diag.provider("ALPHA_VANTAGE").unwrap();
    assert_eq!(av_diag.status, ProviderStatus::RateLimited);
    assert_eq!(av_diag.breaker.consecutive_exhaustion_count, 2);
    assert_eq!(av_diag.stats.calls, 4);
    assert_eq!(av_diag.stats.errors, 4);
}

#[tokio::test]
async fn test_quota_exhaustion_trips_immediately() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(FetchOutcome::QuotaExhausted)
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    let table = mgr.get_prices(&["AAPL", "GOOG", "MSFT"], "5d", "1d").await;
    assert_eq!(table.len(), 3);
    assert_eq!(av.series_calls(), 1);
    assert_eq!(yahoo.series_calls(), 3);
    assert!(mgr.is_circuit_open("ALPHA_VANTAGE"));
}

#[tokio::test]
async fn test_rate_limit_retry_can_succeed() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .series(|_, n| {
            if n == 0 {
                FetchOutcome::RateLimited
            } else {
                yahoo_chart(&CLOSES)
            }
        })
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    let table = mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert_eq!(table.get("AAPL").unwrap().source(), "ALPHA_VANTAGE");
    assert_eq!(av.series_calls(), 2);
    assert_eq!(yahoo.series_calls(), 0);

    let state = mgr.diagnostics().provider("ALPHA_VANTAGE").unwrap().breaker;
    assert_eq!(state.consecutive_exhaustion_count, 0);
    assert!(!state.circuit_open);
}

#[tokio::test]
async fn test_no_mapping_reaches_secondary_without_penalty() {
    // AVAX-USD has no Alpha Vantage crypto code
    let av = ScriptedProvider::new("ALPHA_VANTAGE").always(chart()).build();
    let yahoo = ScriptedProvider::new("YAHOO")
        .always(yahoo_chart(&[35.1, 35.4, 34.9, 36.2, 36.0]))
        .build();
    let mut mgr = manager(&[&av, &yahoo]);

    let first = mgr.get_prices(&["AVAX-USD"], "5d", "1d").await;
    let frame = first.get("AVAX-USD").unwrap();
    assert_eq!(frame.len(), 5);
    assert_eq!(frame.source(), "YAHOO");
    assert_eq!(av.series_calls(), 0);
    assert_eq!(yahoo.series_calls(), 1);
    assert_eq!(
        mgr.last_trace("AVAX-USD").unwrap().summary(),
        "ALPHA_VANTAGE: SKIPPED (NoMapping) -> YAHOO: SUCCESS"
    );

    let diag = mgr.diagnostics();
    let av_diag = diag.provider("ALPHA_VANTAGE").unwrap();
    assert_eq!(av_diag.breaker.consecutive_exhaustion_count, 0);
    assert_eq!(av_diag.stats.errors, 0);

    let repeat = mgr.get_prices(&["AVAX-USD"], "5d", "1d").await;
    assert_eq!(repeat, first);
    assert_eq!(yahoo.series_calls(), 1);
}

#[tokio::test]
async fn test_partial_batch_keeps_resolved_tickers() {
    let yahoo = ScriptedProvider::new("YAHOO")
        .series(|symbol, _| {
            if symbol.to_string() == "DELISTED" {
                FetchOutcome::Empty
            } else {
                yahoo_chart(&CLOSES)
            }
        })
        .build();
    let eastmoney = ScriptedProvider::new("EASTMONEY")
        .series(|symbol, _| {
            if symbol.to_string().ends_with("DELISTED") {
                FetchOutcome::Empty
            } else {
                yahoo_chart(&CLOSES)
            }
        })
        .build();
    let mut mgr = manager(&[&yahoo, &eastmoney]);

    let table = mgr.get_prices(&["AAPL", "DELISTED", "MSFT"], "5d", "1d").await;
    assert_eq!(table.len(), 2);
    assert!(!table.contains("DELISTED"));
    assert_eq!(table.get("AAPL").unwrap().len(), CLOSES.len());
    // Every probe prefix was tried for the unknown ticker
    assert_eq!(eastmoney.series_calls(), 3);

    // Resolved tickers come from cache; only the failure is walked again
    let again = mgr.get_prices(&["AAPL", "DELISTED", "MSFT"], "5d", "1d").await;
    assert_eq!(again, table);
    assert_eq!(yahoo.series_calls(), 4);
}

#[tokio::test]
async fn test_unavailable_provider_is_remembered() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(FetchOutcome::Unavailable("dns error".to_string()))
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    mgr.get_prices(&["AAPL", "GOOG", "MSFT"], "5d", "1d").await;
    assert_eq!(av.series_calls(), 1);
    assert!(mgr.is_unavailable("ALPHA_VANTAGE"));
    assert!(!mgr.is_circuit_open("ALPHA_VANTAGE"));

    let trace = mgr.last_trace("MSFT").unwrap();
    assert_eq!(trace.skip_reasons()[0].1, &SkipReason::Unavailable);

    let diag = mgr.diagnostics();
    let av_diag = diag.provider("ALPHA_VANTAGE").unwrap();
    assert_eq!(av_diag.status, ProviderStatus::Unavailable);
    assert_eq!(av_diag.unavailable.as_deref(), Some("dns error"));
}

#[tokio::test]
async fn test_unconfigured_provider_never_called() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(chart())
        .not_configured()
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    let table = mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert_eq!(table.get("AAPL").unwrap().source(), "YAHOO");
    assert_eq!(av.series_calls(), 0);
    assert_eq!(
        mgr.diagnostics().provider("ALPHA_VANTAGE").unwrap().status,
        ProviderStatus::NotConfigured
    );
}

#[tokio::test]
async fn test_implausible_price_falls_back() {
    // AAPL at 42 is far below its sanity floor
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(yahoo_chart(&[41.0, 42.0]))
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    let table = mgr.get_prices(&["AAPL"], "5d", "1d").await;
    let frame = table.get("AAPL").unwrap();
    assert_eq!(frame.source(), "YAHOO");
    assert_eq!(frame.len(), CLOSES.len());
    assert_eq!(
        mgr.diagnostics().provider("ALPHA_VANTAGE").unwrap().stats.errors,
        1
    );
}

#[tokio::test]
async fn test_malformed_payload_advances_walk() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(FetchOutcome::Malformed("unexpected token".to_string()))
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    let table = mgr.get_prices(&["AAPL", "MSFT"], "5d", "1d").await;
    assert_eq!(table.len(), 2);
    // Malformed is not an exhaustion signal
    assert_eq!(av.series_calls(), 2);
    assert!(!mgr.is_circuit_open("ALPHA_VANTAGE"));
    assert!(!mgr.is_unavailable("ALPHA_VANTAGE"));
}

#[tokio::test]
async fn test_probe_result_is_memoized() {
    let eastmoney = ScriptedProvider::new("EASTMONEY")
        .series(|symbol, _| {
            if symbol.to_string() == "105.ZZZZ" {
                yahoo_chart(&CLOSES)
            } else {
                FetchOutcome::Empty
            }
        })
        .build();
    let mut mgr = manager(&[&eastmoney]);

    assert!(mgr.get_prices(&["ZZZZ"], "5d", "1d").await.contains("ZZZZ"));
    assert_eq!(eastmoney.seen(), vec!["106.ZZZZ", "105.ZZZZ"]);

    assert!(mgr.get_prices(&["ZZZZ"], "1mo", "1d").await.contains("ZZZZ"));
    assert_eq!(eastmoney.seen(), vec!["106.ZZZZ", "105.ZZZZ", "105.ZZZZ"]);

    mgr.reset();
    mgr.get_prices(&["ZZZZ"], "5d", "1d").await;
    assert_eq!(eastmoney.seen().len(), 5);
}

#[tokio::test]
async fn test_preload_warms_subset_lookups() {
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&yahoo]);

    let groups = vec![
        PreloadGroup::new("megacaps", ["AAPL", "MSFT"]),
        PreloadGroup::new("search", ["MSFT", "GOOG"]),
    ];
    let warmed = mgr.preload(&groups, "5d", "1d").await;
    assert_eq!(warmed.len(), 3);
    assert_eq!(yahoo.series_calls(), 3);

    let table = mgr.get_prices(&["GOOG", "AAPL"], "5d", "1d").await;
    assert_eq!(table.len(), 2);
    assert_eq!(yahoo.series_calls(), 3);
}

#[tokio::test]
async fn test_info_from_provider_then_cache() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE").always(chart()).build();
    let yahoo = ScriptedProvider::new("YAHOO")
        .always(chart())
        .info(|_, _| yahoo_summary("Apple Inc.", 190.5, true))
        .build();
    let mut mgr = manager(&[&av, &yahoo]);

    let info = mgr.get_info("AAPL").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::Provider("YAHOO".to_string())));
    assert_eq!(info.name.as_deref(), Some("Apple Inc."));
    assert_eq!(info.current_price, Some(190.5));
    assert_eq!(info.forward_pe, Some(28.5));
    assert_eq!(av.info_calls(), 0);
    assert_eq!(
        mgr.last_trace("AAPL").unwrap().skip_reasons()[0].1,
        &SkipReason::InfoNotSupported
    );

    let again = mgr.get_info("AAPL").await.unwrap();
    assert_eq!(again, info);
    assert_eq!(yahoo.info_calls(), 1);
    assert_eq!(mgr.diagnostics().cache.info_entries, 1);
}

#[tokio::test]
async fn test_info_rejects_implausible_price() {
    let yahoo = ScriptedProvider::new("YAHOO")
        .always(chart())
        .info(|_, _| yahoo_summary("Apple Inc.", 4.0, true))
        .build();
    let mut mgr = manager(&[&yahoo]);

    // Falls back to the price waterfall instead of trusting the bad quote
    let info = mgr.get_info("AAPL").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::PriceFrame));
    assert_eq!(info.current_price, Some(194.0));
}

#[tokio::test]
async fn test_info_derived_and_enriched() {
    let yahoo = ScriptedProvider::new("YAHOO")
        .always(chart())
        .info(|_, _| FetchOutcome::Empty)
        .build();
    let ratios = ScriptedProvider::new("STOCK_ANALYSIS")
        .info(|_, _| ratios_page(31.25, 147.25))
        .info_only()
        .build();
    let mut mgr = manager(&[&yahoo]).with_enrichment(ratios.clone() as Arc<dyn MarketDataProvider>);

    let info = mgr.get_info("AAPL").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::PriceFrameEnriched));
    assert_eq!(info.name.as_deref(), Some("Apple"));
    assert_eq!(info.current_price, Some(194.0));
    assert_eq!(info.previous_close, Some(193.0));
    assert_eq!(info.forward_pe, Some(31.25));
    assert!((info.return_on_equity.unwrap() - 1.4725).abs() < 1e-9);

    assert_eq!(yahoo.series_calls(), 1);
    assert_eq!(ratios.seen(), vec!["aapl"]);

    // The 3mo daily frame fetched for derivation is now cached
    assert!(mgr.get_prices(&["AAPL"], "3mo", "1d").await.contains("AAPL"));
    assert_eq!(yahoo.series_calls(), 1);

    let diag = mgr.diagnostics();
    let enrichment = diag.provider("STOCK_ANALYSIS").unwrap();
    assert_eq!(enrichment.tier, None);
    assert_eq!(enrichment.stats.calls, 1);
}

#[tokio::test]
async fn test_info_derived_from_cached_prices() {
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&yahoo]);

    mgr.get_prices(&["MSFT"], "5d", "1d").await;
    let info = mgr.get_info("MSFT").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::PriceFrame));
    assert_eq!(info.name.as_deref(), Some("Microsoft"));
    assert_eq!(yahoo.series_calls(), 1);

    let change = info.change_pct.unwrap();
    assert!((change - (194.0 - 193.0) / 193.0 * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_cached_prices_answer_before_secondary_info_tier() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(chart())
        .info(|_, _| FetchOutcome::Empty)
        .build();
    let yahoo = ScriptedProvider::new("YAHOO")
        .always(chart())
        .info(|_, _| yahoo_summary("Microsoft Corporation", 410.0, true))
        .build();
    let mut mgr = manager(&[&av, &yahoo]);

    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    let info = mgr.get_info("AAPL").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::PriceFrame));
    assert_eq!(info.current_price, Some(194.0));
    assert_eq!(av.info_calls(), 1);
    assert_eq!(yahoo.info_calls(), 0);

    // Nothing cached for MSFT, so the walk continues to Yahoo
    let info = mgr.get_info("MSFT").await.unwrap();
    assert_eq!(info.source, Some(InfoSource::Provider("YAHOO".to_string())));
    assert_eq!(av.info_calls(), 2);
    assert_eq!(yahoo.info_calls(), 1);
    assert_eq!(
        mgr.last_trace("MSFT").unwrap().summary(),
        "ALPHA_VANTAGE: ERROR (empty) -> YAHOO: SUCCESS"
    );
}

#[tokio::test]
async fn test_batch_info_only_contains_resolved() {
    let yahoo = ScriptedProvider::new("YAHOO")
        .series(|symbol, _| {
            if symbol.to_string() == "AAPL" {
                yahoo_chart(&CLOSES)
            } else {
                FetchOutcome::Empty
            }
        })
        .build();
    let mut mgr = manager(&[&yahoo]);

    let infos = mgr.batch_get_info(&["AAPL", "NOPE", "AAPL"]).await;
    assert_eq!(infos.len(), 1);
    assert!(infos.contains_key("AAPL"));
}

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE")
        .always(FetchOutcome::QuotaExhausted)
        .build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert!(mgr.is_circuit_open("ALPHA_VANTAGE"));

    mgr.reset();
    let diag = mgr.diagnostics();
    assert!(diag
        .providers
        .iter()
        .all(|p| p.status == ProviderStatus::Active && p.stats.calls == 0));
    assert_eq!(diag.cache.single_entries, 0);
    assert_eq!(diag.cache.total_hits, 0);
    assert!(mgr.last_trace("AAPL").is_none());

    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    assert_eq!(av.series_calls(), 2);
}

#[tokio::test]
async fn test_diagnostics_summary_line() {
    let av = ScriptedProvider::new("ALPHA_VANTAGE").not_configured().build();
    let yahoo = ScriptedProvider::new("YAHOO").always(chart()).build();
    let mut mgr = manager(&[&av, &yahoo]);

    mgr.get_prices(&["AAPL"], "5d", "1d").await;
    mgr.get_prices(&["AAPL"], "5d", "1d").await;

    assert_eq!(
        mgr.diagnostics().summary(),
        "ALPHA_VANTAGE=not_configured(calls 0, errors 0) YAHOO=active(calls 1, errors 0) | cache hits 1"
    );
}
