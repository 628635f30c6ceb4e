//! Fallback order, short-circuits and caching of the translation pipeline

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use lexis_cache::{MemoryCache, ResultCache};
use lexis_core::{LanguageCode, Outcome, ProviderSource, TranslationRequest};
use tokio_util::sync::CancellationToken;

use super::doubles::{FailingCache, FakeProvider, Reply, dictionary};
use crate::orchestrator::{OrchestratorBuilder, TranslationOrchestrator};
use crate::tier::{OnDeviceTier, RemoteTier, Tier, TierContext, TierOutcome};

struct Pipeline {
    orchestrator: TranslationOrchestrator,
    on_device: Arc<FakeProvider>,
    remote: Arc<FakeProvider>,
    cache: Arc<MemoryCache>,
}

fn pipeline(on_device: FakeProvider, remote: FakeProvider) -> Pipeline {
    pipeline_with(OrchestratorBuilder::new(), on_device, remote)
}

fn pipeline_with(
    builder: OrchestratorBuilder,
    on_device: FakeProvider,
    remote: FakeProvider,
) -> Pipeline {
    let on_device = Arc::new(on_device);
    let remote = Arc::new(remote);
    let cache = Arc::new(MemoryCache::default());

    // supplied out of order on purpose
    let orchestrator = builder
        .remote(remote.clone())
        .cache(cache.clone())
        .on_device(on_device.clone())
        .dictionary(dictionary())
        .build();

    Pipeline {
        orchestrator,
        on_device,
        remote,
        cache,
    }
}

fn providers() -> (FakeProvider, FakeProvider) {
    (FakeProvider::new("device"), FakeProvider::new("remote"))
}

/// Test 1: single word found in the dictionary
#[tokio::test]
async fn test_dictionary_hit_for_single_word() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("agua", "es", "en", true).await;

    assert!(response.success);
    assert_eq!(response.outcome, Outcome::DictionaryHit);
    assert_eq!(response.provider_source, Some(ProviderSource::Dictionary));
    assert_eq!(response.translated_text.as_deref(), Some("water"));

    let meanings: Vec<&str> = response
        .candidate_meanings
        .iter()
        .map(|m| m.translation.as_str())
        .collect();
    assert_eq!(meanings, vec!["water", "body of water", "rain"]);
    assert!(response.candidate_meanings[0].is_primary);

    assert_eq!(p.on_device.calls(), 0);
    assert_eq!(p.remote.calls(), 0);
}

/// Test 2: only de-en installed, en -> de served through the reverse index
#[tokio::test]
async fn test_reverse_pack_serves_inverse_direction() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("Home", "en", "de", true).await;

    assert_eq!(response.outcome, Outcome::DictionaryHit);
    assert_eq!(response.translated_text.as_deref(), Some("Heim"));

    let cycle: Vec<(usize, &str)> = response
        .candidate_meanings
        .iter()
        .map(|m| (m.current_index, m.translation.as_str()))
        .collect();
    assert_eq!(cycle, vec![(1, "Heim"), (2, "Zuhause")]);
    assert_eq!(p.on_device.calls(), 0);
}

/// Test 3: on-device success never reaches the remote provider
#[tokio::test]
async fn test_on_device_hit_never_calls_remote() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("gato", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::OnDeviceHit);
    assert_eq!(response.provider_source, Some(ProviderSource::OnDeviceModel));
    assert_eq!(response.translated_text.as_deref(), Some("device:gato"));
    assert_eq!(p.on_device.calls(), 1);
    assert_eq!(p.remote.calls(), 0);
}

/// Test 4: missing models stop the pipeline before the remote tier
#[tokio::test]
async fn test_models_not_downloaded_short_circuits() {
    let (device, remote) = providers();
    let p = pipeline(device.without_models(), remote);

    let response = p.orchestrator.translate("gato", "es", "en", true).await;

    assert!(!response.success);
    assert_eq!(response.outcome, Outcome::ModelsNotDownloaded);
    assert!(response.error.unwrap().contains("es -> en"));
    assert_eq!(p.on_device.model_checks.load(Ordering::SeqCst), 1);
    assert_eq!(p.on_device.calls(), 0);
    assert_eq!(p.remote.calls(), 0);
    assert!(p.cache.is_empty().await);
}

/// Test 5: multi-word input skips the dictionary even when a word matches
#[tokio::test]
async fn test_multi_word_skips_dictionary() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("agua fria", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::OnDeviceHit);
    assert!(response.candidate_meanings.is_empty());
    assert_eq!(p.on_device.calls(), 1);
}

/// Test 6: words at the length ceiling are not single words
#[tokio::test]
async fn test_long_word_skips_dictionary() {
    let (device, remote) = providers();
    let p = pipeline_with(
        OrchestratorBuilder::new().single_word_max_chars(4),
        device,
        remote,
    );

    let response = p.orchestrator.translate("agua", "es", "en", true).await;
    assert_eq!(response.outcome, Outcome::OnDeviceHit);
}

/// Test 7: unavailable or unsupported on-device falls through to remote
#[tokio::test]
async fn test_skipped_on_device_falls_to_remote() {
    for device in [
        FakeProvider::new("device").unavailable(),
        FakeProvider::new("device").unsupported(),
    ] {
        let p = pipeline(device, FakeProvider::new("remote"));

        let response = p.orchestrator.translate("gato", "es", "en", true).await;

        assert_eq!(response.outcome, Outcome::RemoteHit);
        assert_eq!(response.provider_source, Some(ProviderSource::RemoteService));
        assert_eq!(p.on_device.calls(), 0);
        assert_eq!(p.on_device.model_checks.load(Ordering::SeqCst), 0);
        assert_eq!(p.remote.calls(), 1);
    }
}

/// Test 8: an on-device error falls through to remote
#[tokio::test]
async fn test_on_device_error_falls_through() {
    let (device, remote) = providers();
    let p = pipeline(device.replying(Reply::Error), remote);

    let response = p.orchestrator.translate("gato", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::RemoteHit);
    assert_eq!(p.on_device.calls(), 1);
    assert_eq!(p.remote.calls(), 1);
}

/// Test 9: a provider exceeding the timeout counts as failed
#[tokio::test]
async fn test_timeout_falls_through() {
    let (device, remote) = providers();
    let p = pipeline_with(
        OrchestratorBuilder::new().provider_timeout(Duration::from_millis(20)),
        device.delayed(Duration::from_millis(500)),
        remote,
    );

    let response = p.orchestrator.translate("gato", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::RemoteHit);
    assert!(response.latency < Duration::from_millis(500));
}

/// Test 10: total failure carries the last observed cause
#[tokio::test]
async fn test_all_failed_reports_last_cause() {
    let (device, remote) = providers();
    let p = pipeline(
        device.replying(Reply::Error),
        remote.replying(Reply::RateLimited),
    );

    let response = p.orchestrator.translate("gato", "es", "en", true).await;

    assert!(!response.success);
    assert_eq!(response.outcome, Outcome::AllFailed);
    let error = response.error.unwrap();
    assert!(error.contains("remote"), "{error}");
    assert!(error.contains("Rate limit exceeded"), "{error}");
    assert!(p.cache.is_empty().await);
}

/// Test 11: an empty pipeline still answers
#[tokio::test]
async fn test_no_tiers_is_all_failed() {
    let orchestrator = TranslationOrchestrator::builder().build();

    let response = orchestrator.translate("gato", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::AllFailed);
    assert!(response.error.is_some());
}

/// Test 12: malformed codes are rejected before any tier
#[tokio::test]
async fn test_invalid_language_code_rejected() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("gato", "e", "en", true).await;

    assert_eq!(response.outcome, Outcome::Rejected);
    assert!(response.error.unwrap().contains("Invalid language code"));
    assert_eq!(p.on_device.calls(), 0);
    assert_eq!(p.remote.calls(), 0);
}

/// Test 13: blank text never reaches a provider
#[tokio::test]
async fn test_blank_text_is_all_failed() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let response = p.orchestrator.translate("  \n", "es", "en", true).await;

    assert_eq!(response.outcome, Outcome::AllFailed);
    assert_eq!(p.on_device.calls(), 0);
}

/// Test 14: second request is served from the cache
#[tokio::test]
async fn test_cache_round_trip() {
    let (device, remote) = providers();
    let p = pipeline(device.unavailable(), remote);

    let first = p.orchestrator.translate("gato", "es", "en", true).await;
    let second = p.orchestrator.translate(" Gato ", "ES", "en", true).await;

    assert_eq!(first.outcome, Outcome::RemoteHit);
    assert_eq!(second.outcome, Outcome::CacheHit);
    assert_eq!(second.provider_source, Some(ProviderSource::Cache));
    assert_eq!(second.translated_text, first.translated_text);
    assert_eq!(p.remote.calls(), 1);

    // the cache-sourced copy is not written back
    let stats = p.cache.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
}

/// Test 15: use_cache=false neither reads nor writes the cache
#[tokio::test]
async fn test_cache_bypass() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    p.orchestrator.translate("gato", "es", "en", false).await;
    let again = p.orchestrator.translate("gato", "es", "en", false).await;

    assert_eq!(again.outcome, Outcome::OnDeviceHit);
    assert_eq!(p.on_device.calls(), 2);
    assert!(p.cache.is_empty().await);
}

/// Test 16: dictionary hits are cached too
#[tokio::test]
async fn test_dictionary_hit_is_cached() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    p.orchestrator.translate("agua", "es", "en", true).await;
    let cached = p.orchestrator.translate("agua", "es", "en", true).await;

    assert_eq!(cached.outcome, Outcome::CacheHit);
    assert_eq!(cached.candidate_meanings.len(), 3);
}

/// Test 17: a request cancelled mid-call discards the provider result
#[tokio::test]
async fn test_cancelled_request_discards_result() {
    let (device, remote) = providers();
    let p = pipeline(device.delayed(Duration::from_millis(100)), remote);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let response = p
        .orchestrator
        .translate_with_cancel("gato", "es", "en", true, &cancel)
        .await;

    assert_eq!(response.outcome, Outcome::AllFailed);
    assert!(response.error.unwrap().contains("cancelled"));
    // the dispatched call completed, nothing after it ran
    assert_eq!(p.on_device.calls(), 1);
    assert_eq!(p.remote.calls(), 0);
    assert!(p.cache.is_empty().await);
}

/// Test 18: already-cancelled requests dispatch nothing
#[tokio::test]
async fn test_pre_cancelled_request() {
    let (device, remote) = providers();
    let p = pipeline(device, remote);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = p
        .orchestrator
        .translate_with_cancel("gato", "es", "en", true, &cancel)
        .await;

    assert_eq!(response.outcome, Outcome::AllFailed);
    assert_eq!(p.on_device.calls(), 0);
}

/// Test 19: one failure does not disable a provider for later requests
#[tokio::test]
async fn test_provider_failure_is_per_request() {
    let (device, remote) = providers();
    let p = pipeline(device.unavailable(), remote.replying(Reply::FlakyOnce));

    let first = p.orchestrator.translate("gato", "es", "en", true).await;
    let second = p.orchestrator.translate("perro", "es", "en", true).await;

    assert_eq!(first.outcome, Outcome::AllFailed);
    assert_eq!(second.outcome, Outcome::RemoteHit);
    assert_eq!(p.remote.calls(), 2);
}

/// Test 20: concurrent requests resolve independently
#[tokio::test]
async fn test_concurrent_requests() {
    let (device, remote) = providers();
    let p = pipeline(device.delayed(Duration::from_millis(5)), remote);
    let orchestrator = Arc::new(p.orchestrator);

    let words = ["gato", "perro", "agua", "casa", "gato", "luna"];
    let handles: Vec<_> = words
        .into_iter()
        .map(|word| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.translate(word, "es", "en", true).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
    assert!(p.cache.len().await >= 4);
}

/// Test 21: a failing cache write never fails the translation
#[tokio::test]
async fn test_cache_write_failure_is_absorbed() {
    let cache = Arc::new(FailingCache::default());
    let remote = Arc::new(FakeProvider::new("remote"));
    let orchestrator = OrchestratorBuilder::new()
        .dictionary(dictionary())
        .remote(remote.clone())
        .cache(cache.clone())
        .build();

    let word = orchestrator.translate("agua", "es", "en", true).await;
    assert!(word.success);
    assert_eq!(word.outcome, Outcome::DictionaryHit);
    assert_eq!(word.translated_text.as_deref(), Some("water"));

    let phrase = orchestrator.translate("el gato negro", "es", "en", true).await;
    assert!(phrase.success);
    assert_eq!(phrase.outcome, Outcome::RemoteHit);
    assert_eq!(phrase.translated_text.as_deref(), Some("remote:el gato negro"));

    assert_eq!(cache.puts.load(Ordering::SeqCst), 2);
}

/// Test 22: unusable providers skip with the provider or pair named
#[tokio::test]
async fn test_tier_skip_reasons() {
    let request = TranslationRequest::new("gato", "es", "en");
    let source = LanguageCode::parse("es").unwrap();
    let target = LanguageCode::parse("en").unwrap();
    let ctx = TierContext {
        request: &request,
        source: &source,
        target: &target,
        single_word: true,
    };

    let remote = RemoteTier::new(
        Arc::new(FakeProvider::new("remote").unavailable()),
        Duration::from_millis(100),
    );
    assert_eq!(
        remote.attempt(&ctx).await,
        TierOutcome::Skip("Provider unavailable: remote".to_string())
    );

    let device = OnDeviceTier::new(
        Arc::new(FakeProvider::new("device").unsupported()),
        Duration::from_millis(100),
    );
    assert_eq!(
        device.attempt(&ctx).await,
        TierOutcome::Skip("Unsupported language pair: es -> en".to_string())
    );
}
