use crate::common::{BrowserScript, NOW, ScriptedFactory, fixed_clock};
use bank_agent::agent::Agent;
use bank_agent::agent::extractor::{FieldExtractor, LocatorKind};
use bank_agent::agent::profile::profile_for;
use bank_agent::browser::config::BrowserConfig;
use bank_agent::browser::session::BrowserSession;
use bank_agent::error::AppError;
use bank_agent::presentation::instrument::{Bank, PriceType, find_by_code, instruments_for_type};
use bank_agent::presentation::price::PriceSide;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn agent(script: &Arc<BrowserScript>, price_type: PriceType) -> Agent {
    Agent::new(
        Bank::Sber,
        price_type,
        ScriptedFactory::shared(script),
        BrowserConfig::default(),
        fixed_clock(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_scrapes_every_currency_in_batches_of_five() {
    let script = BrowserScript::new();
    script.price_everything(PriceType::Currency, "90,50 ₽", "92,00 ₽");

    let outcome = agent(&script, PriceType::Currency).scrape().await.unwrap();

    let expected = instruments_for_type(Bank::Sber, PriceType::Currency);
    assert_eq!(outcome.observations.len(), expected.len());
    assert_eq!(outcome.batches, expected.len().div_ceil(5));
    assert_eq!(outcome.failed_batches, 0);
    assert!(outcome.omitted.is_empty());

    let usd = &outcome.observations["USD"];
    assert_eq!(usd.name, "Доллар США");
    assert_eq!(usd.buy_price, dec!(90.50));
    assert_eq!(usd.sell_price, dec!(92.00));
    assert_eq!(usd.captured_at_millis, NOW);

    let navigations = script.navigations();
    assert_eq!(navigations.len(), outcome.batches);
    assert!(navigations[0].contains("currency=USD&currency=EUR"));
    assert_eq!(script.opens(), 1);
    assert_eq!(script.quits(), 1);
}

#[tokio::test]
async fn test_partial_last_batch_is_padded() {
    let script = BrowserScript::new();
    script.price_everything(PriceType::Currency, "1", "2");

    let currencies = instruments_for_type(Bank::Sber, PriceType::Currency);
    let six = currencies.into_iter().take(6).collect::<Vec<_>>();
    let sixth = six[5].code;
    let outcome = agent(&script, PriceType::Currency)
        .with_instruments(six)
        .scrape()
        .await
        .unwrap();

    assert_eq!(outcome.batches, 2);
    assert_eq!(outcome.observations.len(), 6);
    let last = script.navigations().pop().unwrap();
    assert!(last.contains(&format!(
        "currency={sixth}&currency=&currency=&currency=&currency=&package"
    )));
}

#[tokio::test]
async fn test_metal_page_is_loaded_once() {
    let script = BrowserScript::new();
    script.price_everything(PriceType::Metal, "7 500,00", "8 100,00");

    let outcome = agent(&script, PriceType::Metal).scrape().await.unwrap();

    assert_eq!(outcome.observations.len(), 4);
    assert_eq!(outcome.observations["GOLD"].name, "Золото");
    assert_eq!(outcome.observations["GOLD"].buy_price, dec!(7500.00));
    assert_eq!(
        script.navigations(),
        vec!["https://www.sberbank.ru/retail/ru/quotes/metalbeznal?tab=online".to_string()]
    );
}

#[tokio::test]
async fn test_fallback_locator_is_used_when_primary_times_out() {
    let script = BrowserScript::new();
    let usd = find_by_code(PriceType::Currency, "USD").unwrap();
    script.set_fallback(PriceType::Currency, usd, PriceSide::Buy, "88,10");
    script.set_primary(PriceType::Currency, usd, PriceSide::Sell, "91,30");

    let outcome = agent(&script, PriceType::Currency)
        .with_instruments(vec![usd])
        .scrape()
        .await
        .unwrap();

    let observation = &outcome.observations["USD"];
    assert_eq!(observation.buy_price, dec!(88.10));
    assert_eq!(observation.sell_price, dec!(91.30));
}

#[tokio::test]
async fn test_instrument_missing_a_side_is_omitted() {
    let script = BrowserScript::new();
    let usd = find_by_code(PriceType::Currency, "USD").unwrap();
    let eur = find_by_code(PriceType::Currency, "EUR").unwrap();
    script.set_primary(PriceType::Currency, usd, PriceSide::Buy, "90");
    script.set_primary(PriceType::Currency, usd, PriceSide::Sell, "—");
    script.set_primary(PriceType::Currency, eur, PriceSide::Buy, "98");
    script.set_primary(PriceType::Currency, eur, PriceSide::Sell, "99");

    let outcome = agent(&script, PriceType::Currency)
        .with_instruments(vec![usd, eur])
        .scrape()
        .await
        .unwrap();

    assert!(!outcome.observations.contains_key("USD"));
    assert!(outcome.observations.contains_key("EUR"));
    assert_eq!(outcome.omitted, vec!["USD".to_string()]);
}

#[tokio::test]
async fn test_navigation_failure_skips_only_that_batch() {
    let script = BrowserScript::new();
    script.price_everything(PriceType::Currency, "10", "11");
    script.fail_urls_containing("currency=USD");

    let outcome = agent(&script, PriceType::Currency).scrape().await.unwrap();

    assert_eq!(outcome.failed_batches, 1);
    assert_eq!(outcome.omitted.len(), 5);
    assert!(!outcome.observations.contains_key("USD"));
    let total = instruments_for_type(Bank::Sber, PriceType::Currency).len();
    assert_eq!(outcome.observations.len(), total - 5);
    assert_eq!(script.navigations().len(), outcome.batches);
    assert_eq!(script.quits(), 1);
}

#[tokio::test]
async fn test_startup_failure_is_fatal_and_nothing_leaks() {
    let script = BrowserScript::new();
    script.fail_startup("chromedriver: not found");

    let result = agent(&script, PriceType::Currency).scrape().await;

    assert!(matches!(result, Err(AppError::SessionStartup(_))));
    assert!(script.navigations().is_empty());
    assert_eq!(script.quits(), 0);
}

#[tokio::test]
async fn test_no_instruments_means_no_browser() {
    let script = BrowserScript::new();

    let outcome = agent(&script, PriceType::Currency)
        .with_instruments(Vec::new())
        .scrape()
        .await
        .unwrap();

    assert!(outcome.observations.is_empty());
    assert_eq!(outcome.batches, 0);
    assert_eq!(script.opens(), 0);
}

#[tokio::test]
async fn test_run_scrape_returns_map_keyed_by_code() {
    let script = BrowserScript::new();
    script.price_everything(PriceType::Metal, "1", "2");

    let prices = agent(&script, PriceType::Metal).run_scrape().await.unwrap();

    let mut codes: Vec<_> = prices.keys().cloned().collect();
    codes.sort();
    assert_eq!(codes, vec!["GOLD", "PALLADIUM", "PLATINUM", "SILVER"]);
    assert_eq!(script.quits(), 1);
}

#[tokio::test]
async fn test_browser_is_quit_when_a_scrape_panics() {
    let script = BrowserScript::new();
    script.panic_on_query();
    let agent = Arc::new(agent(&script, PriceType::Metal));

    let joined = tokio::spawn(async move { agent.scrape().await }).await;

    assert!(joined.unwrap_err().is_panic());
    assert_eq!(script.opens(), 1);
    assert_eq!(script.wait_for_quits(1).await, 1);
}

#[tokio::test]
async fn test_browser_is_quit_when_a_scrape_is_cancelled() {
    let script = BrowserScript::new();
    script.hang_on_query();
    let agent = agent(&script, PriceType::Metal);

    let result = tokio::time::timeout(Duration::from_millis(20), agent.scrape()).await;

    assert!(result.is_err());
    assert_eq!(script.navigations().len(), 1);
    assert_eq!(script.wait_for_quits(1).await, 1);
}

#[tokio::test]
async fn test_fallback_hit_reports_its_locator() {
    let script = BrowserScript::new();
    let usd = find_by_code(PriceType::Currency, "USD").unwrap();
    script.set_fallback(PriceType::Currency, usd, PriceSide::Buy, "88,10");
    script.set_primary(PriceType::Currency, usd, PriceSide::Sell, "91,30");

    let profile = profile_for(Bank::Sber, PriceType::Currency).unwrap();
    let mut session = BrowserSession::new(ScriptedFactory::shared(&script), BrowserConfig::default());
    session.create().await.unwrap();
    session.navigate("https://bank.example/rates").await.unwrap();
    let extractor = FieldExtractor::new(profile);

    let buy = extractor
        .extract_with_source(&session, usd, PriceSide::Buy)
        .await
        .unwrap();
    assert_eq!(buy, (dec!(88.10), LocatorKind::Fallback));

    let sell = extractor
        .extract_with_source(&session, usd, PriceSide::Sell)
        .await
        .unwrap();
    assert_eq!(sell, (dec!(91.30), LocatorKind::Primary));

    session.close().await;
}

#[tokio::test]
async fn test_extraction_failures_are_typed() {
    let script = BrowserScript::new();
    let usd = find_by_code(PriceType::Currency, "USD").unwrap();
    script.set_primary(PriceType::Currency, usd, PriceSide::Sell, "н/д");

    let profile = profile_for(Bank::Sber, PriceType::Currency).unwrap();
    let mut session = BrowserSession::new(ScriptedFactory::shared(&script), BrowserConfig::default());
    session.create().await.unwrap();
    session.navigate("https://bank.example/rates").await.unwrap();
    let extractor = FieldExtractor::new(profile);

    let missing = extractor
        .extract_with_source(&session, usd, PriceSide::Buy)
        .await;
    assert!(matches!(missing, Err(AppError::ElementNotFound(_))));

    let garbled = extractor
        .extract_with_source(&session, usd, PriceSide::Sell)
        .await;
    assert!(matches!(garbled, Err(AppError::ElementParse(_))));
    assert_eq!(extractor.extract(&session, usd, PriceSide::Sell).await, None);

    session.close().await;
}
