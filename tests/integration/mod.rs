//! Integration tests for the dutching sniper.
//!
//! These run the full loop over recorded snapshots written to a temporary
//! file, with the paper gateway standing in for an exchange.

use std::io::Write;
use std::time::Duration;

use dutch_sniper::config::Config;
use dutch_sniper::error::{BotError, FeedError};
use dutch_sniper::market::ReplayFeed;
use dutch_sniper::sniper::{AbortReason, Phase, Sniper, Termination};
use dutch_sniper::trading::{PaperGateway, PlaceResultCode, Side};
use dutch_sniper::utils::ShutdownFlag;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

const MARKET: &str = "1.20771785";

/// Build a config the same way the binary does, from environment pairs.
fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("MARKET_ID".to_string(), MARKET.to_string()),
        ("REFRESH_SECONDS".to_string(), "7".to_string()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    let config: Config = envy::from_iter(vars).expect("valid test config");
    config.validate().expect("config passes validation");
    config
}

fn recording(snapshots: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "[{}]", snapshots.join(",")).expect("write recording");
    file
}

fn back_book(status: &str, delay: u32, prices: [&str; 3], available: [&str; 3]) -> String {
    format!(
        r#"{{"market_id": "{MARKET}", "status": "{status}", "delay": {delay}, "runners": [
            {{"selection_id": 58805, "name": "Favourite", "total_matched": "1200.50",
              "best_to_back": {{"price": "{}", "size": "{}"}}}},
            {{"selection_id": 214217, "name": "Second", "total_matched": "310.00",
              "best_to_back": {{"price": "{}", "size": "{}"}}}},
            {{"selection_id": 47972, "name": "Outsider", "total_matched": "85.25",
              "best_to_back": {{"price": "{}", "size": "{}"}}}}
        ]}}"#,
        prices[0], available[0], prices[1], available[1], prices[2], available[2]
    )
}

fn balanced() -> String {
    back_book("ACTIVE", 0, ["2.0", "3.0", "6.0"], ["100", "100", "100"])
}

fn underround() -> String {
    back_book("ACTIVE", 0, ["2.0", "3.2", "7.0"], ["100", "100", "100"])
}

async fn sniper_for(
    file: &NamedTempFile,
    config: &Config,
) -> Sniper<ReplayFeed, PaperGateway> {
    let feed = ReplayFeed::from_path(file.path()).await.expect("load recording");
    Sniper::from_config(config, feed, PaperGateway::new())
}

#[tokio::test(start_paused = true)]
async fn replay_fires_paper_shot_on_underround() {
    let file = recording(&[balanced(), balanced(), underround()]);
    let config = test_config(&[]);
    let sniper = sniper_for(&file, &config).await;

    let summary = sniper.run(ShutdownFlag::never()).await.unwrap();

    let Termination::Done(report) = summary.termination else {
        panic!("expected a shot, got {:?}", summary.termination);
    };
    assert_eq!(report.gateway, "paper");
    assert!(!report.live);
    assert_eq!(report.instructions.len(), 3);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.result_code == PlaceResultCode::Simulated));
    assert_eq!(report.total_stake().round_dp(3), dec!(13.375));
    assert_eq!(report.instructions[2].stake, dec!(2));

    assert_eq!(summary.state.phase, Phase::Done);
    assert_eq!(summary.state.polls, 3);
    assert_eq!(sniper.provider().served(), 3);
}

#[tokio::test(start_paused = true)]
async fn replay_without_liquidity_runs_until_close() {
    let thin = back_book("ACTIVE", 0, ["2.0", "3.2", "7.0"], ["100", "100", "1.00"]);
    let closed = back_book("CLOSED", 0, ["2.0", "3.2", "7.0"], ["100", "100", "1.00"]);
    let file = recording(&[thin.clone(), thin, closed]);
    let config = test_config(&[]);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    assert_eq!(summary.termination, Termination::Aborted(AbortReason::Closed));
    assert_eq!(summary.state.opportunities, 2);
    assert_eq!(summary.state.rejections, 2);
    assert!(!summary.state.shot_fired);
}

#[tokio::test(start_paused = true)]
async fn replay_suspension_then_recovery() {
    let suspended = back_book("SUSPENDED", 0, ["2.0", "3.0", "6.0"], ["100", "100", "100"]);
    let file = recording(&[balanced(), suspended, underround()]);
    let config = test_config(&[("ABORT_ON_SUSPEND", "false")]);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    assert!(matches!(summary.termination, Termination::Done(_)));
    assert_eq!(summary.state.polls, 3);
}

#[tokio::test(start_paused = true)]
async fn replay_in_play_aborts() {
    let in_play = back_book("ACTIVE", 5, ["2.0", "3.2", "7.0"], ["100", "100", "100"]);
    let file = recording(&[balanced(), in_play]);
    let config = test_config(&[]);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    assert_eq!(summary.termination, Termination::Aborted(AbortReason::InPlay));
}

#[tokio::test(start_paused = true)]
async fn replay_skips_bad_price_and_keeps_polling() {
    let bad = back_book("ACTIVE", 0, ["2.0", "-3.2", "7.0"], ["100", "100", "100"]);
    let file = recording(&[bad, underround()]);
    let config = test_config(&[]);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    assert!(matches!(summary.termination, Termination::Done(_)));
    assert_eq!(summary.state.polls, 2);
}

#[tokio::test(start_paused = true)]
async fn replay_evaluates_inactive_market() {
    let inactive = back_book("INACTIVE", 0, ["2.0", "3.2", "7.0"], ["100", "100", "100"]);
    let file = recording(&[inactive]);
    let config = test_config(&[("ABORT_ON_SUSPEND", "true")]);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    assert!(matches!(summary.termination, Termination::Done(_)));
    assert_eq!(summary.state.polls, 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_recording_is_a_feed_error() {
    let file = recording(&[balanced(), balanced()]);
    let config = test_config(&[]);

    let err = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BotError::Feed(FeedError::Exhausted { served: 2, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn held_recording_polls_until_cancelled() {
    let file = recording(&[balanced()]);
    let config = test_config(&[]);
    let feed = ReplayFeed::from_path(file.path())
        .await
        .unwrap()
        .hold_last(true);
    let sniper = Sniper::from_config(&config, feed, PaperGateway::new());
    let (tx, flag) = ShutdownFlag::new();

    let cancel = async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send(true).unwrap();
    };
    let (summary, _) = tokio::join!(sniper.run(flag), cancel);
    let summary = summary.unwrap();

    assert_eq!(summary.termination, Termination::Cancelled);
    // polls at 0, 7, 14, 21 and 28
    assert_eq!(summary.state.polls, 5);
    assert!(summary.state.last_overround.is_some());
}

#[tokio::test(start_paused = true)]
async fn lay_config_fires_on_overbroke_book() {
    let overbroke = format!(
        r#"{{"market_id": "{MARKET}", "status": "ACTIVE", "runners": [
            {{"selection_id": 1, "best_to_back": {{"price": "1.55", "size": "40"}},
              "best_to_lay": {{"price": "1.6", "size": "40"}}}},
            {{"selection_id": 2, "best_to_back": {{"price": "1.95", "size": "40"}},
              "best_to_lay": {{"price": "2.0", "size": "40"}}}}
        ]}}"#
    );
    let file = recording(&[overbroke]);
    let config = test_config(&[("BET_SIDE", "L")]);
    assert_eq!(config.bet_side, Side::Lay);

    let summary = sniper_for(&file, &config)
        .await
        .run(ShutdownFlag::never())
        .await
        .unwrap();

    let Termination::Done(report) = summary.termination else {
        panic!("expected lay shot");
    };
    assert!(report.instructions.iter().all(|b| b.side == Side::Lay));
    assert_eq!(report.total_stake(), dec!(4.5));
}

#[test]
fn config_defaults_match_sniping_rules() {
    let config = test_config(&[]);
    let risk = config.risk_parameters();

    assert_eq!(risk.minimum_stake, dec!(2));
    assert_eq!(risk.max_total_stake, dec!(50));
    assert_eq!(risk.trigger_margin, dec!(1));
    assert_eq!(risk.exclude_over, dec!(1001));
    assert_eq!(risk.side, Side::Back);
    assert!(!risk.bet_in_play);
    assert_eq!(config.poll_interval(), Duration::from_secs(7));
}
