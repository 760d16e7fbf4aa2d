//! HTTP adapters against a local mock server.
#![cfg(feature = "http")]

use chopscreen::adapters::openai_chat_adapter::OpenAiChatAdapter;
use chopscreen::adapters::yahoo_adapter::YahooAdapter;
use chopscreen::adapters::yahoo_news_adapter::YahooNewsAdapter;
use chopscreen::domain::config_validation::LlmSettings;
use chopscreen::domain::error::DashboardError;
use chopscreen::domain::interval::Interval;
use chopscreen::domain::sentiment::{analyze_sentiment, SentimentOutcome};
use chopscreen::ports::chat_port::{ChatPort, ChatRequest};
use chopscreen::ports::data_port::DataPort;
use chopscreen::ports::news_port::{NewsError, NewsPort};
use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod yahoo_chart {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "MSFT", "gmtoffset": -18000},
                "timestamp": [1735828200, 1735914600],
                "indicators": {"quote": [{
                    "open":   [425.5, 421.0],
                    "high":   [426.0, 424.0],
                    "low":    [414.8, 418.1],
                    "close":  [418.6, 423.4],
                    "volume": [16896500, 16662900]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn fetches_and_parses_chart() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v8/finance/chart/MSFT")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("period1".into(), "1735689600".into()),
                Matcher::UrlEncoded("period2".into(), "1751500800".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CHART)
            .create();

        let adapter = YahooAdapter::new(Some(server.url().as_str()), 5).unwrap();
        let series = adapter
            .fetch_ohlcv("MSFT", date(2025, 1, 1), date(2025, 7, 3), Interval::Day)
            .unwrap();

        mock.assert();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].timestamp.date(), date(2025, 1, 2));
        assert_eq!(series.bars()[1].close, 423.4);
    }

    #[test]
    fn not_found_reports_chart_error() {
        let mut server = mockito::Server::new();
        let _chart = server
            .mock("GET", "/v8/finance/chart/NOPE")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#)
            .create();

        let adapter = YahooAdapter::new(Some(server.url().as_str()), 5).unwrap();
        let err = adapter
            .fetch_ohlcv("NOPE", date(2025, 1, 1), date(2025, 7, 3), Interval::Day)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "data fetch failed for NOPE: Not Found: No data found, symbol may be delisted"
        );
    }

    #[test]
    fn server_error_without_payload() {
        let mut server = mockito::Server::new();
        let _chart = server
            .mock("GET", "/v8/finance/chart/MSFT")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body(r#"{"chart":{"result":[],"error":null}}"#)
            .create();

        let adapter = YahooAdapter::new(Some(server.url().as_str()), 5).unwrap();
        let err = adapter
            .fetch_ohlcv("MSFT", date(2025, 1, 1), date(2025, 7, 3), Interval::Day)
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataFetch { .. }));
        assert!(err.to_string().contains("502"));
    }
}

mod yahoo_news {
    use super::*;

    fn mock_lookup(
        server: &mut mockito::Server,
        company: &str,
        body: serde_json::Value,
    ) -> mockito::Mock {
        server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), company.into()),
                Matcher::UrlEncoded("quotesCount".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(body.to_string())
            .create()
    }

    #[test]
    fn resolves_ticker_then_headlines() {
        let mut server = mockito::Server::new();
        let lookup = mock_lookup(&mut server, "Apple", json!({"quotes": [{"symbol": "AAPL"}]}));
        let news = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "AAPL".into()),
                Matcher::UrlEncoded("newsCount".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"news": [
                    {"title": "Apple unveils new chips"},
                    {"title": "  "},
                    {"title": "Services revenue hits record"}
                ]})
                .to_string(),
            )
            .create();

        let adapter = YahooNewsAdapter::new(Some(server.url().as_str()), 5).unwrap();
        let headlines = adapter.headlines("Apple", 10).unwrap();

        lookup.assert();
        news.assert();
        assert_eq!(
            headlines,
            vec!["Apple unveils new chips", "Services revenue hits record"]
        );
    }

    #[test]
    fn unknown_company_has_no_ticker() {
        let mut server = mockito::Server::new();
        let _lookup = mock_lookup(&mut server, "Nowhere Inc", json!({"quotes": []}));

        let adapter = YahooNewsAdapter::new(Some(server.url().as_str()), 5).unwrap();
        assert_eq!(
            adapter.headlines("Nowhere Inc", 10).unwrap_err(),
            NewsError::NoTicker {
                company: "Nowhere Inc".into()
            }
        );
    }

    #[test]
    fn empty_news_and_http_failure() {
        let mut server = mockito::Server::new();
        let _lookup = mock_lookup(&mut server, "Quiet Corp", json!({"quotes": [{"symbol": "QUIET"}]}));
        let _news = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "QUIET".into()))
            .with_status(200)
            .with_body(json!({"news": []}).to_string())
            .create();
        let _broken = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Broken".into()))
            .with_status(500)
            .create();

        let adapter = YahooNewsAdapter::new(Some(server.url().as_str()), 5).unwrap();
        assert_eq!(
            adapter.headlines("Quiet Corp", 10).unwrap_err(),
            NewsError::NoNews {
                ticker: "QUIET".into()
            }
        );
        assert!(matches!(
            adapter.headlines("Broken", 10).unwrap_err(),
            NewsError::Fetch { .. }
        ));
    }
}

mod chat {
    use super::*;

    fn adapter(server: &mockito::Server) -> OpenAiChatAdapter {
        let settings = LlmSettings {
            base_url: server.url(),
            model: "deepseek-chat".into(),
            api_key_env: "UNUSED".into(),
        };
        OpenAiChatAdapter::new(&settings, "test-key".into(), 5).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            system: "You are a helpful stock market assistant.".into(),
            user: "banks".into(),
            temperature: 0.3,
            max_tokens: Some(500),
        }
    }

    #[test]
    fn posts_completion_and_returns_first_choice() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "deepseek-chat",
                "temperature": 0.3,
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": "You are a helpful stock market assistant."},
                    {"role": "user", "content": "banks"}
                ]
            })))
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "JPM - JPMorgan"}}]})
                    .to_string(),
            )
            .create();

        let text = adapter(&server).complete(&request()).unwrap();
        mock.assert();
        assert_eq!(text, "JPM - JPMorgan");
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let mut server = mockito::Server::new();
        let _completion = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(json!({"error": {"message": "Authentication Fails"}}).to_string())
            .create();

        let err = adapter(&server).complete(&request()).unwrap_err();
        assert_eq!(err.to_string(), "chat API error: HTTP 401: Authentication Fails");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new();
        let _completion = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create();

        let err = adapter(&server).complete(&request()).unwrap_err();
        assert!(matches!(err, DashboardError::Chat { reason } if reason == "completion had no choices"));
    }

    #[test]
    fn sentiment_end_to_end_over_http() {
        let mut server = mockito::Server::new();
        let _lookup = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Tesla".into()))
            .with_status(200)
            .with_body(json!({"quotes": [{"symbol": "TSLA"}]}).to_string())
            .create();
        let _news = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "TSLA".into()))
            .with_status(200)
            .with_body(json!({"news": [{"title": "Deliveries beat forecasts"}]}).to_string())
            .create();
        let _completion = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("Deliveries beat forecasts".into()))
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "Bullish."}}]}).to_string())
            .create();

        let news = YahooNewsAdapter::new(Some(server.url().as_str()), 5).unwrap();
        let outcome = analyze_sentiment(&news, &adapter(&server), "Tesla");
        assert_eq!(outcome, SentimentOutcome::Analysis("Bullish.".into()));
    }
}
