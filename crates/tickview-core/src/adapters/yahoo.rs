use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime, Weekday};

use crate::data_source::{HistoryRequest, MarketDataClient, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, NoopHttpClient};
use crate::{currency_or_default, RawPoint, RawSeries, Ticker, TimeRange};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const NOT_FOUND_CODE: &str = "Not Found";

/// Yahoo Finance chart adapter supporting both real API calls and offline mode.
///
/// With a mock transport (the default) the adapter serves a deterministic
/// synthetic history so the dashboard can run without network access.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    use_real_api: bool,
    timeout_ms: u64,
    headers: BTreeMap<String, String>,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            use_real_api: false,
            timeout_ms: 10_000,
            headers: BTreeMap::from([(
                String::from("referer"),
                String::from("https://finance.yahoo.com/"),
            )]),
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let is_real = !http_client.is_mock();
        Self {
            http_client,
            use_real_api: is_real,
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_offline(&self) -> bool {
        !self.use_real_api
    }

    fn endpoint(req: &HistoryRequest) -> String {
        let base = format!(
            "{CHART_ENDPOINT}/{}?interval=1d&includePrePost=false&events=div%2Csplit",
            urlencoding::encode(req.ticker.as_str())
        );

        match req.range {
            TimeRange::Period { window } => format!("{base}&range={}", window.period_code()),
            TimeRange::Explicit { start, end } => format!(
                "{base}&period1={}&period2={}",
                unix_midnight(start),
                unix_midnight(end)
            ),
        }
    }

    async fn fetch_real_history(&self, req: &HistoryRequest) -> Result<RawSeries, SourceError> {
        let request = HttpRequest::get(Self::endpoint(req))
            .with_headers(&self.headers)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        parse_chart_response(&req.ticker, &response)
    }

    fn fetch_synthetic_history(&self, req: &HistoryRequest) -> RawSeries {
        let (start, end) = match req.range {
            TimeRange::Explicit { start, end } => (start, end),
            TimeRange::Period { window } => {
                match TimeRange::trailing(window, OffsetDateTime::now_utc().date()) {
                    TimeRange::Explicit { start, end } => (start, end),
                    TimeRange::Period { .. } => return RawSeries::empty(req.ticker.clone()),
                }
            }
        };

        RawSeries::new(
            req.ticker.clone(),
            "USD",
            synthetic_rows(&req.ticker, start, end),
        )
    }
}

impl MarketDataClient for YahooAdapter {
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_history(&req).await
            } else {
                Ok(self.fetch_synthetic_history(&req))
            }
        })
    }
}

fn parse_chart_response(ticker: &Ticker, response: &HttpResponse) -> Result<RawSeries, SourceError> {
    let parsed = serde_json::from_str::<YahooChartResponse>(&response.body);

    if !response.is_success() {
        // Unknown tickers come back as 404 with a "Not Found" chart error; that is
        // an empty table, not a transport fault.
        if let Ok(chart) = &parsed {
            if chart.chart.is_not_found() {
                return Ok(RawSeries::empty(ticker.clone()));
            }
        }
        if response.status == 429 {
            return Err(SourceError::rate_limited("yahoo returned status 429"));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo returned status {}",
            response.status
        )));
    }

    let chart = parsed
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?
        .chart;

    if let Some(error) = &chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(RawSeries::empty(ticker.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {}: {}",
            error.code,
            error.description.as_deref().unwrap_or("no description")
        )));
    }

    let Some(result) = chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(RawSeries::empty(ticker.clone()));
    };

    let currency = currency_or_default(result.meta.currency.as_deref());
    let Some(timestamps) = result.timestamp else {
        return Ok(RawSeries::new(ticker.clone(), currency, Vec::new()));
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset.unwrap_or(0);

    let rows = timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let date = OffsetDateTime::from_unix_timestamp(ts.saturating_add(offset))
                .ok()
                .map(OffsetDateTime::date);
            let close = quote.close.get(i).copied().flatten();
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());
            RawPoint::new(date, close, volume)
        })
        .collect();

    Ok(RawSeries::new(ticker.clone(), currency, rows))
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn synthetic_rows(ticker: &Ticker, start: Date, end: Date) -> Vec<RawPoint> {
    let seed = ticker_seed(ticker);
    let base = 40.0 + (seed % 360) as f64;
    let phase = (seed % 17) as f64;

    let mut rows = Vec::new();
    let mut date = start;
    let mut index = 0_u64;
    while date < end {
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let t = index as f64;
            let close = base * (1.0 + 0.12 * ((t + phase) / 9.0).sin() + 0.002 * t);
            let volume = 800_000 + seed.wrapping_mul(index + 1) % 4_000_000;
            rows.push(RawPoint::new(
                Some(date),
                Some((close * 100.0).round() / 100.0),
                Some(volume),
            ));
            index += 1;
        }
        date = date.saturating_add(Duration::days(1));
    }
    rows
}

fn ticker_seed(ticker: &Ticker) -> u64 {
    ticker.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

impl YahooChartData {
    fn is_not_found(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|error| error.code == NOT_FOUND_CODE)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpError;
    use crate::LookbackWindow;
    use std::sync::Mutex;
    use time::Month;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn responding(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "gmtoffset": -14400},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{
                    "open": [250.0, 245.0, 240.0],
                    "close": [248.42, null, 237.93],
                    "volume": [104654200, 121082600, null]
                }]}
            }],
            "error": null
        }
    }"#;

    fn request(range: TimeRange) -> HistoryRequest {
        HistoryRequest::new(Ticker::parse("tsla").expect("ticker"), range)
    }

    fn adapter(client: &Arc<RecordingHttpClient>) -> YahooAdapter {
        YahooAdapter::with_http_client(Arc::clone(client) as Arc<dyn HttpClient>)
    }

    #[tokio::test]
    async fn parses_chart_rows_keeping_missing_fields() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))));
        let table = adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Months(3))))
            .await
            .expect("chart should parse");

        assert_eq!(table.ticker.as_str(), "TSLA");
        assert_eq!(table.currency, "USD");
        assert_eq!(table.len(), 3);

        let first = table.rows[0];
        assert_eq!(
            first.date,
            Some(Date::from_calendar_date(2024, Month::January, 2).expect("date"))
        );
        assert_eq!(first.close, Some(248.42));
        assert_eq!(first.volume, Some(104_654_200));
        assert_eq!(table.rows[1].close, None);
        assert_eq!(table.rows[2].volume, None);
    }

    #[tokio::test]
    async fn period_request_uses_range_parameter() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))));
        adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Months(3))))
            .await
            .expect("chart should parse");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("/chart/TSLA?"));
        assert!(requests[0].url.contains("range=3mo"));
        assert!(requests[0].url.contains("interval=1d"));
        assert_eq!(
            requests[0].headers.get("referer").map(String::as_str),
            Some("https://finance.yahoo.com/")
        );
    }

    #[tokio::test]
    async fn explicit_request_uses_unix_bounds() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))));
        let start = Date::from_calendar_date(2024, Month::January, 1).expect("date");
        let end = Date::from_calendar_date(2024, Month::January, 2).expect("date");
        adapter(&client)
            .history(request(TimeRange::Explicit { start, end }))
            .await
            .expect("chart should parse");

        let url = &client.recorded_requests()[0].url;
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153600"));
        assert!(!url.contains("range="));
    }

    #[tokio::test]
    async fn unknown_ticker_is_an_empty_table() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = Arc::new(RecordingHttpClient::responding(Ok(
            HttpResponse::with_status(404, body),
        )));
        let table = adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Years(1))))
            .await
            .expect("not found maps to empty");
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn server_errors_and_transport_faults_are_errors() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(
            HttpResponse::with_status(500, "oops"),
        )));
        let error = adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Years(1))))
            .await
            .expect_err("500 must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);

        let client = Arc::new(RecordingHttpClient::responding(Err(HttpError::new(
            "connection failed: refused",
        ))));
        let error = adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Years(1))))
            .await
            .expect_err("transport must fail");
        assert!(error.message().contains("connection failed"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_internal_error() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            "<html>not json</html>",
        ))));
        let error = adapter(&client)
            .history(request(TimeRange::period(LookbackWindow::Years(1))))
            .await
            .expect_err("html must fail");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }

    #[tokio::test]
    async fn offline_mode_serves_weekday_rows() {
        let adapter = YahooAdapter::default();
        assert!(adapter.is_offline());

        let start = Date::from_calendar_date(2024, Month::January, 1).expect("date");
        let end = Date::from_calendar_date(2024, Month::January, 8).expect("date");
        let table = adapter
            .history(request(TimeRange::Explicit { start, end }))
            .await
            .expect("offline history");

        assert_eq!(table.len(), 5);
        assert!(table
            .rows
            .iter()
            .all(|row| row.close.is_some_and(|close| close > 0.0)));

        let again = adapter
            .history(request(TimeRange::Explicit { start, end }))
            .await
            .expect("offline history");
        assert_eq!(table, again);
    }
}
