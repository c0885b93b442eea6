//! Shared test doubles for the pipeline and governor suites.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use time::{Date, Duration, Month};
use tickview_core::{
    HistoryRequest, MarketDataClient, RawPoint, RawSeries, SourceError, TimeRange,
};

/// Client that replays scripted answers and records every request it sees.
///
/// Once the script runs out it answers with an empty table.
pub struct ScriptedClient {
    answers: Mutex<VecDeque<Result<Vec<RawPoint>, SourceError>>>,
    seen: Mutex<Vec<HistoryRequest>>,
}

impl ScriptedClient {
    pub fn new(answers: Vec<Result<Vec<RawPoint>, SourceError>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Answers every request with `rows`.
    pub fn always(rows: Vec<RawPoint>) -> Arc<Self> {
        Self::new(vec![Ok(rows); 32])
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().expect("seen lock").len()
    }

    pub fn ranges(&self) -> Vec<TimeRange> {
        self.seen
            .lock()
            .expect("seen lock")
            .iter()
            .map(|req| req.range)
            .collect()
    }
}

impl MarketDataClient for ScriptedClient {
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawSeries, SourceError>> + Send + 'a>> {
        self.seen.lock().expect("seen lock").push(req.clone());
        let answer = self
            .answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { answer.map(|rows| RawSeries::new(req.ticker, "USD", rows)) })
    }
}

pub fn day(offset: i64) -> Date {
    Date::from_calendar_date(2024, Month::January, 2).expect("date") + Duration::days(offset)
}

/// `count` consecutive valid rows starting at 100.00 and rising by 1.
pub fn rows(count: usize) -> Vec<RawPoint> {
    (0..count)
        .map(|i| {
            RawPoint::new(
                Some(day(i as i64)),
                Some(100.0 + i as f64),
                Some(1_000 * (i as u64 + 1)),
            )
        })
        .collect()
}
