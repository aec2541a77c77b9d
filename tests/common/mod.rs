#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use newscheck::api::client::Backend;
use newscheck::api::models::{
    AnalysisRequest, AnalysisResult, HealthResponse, HistoryPage, HistoryQuery, HistoryRecord,
};
use newscheck::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Analyze(AnalysisRequest),
    History(HistoryQuery),
    Clear,
    Export,
    Health,
}

/// In-memory backend that stores history newest-first, like the real service.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    records: Mutex<Vec<HistoryRecord>>,
    analyze_script: Mutex<VecDeque<Result<AnalysisResult>>>,
    history_gates: Mutex<HashMap<u32, Arc<Notify>>>,
    analyze_gates: Mutex<HashMap<String, Arc<Notify>>>,
    reported_page: Mutex<Option<u32>>,
    fail_history: AtomicBool,
    fail_clear: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(count: usize) -> Self {
        let backend = Self::new();
        for i in 0..count {
            backend.push_record(&format!("story {}", i), if i % 2 == 0 { "Real" } else { "Fake" });
        }
        backend
    }

    pub fn push_record(&self, summary: &str, result: &str) {
        self.records.lock().unwrap().insert(0, record(summary, result));
    }

    pub fn script_analyze(&self, outcome: Result<AnalysisResult>) {
        self.analyze_script.lock().unwrap().push_back(outcome);
    }

    /// Holds `GET /history` for `page` until the returned handle is notified.
    pub fn gate_history(&self, page: u32) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.history_gates.lock().unwrap().insert(page, Arc::clone(&notify));
        notify
    }

    /// Holds `POST /analyze` for `text` until the returned handle is notified.
    /// The scripted outcome is taken when the request arrives, not when it is released.
    pub fn gate_analyze(&self, text: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.analyze_gates.lock().unwrap().insert(text.to_string(), Arc::clone(&notify));
        notify
    }

    /// Makes every history response claim to be `page`, whatever was asked for.
    pub fn report_page(&self, page: Option<u32>) {
        *self.reported_page.lock().unwrap() = page;
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn record(summary: &str, result: &str) -> HistoryRecord {
    HistoryRecord {
        created_at: "2026-10-19 08:30:00".to_string(),
        news_summary: summary.to_string(),
        source_url: None,
        result: result.to_string(),
        method: "Machine Learning".to_string(),
    }
}

pub fn verdict(result: &str) -> AnalysisResult {
    AnalysisResult {
        result: Some(result.to_string()),
        final_label: Some(format!("{} News", result)),
        verification_method: Some("Machine Learning".to_string()),
        confidence: Some(0.75),
        ..Default::default()
    }
}

impl Backend for FakeBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.log(Call::Analyze(request.clone()));
        let scripted = self.analyze_script.lock().unwrap().pop_front();
        let outcome = scripted.unwrap_or_else(|| Ok(verdict("Real")));
        let gate = self.analyze_gates.lock().unwrap().remove(&request.text);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Ok(result) = &outcome {
            let category = result.result.clone().unwrap_or_else(|| "Unverified".to_string());
            self.push_record(&request.text, &category);
        }
        outcome
    }

    async fn history(&self, query: HistoryQuery) -> Result<HistoryPage> {
        self.log(Call::History(query));
        let gate = self.history_gates.lock().unwrap().remove(&query.page);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(AppError::TransportError("connection refused".to_string()));
        }

        let records = self.records.lock().unwrap();
        let offset = (query.page.max(1) as usize - 1) * query.limit as usize;
        let items: Vec<HistoryRecord> = records
            .iter()
            .filter(|r| query.result.is_none_or(|c| r.result == c.as_str()))
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(HistoryPage {
            items,
            page: Some(self.reported_page.lock().unwrap().unwrap_or(query.page)),
        })
    }

    async fn clear_history(&self) -> Result<()> {
        self.log(Call::Clear);
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(AppError::ServerError { status: 500, message: None });
        }
        self.records.lock().unwrap().clear();
        Ok(())
    }

    async fn export_history(&self) -> Result<String> {
        self.log(Call::Export);
        let mut csv = String::from("Date,News Summary,Source,Result,Method\n");
        for r in self.records.lock().unwrap().iter() {
            csv.push_str(&format!("{},{},,{},{}\n", r.created_at, r.news_summary, r.result, r.method));
        }
        Ok(csv)
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.log(Call::Health);
        Ok(HealthResponse { status: "ok".to_string() })
    }
}
