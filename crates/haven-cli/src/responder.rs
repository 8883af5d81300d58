//! Emergency responder that answers free-text questions

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use haven_core::{LLMProvider, RAGEngine, RAGQuery, VectorDocument};
use haven_geo::{aggregate_city, detect_protection_intent, CityExtractor, CityReport, RecordStore};

/// Returned whenever the generator cannot answer
pub const EMERGENCY_FALLBACK: &str = "The emergency assistant is unavailable right now.\n\n\
IMMEDIATE ACTION: Call emergency services 100 (Police), 101 (Medical)";

const RETRIEVAL_TOP_K: usize = 5;
const LOCATIONS_SHOWN: usize = 3;

const INSTRUCTIONS: &str = "You are an AI emergency assistant for Israel safety. \
Provide IMMEDIATE, CLEAR, and ACTIONABLE responses.

INSTRUCTIONS:
- Prioritize SAFETY above all else
- Use SIMPLE markdown formatting ONLY: bold text with single asterisks *like this*
- Start important sections with simple bullet points using -
- Include emergency contact numbers when relevant
- Be calm but supportive
- Include relevant location information
- Keep responses clear and readable";

/// Answers questions from the location table, retrieved context and the LLM
pub struct EmergencyResponder<L: LLMProvider, R: RAGEngine> {
    llm: L,
    rag: Option<R>,
    store: Arc<RecordStore>,
}

impl<L: LLMProvider, R: RAGEngine> EmergencyResponder<L, R> {
    pub fn new(llm: L, store: Arc<RecordStore>) -> Self {
        Self {
            llm,
            rag: None,
            store,
        }
    }

    /// Create with RAG support
    pub fn with_rag(llm: L, rag: R, store: Arc<RecordStore>) -> Self {
        Self {
            llm,
            rag: Some(rag),
            store,
        }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn rag(&self) -> Option<&R> {
        self.rag.as_ref()
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn has_rag(&self) -> bool {
        self.rag.as_ref().is_some_and(|r| r.is_ready())
    }

    /// Answer a question; never fails, degrading to [`EMERGENCY_FALLBACK`]
    pub async fn answer(&self, question: &str) -> String {
        let table = self.store.snapshot();
        let cities = CityExtractor::from_table(&table).extract(question);
        let reports: Vec<CityReport> = cities
            .iter()
            .map(|city| aggregate_city(&table, city))
            .collect();
        debug!(cities = ?cities, "cities mentioned in question");

        let documents = self.retrieve(question).await;
        let context = match &self.rag {
            Some(rag) => rag.build_context(&documents),
            None => String::new(),
        };

        let prompt = build_prompt(question, &context, &reports);

        // the provider's own defaults carry its configured model and timeout
        let mut response = match self.llm.generate(&prompt).await {
            Ok(result) => result.text,
            Err(e) => {
                error!(error = %e, "generation failed, returning fallback");
                return EMERGENCY_FALLBACK.to_string();
            }
        };

        if !documents.is_empty() {
            response.push_str("\n\n*Relevant Locations:*\n");
            for doc in documents.iter().take(LOCATIONS_SHOWN) {
                response.push_str(&location_line(doc));
                response.push('\n');
            }
        }

        let wants_protection = detect_protection_intent(question);
        for report in &reports {
            response.push('\n');
            response.push_str(&format_city_summary(report, wants_protection));
        }

        response
    }

    async fn retrieve(&self, question: &str) -> Vec<VectorDocument> {
        let Some(rag) = self.rag.as_ref().filter(|r| r.is_ready()) else {
            return Vec::new();
        };

        let query = RAGQuery {
            query: question.to_string(),
            top_k: RETRIEVAL_TOP_K,
            ..Default::default()
        };

        match rag.retrieve(&query).await {
            Ok(result) => result.documents,
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without context");
                Vec::new()
            }
        }
    }
}

fn build_prompt(question: &str, context: &str, reports: &[CityReport]) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\nContext: ");
    prompt.push_str(context.trim());

    if !reports.is_empty() {
        prompt.push_str("\n\nCity overview:\n");
        for report in reports {
            prompt.push_str(&format_city_summary(report, false));
        }
    }

    prompt.push_str(&format!("\n\nQuestion: {}\n\nEmergency response:", question));
    prompt
}

/// `- KIND in City (GPS: lat, lon)` with the threat level for threats
fn location_line(doc: &VectorDocument) -> String {
    let text = |key: &str| match doc.metadata.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    };

    let mut line = format!(
        "- {} in {} (GPS: {}, {})",
        text("kind").to_uppercase(),
        text("city"),
        text("lat"),
        text("lon")
    );

    if let Some(Value::String(level)) = doc.metadata.get("threat_level") {
        line.push_str(&format!(" [{}]", level));
    }

    line
}

/// Short city overview; lists safety facilities when `with_facilities`
pub fn format_city_summary(report: &CityReport, with_facilities: bool) -> String {
    let mut summary = format!(
        "*{}:* {} safety facilities, {} threat zones (safety score {})\n",
        report.city,
        report.safety_count(),
        report.threat_count(),
        report.safety_score
    );

    let levels = report.level_counts();
    if !levels.is_empty() {
        let parts: Vec<String> = levels
            .iter()
            .map(|(level, count)| format!("{} x{}", level, count))
            .collect();
        summary.push_str(&format!("- Threats: {}\n", parts.join(", ")));
    }

    if with_facilities && !report.safety.is_empty() {
        summary.push_str(&format!("*Safety facilities in {}:*\n", report.city));
        for record in &report.safety {
            let name = record.name.as_deref().unwrap_or(&record.city);
            summary.push_str(&format!(
                "- {} {} (GPS: {}, {})\n",
                record.kind.as_str().to_uppercase(),
                name,
                record.lat,
                record.lon
            ));
        }
    }

    summary
}

/// Immediate actions for the most common emergencies
pub fn emergency_guide() -> &'static str {
    "*IMMEDIATE EMERGENCY ACTIONS:*

*ROCKET ALERT:*
- Find nearest bunker/reinforced room
- 90 seconds in most areas
- Stay away from windows, lie on floor

*SHOOTING:*
- Get down immediately, find cover
- Call 100 (Police), stay hidden

*GENERAL:*
- Keep emergency contacts ready
- Know nearest shelter location
- Follow Home Front Command instructions"
}
