//! LLM-backed emergency assistant
//!
//! The assistant sees a plain-text snapshot of hospital availability and
//! nearby ambulances, then answers the patient's question through the
//! [`LlmProvider`].

use crate::error::{WorkflowError, WorkflowResult};
use crate::geo::distance_between;
use crate::nearby::{AMBULANCE_RADIUS_KM, ambulances_in_range};
use medibed_store::{LlmProvider, LlmRequest, StoreError};
use medibed_types::{Ambulance, GeoPoint, Hospital};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;

const PREAMBLE: &str = "You are an AI Emergency Health Assistant chatbot for a hospital \
emergency management app. You have access to real-time hospital and ambulance data.";

const INSTRUCTIONS: &str = "Instructions:
- Answer based on the real-time data above.
- For nearest ICU queries, find hospitals with available ICU beds sorted by distance (within 5 KM).
- For ambulance queries, show only those within 4 KM radius.
- For first-aid queries (heart attack, accident, bleeding, breathing difficulty), provide step-by-step emergency instructions.
- Provide distances, ETAs, phone numbers, and bed counts where relevant.
- Be concise, helpful, and reassuring.
- Use markdown formatting for clarity.
- If asked about routes, provide general traffic-aware directions.";

/// Text snapshot of availability around `location`
pub fn assistant_context(
    hospitals: &[Hospital],
    ambulances: &[Ambulance],
    location: Option<GeoPoint>,
) -> String {
    if hospitals.is_empty() {
        return "No hospital data available currently.".to_string();
    }

    let mut ctx = String::new();
    match location {
        Some(p) => {
            let _ = writeln!(ctx, "Patient Location: {}", p);
        }
        None => ctx.push_str("Patient Location: Unknown\n"),
    }

    ctx.push_str("\nNEARBY HOSPITALS:\n");
    for h in hospitals {
        let distance = location
            .map(|p| format!("{:.1}", distance_between(p, h.location())))
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(
            ctx,
            "- {} ({} km): ICU={}, General={}, Emergency={}, Ventilator={}, Phone: {}, Rating: {}, ICU Load: {}",
            h.name,
            distance,
            h.beds.icu,
            h.beds.general,
            h.beds.emergency,
            h.beds.ventilator,
            h.phone.as_deref().filter(|p| !p.is_empty()).unwrap_or("N/A"),
            h.rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string()),
            h.icu_load_prediction,
        );
    }

    let _ = writeln!(ctx, "\nAMBULANCES WITHIN {}KM:", AMBULANCE_RADIUS_KM);
    let in_range = location
        .map(|p| ambulances_in_range(ambulances, p))
        .unwrap_or_default();
    if in_range.is_empty() {
        ctx.push_str("None available within 4 KM.\n");
    }
    for a in in_range {
        let _ = writeln!(
            ctx,
            "- {} ({}): {:.1} km, ETA ~{} min, Driver: {}",
            a.ambulance.vehicle_number,
            a.ambulance.ambulance_type,
            a.distance_km,
            a.eta_minutes,
            a.ambulance.driver_phone.as_deref().unwrap_or("N/A"),
        );
    }
    ctx
}

/// Full prompt for one question
pub fn assistant_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\nCONTEXT DATA:\n{}\n\nUSER QUERY: {}\n\n{}",
        PREAMBLE, context, question, INSTRUCTIONS
    )
}

pub struct Assistant {
    llm: Arc<dyn LlmProvider>,
}

impl Assistant {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Answer `question` given the current availability snapshot
    pub async fn ask(
        &self,
        question: &str,
        hospitals: &[Hospital],
        ambulances: &[Ambulance],
        location: Option<GeoPoint>,
    ) -> WorkflowResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(WorkflowError::validation("question", "question is empty"));
        }

        let context = assistant_context(hospitals, ambulances, location);
        let request = LlmRequest::new(assistant_prompt(&context, question));
        log::debug!("assistant prompt is {} bytes", request.prompt.len());

        match self.llm.invoke(&request).await? {
            Value::String(answer) => Ok(answer),
            Value::Null => Err(StoreError::Llm("empty response".into()).into()),
            other => Ok(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibed_store::ScriptedLlm;
    use medibed_types::{AmbulanceType, BedCount, IcuLoad, RecordMeta};
    use serde_json::json;

    fn hospital() -> Hospital {
        let mut h = Hospital::new("City General", GeoPoint::new(17.395, 78.4867));
        h.phone = Some("+91 40 2345 6789".into());
        h.rating = Some(4.5);
        h.beds.icu = BedCount::new(2, 20);
        h.beds.general = BedCount::new(80, 120);
        h.icu_load_prediction = IcuLoad::High;
        h
    }

    fn ambulance(lat: f64) -> Ambulance {
        Ambulance {
            meta: RecordMeta::default(),
            vehicle_number: "HY 07 KT 4821".into(),
            ambulance_type: AmbulanceType::Als,
            city: "Hyderabad".into(),
            latitude: lat,
            longitude: 78.4867,
            is_available: true,
            driver_name: "Driver 1".into(),
            driver_phone: Some("+91 98712 34567".into()),
            hospital_id: None,
        }
    }

    #[test]
    fn test_context_lists_hospitals_and_close_ambulances() {
        let ctx = assistant_context(
            &[hospital()],
            &[ambulance(17.40), ambulance(17.60)],
            Some(GeoPoint::new(17.385, 78.4867)),
        );

        assert!(ctx.starts_with("Patient Location: 17.3850, 78.4867\n"));
        assert!(ctx.contains(
            "- City General (1.1 km): ICU=2/20, General=80/120, Emergency=0/0, Ventilator=0/0, \
             Phone: +91 40 2345 6789, Rating: 4.5, ICU Load: high"
        ));
        assert!(ctx.contains("AMBULANCES WITHIN 4KM:"));
        assert!(ctx.contains("- HY 07 KT 4821 (ALS): 1.7 km, ETA ~3 min, Driver: +91 98712 34567"));
        assert_eq!(ctx.matches("HY 07 KT 4821").count(), 1);
    }

    #[test]
    fn test_context_without_location() {
        let ctx = assistant_context(&[hospital()], &[ambulance(17.40)], None);
        assert!(ctx.starts_with("Patient Location: Unknown"));
        assert!(ctx.contains("(? km)"));
        assert!(ctx.contains("None available within 4 KM."));
    }

    #[test]
    fn test_context_without_hospitals() {
        assert_eq!(assistant_context(&[], &[], None), "No hospital data available currently.");
    }

    #[tokio::test]
    async fn test_ask_sends_context_and_question() {
        let llm = ScriptedLlm::new().respond_with(json!("Go to City General."));
        let assistant = Assistant::new(Arc::new(llm.clone()));

        let answer = assistant
            .ask("nearest ICU?", &[hospital()], &[], None)
            .await
            .unwrap();
        assert_eq!(answer, "Go to City General.");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("USER QUERY: nearest ICU?"));
        assert!(requests[0].prompt.contains("City General"));
        assert!(!requests[0].add_context_from_internet);
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_question() {
        let assistant = Assistant::new(Arc::new(ScriptedLlm::new()));
        let result = assistant.ask("  ", &[], &[], None).await;
        assert!(matches!(result, Err(WorkflowError::Validation { .. })));
    }
}
