//! Incremental extraction from a chat conversation.
//!
//! Each turn replays the entire prior conversation to the collaborator so
//! facts stated turns ago ("today at 12") stay recoverable — there is no
//! server-side summarization. The JSON handling is an explicit state
//! machine: `Attempt1 → (ParseFail) → Attempt2 → (ParseFail) → Fallback`.

use cabflow_core::{dates, phone, ExtractedJob};
use serde::Deserialize;

use crate::gate::{address_is_complete, infer_vehicle, question_for, REQUIRED_FIELDS};
use crate::llm::{ChatMessage, ChatModel};

const EXTRACTION_PROMPT: &str = "\
You are a taxi booking assistant. Extract booking details from the \
conversation so far. Respond with JSON only, using exactly these keys: \
date, time, pickup, destination, customerName, phone, vehicle, passengers. \
Use null for anything the caller has not said. Dates are DD/MM/YYYY, times \
are 24-hour HH:MM. Addresses must include the postcode when the caller has \
given one. Never invent values.";

const STRICT_JSON_PROMPT: &str = "\
Respond with a single JSON object and nothing else — no prose, no code \
fences, no explanations. Keys: date, time, pickup, destination, \
customerName, phone, vehicle, passengers. Use null for unknown values.";

const OPENING_QUESTION: &str =
    "Sorry, I didn't catch that. When would you like to travel, and from where?";

/// How many passenger phone numbers are kept.
const MAX_PHONES: usize = 3;

/// The result of one conversational turn.
///
/// `next_question` is `Some` exactly when `missing_fields` is non-empty —
/// the caller must never present a booking summary while anything is
/// missing.
#[derive(Debug)]
pub struct ChatExtraction {
    pub data: ExtractedJob,
    /// Still-missing required fields, in question-priority order.
    pub missing_fields: Vec<String>,
    pub next_question: Option<String>,
}

/// Raw collaborator output before normalization.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LlmFields {
    date: Option<String>,
    time: Option<String>,
    pickup: Option<String>,
    destination: Option<String>,
    customer_name: Option<String>,
    phone: Option<String>,
    vehicle: Option<String>,
    passengers: Option<u32>,
}

/// Drives the chat-model collaborator to extract booking fields.
pub struct ConversationalExtractor<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> ConversationalExtractor<'a> {
    #[must_use]
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }

    /// Extracts fields from the latest message plus the full conversation.
    ///
    /// Never errors: collaborator failures degrade to an all-fields-missing
    /// record with a generic opening question.
    pub async fn extract_incremental(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> ChatExtraction {
        let Some(fields) = self.attempt_extraction(message, history).await else {
            return fallback_extraction();
        };
        let fields = self.verify_date(fields, message, history).await;
        assemble(fields)
    }

    /// The JSON attempt state machine. Collaborator errors count as parse
    /// failures: one stricter retry, then `None`.
    async fn attempt_extraction(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Option<LlmFields> {
        for (attempt, system) in [(1u8, EXTRACTION_PROMPT), (2, STRICT_JSON_PROMPT)] {
            match self
                .model
                .complete(&conversation(system, history, message))
                .await
            {
                Ok(text) => {
                    if let Some(fields) = parse_fields(&text) {
                        return Some(fields);
                    }
                    tracing::warn!(attempt, "chat model returned non-JSON, escalating");
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "chat model call failed");
                }
            }
        }
        None
    }

    /// Defensive second pass over the whole transcript for the `date` field,
    /// the one most prone to being silently dropped. Non-empty corrections
    /// override the first pass; empty ones never overwrite.
    async fn verify_date(
        &self,
        mut fields: LlmFields,
        message: &str,
        history: &[ChatMessage],
    ) -> LlmFields {
        let prompt = format!(
            "Re-read the entire conversation and determine the journey date. \
             If the caller wants to travel today or as soon as possible and \
             gives no other date, the date is {today}. Respond with JSON \
             only, e.g. {{\"date\": \"DD/MM/YYYY\"}}; use null if there is \
             genuinely no date signal.",
            today = dates::today_canonical()
        );
        match self
            .model
            .complete(&conversation(&prompt, history, message))
            .await
        {
            Ok(text) => {
                if let Some(correction) = parse_fields(&text) {
                    merge_non_empty(&mut fields, correction);
                } else {
                    tracing::warn!("date verification pass returned non-JSON, keeping first pass");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "date verification pass failed, keeping first pass");
            }
        }
        fields
    }
}

/// System prompt + full replayed history + the new user message.
fn conversation(system: &str, history: &[ChatMessage], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(message));
    messages
}

/// Pulls the first `{…}` block out of the response and parses it. Tolerates
/// code fences and prose around the JSON.
fn parse_fields(text: &str) -> Option<LlmFields> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn merge_non_empty(fields: &mut LlmFields, correction: LlmFields) {
    let take = |dst: &mut Option<String>, src: Option<String>| {
        if let Some(value) = src {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                *dst = Some(trimmed.to_owned());
            }
        }
    };
    take(&mut fields.date, correction.date);
    take(&mut fields.time, correction.time);
    take(&mut fields.pickup, correction.pickup);
    take(&mut fields.destination, correction.destination);
    take(&mut fields.customer_name, correction.customer_name);
    take(&mut fields.phone, correction.phone);
    take(&mut fields.vehicle, correction.vehicle);
    if correction.passengers.is_some() {
        fields.passengers = correction.passengers;
    }
}

fn assemble(fields: LlmFields) -> ChatExtraction {
    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

    let mut data = ExtractedJob {
        date: fields.date.as_deref().and_then(normalize_chat_date),
        time: fields.time.as_deref().and_then(dates::parse_booking_time),
        pickup: non_empty(fields.pickup),
        destination: non_empty(fields.destination),
        customer_name: non_empty(fields.customer_name),
        passengers: fields.passengers,
        ..ExtractedJob::default()
    };

    if let Some(raw) = fields.phone.as_deref() {
        let phones = phone::prioritize(&phone::split_phones(raw), MAX_PHONES);
        if !phones.is_empty() {
            data.customer_phone = Some(phones.join(", "));
        }
    }

    data.vehicle_type = non_empty(fields.vehicle)
        .or_else(|| data.passengers.map(|n| infer_vehicle(n).to_owned()));

    let missing_fields = missing_fields(&data);
    let next_question = missing_fields.first().map(|field| question_for(field));
    ChatExtraction {
        data,
        missing_fields,
        next_question,
    }
}

/// Chat dates accept "today"/"ASAP" phrasing on top of the usual forms.
fn normalize_chat_date(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if matches!(
        lower.as_str(),
        "today" | "asap" | "now" | "as soon as possible"
    ) {
        return Some(dates::today_canonical());
    }
    dates::parse_booking_date(raw)
}

/// Missing required fields in fixed priority order. Addresses must pass the
/// completeness gate to count as present.
fn missing_fields(data: &ExtractedJob) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|&&field| !field_is_present(data, field))
        .map(|&field| field.to_owned())
        .collect()
}

fn field_is_present(data: &ExtractedJob, field: &str) -> bool {
    match field {
        "date" => data.date.is_some(),
        "time" => data.time.is_some(),
        "pickup" => data.pickup.as_deref().is_some_and(address_is_complete),
        "destination" => data.destination.as_deref().is_some_and(address_is_complete),
        "customerName" => data.customer_name.is_some(),
        "phone" => data.customer_phone.is_some(),
        "vehicle" => data.vehicle_type.is_some(),
        _ => false,
    }
}

fn fallback_extraction() -> ChatExtraction {
    ChatExtraction {
        data: ExtractedJob::default(),
        missing_fields: REQUIRED_FIELDS.iter().map(|&f| f.to_owned()).collect(),
        next_question: Some(OPENING_QUESTION.to_owned()),
    }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod extractor_test;
