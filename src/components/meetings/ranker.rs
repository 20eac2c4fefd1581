use super::models::{CandidateSlot, MeetingRequest, RankedSlot};
use crate::components::llm::{extract_json, TextGenerator};
use async_trait::async_trait;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Write;
use tracing::{debug, info, warn};

/// Default number of meeting times to propose
pub const DEFAULT_RANKED_SLOTS: usize = 3;

/// Picks the best meeting times out of a candidate list
#[async_trait]
pub trait SlotRanker: Send + Sync {
    async fn rank(&self, slots: &[CandidateSlot], request: &MeetingRequest) -> Vec<RankedSlot>;
}

/// Earliest available slots first, no justification
#[derive(Debug, Clone)]
pub struct FirstAvailableRanker {
    limit: usize,
}

impl Default for FirstAvailableRanker {
    fn default() -> Self {
        Self::new(DEFAULT_RANKED_SLOTS)
    }
}

impl FirstAvailableRanker {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn pick(&self, slots: &[CandidateSlot]) -> Vec<RankedSlot> {
        let mut available: Vec<&CandidateSlot> = slots.iter().filter(|s| s.available).collect();
        available.sort_by_key(|s| s.slot.start);
        available
            .into_iter()
            .take(self.limit)
            .map(|s| RankedSlot {
                slot: s.slot,
                reason: None,
            })
            .collect()
    }
}

#[async_trait]
impl SlotRanker for FirstAvailableRanker {
    async fn rank(&self, slots: &[CandidateSlot], _request: &MeetingRequest) -> Vec<RankedSlot> {
        self.pick(slots)
    }
}

#[derive(Debug, Deserialize)]
struct Pick {
    index: usize,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RankingResponse {
    Wrapped { suggestions: Vec<Pick> },
    Bare(Vec<Pick>),
}

impl RankingResponse {
    fn into_picks(self) -> Vec<Pick> {
        match self {
            Self::Wrapped { suggestions } => suggestions,
            Self::Bare(picks) => picks,
        }
    }
}

/// Asks a text generator to choose; falls back to [`FirstAvailableRanker`]
pub struct LlmSlotRanker<G: TextGenerator> {
    generator: G,
    timezone: Tz,
    limit: usize,
    fallback: FirstAvailableRanker,
}

impl<G: TextGenerator> LlmSlotRanker<G> {
    pub fn new(generator: G, timezone: Tz) -> Self {
        Self::with_limit(generator, timezone, DEFAULT_RANKED_SLOTS)
    }

    pub fn with_limit(generator: G, timezone: Tz, limit: usize) -> Self {
        Self {
            generator,
            timezone,
            limit,
            fallback: FirstAvailableRanker::new(limit),
        }
    }

    fn build_prompt(&self, available: &[&CandidateSlot], request: &MeetingRequest) -> String {
        let mut prompt = format!(
            "You help schedule meetings. Choose the {} best times for the meeting below.\n\n\
             Meeting: {}\nDescription: {}\nDuration: {} minutes\n\nAvailable times ({}):\n",
            self.limit,
            request.title,
            if request.description.is_empty() { "-" } else { request.description.as_str() },
            request.duration_minutes,
            self.timezone
        );
        for (i, candidate) in available.iter().enumerate() {
            let start = candidate.slot.start.with_timezone(&self.timezone);
            let end = candidate.slot.end.with_timezone(&self.timezone);
            let _ = writeln!(
                prompt,
                "{}. {} {}-{}",
                i + 1,
                start.format("%A %Y-%m-%d"),
                start.format("%H:%M"),
                end.format("%H:%M")
            );
        }
        prompt.push_str(
            "\nPrefer mid-morning and early afternoon, avoid the very start and end of the day, \
             and spread options across different days when possible.\n\
             Respond with only JSON of the form \
             {\"suggestions\": [{\"index\": <number from the list>, \"reason\": \"<one sentence>\"}]}",
        );
        prompt
    }

    /// Map the model's 1-based picks onto slots, dropping invalid and duplicate indices
    fn resolve_picks(&self, picks: Vec<Pick>, available: &[&CandidateSlot]) -> Vec<RankedSlot> {
        let mut seen = HashSet::new();
        picks
            .into_iter()
            .filter(|p| p.index >= 1 && p.index <= available.len())
            .filter(|p| seen.insert(p.index))
            .take(self.limit)
            .map(|p| RankedSlot {
                slot: available[p.index - 1].slot,
                reason: p.reason.filter(|r| !r.trim().is_empty()),
            })
            .collect()
    }
}

#[async_trait]
impl<G: TextGenerator> SlotRanker for LlmSlotRanker<G> {
    async fn rank(&self, slots: &[CandidateSlot], request: &MeetingRequest) -> Vec<RankedSlot> {
        let mut available: Vec<&CandidateSlot> = slots.iter().filter(|s| s.available).collect();
        if available.is_empty() {
            return Vec::new();
        }
        available.sort_by_key(|s| s.slot.start);

        let prompt = self.build_prompt(&available, request);
        let response = match self.generator.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Slot ranking failed, using earliest available slots: {}", e);
                return self.fallback.pick(slots);
            }
        };

        let Some(parsed) = extract_json::<RankingResponse>(&response) else {
            warn!("Slot ranking response was not valid JSON, using earliest available slots");
            debug!("Unparseable ranking response: {}", response);
            return self.fallback.pick(slots);
        };

        let ranked = self.resolve_picks(parsed.into_picks(), &available);
        if ranked.is_empty() {
            warn!("Slot ranking picked no valid slots, using earliest available slots");
            return self.fallback.pick(slots);
        }

        info!("Ranked {} meeting slots for '{}'", ranked.len(), request.title);
        ranked
    }
}
