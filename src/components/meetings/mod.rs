pub mod finder;
pub mod models;
pub mod ranker;
pub mod service;

pub use finder::{enumerate_slots, MeetingSlotFinder};
pub use models::{CandidateSlot, MeetingRequest, RankedSlot, WorkingHours};
pub use ranker::{FirstAvailableRanker, LlmSlotRanker, SlotRanker};
pub use service::MeetingScheduler;
