//! Rule-based advice derived from raw survey answers
//!
//! These rules are static business logic, independent of the classifier:
//! they fire on input thresholds, not on the predicted label.

use crate::schema::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Confidence at or below this triggers the low-confidence tip
pub const LOW_CONFIDENCE_MAX: u8 = 2;

/// Peer influence at or above this triggers the peer-pressure tip
pub const PEER_INFLUENCE_MIN: u8 = 4;

/// Weekly usage at or above this triggers the heavy-usage tip
pub const HEAVY_USAGE_MIN: u32 = 10;

/// A triggered advice message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tip {
    LowConfidence,
    PeerPressure,
    HeavyUsage,
}

impl Tip {
    pub fn message(&self) -> &'static str {
        match self {
            Tip::LowConfidence => {
                "Low confidence in solving alone: attempt problems yourself for at least \
                 30 minutes before asking ChatGPT, and use it to verify answers rather \
                 than to produce them."
            }
            Tip::PeerPressure => {
                "Peer habits are steering your usage: discuss problems with classmates \
                 or professors before turning to AI tools."
            }
            Tip::HeavyUsage => {
                "Weekly usage is high: set a usage budget (for example 30 minutes a day) \
                 and keep a learning journal of key takeaways instead of copy-pasting."
            }
        }
    }
}

/// Evaluate the advice rules for one record, in fixed order
pub fn tips_for(record: &FeatureRecord) -> Vec<Tip> {
    let mut tips = Vec::new();
    if record.confidence_in_solving_alone <= LOW_CONFIDENCE_MAX {
        tips.push(Tip::LowConfidence);
    }
    if record.peer_usage_influence >= PEER_INFLUENCE_MIN {
        tips.push(Tip::PeerPressure);
    }
    if record.chatgpt_usage_frequency_per_week >= HEAVY_USAGE_MIN {
        tips.push(Tip::HeavyUsage);
    }
    tips
}

/// General guidance shown with a dependent verdict
pub fn dependent_guidance() -> &'static [&'static str] {
    &[
        "Try solving problems on your own for at least 30 minutes before asking ChatGPT.",
        "Use ChatGPT to verify your answers, not as the first step.",
        "Maintain a learning journal with key takeaways instead of copy-pasting.",
        "Discuss with peers or professors before turning to AI tools.",
        "Refer to books, lecture notes, or trusted educational videos before seeking AI help.",
        "Limit usage duration, for example to no more than 30 minutes a day.",
        "Avoid using ChatGPT during assessments unless explicitly allowed.",
    ]
}

/// General guidance shown with a not-dependent verdict
pub fn balanced_guidance() -> &'static [&'static str] {
    &[
        "Keep up your strong self-learning habits.",
        "Try mentoring peers or exploring advanced topics independently.",
    ]
}
