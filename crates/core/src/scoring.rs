//! Raw correct-count to scaled-score conversion.
//!
//! The tables are fixed data and must be preserved exactly; they are not
//! derived from any formula.

use serde::{Deserialize, Serialize};

use crate::model::Subject;

pub const FLOOR_SCORE: u16 = 200;
pub const CEILING_SCORE: u16 = 400;

#[rustfmt::skip]
const THIRTY_QUESTION_TABLE: [u16; 31] = [
    200, 200, 200, 200, 210, 220, 230, 240, 250, 260,
    270, 280, 290, 290, 290, 290, 300, 310, 320, 330,
    340, 350, 360, 370, 380, 390, 400, 400, 400, 400,
    400,
];

#[rustfmt::skip]
const FORTY_QUESTION_TABLE: [u16; 41] = [
    200, 200, 200, 200, 200, 200, 210, 220, 230, 240,
    250, 260, 270, 280, 280, 290, 290, 290, 290, 290,
    290, 290, 300, 300, 310, 310, 320, 320, 330, 330,
    340, 350, 360, 370, 370, 380, 390, 390, 400, 400,
    400,
];

#[rustfmt::skip]
const FIFTY_QUESTION_TABLE: [u16; 51] = [
    200, 200, 200, 200, 200, 200, 200, 200, 200, 200,
    200, 200, 200, 200, 200, 210, 220, 230, 240, 250,
    260, 270, 280, 290, 290, 290, 290, 300, 300, 310,
    310, 320, 330, 340, 340, 350, 360, 360, 370, 370,
    380, 380, 380, 390, 390, 400, 400, 400, 400, 400,
    400,
];

/// Question-count category selecting a score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBucket {
    Thirty,
    Forty,
    Fifty,
}

impl ScoreBucket {
    /// Totals other than 30 and 50 fall back to the 40-question table.
    #[must_use]
    pub fn for_total(total: i64) -> Self {
        match total {
            30 => ScoreBucket::Thirty,
            50 => ScoreBucket::Fifty,
            _ => ScoreBucket::Forty,
        }
    }

    #[must_use]
    pub fn max_correct(self) -> usize {
        self.table().len() - 1
    }

    #[must_use]
    pub fn table(self) -> &'static [u16] {
        match self {
            ScoreBucket::Thirty => &THIRTY_QUESTION_TABLE,
            ScoreBucket::Forty => &FORTY_QUESTION_TABLE,
            ScoreBucket::Fifty => &FIFTY_QUESTION_TABLE,
        }
    }
}

/// Maps `correct` answers out of `total` questions onto the 200–400 scale.
///
/// Never fails: negative counts give the floor, counts above the total (or
/// the bucket maximum) are clamped before lookup.
#[must_use]
pub fn scale_score(correct: i64, total: i64) -> u16 {
    if correct < 0 {
        return FLOOR_SCORE;
    }
    let bucket = ScoreBucket::for_total(total);
    let clamped = correct.min(total.max(0));
    let index = usize::try_from(clamped)
        .unwrap_or(0)
        .min(bucket.max_correct());
    bucket.table()[index]
}

/// Display band of a scaled score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Unscored,
    BelowTarget,
    OnTarget,
    Strong,
}

impl ScoreBand {
    /// Classifies a score after rounding it to the nearest ten.
    #[must_use]
    pub fn classify(score: Option<u16>) -> Self {
        let Some(score) = score else {
            return ScoreBand::Unscored;
        };
        match round_to_nearest_ten(score) {
            s if s < FLOOR_SCORE => ScoreBand::Unscored,
            s if s > 320 => ScoreBand::Strong,
            300..=320 => ScoreBand::OnTarget,
            _ => ScoreBand::BelowTarget,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Unscored => "Not attempted",
            ScoreBand::BelowTarget => "Below target",
            ScoreBand::OnTarget => "On target",
            ScoreBand::Strong => "Strong",
        }
    }
}

/// Rounds half up: 295 becomes 300, 294 becomes 290.
#[must_use]
pub fn round_to_nearest_ten(score: u16) -> u16 {
    score.saturating_add(5) / 10 * 10
}

/// Correct answers attributed to one topic of a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScore {
    pub topic: &'static str,
    pub correct: u32,
    pub total: u32,
}

impl TopicScore {
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            self.correct * 100 / self.total
        }
    }
}

/// Splits an attempt's result across the subject's topics.
///
/// Questions are spread evenly with the remainder going to the first
/// topics. Correct answers are allocated in proportion to each topic's
/// share using largest remainders, ties going to the earlier topic, so the
/// breakdown is stable for a given input and always sums to `correct`.
#[must_use]
pub fn topic_breakdown(subject: Subject, correct: u32, total: u32) -> Vec<TopicScore> {
    let topics = subject.topics();
    if topics.is_empty() || total == 0 {
        return Vec::new();
    }
    let correct = correct.min(total);
    let count = u32::try_from(topics.len()).unwrap_or(u32::MAX);
    let base = total / count;
    let extra = total % count;

    let totals: Vec<u32> = (0..count).map(|i| base + u32::from(i < extra)).collect();

    let products: Vec<u64> = totals
        .iter()
        .map(|&t| u64::from(t) * u64::from(correct))
        .collect();
    let mut allocated: Vec<u32> = products
        .iter()
        .map(|&p| u32::try_from(p / u64::from(total)).unwrap_or(0))
        .collect();
    let mut remaining = correct - allocated.iter().sum::<u32>();

    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = products[a] % u64::from(total);
        let rb = products[b] % u64::from(total);
        rb.cmp(&ra).then(a.cmp(&b))
    });
    for i in order {
        if remaining == 0 {
            break;
        }
        if allocated[i] < totals[i] {
            allocated[i] += 1;
            remaining -= 1;
        }
    }

    topics
        .iter()
        .zip(totals)
        .zip(allocated)
        .map(|((&topic, total), correct)| TopicScore {
            topic,
            correct,
            total,
        })
        .collect()
}
