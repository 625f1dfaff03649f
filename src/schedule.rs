//! Randomized boot message schedule
//!
//! A boot sequence is a handful of flavor messages at increasing offsets,
//! then a fixed "Initializing <name> subsystem..." line, optional service
//! lines for special entries, and finally the terminal action. Only the
//! cumulative offset matters; nothing depends on which messages were drawn.

use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::MessageSettings;

/// Fixed lines special entries show after the subsystem line
pub const SERVICE_MESSAGES: [&str; 2] = ["Bringing services online...", "Ready to launch desktop..."];

/// Delay ranges and message count for one kind of entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    pub message_count: usize,
    pub step_ms: RangeInclusive<u64>,
    pub subsystem_ms: RangeInclusive<u64>,
    /// Only special entries show the service lines
    pub services_ms: Option<RangeInclusive<u64>>,
    pub finish_ms: RangeInclusive<u64>,
}

impl Pacing {
    pub fn ordinary() -> Self {
        Self {
            message_count: 3,
            step_ms: 200..=600,
            subsystem_ms: 350..=750,
            services_ms: None,
            finish_ms: 350..=750,
        }
    }

    pub fn special() -> Self {
        Self {
            message_count: 5,
            step_ms: 300..=700,
            subsystem_ms: 450..=900,
            services_ms: Some(400..=800),
            finish_ms: 500..=1000,
        }
    }

    pub fn for_entry(special: bool) -> Self {
        if special {
            Self::special()
        } else {
            Self::ordinary()
        }
    }
}

/// One status update at an offset from activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub at: Duration,
    pub message: String,
}

/// The full status schedule for one activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPlan {
    pub steps: Vec<Step>,
    /// Offset of the terminal action, always after the last step
    pub finish_at: Duration,
}

/// Message pool for an entry: filler, plus the extras when special
pub fn message_pool(messages: &MessageSettings, special: bool) -> Vec<&str> {
    let mut pool: Vec<&str> = messages.filler.iter().map(String::as_str).collect();
    if special {
        pool.extend(messages.special.iter().map(String::as_str));
    }
    pool
}

/// Draw `count` distinct messages uniformly without replacement.
///
/// Partial Fisher-Yates over a scratch copy of the pool. A pool smaller
/// than `count` is returned whole, in random order.
pub fn sample_messages<R: Rng + ?Sized>(pool: &[&str], count: usize, rng: &mut R) -> Vec<String> {
    let mut scratch = pool.to_vec();
    let take = count.min(scratch.len());
    let (chosen, _) = scratch.partial_shuffle(rng, take);
    chosen.iter().map(|m| m.to_string()).collect()
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<u64>) -> Duration {
    Duration::from_millis(rng.gen_range(range.clone()))
}

/// Build the schedule for booting `name`
pub fn plan_boot<R: Rng + ?Sized>(
    name: &str,
    special: bool,
    messages: &MessageSettings,
    rng: &mut R,
) -> BootPlan {
    let pacing = Pacing::for_entry(special);
    let pool = message_pool(messages, special);
    let drawn = sample_messages(&pool, pacing.message_count, rng);

    let mut elapsed = Duration::ZERO;
    let mut steps = Vec::with_capacity(drawn.len() + 1 + SERVICE_MESSAGES.len());

    for message in drawn {
        elapsed += jitter(rng, &pacing.step_ms);
        steps.push(Step { at: elapsed, message });
    }

    elapsed += jitter(rng, &pacing.subsystem_ms);
    steps.push(Step {
        at: elapsed,
        message: format!("Initializing {name} subsystem..."),
    });

    if let Some(range) = &pacing.services_ms {
        for message in SERVICE_MESSAGES {
            elapsed += jitter(rng, range);
            steps.push(Step {
                at: elapsed,
                message: message.to_string(),
            });
        }
    }

    elapsed += jitter(rng, &pacing.finish_ms);

    BootPlan {
        steps,
        finish_at: elapsed,
    }
}
