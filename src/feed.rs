//! Narrative/modifier feed
//!
//! The feed decides *when* to ask the Overseer for a new narrative line and
//! modifier, and buffers the answers until the simulation picks them up at a
//! frame boundary. The actual transport (browser `fetch`, offline narrator)
//! lives outside; it takes requests from `take_requests` and hands results
//! back through `deliver`.
//!
//! Every request carries a ticket. Only the most recent ticket is accepted,
//! so a newer request supersedes older in-flight ones and `stop` invalidates
//! everything outstanding.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::difficulty::{DifficultyProfile, feed_interval};
use crate::error::TransportError;
use crate::sim::modifier::ALL_MODIFIERS;

/// Outgoing request to the narrative endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub ticket: u64,
    pub prompt: String,
}

impl FeedRequest {
    /// JSON body for the endpoint: `{"prompt": "..."}`
    pub fn body_json(&self) -> String {
        #[derive(Serialize)]
        struct Body<'a> {
            prompt: &'a str,
        }
        serde_json::to_string(&Body {
            prompt: &self.prompt,
        })
        .unwrap_or_default()
    }
}

/// Narrative line plus modifier text (untrusted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub narrative: String,
    pub modifier: String,
}

/// Parse an endpoint body
pub fn parse_response(body: &str) -> Result<FeedResponse, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Local stand-in when the endpoint could not be used
pub fn fallback_response(error: &TransportError, rng: &mut impl Rng) -> FeedResponse {
    match error {
        TransportError::Status(_) => FeedResponse {
            narrative: "The AI systems flicker momentarily as Subject Delta continues their escape attempt."
                .into(),
            modifier: "normal".into(),
        },
        TransportError::Network(_) | TransportError::Malformed(_) => {
            let modifier = if rng.random::<f32>() < 0.3 {
                "low gravity"
            } else if rng.random::<f32>() < 0.6 {
                "disappearing platforms"
            } else {
                "spawning drones"
            };
            FeedResponse {
                narrative:
                    "System interference detected. Protocols adapting to Subject Delta's progress."
                        .into(),
                modifier: modifier.into(),
            }
        }
    }
}

/// A synchronous narrative source (headless runs, tests)
pub trait Narrator {
    fn respond(&mut self, request: &FeedRequest) -> Result<FeedResponse, TransportError>;
}

const OFFLINE_NARRATIVES: [&str; 4] = [
    "The AI Overseer watches silently as Subject Delta navigates the treacherous platforms.",
    "Laboratory systems fluctuate unpredictably, creating new challenges for the escaping subject.",
    "Security measures intensify as the subject moves closer to potential freedom.",
    "The facility's automated defenses adapt to counter Subject Delta's progress.",
];

/// Canned Overseer used when no endpoint is configured
#[derive(Debug, Clone)]
pub struct OfflineNarrator {
    rng: Pcg32,
}

impl OfflineNarrator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Narrator for OfflineNarrator {
    fn respond(&mut self, _request: &FeedRequest) -> Result<FeedResponse, TransportError> {
        let narrative = OFFLINE_NARRATIVES[self.rng.random_range(0..OFFLINE_NARRATIVES.len())];
        let modifier = ALL_MODIFIERS[self.rng.random_range(0..ALL_MODIFIERS.len())];
        Ok(FeedResponse {
            narrative: narrative.into(),
            modifier: modifier.as_str().into(),
        })
    }
}

/// Request scheduler and response inbox
#[derive(Debug, Clone)]
pub struct ModifierFeed {
    difficulty: String,
    tier: u32,
    interval_ms: f32,
    elapsed_ms: f32,
    running: bool,
    latest_ticket: u64,
    outbox: Vec<FeedRequest>,
    inbox: VecDeque<FeedResponse>,
    rng: Pcg32,
}

impl ModifierFeed {
    pub fn new(profile: &DifficultyProfile, seed: u64) -> Self {
        Self {
            difficulty: profile.display_name.clone(),
            tier: 1,
            interval_ms: feed_interval(profile, 1),
            elapsed_ms: 0.0,
            running: false,
            latest_ticket: 0,
            outbox: Vec::new(),
            inbox: VecDeque::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn interval_ms(&self) -> f32 {
        self.interval_ms
    }

    /// Escalate (or reset) the tier; takes effect on the next interval
    pub fn set_tier(&mut self, tier: u32, profile: &DifficultyProfile) {
        self.tier = tier.max(1);
        self.interval_ms = feed_interval(profile, self.tier);
    }

    /// Start the interval and ask immediately
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed_ms = 0.0;
        self.issue();
        log::info!(
            "Narrative feed started (tier {}, every {:.0}ms)",
            self.tier,
            self.interval_ms
        );
    }

    /// Cancel the interval and invalidate every outstanding request
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.latest_ticket += 1;
        self.outbox.clear();
        self.inbox.clear();
        log::info!("Narrative feed stopped");
    }

    /// Advance the interval timer by `dt` milliseconds
    pub fn advance(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        self.elapsed_ms += dt;
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            self.issue();
        }
    }

    fn issue(&mut self) {
        self.latest_ticket += 1;
        let prompt = format!(
            "Generate a one-sentence story update and a random game modifier for level {} of the AI lab escape game ({} difficulty). \
             Higher levels should have more dangerous modifiers. \
             Available modifiers: low gravity, disappearing platforms, spawning drones, normal.",
            self.tier, self.difficulty
        );
        log::debug!("Narrative request #{}", self.latest_ticket);
        self.outbox.push(FeedRequest {
            ticket: self.latest_ticket,
            prompt,
        });
    }

    /// Requests the transport should send now
    pub fn take_requests(&mut self) -> Vec<FeedRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Hand back a transport result. Failures become a local fallback.
    /// Returns false if the ticket was superseded or cancelled.
    pub fn deliver(&mut self, ticket: u64, result: Result<FeedResponse, TransportError>) -> bool {
        if !self.running || ticket != self.latest_ticket {
            log::debug!("Dropping stale narrative response #{}", ticket);
            return false;
        }
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("{}; using local fallback", e);
                fallback_response(&e, &mut self.rng)
            }
        };
        self.inbox.push_back(response);
        true
    }

    /// Responses ready to apply, oldest first
    pub fn drain(&mut self) -> Vec<FeedResponse> {
        self.inbox.drain(..).collect()
    }

    /// Serve every pending request through a synchronous narrator
    pub fn pump(&mut self, narrator: &mut impl Narrator) {
        for request in self.take_requests() {
            let result = narrator.respond(&request);
            self.deliver(request.ticket, result);
        }
    }
}
