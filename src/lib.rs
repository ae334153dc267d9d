//! Proposal: staged-reveal valentine card engine
//!
//! Messages → StagedReveal → ResponseController → NotificationSink

pub mod core;
pub mod types;

// =============================================================================
// DECLINE ESCALATION
// =============================================================================

/// Number of declines after which the decline button is withdrawn
pub const DECLINE_THRESHOLD: u32 = 3;

// =============================================================================
// DISPLAY TIMING - presentation only, never consulted by the controller
// =============================================================================

/// Delay before the first message appears (milliseconds)
pub const FIRST_REVEAL_DELAY_MS: u64 = 800;

/// Delay before every later message appears (milliseconds)
pub const REVEAL_DELAY_MS: u64 = 400;

/// Delay between the question appearing and the buttons showing (milliseconds)
pub const BUTTONS_DELAY_MS: u64 = 500;

// =============================================================================
// SHRINK PROFILE
// =============================================================================

/// Below this scale the decline button also starts fading out
pub const FADE_SCALE_FLOOR: f64 = 0.2;

/// How much of the decline button's lost scale the affirm button gains
pub const AFFIRM_GROWTH_FACTOR: f64 = 0.75;

// =============================================================================
// NOTIFICATION
// =============================================================================

/// Default transactional email endpoint
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.resend.com/emails";

/// Default sender
pub const DEFAULT_FROM_ADDRESS: &str = "Valentine Proposal <onboarding@resend.dev>";

/// Per-request timeout for the email provider (seconds)
pub const EMAIL_REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long the CLI waits for outstanding deliveries before exiting (seconds)
pub const SHUTDOWN_GRACE_SECS: u64 = 15;

// =============================================================================
// HTTP SESSIONS
// =============================================================================

/// Resolved sessions with no live subscribers are dropped after this idle time (seconds)
pub const SESSION_IDLE_TTL_SECS: u64 = 30 * 60;

/// How often the server sweeps idle sessions (seconds)
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
