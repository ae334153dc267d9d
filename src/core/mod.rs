//! Core modules for the proposal card

pub mod reveal;
pub mod escalation;
pub mod controller;
pub mod config;
pub mod notify;
pub mod presentation;
pub mod api;

pub use reveal::StagedReveal;
pub use escalation::DeclineEscalation;
pub use controller::{transition, ControllerConfig, ResponseController, Rules, Session, Transition};
pub use config::NotifierConfig;
pub use notify::{deliver, EmailRequest, EmailSink, LogSink, NotificationSink, Notifier};
pub use presentation::{buttons_delay, jitter, reveal_delay, Bounds, ShrinkProfile};
pub use api::{create_router, run_server};
