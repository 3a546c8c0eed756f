// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Check-in scheduling and escalation engine.
//!
//! A [`CheckInEngine`] owns every check-in record, arms a schedule timer
//! that prompts the user each interval, arms an escalation timer after each
//! prompt, and hands unanswered or distressed check-ins to the
//! [`EscalationNotifier`], which alerts the record's emergency contacts.

pub mod engine;
pub mod notifier;
pub mod schedule;
pub mod settings;
mod timers;

pub use engine::{ArmedTimers, CheckInEngine, CheckInEngineBuilder};
pub use notifier::{
    Delivery, DispatchFailure, EscalationNotifier, EscalationReport, EscalationTrigger,
};
pub use settings::EngineSettings;
pub use timers::TimerKind;
