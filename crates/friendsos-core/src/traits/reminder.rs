// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local user-facing reminder surface.

use async_trait::async_trait;

use crate::error::FriendsosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ReminderPrompt;

/// Shows due check-in prompts to the monitored user.
#[async_trait]
pub trait ReminderSurface: PluginAdapter {
    /// Display a prompt. Failures are logged by the engine and never block
    /// the escalation timer.
    async fn show_prompt(&self, prompt: &ReminderPrompt) -> Result<(), FriendsosError>;

    /// Play an audible cue alongside the prompt.
    async fn play_cue(&self) -> Result<(), FriendsosError>;
}
