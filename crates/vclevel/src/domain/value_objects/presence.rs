//! Presence - voice-state transitions mapped onto membership changes

use serde::{Deserialize, Serialize};

/// Mute/deafen flags carried by a voice state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFlags {
    pub deaf: bool,
    pub mute: bool,
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl VoiceFlags {
    pub fn any(&self) -> bool {
        self.deaf || self.mute || self.self_mute || self.self_deaf
    }
}

/// Platform-neutral view of a member's voice state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSnapshot {
    /// Voice channel the member is connected to, if any
    pub channel: Option<u64>,
    pub flags: VoiceFlags,
}

/// Effect of a voice-state event on the membership set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceChange {
    Present,
    Absent,
    Unchanged,
}

impl PresenceChange {
    /// Classify a voice-state transition.
    ///
    /// Joining a channel (no previous state, or a previous state outside any
    /// channel) marks the member present and leaving always marks them
    /// absent. Moving between channels changes nothing. A flag change in
    /// place is judged on the flags the member had before the update: present
    /// if any was set, absent if all were clear.
    pub fn classify(old: Option<&VoiceSnapshot>, new: &VoiceSnapshot) -> Self {
        let Some(old) = old else {
            return match new.channel {
                Some(_) => Self::Present,
                None => Self::Absent,
            };
        };

        match (old.channel, new.channel) {
            (_, None) => Self::Absent,
            (None, Some(_)) => Self::Present,
            (Some(before), Some(now)) if before != now => Self::Unchanged,
            (Some(_), Some(_)) => Self::from_flags(&old.flags),
        }
    }

    fn from_flags(flags: &VoiceFlags) -> Self {
        if flags.any() {
            Self::Present
        } else {
            Self::Absent
        }
    }
}
