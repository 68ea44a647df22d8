//! Non-fatal conditions raised while setting up a scheduler.

use std::fmt;

use crate::config::LegacyMode;

/// Location pairs listed before the warning text is truncated.
const MAX_LISTED_PAIRS: usize = 4;

/// A soft condition. Every warning is also logged with `tracing::warn!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerWarning {
    /// A legacy mode was given on its own.
    LegacyModeDeprecated {
        /// The mode used.
        mode: LegacyMode,
    },
    /// A legacy mode was given together with a movement config.
    LegacyModeIgnored {
        /// The mode dropped.
        mode: LegacyMode,
    },
    /// Policy `none` with locations whose slot windows differ.
    OverlapRisk {
        /// Unordered location pairs with differing windows.
        pairs: Vec<(String, String)>,
    },
    /// A visitor requested a name that is not a known host.
    UnknownHostRequest {
        /// Visitor name.
        visitor: String,
        /// Requested name as resolved.
        host: String,
    },
    /// A visitor requested a known host that has no availability yet.
    HostNotYetAvailable {
        /// Visitor name.
        visitor: String,
        /// Host name.
        host: String,
    },
}

impl SchedulerWarning {
    /// Whether this warning is about an unmatched host request.
    pub fn is_request_warning(&self) -> bool {
        matches!(
            self,
            SchedulerWarning::UnknownHostRequest { .. } | SchedulerWarning::HostNotYetAvailable { .. }
        )
    }
}

impl fmt::Display for SchedulerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerWarning::LegacyModeDeprecated { mode } => write!(
                f,
                "Legacy mode {mode:?} is deprecated; configure movement instead."
            ),
            SchedulerWarning::LegacyModeIgnored { mode } => write!(
                f,
                "Both a movement config and legacy mode {mode:?} were given; \
                 the movement config is used."
            ),
            SchedulerWarning::OverlapRisk { pairs } => {
                let mut listed: Vec<String> = pairs
                    .iter()
                    .take(MAX_LISTED_PAIRS)
                    .map(|(a, b)| format!("{a}/{b}"))
                    .collect();
                if pairs.len() > MAX_LISTED_PAIRS {
                    listed.push("...".to_owned());
                }
                write!(
                    f,
                    "Movement policy 'none' with differing slot times at {}; \
                     real-time visitor overlaps are possible. Consider \
                     policy 'nonoverlap_time'.",
                    listed.join(", ")
                )
            }
            SchedulerWarning::UnknownHostRequest { visitor, host } => write!(
                f,
                "Visitor '{visitor}' requested '{host}', which is not a known host; \
                 the request is ignored."
            ),
            SchedulerWarning::HostNotYetAvailable { visitor, host } => write!(
                f,
                "Visitor '{visitor}' requested '{host}', who is not yet available; \
                 the request is ignored until availability is set."
            ),
        }
    }
}
