//! User-visible status of the last load or save.

/// Outcome of the most recent attempt, rendered as a fixed string.
///
/// Each new attempt replaces the previous message; messages never
/// accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StatusMessage {
    /// A search or load completed.
    #[strum(serialize = "Success loading!")]
    LoadSucceeded,
    /// A search or load failed.
    #[strum(serialize = "Error Loading!")]
    LoadFailed,
    /// A save has been issued and not yet answered.
    #[strum(serialize = "Is saving ...")]
    Saving,
    /// A save completed.
    #[strum(serialize = "Success saving!")]
    SaveSucceeded,
    /// A save failed.
    #[strum(serialize = "Error saving!")]
    SaveFailed,
}

impl StatusMessage {
    /// Return `true` for the failure messages.
    pub fn is_error(self) -> bool {
        matches!(self, Self::LoadFailed | Self::SaveFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_render_verbatim() {
        assert_eq!(StatusMessage::LoadSucceeded.to_string(), "Success loading!");
        assert_eq!(StatusMessage::LoadFailed.to_string(), "Error Loading!");
        assert_eq!(StatusMessage::Saving.to_string(), "Is saving ...");
        assert_eq!(StatusMessage::SaveSucceeded.to_string(), "Success saving!");
        assert_eq!(StatusMessage::SaveFailed.to_string(), "Error saving!");
    }

    #[test]
    fn only_failures_are_errors() {
        assert!(StatusMessage::LoadFailed.is_error());
        assert!(StatusMessage::SaveFailed.is_error());
        assert!(!StatusMessage::Saving.is_error());
    }
}
