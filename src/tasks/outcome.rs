/// Result of one network attempt.
///
/// Only used for reporting: both variants take the same cleanup-and-retry path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failure { code: i32 },
}

impl TaskOutcome {
    /// Maps a task's outcome code: `0` is success, anything else failure.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TaskOutcome::Success,
            code => TaskOutcome::Failure { code },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    /// The raw outcome code.
    pub fn code(&self) -> i32 {
        match self {
            TaskOutcome::Success => 0,
            TaskOutcome::Failure { code } => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_the_only_success() {
        assert_eq!(TaskOutcome::from_code(0), TaskOutcome::Success);
        assert_eq!(TaskOutcome::from_code(1), TaskOutcome::Failure { code: 1 });
        assert_eq!(
            TaskOutcome::from_code(-0x7780),
            TaskOutcome::Failure { code: -0x7780 }
        );
        assert_eq!(TaskOutcome::from_code(-5).code(), -5);
    }
}
