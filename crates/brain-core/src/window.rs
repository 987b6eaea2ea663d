//! Context-window policy applied before a transcript reaches a brain.

/// Limits how much of a transcript is sent to the brain.
///
/// System turns are always kept, in their original position relative to
/// each other and ahead of the conversation. When `max_turns` is set only
/// the most recent `max_turns` user/assistant turns follow them.
///
/// # Example
///
/// ```rust
/// use brain_core::{ChatTurn, ContextWindow};
///
/// let window = ContextWindow::sliding(2);
/// let turns = vec![
///     ChatTurn::system("prompt"),
///     ChatTurn::assistant("Hello"),
///     ChatTurn::user("hi"),
///     ChatTurn::assistant("How can I help?"),
/// ];
///
/// let kept = window.apply(turns);
/// assert_eq!(kept.len(), 3);
/// assert!(kept[0].is_system());
/// assert_eq!(kept[1].content, "hi");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextWindow {
    pub max_turns: Option<usize>,
}

impl ContextWindow {
    /// Send the whole transcript.
    pub fn unbounded() -> Self {
        Self { max_turns: None }
    }

    /// Keep the system turns plus the last `max_turns` conversation turns.
    pub fn sliding(max_turns: usize) -> Self {
        Self {
            max_turns: Some(max_turns),
        }
    }

    /// Apply the policy to an ordered transcript.
    pub fn apply(&self, turns: Vec<crate::ChatTurn>) -> Vec<crate::ChatTurn> {
        let (mut kept, mut conversation): (Vec<_>, Vec<_>) =
            turns.into_iter().partition(|t| t.is_system());

        if let Some(max) = self.max_turns {
            if conversation.len() > max {
                let to_remove = conversation.len() - max;
                conversation.drain(0..to_remove);
            }
        }

        kept.extend(conversation);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatTurn, Role};

    fn transcript(n: usize) -> Vec<ChatTurn> {
        let mut turns = vec![ChatTurn::system("prompt")];
        for i in 0..n {
            if i % 2 == 0 {
                turns.push(ChatTurn::assistant(format!("a{}", i)));
            } else {
                turns.push(ChatTurn::user(format!("u{}", i)));
            }
        }
        turns
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let kept = ContextWindow::unbounded().apply(transcript(7));
        assert_eq!(kept.len(), 8);
        assert_eq!(kept, transcript(7));
    }

    #[test]
    fn test_sliding_keeps_system_and_tail() {
        let kept = ContextWindow::sliding(3).apply(transcript(7));
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[0].role, Role::System);
        let contents: Vec<_> = kept[1..].iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a4", "u5", "a6"]);
    }

    #[test]
    fn test_sliding_shorter_than_window() {
        let kept = ContextWindow::sliding(10).apply(transcript(2));
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_zero_window_sends_only_system() {
        let kept = ContextWindow::sliding(0).apply(transcript(4));
        assert_eq!(kept, vec![ChatTurn::system("prompt")]);
    }
}
