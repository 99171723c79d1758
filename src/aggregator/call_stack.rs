//! Active call stack with an incrementally maintained joined path.
//!
//! The path buffer always holds `root;...;top`. Each frame remembers the
//! buffer length before its own name went in, so popping is a truncation
//! instead of a rebuild over the remaining frames.

use crate::utils::config::PATH_SEPARATOR;

/// A call that has been entered but not yet exited
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub name: String,
    pub entry_time_us: f64,

    /// Path buffer length right before this frame was pushed
    pub path_len_before_push: usize,
}

#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<StackFrame>,
    path: String,
    max_depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a call
    pub fn push(&mut self, name: impl Into<String>, entry_time_us: f64) {
        let name = name.into();
        let path_len_before_push = self.path.len();

        if !self.frames.is_empty() {
            self.path.push(PATH_SEPARATOR);
        }
        self.path.push_str(&name);

        self.frames.push(StackFrame {
            name,
            entry_time_us,
            path_len_before_push,
        });
        self.max_depth = self.max_depth.max(self.frames.len());
    }

    /// Leave the innermost call
    ///
    /// Returns an owned copy of the path the call completed under, and its
    /// duration. `None` if no call is open, in which case nothing changes.
    pub fn pop(&mut self, exit_time_us: f64) -> Option<(String, f64)> {
        let frame = self.frames.pop()?;
        let snapshot = self.path.clone();
        self.path.truncate(frame.path_len_before_push);

        Some((snapshot, exit_time_us - frame.entry_time_us))
    }

    /// Current joined path, root first
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Deepest the stack has been since creation
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_builds_joined_path() {
        let mut stack = CallStack::new();
        stack.push("{main}", 0.0);
        stack.push("a", 1.0);
        stack.push("c", 2.0);

        assert_eq!(stack.path(), "{main};a;c");
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.top().map(|f| f.path_len_before_push), Some(8));
    }

    #[test]
    fn test_pop_returns_snapshot_and_duration() {
        let mut stack = CallStack::new();
        stack.push("{main}", 10.0);
        stack.push("a", 20.0);

        let (path, duration) = stack.pop(209.0).unwrap();
        assert_eq!(path, "{main};a");
        assert_eq!(duration, 189.0);
        assert_eq!(stack.path(), "{main}");
    }

    #[test]
    fn test_push_pop_restores_buffer() {
        let mut stack = CallStack::new();
        for (i, name) in ["{main}", "b", "d"].iter().enumerate() {
            stack.push(*name, i as f64);

            let before = stack.path().to_string();
            let len_before = stack.path().len();
            stack.push("e", 10.0);
            stack.pop(11.0);

            assert_eq!(stack.path(), before);
            assert_eq!(stack.path().len(), len_before);
        }
    }

    #[test]
    fn test_snapshot_survives_later_pushes() {
        let mut stack = CallStack::new();
        stack.push("{main}", 0.0);
        stack.push("a", 1.0);
        let (path, _) = stack.pop(2.0).unwrap();
        stack.push("zzzzzz", 3.0);

        assert_eq!(path, "{main};a");
    }

    #[test]
    fn test_pop_on_empty_stack() {
        let mut stack = CallStack::new();
        assert_eq!(stack.pop(5.0), None);
        assert!(stack.is_empty());
        assert_eq!(stack.path(), "");
    }

    #[test]
    fn test_max_depth_is_high_water_mark() {
        let mut stack = CallStack::new();
        stack.push("a", 0.0);
        stack.push("b", 0.0);
        stack.pop(1.0);
        stack.pop(1.0);
        stack.push("c", 2.0);

        assert_eq!(stack.max_depth(), 2);
    }
}
