//! Line-level control flow.
//!
//! Jump targets are line numbers counted from 1. Jumping to line number `n`
//! resumes at the first executable line whose 0-based index is `n` or later,
//! that is the first instruction after source line `n`.

use crate::parsing::program::Program;

#[derive(Debug, Clone)]
pub(crate) struct FlowController {
    executable: Vec<bool>,
    last_instruction: Option<usize>,
    current: usize,
    next: Option<usize>,
    modified: bool,
    remaining_sleep: usize,
}

impl FlowController {
    pub(crate) fn new(program: &Program) -> Self {
        let mut flow = Self {
            executable: program.lines().iter().map(|l| l.is_instruction()).collect(),
            last_instruction: program.last_instruction_index(),
            current: 0,
            next: None,
            modified: false,
            remaining_sleep: 0,
        };
        flow.next = flow.next_executable(0);
        flow
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }

    /// Index of the line executed next, `None` once terminated.
    pub(crate) fn next(&self) -> Option<usize> {
        self.next
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.next.is_none()
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.modified
    }

    /// Continues at the first executable line after 1-based line `line_number`.
    pub(crate) fn jump(&mut self, line_number: usize) {
        self.next = self.next_executable(line_number);
        self.modified = true;
    }

    /// Stops the program after the current line.
    pub(crate) fn terminate(&mut self) {
        self.next = None;
        self.modified = true;
    }

    pub(crate) fn update_current(&mut self) {
        if let Some(next) = self.next {
            self.current = next;
        }
    }

    pub(crate) fn move_next(&mut self) {
        self.next = self.next_executable(self.current + 1);
    }

    pub(crate) fn reset(&mut self) {
        self.modified = false;
    }

    pub(crate) fn sleep(&mut self, steps: usize) {
        self.remaining_sleep = steps;
    }

    pub(crate) fn is_sleeping(&self) -> bool {
        self.remaining_sleep > 0
    }

    pub(crate) fn process_sleep(&mut self) {
        self.remaining_sleep = self.remaining_sleep.saturating_sub(1);
    }

    /// First executable line at or after `start`.
    fn next_executable(&self, start: usize) -> Option<usize> {
        let last = self.last_instruction?;
        if start > last {
            return None;
        }
        (start..=last).find(|i| self.executable[*i])
    }
}
