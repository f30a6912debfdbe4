use crate::execution::errors::VMError;

/// Saved stack registers and the address to return to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StackFrame {
    /// Values of `s0..sM-1` at call time.
    pub(crate) registers: Vec<u16>,
    /// Line number to resume after, as passed to a jump.
    pub(crate) return_address: usize,
}

/// Bounded call stack.
#[derive(Debug, Clone)]
pub(crate) struct CallStack {
    frames: Vec<StackFrame>,
    max_depth: usize,
}

impl CallStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pushes `frame`, failing with [`VMError::StackOverflow`] at the depth limit.
    pub(crate) fn push(&mut self, frame: StackFrame) -> Result<(), VMError> {
        if self.frames.len() >= self.max_depth {
            return Err(VMError::StackOverflow {
                max_depth: self.max_depth,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<StackFrame, VMError> {
        self.frames.pop().ok_or(VMError::StackUnderflow)
    }
}
