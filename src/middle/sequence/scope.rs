//! Function and block frames
//!
//! Frame 0 is the global frame. Every block opens a fresh frame; every
//! function (including one instantiated halfway through another) gets its
//! own frame stack, so it never sees the locals of whoever triggered it.

use crate::frontend::types::Type;

#[derive(Debug, Clone)]
struct FunctionScope {
    ret: Type,
    frames: Vec<usize>,
    loops: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    next_frame: usize,
    functions: Vec<FunctionScope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_function(
        &mut self,
        ret: Type,
    ) {
        self.functions.push(FunctionScope {
            ret,
            frames: Vec::new(),
            loops: 0,
        });
    }

    pub fn leave_function(&mut self) {
        self.functions.pop();
    }

    pub fn in_function(&self) -> bool {
        !self.functions.is_empty()
    }

    /// Open a block frame in the current function
    pub fn push_frame(&mut self) -> usize {
        self.next_frame += 1;
        let frame = self.next_frame;
        if let Some(function) = self.functions.last_mut() {
            function.frames.push(frame);
        }
        frame
    }

    /// Close the innermost block frame
    pub fn pop_frame(&mut self) -> Option<usize> {
        self.functions.last_mut()?.frames.pop()
    }

    /// Frame new locals go into; 0 outside functions
    pub fn current_frame(&self) -> usize {
        self.functions
            .last()
            .and_then(|f| f.frames.last().copied())
            .unwrap_or(0)
    }

    /// Local frames whose variables are in scope
    pub fn visible(&self) -> &[usize] {
        self.functions.last().map(|f| f.frames.as_slice()).unwrap_or(&[])
    }

    pub fn return_type(&self) -> Option<&Type> {
        self.functions.last().map(|f| &f.ret)
    }

    pub fn enter_loop(&mut self) {
        if let Some(function) = self.functions.last_mut() {
            function.loops += 1;
        }
    }

    pub fn leave_loop(&mut self) {
        if let Some(function) = self.functions.last_mut() {
            function.loops = function.loops.saturating_sub(1);
        }
    }

    pub fn in_loop(&self) -> bool {
        self.functions.last().is_some_and(|f| f.loops > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_function_hides_outer_frames() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.current_frame(), 0);

        scopes.enter_function(Type::atomic("i32"));
        let outer = scopes.push_frame();
        assert_eq!(scopes.visible(), &[outer]);

        scopes.enter_function(Type::atomic("void"));
        let inner = scopes.push_frame();
        assert_eq!(scopes.visible(), &[inner]);
        assert!(scopes.return_type().is_some_and(|t| t.is_void()));

        scopes.pop_frame();
        scopes.leave_function();
        assert_eq!(scopes.visible(), &[outer]);
        assert_ne!(outer, inner);
    }

    #[test]
    fn test_loops_are_per_function() {
        let mut scopes = ScopeStack::new();
        scopes.enter_function(Type::atomic("void"));
        scopes.enter_loop();
        assert!(scopes.in_loop());
        scopes.enter_function(Type::atomic("void"));
        assert!(!scopes.in_loop());
        scopes.leave_function();
        scopes.leave_loop();
        assert!(!scopes.in_loop());
    }
}
