use std::collections::HashMap;

use super::value::Value;

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    /// Function activation frame: lookups do not continue past it except into the
    /// global frame.
    boundary: bool,
}

/// Lexical scope stack. Frame 0 is the global frame and is never popped.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::default()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn push_boundary(&mut self) {
        self.frames.push(Frame {
            bindings: HashMap::new(),
            boundary: true,
        });
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pop every frame above `depth`. Calling it again with the same depth is a no-op.
    pub fn unwind_to(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    /// Indices of the frames visible from the top, innermost first.
    fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        let top = self.frames.len() - 1;
        let stop = (1..=top)
            .rev()
            .find(|i| self.frames[*i].boundary)
            .unwrap_or(0);
        (stop..=top).rev().chain(if stop > 0 { Some(0) } else { None })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.visible()
            .find_map(|i| self.frames[i].bindings.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Store `value` under `name`. A declaration always binds in the innermost frame; an
    /// assignment updates the nearest visible binding, or binds in the innermost frame when
    /// there is none.
    pub fn set_value(&mut self, name: &str, value: Value, is_declaration: bool) {
        if !is_declaration {
            let found = self
                .visible()
                .find(|i| self.frames[*i].bindings.contains_key(name));
            if let Some(i) = found {
                self.frames[i].bindings.insert(name.to_string(), value);
                return;
            }
        }
        if let Some(top) = self.frames.last_mut() {
            top.bindings.insert(name.to_string(), value);
        }
    }

    /// Bind in the global frame regardless of the current depth.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.frames[0].bindings.insert(name.to_string(), value);
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_block_binding_is_dropped_on_pop() {
        let mut scopes = ScopeStack::new();
        scopes.set_value("outer", num(1.0), true);
        scopes.push();
        scopes.set_value("inner", num(2.0), true);
        assert_eq!(scopes.get("outer"), Some(&num(1.0)));
        scopes.pop();
        assert!(scopes.get("inner").is_none());
        assert_eq!(scopes.get("outer"), Some(&num(1.0)));
    }

    #[test]
    fn test_assignment_updates_outer_binding() {
        let mut scopes = ScopeStack::new();
        scopes.set_value("x", num(1.0), true);
        scopes.push();
        scopes.set_value("x", num(5.0), false);
        scopes.pop();
        assert_eq!(scopes.get("x"), Some(&num(5.0)));
    }

    #[test]
    fn test_declaration_shadows() {
        let mut scopes = ScopeStack::new();
        scopes.set_value("x", num(1.0), true);
        scopes.push();
        scopes.set_value("x", num(2.0), true);
        assert_eq!(scopes.get("x"), Some(&num(2.0)));
        scopes.pop();
        assert_eq!(scopes.get("x"), Some(&num(1.0)));
    }

    #[test]
    fn test_boundary_hides_caller_frames_but_not_globals() {
        let mut scopes = ScopeStack::new();
        scopes.set_value("global", num(1.0), true);
        scopes.push();
        scopes.set_value("caller_local", num(2.0), true);
        scopes.push_boundary();
        assert_eq!(scopes.get("global"), Some(&num(1.0)));
        assert!(scopes.get("caller_local").is_none());
    }

    #[test]
    fn test_unwind_is_idempotent_and_keeps_global() {
        let mut scopes = ScopeStack::new();
        let depth = scopes.depth();
        scopes.push();
        scopes.push();
        scopes.unwind_to(depth);
        scopes.unwind_to(depth);
        assert_eq!(scopes.depth(), 1);
        scopes.unwind_to(0);
        assert_eq!(scopes.depth(), 1);
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
    }
}
