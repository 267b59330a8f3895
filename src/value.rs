//! Runtime values, closures, and the persistent position -> value map.

use std::rc::Rc;

use crate::canvas::Canvas;
use crate::direction::Direction;
use crate::eval::Interpreter;

/// A curried, heap-allocated function value.
#[derive(Clone)]
pub enum Func {
    /// A `lambda` tile: applying it evaluates its body at `(x + 2, y)`
    /// under an environment extended with the argument and a
    /// self-reference, per the fixed-point scheme in the design notes.
    Lambda(Rc<Lambda>),
    /// A primitive (`functions/add`, `extensions/sin`, ...), already
    /// partially applied zero or more times.
    Native(Rc<dyn Fn(Value) -> Option<Value>>),
}

impl std::fmt::Debug for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lambda(l) => write!(f, "<lambda@{},{}>", l.x, l.y),
            Self::Native(_) => write!(f, "<native>"),
        }
    }
}

pub struct Lambda {
    pub interpreter: Rc<Interpreter>,
    pub env: Env,
    pub x: i64,
    pub y: i64,
}

/// A dynamically typed value flowing through the evaluator.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Unit,
    Canvas(Rc<Canvas>),
    Function(Func),
    Pair(Box<Value>, Box<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Unit, Self::Unit) => true,
            (Self::Canvas(a), Self::Canvas(b)) => a == b,
            (Self::Pair(a1, b1), Self::Pair(a2, b2)) => a1 == a2 && b1 == b2,
            _ => false,
        }
    }
}

impl Value {
    pub fn apply(&self, arg: Value) -> Option<Value> {
        match self {
            Self::Function(Func::Native(f)) => f(arg),
            Self::Function(Func::Lambda(lambda)) => {
                let self_value = Value::Function(Func::Lambda(Rc::clone(lambda)));
                let env = lambda
                    .env
                    .extend((lambda.x + 1, lambda.y), arg)
                    .extend((lambda.x, lambda.y), self_value);
                lambda.interpreter.eval(lambda.x + 2, lambda.y, Direction::None, &env)
            }
            _ => None,
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }
}

enum EnvNode {
    Empty,
    Base(std::collections::HashMap<(i64, i64), Value>),
    Extend { key: (i64, i64), value: Value, parent: Env },
}

/// A persistent map from grid position to bound value. Extending never
/// mutates the parent, so sibling evaluation chains never see each
/// other's bindings.
#[derive(Clone)]
pub struct Env(Rc<EnvNode>);

impl Default for Env {
    fn default() -> Self {
        Self(Rc::new(EnvNode::Empty))
    }
}

impl Env {
    pub fn from_base(map: std::collections::HashMap<(i64, i64), Value>) -> Self {
        Self(Rc::new(EnvNode::Base(map)))
    }

    #[must_use]
    pub fn extend(&self, key: (i64, i64), value: Value) -> Self {
        Self(Rc::new(EnvNode::Extend { key, value, parent: self.clone() }))
    }

    pub fn get(&self, key: (i64, i64)) -> Option<Value> {
        match self.0.as_ref() {
            EnvNode::Empty => None,
            EnvNode::Base(map) => map.get(&key).cloned(),
            EnvNode::Extend { key: k, value, parent } => {
                if *k == key {
                    Some(value.clone())
                } else {
                    parent.get(key)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extension_shadows_without_mutating_parent() {
        let base = Env::default();
        let a = base.extend((0, 0), Value::Int(1));
        let b = a.extend((0, 0), Value::Int(2));

        assert_eq!(a.get((0, 0)).unwrap().as_f64(), Some(1.0));
        assert_eq!(b.get((0, 0)).unwrap().as_f64(), Some(2.0));
        assert!(base.get((0, 0)).is_none());
    }

    #[test]
    fn base_map_is_visible_under_extensions() {
        let mut map = std::collections::HashMap::new();
        map.insert((5, 5), Value::Bool(true));
        let env = Env::from_base(map).extend((1, 1), Value::Int(9));

        assert!(matches!(env.get((5, 5)), Some(Value::Bool(true))));
        assert!(matches!(env.get((1, 1)), Some(Value::Int(9))));
        assert!(env.get((9, 9)).is_none());
    }
}
