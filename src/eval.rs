//! The dataflow evaluator: `eval(x, y, arrival, env) -> Value`.
//!
//! Straight and corner wires, bridges, and joins are driven by an
//! explicit loop (see [`forward`]) so an arbitrarily long wire run costs
//! O(1) stack frames; recursion only happens at `app`, lambda application,
//! and entry evaluation, where it mirrors genuine program nesting.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::canvas;
use crate::config::Config;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::direction::Direction;
use crate::grid::Grids;
use crate::library::Library;
use crate::numeric;
use crate::tile::KnownTile;
use crate::value::{Env, Func, Lambda, Value};

/// A generous ceiling on total reductions, guarding against runaway
/// recursion in a malformed program without imposing a real limit on any
/// program this language can reasonably express.
const MAX_REDUCTIONS: u64 = 2_000_000;

pub struct Interpreter {
    pub grids: Grids,
    pub library: Library,
    pub config: Config,
    diagnostics: RefCell<Diagnostics>,
    steps: Cell<u64>,
}

enum Forward {
    /// Step to a neighbouring cell with a new arrival direction.
    Goto(i64, i64, Direction),
    /// This tile is not a forwarder (or the arrival direction is illegal
    /// for it); fall through to full dispatch.
    Stop,
}

impl Interpreter {
    pub fn new(grids: Grids, library: Library, config: Config) -> Rc<Self> {
        Rc::new(Self { grids, library, config, diagnostics: RefCell::new(Diagnostics::default()), steps: Cell::new(0) })
    }

    pub fn diagnostics(&self) -> std::cell::Ref<'_, Diagnostics> {
        self.diagnostics.borrow()
    }

    pub(crate) fn diagnose(&self, x: i64, y: i64, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.borrow_mut().push(self.grids.base_grid, x, y, kind, message);
    }

    /// `eval(x, y, arrival_dir, env) -> Value`, the evaluator's sole entry
    /// point. Returns `None` for any routing/shape/type failure; callers
    /// treat that as "nothing" and propagate it as a failure of their own.
    pub fn eval(self: &Rc<Self>, mut x: i64, mut y: i64, mut dir: Direction, env: &Env) -> Option<Value> {
        loop {
            let steps = self.steps.get() + 1;
            self.steps.set(steps);
            if steps > MAX_REDUCTIONS {
                self.diagnose(x, y, DiagnosticKind::ReductionLimit, "reduction limit exceeded");
                return None;
            }

            if let Some(value) = env.get((x, y)) {
                return Some(value);
            }

            let Some(name) = self.grids.name(x, y) else {
                self.diagnose(x, y, DiagnosticKind::Routing, "position is outside the program grid");
                return None;
            };
            let Some(tile) = name.known() else {
                self.diagnose(x, y, DiagnosticKind::Recognition, format!("cell has no known meaning ({name})"));
                return None;
            };

            match forward(x, y, tile, dir) {
                Forward::Goto(nx, ny, ndir) => {
                    x = nx;
                    y = ny;
                    dir = ndir;
                }
                Forward::Stop => return self.dispatch(x, y, dir, tile, env),
            }
        }
    }

    fn dispatch(self: &Rc<Self>, x: i64, y: i64, dir: Direction, tile: KnownTile, env: &Env) -> Option<Value> {
        match tile {
            KnownTile::Canvas => canvas::recognize(&self.grids, x, y).map(|c| Value::Canvas(Rc::new(c))).or_else(|| {
                self.diagnose(x, y, DiagnosticKind::Shape, "canvas border does not close");
                None
            }),

            KnownTile::EndE | KnownTile::EndS | KnownTile::WireNs | KnownTile::WireWe | KnownTile::WireNe
            | KnownTile::WireNw | KnownTile::WireSe | KnownTile::WireSw | KnownTile::Bridge
            | KnownTile::JoinNse | KnownTile::JoinNsw | KnownTile::JoinNwe => {
                self.diagnose(x, y, DiagnosticKind::Routing, format!("wrong side {dir} for tile {tile}"));
                None
            }

            KnownTile::App => {
                if dir != Direction::West {
                    self.diagnose(x, y, DiagnosticKind::Routing, format!("wrong side {dir} for tile app"));
                    return None;
                }
                let f = self.eval(x, y + 1, Direction::South, env);
                let arg = self.eval(x, y - 1, Direction::North, env);
                let Some(f) = f else {
                    self.diagnose(x, y, DiagnosticKind::Routing, "function not found");
                    return None;
                };
                let Some(arg) = arg else {
                    self.diagnose(x, y, DiagnosticKind::Routing, "argument not found");
                    return None;
                };
                f.apply(arg).or_else(|| {
                    self.diagnose(x, y, DiagnosticKind::TypeMismatch, "application failed");
                    None
                })
            }

            KnownTile::Lambda => Some(Value::Function(Func::Lambda(Rc::new(Lambda {
                interpreter: Rc::clone(self),
                env: env.clone(),
                x,
                y,
            })))),

            KnownTile::Entry => {
                let (content, ret) = self.eval_entry_parts(x, y, env);
                match (content, ret) {
                    (Some(content), Some(ret)) => Some(Value::Pair(Box::new(content), Box::new(ret))),
                    _ => {
                        self.diagnose(x, y, DiagnosticKind::EntryInvalid, "entry referenced as a value has no content/return");
                        None
                    }
                }
            }

            KnownTile::SliderL => numeric::read_slider(&self.grids, x, y).map(Value::Float).or_else(|| {
                self.diagnose(x, y, DiagnosticKind::Shape, "malformed slider");
                None
            }),

            KnownTile::Digit(_) | KnownTile::Dot | KnownTile::Sub => {
                if let Some(value) = numeric::read_number(&self.grids, x, y) {
                    Some(value)
                } else if tile == KnownTile::Sub {
                    Some(self.primitive(tile, x, y))
                } else {
                    self.diagnose(x, y, DiagnosticKind::Shape, "no number here");
                    None
                }
            }

            KnownTile::SliderM | KnownTile::SliderR => {
                self.diagnose(x, y, DiagnosticKind::Routing, format!("wrong side {dir} for tile {tile}"));
                None
            }

            KnownTile::Label => {
                self.diagnose(x, y, DiagnosticKind::Routing, "label tile is not a readable expression");
                None
            }

            _primitive_tile => Some(self.primitive(tile, x, y)),
        }
    }

    /// Evaluate an entry's content and return-canvas, independently, so
    /// the renderer can distinguish "no content" from "return isn't a
    /// canvas" per the error-handling design.
    pub fn eval_entry_parts(self: &Rc<Self>, x: i64, y: i64, env: &Env) -> (Option<Value>, Option<Value>) {
        let content = self.eval(x + 1, y, Direction::None, env);
        let ret = self.eval(x + 2, y, Direction::None, env);
        (content, ret)
    }

    fn primitive(self: &Rc<Self>, tile: KnownTile, x: i64, y: i64) -> Value {
        debug!(tile = %tile, x, y, "constructing primitive");
        let interp = Rc::clone(self);
        match tile {
            KnownTile::Add => numeric_binop(interp, x, y, |a, b| Some(a + b), |a, b| a + b),
            KnownTile::Sub => numeric_binop(interp, x, y, |a, b| Some(a - b), |a, b| a - b),
            KnownTile::Mul => numeric_binop(interp, x, y, |a, b| Some(a * b), |a, b| a * b),
            KnownTile::Mod => numeric_binop(interp, x, y, |a, b| (b != 0).then(|| floor_mod(a, b)), floor_mod_f64),
            KnownTile::Div => div(interp, x, y),
            KnownTile::Pow => pow(interp, x, y),
            KnownTile::Floor => floor(interp, x, y),

            KnownTile::Equal => compare(interp, x, y, |o| o == std::cmp::Ordering::Equal, true),
            KnownTile::Unequal => compare(interp, x, y, |o| o != std::cmp::Ordering::Equal, true),
            KnownTile::Greater => compare(interp, x, y, |o| o == std::cmp::Ordering::Greater, false),
            KnownTile::Less => compare(interp, x, y, |o| o == std::cmp::Ordering::Less, false),
            KnownTile::GreaterEqual => compare(interp, x, y, |o| o != std::cmp::Ordering::Less, false),
            KnownTile::LessEqual => compare(interp, x, y, |o| o != std::cmp::Ordering::Greater, false),

            KnownTile::And => native2(move |a, b| bool_op(&interp, x, y, a, b, |a, b| a && b)),
            KnownTile::Or => native2(move |a, b| bool_op(&interp, x, y, a, b, |a, b| a || b)),
            KnownTile::Not => native1(move |a| match a {
                Value::Bool(b) => Some(Value::Bool(!b)),
                other => {
                    interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("not expects a bool, got {other:?}"));
                    None
                }
            }),
            KnownTile::If => if_primitive(interp, x, y),

            KnownTile::Width => native1(move |a| match a {
                Value::Canvas(c) => Some(Value::Int(c.width())),
                other => {
                    interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("width expects a canvas, got {other:?}"));
                    None
                }
            }),
            KnownTile::Height => native1(move |a| match a {
                Value::Canvas(c) => Some(Value::Int(c.height())),
                other => {
                    interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("height expects a canvas, got {other:?}"));
                    None
                }
            }),
            KnownTile::Read => read(interp, x, y),
            KnownTile::Write => write_primitive(interp, x, y),

            KnownTile::Cos => native1(move |a| trig(&interp, x, y, a, f64::cos)),
            KnownTile::Sin => native1(move |a| trig(&interp, x, y, a, f64::sin)),
            KnownTile::Atan2 => native2(move |vy, vx| {
                let (Some(vy), Some(vx)) = (vy.as_f64(), vx.as_f64()) else {
                    interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "atan2 expects numbers");
                    return None;
                };
                Some(Value::Float(vy.atan2(vx)))
            }),

            other => {
                self.diagnose(x, y, DiagnosticKind::Routing, format!("{other} is not implemented"));
                Value::Unit
            }
        }
    }
}


/// Table-driven straight/corner wire, bridge, and join routing. Returns
/// `Forward::Stop` for any tile this table doesn't own, or whenever the
/// arrival direction is illegal for the given tile.
fn forward(x: i64, y: i64, tile: KnownTile, dir: Direction) -> Forward {
    use Direction::{East, North, South, West};
    let step = |d: Direction| {
        let (dx, dy) = d.step();
        Forward::Goto(x + dx, y + dy, d)
    };
    match (tile, dir) {
        (KnownTile::WireNs, North) => step(North),
        (KnownTile::WireNs, South) => step(South),

        (KnownTile::WireWe, East) => step(East),
        (KnownTile::WireWe, West) => step(West),

        (KnownTile::WireNe, West) => step(North),
        (KnownTile::WireNe, South) => step(East),

        (KnownTile::WireNw, East) => step(North),
        (KnownTile::WireNw, South) => step(West),

        (KnownTile::WireSe, North) => step(East),
        (KnownTile::WireSe, West) => step(South),

        (KnownTile::WireSw, North) => step(West),
        (KnownTile::WireSw, East) => step(South),

        (KnownTile::Bridge, North) => step(North),
        (KnownTile::Bridge, South) => step(South),
        (KnownTile::Bridge, East) => step(East),
        (KnownTile::Bridge, West) => step(West),

        (KnownTile::JoinNse, North | West) => step(North),
        (KnownTile::JoinNsw, North | East) => step(North),
        (KnownTile::JoinNwe, East | West) => step(North),

        (KnownTile::EndE, d) if d != West => step(East),
        (KnownTile::EndS, d) if d != North => step(South),

        _ => Forward::Stop,
    }
}

fn native1(f: impl Fn(Value) -> Option<Value> + 'static) -> Value {
    Value::Function(Func::Native(Rc::new(f)))
}

fn native2(f: impl Fn(Value, Value) -> Option<Value> + Clone + 'static) -> Value {
    native1(move |a| {
        let f = f.clone();
        Some(native1(move |b| f(a.clone(), b)))
    })
}

fn native3(f: impl Fn(Value, Value, Value) -> Option<Value> + Clone + 'static) -> Value {
    native2(move |a, b| {
        let f = f.clone();
        Some(native1(move |c| f(a.clone(), b.clone(), c)))
    })
}

fn native4(f: impl Fn(Value, Value, Value, Value) -> Option<Value> + Clone + 'static) -> Value {
    native3(move |a, b, c| {
        let f = f.clone();
        Some(native1(move |d| f(a.clone(), b.clone(), c.clone(), d)))
    })
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q }
}

/// Float modulo with the result taking the sign of `b`, matching
/// [`floor_mod`]'s integer convention (Rust's `%` and `rem_euclid` both
/// disagree with this for negative divisors).
fn floor_mod_f64(a: f64, b: f64) -> f64 {
    a - (a / b).floor() * b
}

fn numeric_binop(
    interp: Rc<Interpreter>,
    x: i64,
    y: i64,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    native2(move |a, b| match (&a, &b) {
        (Value::Int(ai), Value::Int(bi)) => match int_op(*ai, *bi) {
            Some(v) => Some(Value::Int(v)),
            None => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "arithmetic on integers failed (e.g. division by zero)");
                None
            }
        },
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(af), Some(bf)) => Some(Value::Float(float_op(af, bf))),
            _ => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "arithmetic expects numbers");
                None
            }
        },
    })
}

fn div(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native2(move |a, b| {
        if a.is_float() || b.is_float() {
            let (Some(af), Some(bf)) = (a.as_f64(), b.as_f64()) else {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "div expects numbers");
                return None;
            };
            if bf == 0.0 {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "division by zero");
                return None;
            }
            Some(Value::Float(af / bf))
        } else if let (Value::Int(ai), Value::Int(bi)) = (&a, &b) {
            if *bi == 0 {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "division by zero");
                return None;
            }
            Some(Value::Int(floor_div(*ai, *bi)))
        } else {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "div expects numbers");
            None
        }
    })
}

fn pow(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native2(move |a, b| match (&a, &b) {
        (Value::Int(base), Value::Int(exp)) if *exp >= 0 && u32::try_from(*exp).is_ok() => {
            match base.checked_pow(u32::try_from(*exp).unwrap()) {
                Some(v) => Some(Value::Int(v)),
                None => Some(Value::Float((*base as f64).powf(*exp as f64))),
            }
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(af), Some(bf)) => Some(Value::Float(af.powf(bf))),
            _ => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "pow expects numbers");
                None
            }
        },
    })
}

fn floor(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native1(move |a| match a {
        Value::Int(i) => Some(Value::Int(i)),
        Value::Float(f) => Some(Value::Int(f.trunc() as i64)),
        other => {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("floor expects a number, got {other:?}"));
            None
        }
    })
}

fn compare(interp: Rc<Interpreter>, x: i64, y: i64, accept: fn(std::cmp::Ordering) -> bool, allow_non_numeric_eq: bool) -> Value {
    native2(move |a, b| {
        if allow_non_numeric_eq {
            if let (Value::Bool(ab), Value::Bool(bb)) = (&a, &b) {
                return Some(Value::Bool(accept(ab.cmp(bb))));
            }
            if matches!(a, Value::Unit) && matches!(b, Value::Unit) {
                return Some(Value::Bool(accept(std::cmp::Ordering::Equal)));
            }
        }
        match (a.as_f64(), b.as_f64()) {
            (Some(af), Some(bf)) => af.partial_cmp(&bf).map(|o| Value::Bool(accept(o))).or_else(|| {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "comparison of NaN");
                None
            }),
            _ => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "comparison expects two numbers (or two bools for equal/unequal)");
                None
            }
        }
    })
}

fn bool_op(interp: &Rc<Interpreter>, x: i64, y: i64, a: Value, b: Value, op: fn(bool, bool) -> bool) -> Option<Value> {
    match (a, b) {
        (Value::Bool(ab), Value::Bool(bb)) => Some(Value::Bool(op(ab, bb))),
        (a, b) => {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("and/or expect bools, got {a:?} and {b:?}"));
            None
        }
    }
}

fn if_primitive(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native3(move |cond, then_branch, else_branch| match cond {
        Value::Bool(true) => then_branch.apply(Value::Unit),
        Value::Bool(false) => else_branch.apply(Value::Unit),
        other => {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("if expects a bool condition, got {other:?}"));
            None
        }
    })
}

fn trig(interp: &Rc<Interpreter>, x: i64, y: i64, a: Value, f: fn(f64) -> f64) -> Option<Value> {
    match a.as_f64() {
        Some(v) => Some(Value::Float(f(v))),
        None => {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("trig function expects a number, got {a:?}"));
            None
        }
    }
}

fn read(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native3(move |canvas, cx, cy| {
        let (Value::Canvas(c), Value::Int(cx), Value::Int(cy)) = (&canvas, &cx, &cy) else {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "read expects (canvas, int, int)");
            return None;
        };
        match c.read(*cx, *cy) {
            Some(pixel) => Some(Value::Int(i64::from(pixel))),
            None => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("read out of bounds at ({cx}, {cy})"));
                None
            }
        }
    })
}

fn write_primitive(interp: Rc<Interpreter>, x: i64, y: i64) -> Value {
    native4(move |canvas, cx, cy, v| {
        let (Value::Canvas(c), Value::Int(cx), Value::Int(cy), Value::Int(v)) = (&canvas, &cx, &cy, &v) else {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, "write expects (canvas, int, int, int)");
            return None;
        };
        let Ok(v) = u8::try_from(*v) else {
            interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("write value {v} out of pixel range"));
            return None;
        };
        match c.write(*cx, *cy, v) {
            Some(updated) => Some(Value::Canvas(Rc::new(updated))),
            None => {
                interp.diagnose(x, y, DiagnosticKind::TypeMismatch, format!("write out of bounds at ({cx}, {cy})"));
                None
            }
        }
    })
}
