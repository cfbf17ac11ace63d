//! Constants and functions every expression may reference.

use simsearch::SimSearch;
use std::f64::consts;

/// The free variable.
pub const VAR: &str = "x";

pub enum Kind {
    Const(f64),
    Func(fn(f64) -> f64),
    Func2(fn(f64, f64) -> f64),
    /// Variadic, at least one argument.
    FuncN(fn(&[f64]) -> f64),
}

pub struct Builtin {
    pub name: &'static str,
    pub kind: Kind,
}

const fn b(name: &'static str, kind: Kind) -> Builtin {
    Builtin { name, kind }
}

pub static BUILTINS: &[Builtin] = &[
    b("pi", Kind::Const(consts::PI)),
    b("e", Kind::Const(consts::E)),
    b("tau", Kind::Const(consts::TAU)),
    b("phi", Kind::Const(1.618_033_988_749_895)),
    b("sin", Kind::Func(f64::sin)),
    b("cos", Kind::Func(f64::cos)),
    b("tan", Kind::Func(f64::tan)),
    b("sec", Kind::Func(sec)),
    b("csc", Kind::Func(csc)),
    b("cot", Kind::Func(cot)),
    b("asin", Kind::Func(f64::asin)),
    b("acos", Kind::Func(f64::acos)),
    b("atan", Kind::Func(f64::atan)),
    b("sinh", Kind::Func(f64::sinh)),
    b("cosh", Kind::Func(f64::cosh)),
    b("tanh", Kind::Func(f64::tanh)),
    b("asinh", Kind::Func(f64::asinh)),
    b("acosh", Kind::Func(f64::acosh)),
    b("atanh", Kind::Func(f64::atanh)),
    b("sqrt", Kind::Func(f64::sqrt)),
    b("cbrt", Kind::Func(f64::cbrt)),
    b("exp", Kind::Func(f64::exp)),
    b("log", Kind::Func(f64::ln)),
    b("ln", Kind::Func(f64::ln)),
    b("log10", Kind::Func(f64::log10)),
    b("log2", Kind::Func(f64::log2)),
    b("abs", Kind::Func(f64::abs)),
    b("sign", Kind::Func(sign)),
    b("floor", Kind::Func(f64::floor)),
    b("ceil", Kind::Func(f64::ceil)),
    b("round", Kind::Func(f64::round)),
    b("atan2", Kind::Func2(f64::atan2)),
    b("pow", Kind::Func2(f64::powf)),
    b("mod", Kind::Func2(modulo)),
    b("max", Kind::FuncN(max)),
    b("min", Kind::FuncN(min)),
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub fn is_constant(name: &str) -> bool {
    matches!(lookup(name), Some(Builtin { kind: Kind::Const(_), .. }))
}

pub fn is_function(name: &str) -> bool {
    lookup(name).is_some_and(|b| !matches!(b.kind, Kind::Const(_)))
}

/// The closest known name, if any is close enough.
pub fn suggest(name: &str) -> Option<&'static str> {
    let mut engine: SimSearch<&'static str> = SimSearch::new();
    engine.insert(VAR, VAR);
    for b in BUILTINS {
        engine.insert(b.name, b.name);
    }

    engine.search(name).into_iter().next()
}

fn sec(x: f64) -> f64 {
    x.cos().recip()
}

fn csc(x: f64) -> f64 {
    x.sin().recip()
}

fn cot(x: f64) -> f64 {
    x.tan().recip()
}

// zero is unsigned, unlike f64::signum
fn sign(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x.signum()
    }
}

// result takes the sign of the divisor
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert!(is_constant("pi"));
        assert!(!is_constant("sin"));
        assert!(is_function("log10"));
        assert!(!is_function("e"));
        assert!(lookup("foo").is_none());
    }

    #[test]
    fn helpers() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(modulo(-1.0, 3.0), 2.0);
        assert_eq!(max(&[1.0, 4.0, 2.0]), 4.0);
        assert_eq!(min(&[1.0, 4.0, 2.0]), 1.0);
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest("sinn"), Some("sin"));
        assert_eq!(suggest("X"), Some("x"));
    }
}
