//! LaTeX rendering of a parsed expression.
//!
//! Works straight off the RPN token stream. Parentheses are not kept in RPN so they are
//! re-derived from operator precedence: a child is wrapped only when it binds looser than its
//! position requires.

use super::*;
use meval::tokenizer::{Operation, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Sum,
    Product,
    Neg,
    Power,
    Atom,
}

#[derive(Debug)]
struct Node {
    tex: String,
    prec: Prec,
    /// A plain number literal, usable as a juxtaposed coefficient.
    numeric: bool,
    /// The rendering visibly starts with a digit.
    lead_digit: bool,
    /// A bare `\frac`, which reads as a mixed number after a coefficient.
    fraction: bool,
}

impl Node {
    fn atom(tex: String) -> Self {
        Self {
            tex,
            prec: Prec::Atom,
            numeric: false,
            lead_digit: false,
            fraction: false,
        }
    }

    fn number(n: f64) -> Self {
        if n.is_infinite() {
            // an overflowing literal such as `1e400`
            return Self::atom("\\infty".to_string());
        }

        let (tex, prec) = number(n);
        Self {
            tex,
            prec,
            numeric: prec == Prec::Atom,
            lead_digit: true,
            fraction: false,
        }
    }

    fn wrap(self) -> Self {
        Self::atom(format!("\\left({}\\right)", self.tex))
    }

    fn wrap_when(self, loose: impl FnOnce(&Self) -> bool) -> Self {
        if loose(&self) {
            self.wrap()
        } else {
            self
        }
    }
}

/// Render RPN tokens as LaTeX.
pub fn render(rpn: &[Token]) -> Result<String, Error> {
    let mut stack: Vec<Node> = Vec::with_capacity(rpn.len());

    for t in rpn {
        let node = match t {
            Token::Number(n) => Node::number(*n),
            Token::Var(name) => Node::atom(ident(name)),
            Token::Unary(op) => {
                let a = pop(&mut stack)?;
                unary(op, a)?
            }
            Token::Binary(op) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                binary(op, a, b)?
            }
            Token::Func(name, Some(n)) => {
                let at = stack
                    .len()
                    .checked_sub(*n)
                    .ok_or_else(|| malformed("function is missing arguments"))?;
                let args = stack.split_off(at);
                func(name, args)
            }
            t => return Err(malformed(format!("unexpected token {t:?}"))),
        };
        stack.push(node);
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(node), true) => Ok(node.tex),
        _ => Err(malformed("dangling operands")),
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::Evaluation(format!("cannot typeset expression: {}", msg.into()))
}

fn pop(stack: &mut Vec<Node>) -> Result<Node, Error> {
    stack.pop().ok_or_else(|| malformed("operator is missing an operand"))
}

fn number(n: f64) -> (String, Prec) {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return (format!("{}", n as i64), Prec::Atom);
    }

    if n != 0.0 && (n.abs() >= 1e15 || n.abs() < 1e-4) {
        let s = format!("{n:e}");
        if let Some((m, e)) = s.split_once('e') {
            return (format!("{m}\\times10^{{{e}}}"), Prec::Product);
        }
    }

    (format!("{n}"), Prec::Atom)
}

fn ident(name: &str) -> String {
    match name {
        "pi" | "tau" | "phi" => format!("\\{name}"),
        n if n.chars().count() == 1 => n.to_string(),
        n => format!("\\mathrm{{{n}}}"),
    }
}

fn unary(op: &Operation, a: Node) -> Result<Node, Error> {
    let node = match op {
        Operation::Minus | Operation::Plus => {
            let sign = if matches!(op, Operation::Minus) { '-' } else { '+' };
            let a = a.wrap_when(|n| matches!(n.prec, Prec::Sum | Prec::Neg));
            Node {
                tex: format!("{sign}{}", a.tex),
                prec: Prec::Neg,
                numeric: false,
                lead_digit: false,
                fraction: false,
            }
        }
        op => return Err(malformed(format!("{op:?} is not a unary operator"))),
    };

    Ok(node)
}

fn binary(op: &Operation, a: Node, b: Node) -> Result<Node, Error> {
    let loose = |n: &Node| matches!(n.prec, Prec::Sum | Prec::Neg);

    let (lead_digit, tex, prec) = match op {
        Operation::Plus => {
            let b = b.wrap_when(|n| n.prec == Prec::Neg);
            let tex = format!("{}+{}", a.tex, b.tex);
            (a.lead_digit, tex, Prec::Sum)
        }
        Operation::Minus => {
            let b = b.wrap_when(loose);
            let tex = format!("{}-{}", a.tex, b.tex);
            (a.lead_digit, tex, Prec::Sum)
        }
        Operation::Times => {
            let coefficient = a.numeric;
            let a = a.wrap_when(|n| n.prec == Prec::Sum);
            let b = b.wrap_when(loose);
            let tex = if coefficient && !b.lead_digit && !b.fraction {
                format!("{}{}", a.tex, b.tex)
            } else {
                format!("{}\\cdot {}", a.tex, b.tex)
            };
            (a.lead_digit, tex, Prec::Product)
        }
        Operation::Div => {
            let tex = format!("\\frac{{{}}}{{{}}}", a.tex, b.tex);
            (false, tex, Prec::Product)
        }
        Operation::Rem => {
            let a = a.wrap_when(|n| n.prec == Prec::Sum);
            let b = b.wrap_when(|n| n.prec <= Prec::Neg);
            let tex = format!("{}\\bmod {}", a.tex, b.tex);
            (a.lead_digit, tex, Prec::Product)
        }
        Operation::Pow => {
            let a = a.wrap_when(|n| n.prec < Prec::Atom);
            let tex = format!("{{{}}}^{{{}}}", a.tex, b.tex);
            (a.lead_digit, tex, Prec::Power)
        }
        op => return Err(malformed(format!("{op:?} is not a binary operator"))),
    };

    Ok(Node {
        tex,
        prec,
        numeric: false,
        lead_digit,
        fraction: matches!(op, Operation::Div),
    })
}

fn func(name: &str, args: Vec<Node>) -> Node {
    if let [a] = args.as_slice() {
        let a = &a.tex;
        let special = match name {
            "sqrt" => Some(format!("\\sqrt{{{a}}}")),
            "cbrt" => Some(format!("\\sqrt[3]{{{a}}}")),
            "abs" => Some(format!("\\left|{a}\\right|")),
            "floor" => Some(format!("\\left\\lfloor{a}\\right\\rfloor")),
            "ceil" => Some(format!("\\left\\lceil{a}\\right\\rceil")),
            "log" | "ln" => Some(format!("\\ln\\left({a}\\right)")),
            "log10" => Some(format!("\\log_{{10}}\\left({a}\\right)")),
            "log2" => Some(format!("\\log_{{2}}\\left({a}\\right)")),
            _ => None,
        };
        if let Some(tex) = special {
            return Node::atom(tex);
        }
    }

    let op = match name {
        "sin" | "cos" | "tan" | "sec" | "csc" | "cot" | "sinh" | "cosh" | "tanh" | "exp"
        | "max" | "min" => format!("\\{name}"),
        "asin" | "acos" | "atan" => format!("\\arc{}", &name[1..]),
        n => format!("\\mathrm{{{n}}}"),
    };

    let args = args
        .into_iter()
        .map(|n| n.tex)
        .collect::<Vec<_>>()
        .join(",");

    Node::atom(format!("{op}\\left({args}\\right)"))
}
