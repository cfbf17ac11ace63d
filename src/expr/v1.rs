use super::*;
use builtins::{Kind, BUILTINS};
use meval::{tokenizer::ParseError, Context, Expr};

/*** A note on the implementation ***
 *
 * `meval` contexts hold their functions behind `Rc`, so a context can neither live in a static
 * nor cross threads. The builtin table is installed once per thread into a prototype context,
 * and every parsed expression takes a clone of it. An `Eq` therefore stays on the thread that
 * parsed it, which suits evaluating several expressions in parallel: each task parses its own.
 *
 * Binding `x` does not touch the shared context. Each evaluation layers a `(name, value)` pair
 * over it on the stack, `((x, value), &ctx)`, which is dropped when the evaluation returns
 * however it returns. Nothing can leak from one point to the next.
 */

thread_local! {
    static PROTOTYPE: Context<'static> = prototype();
}

fn prototype() -> Context<'static> {
    let mut ctx = Context::empty();
    for b in BUILTINS {
        match b.kind {
            Kind::Const(v) => ctx.var(b.name, v),
            Kind::Func(f) => ctx.func(b.name, f),
            Kind::Func2(f) => ctx.func2(b.name, f),
            Kind::FuncN(f) => ctx.funcn(b.name, f, 1..),
        };
    }
    ctx
}

#[derive(Clone)]
pub struct Eq {
    src: Source,

    /// Builtins, cloned from the thread's prototype.
    ctx: Context<'static>,

    /// Parsed expression, in RPN.
    expr: Expr,
}

impl Equation for Eq {
    fn parse(src: Source) -> Result<Self, Error> {
        let expr = src
            .canon
            .parse::<Expr>()
            .map_err(|e| syntax_error(&src, e))?;

        let ctx = PROTOTYPE.with(Context::clone);

        log::debug!("parsed '{}' into {} RPN tokens", src.text, expr.len());

        Ok(Self { src, ctx, expr })
    }

    fn check(&self) -> Result<(), Error> {
        // meval only fails on unknown names and wrong arity, never on the value bound to `x`,
        // so one evaluation at the probe stands for every point
        self.expr
            .eval_with_context(((VAR, PROBE), &self.ctx))
            .map(|_| ())
            .map_err(resolution_error)
    }

    fn solve(&self, x: f64) -> Option<f64> {
        self.expr.eval_with_context(((VAR, x), &self.ctx)).ok()
    }

    fn tex(&self) -> Result<String, Error> {
        tex::render(&self.expr)
    }

    fn source(&self) -> &Source {
        &self.src
    }
}

fn syntax_error(src: &Source, e: meval::Error) -> Error {
    let text = &src.text;
    match e {
        meval::Error::ParseError(ParseError::UnexpectedToken(pos)) => {
            Error::parse("unexpected token", text, Some(src.locate(pos)))
        }
        meval::Error::ParseError(ParseError::MissingRParen(n)) => Error::parse(
            format!("missing {n} closing parenthes{}", if n == 1 { "is" } else { "es" }),
            text,
            Some((text.len(), 0)),
        ),
        e => Error::parse(e.to_string(), text, None),
    }
}

fn resolution_error(e: meval::Error) -> Error {
    match e {
        meval::Error::UnknownVariable(name) => unknown(name),
        meval::Error::Function(name, _) if builtins::lookup(&name).is_none() => unknown(name),
        e => Error::Evaluation(e.to_string()),
    }
}

fn unknown(name: String) -> Error {
    let help = builtins::suggest(&name).map(|s| format!("did you mean '{s}'?"));
    Error::UnknownIdentifier { name, help }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(s: &str) -> Eq {
        parse::<Eq>(s).unwrap()
    }

    #[test]
    fn solving() {
        assert_eq!(eq("x^2 + 1").solve(3.0), Some(10.0));
        assert_eq!(eq("y = 2x").solve(4.0), Some(8.0));
        assert_eq!(eq("x**3").solve(2.0), Some(8.0));
        assert_eq!(eq("log(1)").solve(0.0), Some(0.0));
        assert_eq!(eq("log10(x)").solve(10.0), Some(1.0));
        assert_eq!(eq("max(x, 2, -1)").solve(1.0), Some(2.0));
        assert_eq!(eq("(x+1)(x-1)").solve(3.0), Some(8.0));
        assert_eq!(eq("-x^2").solve(3.0), Some(-9.0));
    }

    #[test]
    fn non_finite_results_are_returned() {
        assert_eq!(eq("1/x").solve(0.0), Some(f64::INFINITY));
        assert!(eq("sqrt(x)").solve(-1.0).unwrap().is_nan());
    }

    #[test]
    fn bindings_do_not_persist() {
        let e = eq("x + 1");
        assert_eq!(e.solve(1.0), Some(2.0));
        assert_eq!(e.solve(-5.0), Some(-4.0));
        assert_eq!(e.solve(1.0), Some(2.0));
    }

    #[test]
    fn check_resolves_identifiers() {
        assert!(eq("sin(x) + pi").check().is_ok());
        assert!(eq("42").check().is_ok());

        match eq("foo(x)").check().unwrap_err() {
            Error::UnknownIdentifier { name, .. } => assert_eq!(name, "foo"),
            e => panic!("unexpected {e:?}"),
        }

        match eq("sinn(x)").check().unwrap_err() {
            Error::UnknownIdentifier { name, help } => {
                assert_eq!(name, "sinn");
                assert_eq!(help.as_deref(), Some("did you mean 'sin'?"));
            }
            e => panic!("unexpected {e:?}"),
        }

        assert!(matches!(
            eq("z + x").check(),
            Err(Error::UnknownIdentifier { .. })
        ));
        assert!(matches!(
            eq("sin(x, 2)").check(),
            Err(Error::Evaluation(_))
        ));

        // values that fail numerically at the probe are still fine
        assert!(eq("1/(x-1)").check().is_ok());
        assert!(eq("log(x - 5)").check().is_ok());
    }

    #[test]
    fn syntax_errors_point_at_source() {
        match parse::<Eq>("y = 2 + * x").err().unwrap() {
            Error::Parse { at, src, .. } => {
                assert_eq!(src, "2 + * x");
                assert!(at.is_some());
            }
            e => panic!("unexpected {e:?}"),
        }

        assert!(parse::<Eq>("(x + 1").err().unwrap().is_parse());
        assert!(parse::<Eq>("x +").err().unwrap().is_parse());
    }

    #[test]
    fn typesetting() {
        assert_eq!(eq("y = 2x^2").tex().unwrap(), "2{x}^{2}");
        assert_eq!(to_display_notation(&eq("sqrt(x)")), "\\sqrt{x}");
    }
}
