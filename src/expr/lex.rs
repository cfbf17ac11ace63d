//! Surface grammar.
//!
//! Users type things `meval` does not accept: implicit multiplication (`2x`, `(x+1)(x-1)`),
//! Python style powers (`x**2`) and the odd unicode operator from a virtual keyboard (`π`, `×`).
//! The lexer here turns the cleaned text into the canonical form understood by the backend,
//! remembering where each emitted token came from so backend errors can point at the source.

use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok<'a> {
    Num(&'a str),
    Ident(&'a str),
    Op(char),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    tok: Tok<'a>,
    /// Byte span into the cleaned text.
    span: (usize, usize),
    /// Whitespace separates this lexeme from the previous one.
    gap: bool,
}

/// An expression's text in each of its forms.
#[derive(Debug, Clone)]
pub struct Source {
    /// Exactly what the user supplied.
    pub raw: String,
    /// Trimmed, with any `y =` prefix removed.
    pub text: String,
    /// Canonical text handed to the backend.
    pub canon: String,
    /// `(canon start, canon end, text span)` for every emitted token.
    map: Vec<(usize, usize, (usize, usize))>,
}

impl Source {
    /// Clean and normalise user input.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let text = clean(raw);
        let lexemes = tokenize(text)?;

        if lexemes.is_empty() {
            return Err(Error::parse("expression is empty", text, None));
        }

        let mut canon = String::with_capacity(text.len() + 8);
        let mut map = Vec::with_capacity(lexemes.len());
        let mut prev: Option<Lexeme> = None;

        for lx in lexemes {
            if let Some(p) = prev {
                if implicit_times(&p, &lx) {
                    let at = canon.len();
                    canon.push('*');
                    map.push((at, at + 1, (lx.span.0, 0)));
                } else if would_merge(&p.tok, &lx.tok) {
                    canon.push(' ');
                }
            }

            let at = canon.len();
            match lx.tok {
                Tok::Num(s) => push_number(&mut canon, s),
                Tok::Ident(s) => canon.push_str(s),
                Tok::Op(c) => canon.push(c),
                Tok::LParen => canon.push('('),
                Tok::RParen => canon.push(')'),
                Tok::Comma => canon.push(','),
            }
            map.push((at, canon.len(), lx.span));
            prev = Some(lx);
        }

        log::debug!("normalised '{}' into '{}'", text, canon);

        Ok(Self {
            raw: raw.to_string(),
            text: text.to_string(),
            canon,
            map,
        })
    }

    /// Map a byte offset in the canonical text back onto a span of the cleaned text.
    pub fn locate(&self, canon_pos: usize) -> (usize, usize) {
        self.map
            .iter()
            .find(|(s, e, _)| (*s..*e).contains(&canon_pos))
            .map(|(_, _, span)| *span)
            .unwrap_or((self.text.len(), 0))
    }
}

/// Trim the text and strip a leading `y =`.
pub fn clean(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('y')
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .map(str::trim_start)
        .unwrap_or(text)
}

fn tokenize(text: &str) -> Result<Vec<Lexeme<'_>>, Error> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut gap = false;
    let mut i = 0;

    while i < text.len() {
        let c = text[i..].chars().next().unwrap_or_default();
        let start = i;

        if c.is_whitespace() {
            gap = true;
            i += c.len_utf8();
            continue;
        }

        let tok = match c {
            '0'..='9' | '.' => {
                i = scan_number(bytes, i);
                if i == start + 1 && c == '.' {
                    return Err(Error::parse(
                        "a lone '.' is not a number",
                        text,
                        Some((start, 1)),
                    ));
                }
                Tok::Num(&text[start..i])
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                Tok::Ident(&text[start..i])
            }
            '*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                Tok::Op('^')
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                i += 1;
                Tok::Op(c)
            }
            '(' => {
                i += 1;
                Tok::LParen
            }
            ')' => {
                i += 1;
                Tok::RParen
            }
            ',' => {
                i += 1;
                Tok::Comma
            }
            c => {
                i += c.len_utf8();
                match c {
                    'π' => Tok::Ident("pi"),
                    'τ' => Tok::Ident("tau"),
                    'φ' => Tok::Ident("phi"),
                    '√' => Tok::Ident("sqrt"),
                    '×' | '·' | '⋅' => Tok::Op('*'),
                    '÷' => Tok::Op('/'),
                    '−' => Tok::Op('-'),
                    c => {
                        return Err(Error::parse(
                            format!("unexpected character '{c}'"),
                            text,
                            Some((start, c.len_utf8())),
                        ))
                    }
                }
            }
        };

        out.push(Lexeme {
            tok,
            span: (start, i - start),
            gap,
        });
        gap = false;
    }

    Ok(out)
}

/// Digits, an optional fraction, an optional exponent.
///
/// The exponent is only consumed when digits follow, so `2e` is `2` then `e`.
fn scan_number(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            i = j;
            while i < b.len() && b[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

/// Write a number with digits on both sides of any decimal point: `.5` is `0.5`, `5.` is `5.0`.
fn push_number(canon: &mut String, s: &str) {
    let (mantissa, exp) = match s.find(|c| c == 'e' || c == 'E') {
        Some(i) => s.split_at(i),
        None => (s, ""),
    };

    if mantissa.starts_with('.') {
        canon.push('0');
    }
    canon.push_str(mantissa);
    if mantissa.ends_with('.') {
        canon.push('0');
    }
    canon.push_str(exp);
}

fn implicit_times(prev: &Lexeme, cur: &Lexeme) -> bool {
    use Tok::*;

    match (prev.tok, cur.tok) {
        (Num(_), Ident(_) | LParen) => true,
        (RParen, Num(_) | Ident(_) | LParen) => true,
        // `x(x+1)` and `pi(x)` multiply, unknown names stay calls so they fail resolution
        (Ident(name), LParen) => name == VAR || builtins::is_constant(name),
        (Ident(name), Ident(_)) => cur.gap && !builtins::is_function(name),
        _ => false,
    }
}

fn would_merge(prev: &Tok, cur: &Tok) -> bool {
    matches!(
        (prev, cur),
        (Tok::Num(_) | Tok::Ident(_), Tok::Num(_) | Tok::Ident(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(s: &str) -> String {
        Source::new(s).unwrap().canon
    }

    #[test]
    fn cleaning() {
        assert_eq!(clean("  y = 2*x "), "2*x");
        assert_eq!(clean("y=x"), "x");
        assert_eq!(clean("y   =x"), "x");
        assert_eq!(clean("x + y"), "x + y");
        assert_eq!(clean("yx"), "yx");
        assert_eq!(clean("   "), "");
    }

    #[test]
    fn explicit_forms_pass_through() {
        assert_eq!(canon("y = 2*x^2 + 3*x - 4"), "2*x^2+3*x-4");
        assert_eq!(canon("sin(x) / cos(x)"), "sin(x)/cos(x)");
        assert_eq!(canon("atan2(x, 1)"), "atan2(x,1)");
        assert_eq!(canon("1.5e-3 * x"), "1.5e-3*x");
        assert_eq!(canon(".5x + 2."), "0.5*x+2.0");
        assert_eq!(canon("5.E2"), "5.0E2");
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(canon("2x"), "2*x");
        assert_eq!(canon("2x^2"), "2*x^2");
        assert_eq!(canon("2(x+1)"), "2*(x+1)");
        assert_eq!(canon("(x+1)(x-1)"), "(x+1)*(x-1)");
        assert_eq!(canon("(x)2"), "(x)*2");
        assert_eq!(canon("3sin(x)"), "3*sin(x)");
        assert_eq!(canon("x(x+1)"), "x*(x+1)");
        assert_eq!(canon("pi x"), "pi*x");
        assert_eq!(canon("2e"), "2*e");
    }

    #[test]
    fn unknown_calls_stay_calls() {
        assert_eq!(canon("foo(x)"), "foo(x)");
        assert_eq!(canon("sin x"), "sin x");
    }

    #[test]
    fn alternative_operators() {
        assert_eq!(canon("x**2"), "x^2");
        assert_eq!(canon("2π"), "2*pi");
        assert_eq!(canon("x × 3 ÷ 2 − 1"), "x*3/2-1");
        assert_eq!(canon("√(x)"), "sqrt(x)");
    }

    #[test]
    fn rejects() {
        assert!(Source::new("").unwrap_err().is_parse());
        assert!(Source::new("  y =  ").unwrap_err().is_parse());

        for (text, at) in [("x $ 2", 2), ("x!", 1), ("3!x", 1)] {
            match Source::new(text).unwrap_err() {
                Error::Parse { at: span, .. } => {
                    assert_eq!(span.map(|s| (s.offset(), s.len())), Some((at, 1)), "{text}")
                }
                e => panic!("unexpected {e:?}"),
            }
        }
    }

    #[test]
    fn locate_maps_back_to_source() {
        let s = Source::new("y = 2x + sin x").unwrap();
        assert_eq!(s.canon, "2*x+sin x");
        assert_eq!(s.locate(0), (0, 1)); // 2
        assert_eq!(s.locate(2), (1, 1)); // x
        assert_eq!(s.locate(8), (9, 1)); // second x
        assert_eq!(s.locate(100), (s.text.len(), 0));
    }
}
