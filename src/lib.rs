//! Expression evaluation engine for function plotting.
//!
//! Type `y = f(x)`, get back whether it is valid, how to typeset it, and the points to draw.
//!
//! ```rust
//! let domain = graphme::generate_domain(-2.0, 2.0, 4).unwrap();
//! assert_eq!(domain, [-2.0, -1.0, 0.0, 1.0, 2.0]);
//!
//! assert!(graphme::is_valid_expression("y = 1/x"));
//! assert_eq!(graphme::display_notation("y = 1/x"), "\\frac{1}{x}");
//!
//! // the singularity at zero is left out
//! let series = graphme::evaluate_series("y = 1/x", &domain).unwrap();
//! assert_eq!(series.x, [-2.0, -1.0, 1.0, 2.0]);
//! assert_eq!(series.y, [-0.5, -1.0, 1.0, 0.5]);
//! ```
use clap::{ArgAction, Parser, ValueEnum};
use miette::{miette, IntoDiagnostic, WrapErr};
use std::io::{self, Write};

mod domain;
mod error;
pub mod expr;
pub mod sample;

pub use domain::{generate_domain, Sampling};
pub use error::Error;
pub use expr::Description;
pub use sample::{Plot, Series};

use expr::Equation;

/// The expression backend behind the crate level functions.
pub type DefaultEquation = expr::v1::Eq;

/// Whether the text is an expression in `x` which can be plotted.
///
/// Never panics, any failure is `false`.
pub fn is_valid_expression(text: &str) -> bool {
    expr::validate::<DefaultEquation>(text)
}

/// LaTeX for the expression.
///
/// Returns the text unchanged if it cannot be parsed or typeset.
pub fn display_notation(text: &str) -> String {
    match expr::parse::<DefaultEquation>(text) {
        Ok(eq) => expr::to_display_notation(&eq),
        Err(_) => text.to_string(),
    }
}

/// Sample an expression over a domain. See [`sample::evaluate`].
pub fn evaluate_series(text: &str, domain: &[f64]) -> Result<Series, Error> {
    let eq = expr::parse::<DefaultEquation>(text)?;
    sample::evaluate(&eq, domain)
}

/// Sample several expressions over one domain, in parallel. See [`sample::evaluate_many`].
pub fn evaluate_many<S: AsRef<str> + Sync>(texts: &[S], domain: &[f64]) -> Vec<Plot> {
    sample::evaluate_many::<DefaultEquation, S>(texts, domain)
}

/// Parse, validate and typeset an expression. See [`expr::describe`].
pub fn describe(text: &str) -> Description {
    expr::describe::<DefaultEquation>(text)
}

/// Sample, typeset or check expressions of the form `y = f(x)`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct App {
    /// The expressions to plot, optionally prefixed with `y =`.
    /// Use `--` before an expression starting with '-'.
    #[arg(required = true)]
    pub exprs: Vec<String>,

    /// The first x-value.
    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
    pub start: f64,

    /// The last x-value.
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub end: f64,

    /// Number of subdivisions of the range.
    #[arg(short, long, default_value_t = 500)]
    pub steps: usize,

    /// The version of equation resolver to use.
    #[arg(long, default_value_t, value_enum)]
    pub eq_resolver: EquationResolver,

    /// The output format to write to stdout.
    #[arg(short, long, default_value_t, value_enum)]
    pub out: Output,

    /// Do not output the sampling statistics along with the table.
    #[arg(short, long)]
    pub no_stats: bool,

    /// Only print the LaTeX of each expression.
    #[arg(long, conflicts_with = "check")]
    pub tex: bool,

    /// Only check the expressions, failing if any is invalid.
    #[arg(long)]
    pub check: bool,

    /// Log more to stderr. Repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Copy, Clone, ValueEnum, Default)]
pub enum EquationResolver {
    #[default]
    V1,
}

#[derive(Debug, Copy, Clone, ValueEnum, Default)]
pub enum Output {
    /// Rich table view.
    #[default]
    Table,

    /// Plain, space separated table. Dropped points are NaN.
    Plain,

    /// CSV with a header row. Dropped points are empty cells.
    Csv,

    /// JSON array of plots.
    Json,
}

impl App {
    pub fn run(self) -> miette::Result<()> {
        match self.eq_resolver {
            EquationResolver::V1 => run::<expr::v1::Eq>(self),
        }
    }

    /// Install the stderr logger at the level asked for.
    pub fn init_logger(&self) -> miette::Result<()> {
        use simplelog::*;

        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )
        .into_diagnostic()
        .wrap_err("failed to initialise logging")
    }
}

fn run<E>(app: App) -> miette::Result<()>
where
    E: Equation,
{
    let App {
        exprs,
        start,
        end,
        steps,
        eq_resolver: _,
        out,
        no_stats,
        tex,
        check,
        verbose: _,
    } = app;

    if check {
        return check_exprs::<E>(&exprs, out);
    }

    if tex {
        let w = &mut io::stdout();
        for e in &exprs {
            let eq = expr::parse::<E>(e).wrap_err_with(|| format!("parsing '{e}' failed"))?;
            writeln!(w, "{}", expr::to_display_notation(&eq)).into_diagnostic()?;
        }
        return Ok(());
    }

    let sampling = Sampling { start, end, steps };
    let domain = sampling
        .domain()
        .wrap_err("failed to build the sampling domain")?;

    // fail on the first invalid expression, with its full diagnostic, rather than plotting a
    // blank column
    let plots = sample::try_evaluate_many::<E, _>(&exprs, &domain)
        .into_iter()
        .zip(&exprs)
        .map(|(p, e)| p.wrap_err_with(|| format!("cannot plot '{e}'")))
        .collect::<miette::Result<Vec<_>>>()?;

    match out {
        Output::Table => write_table(&domain, &plots, !no_stats),
        Output::Plain => write_plain(&domain, &plots),
        Output::Csv => write_csv(&domain, &plots),
        Output::Json => write_json(&plots),
    }
}

fn check_exprs<E: Equation>(exprs: &[String], out: Output) -> miette::Result<()> {
    let descs = exprs
        .iter()
        .map(|e| expr::describe::<E>(e))
        .collect::<Vec<_>>();

    let w = &mut io::stdout();

    match out {
        Output::Json => {
            serde_json::to_writer_pretty(&mut *w, &descs).into_diagnostic()?;
            writeln!(w).into_diagnostic()?;
        }
        _ => {
            for d in &descs {
                let r = match &d.error {
                    None => writeln!(w, "ok       {}", d.expression),
                    Some(e) => writeln!(w, "invalid  {}: {}", d.expression, e),
                };
                r.into_diagnostic()?;
            }
        }
    }

    let invalid = descs.iter().filter(|d| !d.valid).count();
    if invalid > 0 {
        return Err(miette!(
            "{} of {} expressions are invalid",
            invalid,
            descs.len()
        ));
    }

    Ok(())
}

/// Each plot's y-values lined up on the shared domain, `None` where a point was dropped.
fn aligned(domain: &[f64], plots: &[Plot]) -> Vec<Vec<Option<f64>>> {
    plots
        .iter()
        .map(|p| {
            let mut pts = p.series.points().peekable();
            domain
                .iter()
                .map(|d| pts.next_if(|(x, _)| x == d).map(|(_, y)| y))
                .collect()
        })
        .collect()
}

fn write_table(domain: &[f64], plots: &[Plot], write_stats: bool) -> miette::Result<()> {
    use comfy_table::{Cell, CellAlignment as CA, Row, Table};

    let w = &mut io::stdout();

    let mut nfmtr = "[~4]".parse::<numfmt::Formatter>().expect("just fine");

    let cols = aligned(domain, plots);

    let mut table = Table::new();

    table.set_header(std::iter::once("x").chain(plots.iter().map(|p| p.expr.as_str())));

    for (i, x) in domain.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(nfmtr.fmt(*x)).set_alignment(CA::Right));
        for col in &cols {
            let cell = match col[i] {
                Some(y) => Cell::new(nfmtr.fmt(y)),
                None => Cell::new(""),
            };
            row.add_cell(cell.set_alignment(CA::Right));
        }
        table.add_row(row);
    }

    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);

    writeln!(w, "{table}").into_diagnostic()?;

    if write_stats {
        writeln!(w, "  Number of points: {}", domain.len()).into_diagnostic()?;
        for p in plots {
            writeln!(
                w,
                "  {}: {} plotted, {} dropped",
                p.expr,
                p.series.len(),
                domain.len() - p.series.len()
            )
            .into_diagnostic()?;
        }
    }

    Ok(())
}

fn write_plain(domain: &[f64], plots: &[Plot]) -> miette::Result<()> {
    let w = &mut io::BufWriter::new(io::stdout());
    let cols = aligned(domain, plots);

    for (i, x) in domain.iter().enumerate() {
        write!(w, "{x}").into_diagnostic()?;
        for col in &cols {
            write!(w, " {}", col[i].unwrap_or(f64::NAN)).into_diagnostic()?;
        }
        writeln!(w).into_diagnostic()?;
    }

    w.flush().into_diagnostic()
}

fn write_csv(domain: &[f64], plots: &[Plot]) -> miette::Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    let cols = aligned(domain, plots);

    wtr.write_record(std::iter::once("x").chain(plots.iter().map(|p| p.expr.as_str())))
        .into_diagnostic()
        .wrap_err("failed to write CSV header row")?;

    for (i, x) in domain.iter().enumerate() {
        let record = std::iter::once(x.to_string()).chain(
            cols.iter()
                .map(|col| col[i].map(|y| y.to_string()).unwrap_or_default()),
        );
        wtr.write_record(record)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write CSV row {}", i + 1))?;
    }

    wtr.flush().into_diagnostic()
}

fn write_json(plots: &[Plot]) -> miette::Result<()> {
    let w = &mut io::stdout();
    serde_json::to_writer_pretty(&mut *w, plots).into_diagnostic()?;
    writeln!(w).into_diagnostic()
}
