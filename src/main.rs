use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, LabeledSpan};
use pocket_calc::{
    config::{Config, ConfigError},
    history::History,
    lexer::UnknownChars,
    round::MAX_PRECISION,
    session::{format_number, Session},
    token::format_tokens,
    EvalError, Evaluator,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Input {
    /// The expression to evaluate. Without one, expressions are read from stdin, one per line.
    expression: Vec<String>,

    /// Debug the lexer, printing out each token. Does not evaluate the expression.
    #[clap(long, default_value = "false")]
    debug_lexer: bool,

    /// Debug the converter, printing out the postfix sequence. Does not evaluate the expression.
    #[clap(long, default_value = "false")]
    debug_postfix: bool,

    /// Reject characters that are not part of an expression instead of ignoring them.
    #[clap(long, default_value = "false")]
    strict: bool,

    /// Decimal digits kept in results.
    #[clap(long)]
    precision: Option<u32>,

    /// Config file to use instead of the default one.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `pocket_calc=trace`. RUST_LOG takes precedence.
    #[clap(long)]
    log_level: Option<String>,
}

fn main() -> miette::Result<()> {
    let input = Input::parse();

    let config = match &input.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    init_logging(input.log_level.as_deref().unwrap_or(&config.log.filter));

    let mut options = config.eval_options();
    if input.strict {
        options.unknown_chars = UnknownChars::Reject;
    }
    if let Some(precision) = input.precision {
        if precision > MAX_PRECISION {
            return Err(ConfigError::Precision { precision }.into());
        }
        options.precision = precision;
    }
    let evaluator = Evaluator::new(options);
    let expression = input.expression.concat();

    if input.debug_lexer {
        return run_debug_lexer(&evaluator, &expression);
    }

    if input.debug_postfix {
        return run_debug_postfix(&evaluator, &expression);
    }

    let history = match &config.history.file {
        Some(path) => History::load(path, config.history.capacity)
            .into_diagnostic()?
            .persist_to(path),
        None => History::new(config.history.capacity),
    };
    let mut session = Session::new(evaluator, history);

    if expression.is_empty() {
        run_repl(&mut session)
    } else {
        session
            .submit(&expression)
            .map(|_| println!("{}", session.display()))
            .map_err(|e| report(e, &expression))
    }
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Attaches the expression so labels render underneath it.
fn report(error: EvalError, expression: &str) -> miette::Report {
    miette::Report::new(error).with_source_code(expression.trim().to_string())
}

fn run_repl(session: &mut Session) -> miette::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":history" => print!("{}", session.history().render()),
            ":clear" => session.history_mut().clear(),
            expression => match session.submit(expression) {
                Ok(value) => println!("{}", format_number(value)),
                Err(e) => eprintln!("{:?}", report(e, expression)),
            },
        }
    }

    Ok(())
}

fn run_debug_lexer(evaluator: &Evaluator, expression: &str) -> miette::Result<()> {
    let tokens = evaluator
        .tokens(expression)
        .map_err(|e| report(e, expression))?;
    let source_code = expression.trim().to_string();

    for token in tokens {
        let diag = miette::miette!(
            labels = vec![LabeledSpan::at(
                token.span.start..token.span.end,
                format!("{:?}", token.kind)
            )],
            severity = miette::Severity::Advice,
            "found a token",
        )
        .with_source_code(source_code.clone());
        eprintln!("{:?}", diag);
    }

    Ok(())
}

fn run_debug_postfix(evaluator: &Evaluator, expression: &str) -> miette::Result<()> {
    let postfix = evaluator
        .postfix(expression)
        .map_err(|e| report(e, expression))?;
    println!("{}", format_tokens(&postfix));

    Ok(())
}
