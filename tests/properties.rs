//! Seeded, bounded property checks.
//!
//! The generator is deterministic so every run sees the same inputs.

use pocket_calc::{
    evaluate,
    round::round_to,
    sanitize::{sanitize, DANGLING},
    ErrorKind,
};

#[derive(Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    fn pick(&mut self, n: usize) -> usize {
        self.next_u32() as usize % n
    }

    fn choose<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len())]
    }
}

const NUMBERS: &[&str] = &["0", "1", "2", "3", "4", "7", "10", "0.5", "2.25", "12.5"];
const OPERATORS: &[&str] = &["+", "-", "*", "/", "%"];

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return rng.choose(NUMBERS).to_string();
    }

    match rng.pick(4) {
        0 => rng.choose(NUMBERS).to_string(),
        1 => format!("({})", gen_expr(rng, depth - 1)),
        _ => format!(
            "{}{}{}",
            gen_expr(rng, depth - 1),
            rng.choose(OPERATORS),
            gen_expr(rng, depth - 1)
        ),
    }
}

/// Straightforward recursive descent over the same grammar, used as the oracle.
struct Reference<'a> {
    rest: &'a [u8],
}

impl<'a> Reference<'a> {
    fn eval(source: &'a str) -> Result<f64, ErrorKind> {
        let mut parser = Self {
            rest: source.as_bytes(),
        };
        let value = parser.expr()?;
        assert!(parser.rest.is_empty(), "generator produced trailing input");

        if !value.is_finite() {
            return Err(ErrorKind::InvalidOperation);
        }
        Ok(round_to(value, 4))
    }

    fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    fn bump(&mut self) {
        self.rest = &self.rest[1..];
    }

    fn expr(&mut self) -> Result<f64, ErrorKind> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ErrorKind> {
        let mut value = self.factor()?;
        while let Some(op @ (b'*' | b'/' | b'%')) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            value = match op {
                b'*' => value * rhs,
                b'/' if rhs == 0.0 => return Err(ErrorKind::DivisionByZero),
                b'/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ErrorKind> {
        if self.peek() == Some(b'(') {
            self.bump();
            let value = self.expr()?;
            assert_eq!(self.peek(), Some(b')'));
            self.bump();
            return Ok(value);
        }

        let len = self
            .rest
            .iter()
            .position(|c| !(c.is_ascii_digit() || *c == b'.'))
            .unwrap_or(self.rest.len());
        let literal = std::str::from_utf8(&self.rest[..len]).unwrap();
        self.rest = &self.rest[len..];
        Ok(literal.parse().unwrap())
    }
}

#[test]
fn postfix_matches_recursive_descent() {
    let mut rng = Rng::new(0xC0FFEE);
    let mut seen_ok = 0;
    let mut seen_err = 0;

    for _ in 0..2000 {
        let expression = gen_expr(&mut rng, 5);
        let expected = Reference::eval(&expression);
        let actual = evaluate(&expression).map_err(|e| e.kind());

        assert_eq!(actual, expected, "when evaluating '{expression}'");
        match actual {
            Ok(_) => seen_ok += 1,
            Err(_) => seen_err += 1,
        }
    }

    // Both paths should actually get exercised.
    assert!(seen_ok > 100, "only {seen_ok} successes");
    assert!(seen_err > 0, "no failures generated");
}

#[test]
fn sanitize_never_leaves_dangling_tail() {
    const ALPHABET: &[&str] = &[
        "0", "5", "9", ".", "+", "-", "*", "/", "%", "(", ")", " ", "x",
    ];
    let mut rng = Rng::new(0xBADC0DE);

    for _ in 0..2000 {
        let len = rng.pick(12);
        let input: String = (0..len).map(|_| rng.choose(ALPHABET)).collect();

        let once = sanitize(&input);
        assert!(!once.ends_with(DANGLING), "sanitize('{input}') = '{once}'");
        assert_eq!(sanitize(once), once, "not idempotent for '{input}'");
        assert!(input.starts_with(once));
    }
}

#[test]
fn arbitrary_input_never_panics() {
    const ALPHABET: &[&str] = &["1", "2", ".", "+", "-", "*", "/", "%", "(", ")", "a"];
    let mut rng = Rng::new(42);

    for _ in 0..2000 {
        let len = rng.pick(16);
        let input: String = (0..len).map(|_| rng.choose(ALPHABET)).collect();

        if let Ok(value) = evaluate(&input) {
            assert!(value.is_finite(), "'{input}' gave {value}");
        }
    }
}

#[test]
fn rounding_is_idempotent() {
    let mut rng = Rng::new(7);

    for _ in 0..5000 {
        let value = (rng.next_u32() as f64 - u32::MAX as f64 / 2.0) / (1 + rng.pick(100_000)) as f64;
        let once = round_to(value, 4);
        assert_eq!(round_to(once, 4), once, "value {value}");
    }
}
