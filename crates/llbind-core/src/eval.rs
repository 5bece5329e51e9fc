//! Integer constant evaluation for array lengths and enumerators.

use llbind_ast::Expr;

/// Evaluates `expr`, resolving identifiers through `lookup`.
pub fn eval_int(expr: &Expr, lookup: &dyn Fn(&str) -> Option<i64>) -> Option<i64> {
    match expr {
        Expr::Lit(text) => parse_int_literal(text),
        Expr::Ident(name) => lookup(name),
        Expr::Paren(inner) => eval_int(inner, lookup),
        Expr::Neg(inner) => eval_int(inner, lookup)?.checked_neg(),
    }
}

/// Evaluates an expression that may not reference identifiers.
pub fn eval_const(expr: &Expr) -> Option<i64> {
    eval_int(expr, &|_: &str| None)
}

/// Parses a C integer or character literal: `42`, `0x2Au`, `052`, `0b101`,
/// `100UL`, `'a'`, `'\n'`.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(body) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return parse_char_literal(body);
    }
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let (digits, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };
    let digits = digits.replace('\'', "");
    if digits.is_empty() {
        return None;
    }
    // literals beyond i64 are not representable
    let value = u64::from_str_radix(&digits, radix).ok()?;
    i64::try_from(value).ok()
}

fn parse_char_literal(body: &str) -> Option<i64> {
    let mut chars = body.chars();
    let value = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n' as i64,
            't' => '\t' as i64,
            'r' => '\r' as i64,
            '0' => 0,
            '\\' => '\\' as i64,
            '\'' => '\'' as i64,
            '"' => '"' as i64,
            _ => return None,
        },
        c => c as i64,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literals() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("0x2A"), Some(42));
        assert_eq!(parse_int_literal("0X2au"), Some(42));
        assert_eq!(parse_int_literal("052"), Some(42));
        assert_eq!(parse_int_literal("0b101010"), Some(42));
        assert_eq!(parse_int_literal("100UL"), Some(100));
        assert_eq!(parse_int_literal("1'000"), Some(1000));
        assert_eq!(parse_int_literal("'a'"), Some(97));
        assert_eq!(parse_int_literal("'\\n'"), Some(10));
        assert_eq!(parse_int_literal("N"), None);
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal("1.5"), None);
    }

    #[test]
    fn test_literal_beyond_i64() {
        assert_eq!(parse_int_literal("0x7FFFFFFFFFFFFFFF"), Some(i64::MAX));
        assert_eq!(parse_int_literal("0xFFFFFFFFFFFFFFFF"), None);
        assert_eq!(parse_int_literal("18446744073709551615ULL"), None);
    }

    #[test]
    fn test_eval_expressions() {
        let expr = Expr::Neg(Box::new(Expr::Paren(Box::new(Expr::lit("8")))));
        assert_eq!(eval_const(&expr), Some(-8));

        let lookup = |name: &str| (name == "BASE").then_some(10);
        assert_eq!(eval_int(&Expr::Ident("BASE".into()), &lookup), Some(10));
        assert_eq!(eval_int(&Expr::Ident("OTHER".into()), &lookup), None);
        assert_eq!(eval_const(&Expr::Ident("BASE".into())), None);
    }
}
