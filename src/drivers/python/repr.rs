//! Python source text for parameter values, following `repr()`

use crate::parameter::ParamValue;

pub fn python_repr(value: &ParamValue) -> String {
    match value {
        ParamValue::None => "None".to_string(),
        ParamValue::Bool(true) => "True".to_string(),
        ParamValue::Bool(false) => "False".to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => repr_float(*f),
        ParamValue::Str(s) => repr_str(s),
        ParamValue::List(items) => format!("[{}]", join(items)),
        ParamValue::Tuple(items) if items.len() == 1 => format!("({},)", python_repr(&items[0])),
        ParamValue::Tuple(items) => format!("({})", join(items)),
        ParamValue::Dict(pairs) => {
            let body = pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", python_repr(k), python_repr(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{}}}", body)
        }
    }
}

fn join(items: &[ParamValue]) -> String {
    items.iter().map(python_repr).collect::<Vec<_>>().join(", ")
}

/// Shortest round-trip digits, positional for exponents in `-4..16`,
/// scientific otherwise
fn repr_float(f: f64) -> String {
    if f.is_nan() {
        return "float('nan')".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "float('inf')" } else { "float('-inf')" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            } else {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            }
        } else {
            format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{}.{}", lead, rest)
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, exp_sign, exponent.abs())
    };

    format!("{}{}", sign, body)
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Approximates `str.isprintable()`: control, format, separator (other than
/// space) and private-use characters are escaped.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c as u32,
        0xAD | 0x600..=0x605
            | 0x61C
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0xE000..=0xF8FF
            | 0xF0000..=0x10FFFF
    )
}
