// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Text forms of complex numbers, polynomials and keyframes.
//!
//! A complex literal is any of `a`, `bi`, `a+bi`, `a-bi`, with `i` and
//! `-i` standing for a unit imaginary part.  A polynomial is a comma
//! separated list of complex literals, highest power first, so
//! `1,0,0,-i` is x³ - i.  A keyframe is a polynomial optionally followed
//! by `@frame`; without one it lands on frame 0.

use num::Complex;
use std::str::FromStr;

use crate::errors::RenderError;
use crate::keyframes::Keyframes;
use crate::polynomial::Polynomial;

fn parse_number<T: FromStr>(s: &str, input: &str) -> Result<T, RenderError> {
    T::from_str(s).map_err(|_| RenderError::parse(input, format!("{:?} is not a number", s)))
}

fn parse_imaginary(s: &str, input: &str) -> Result<f64, RenderError> {
    match s {
        "" | "+" => Ok(1.0),
        "-" => Ok(-1.0),
        _ => parse_number(s, input),
    }
}

/// Where the imaginary part of `body` starts: the last sign that is
/// neither leading nor part of an exponent.
fn split_point(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    (1..bytes.len())
        .rev()
        .find(|&k| (bytes[k] == b'+' || bytes[k] == b'-') && bytes[k - 1] != b'e' && bytes[k - 1] != b'E')
}

/// Parses a single complex literal.
pub fn parse_complex(s: &str) -> Result<Complex<f64>, RenderError> {
    let input = s;
    let s = s.trim();
    if s.is_empty() {
        return Err(RenderError::parse(input, "empty complex number"));
    }

    let value = if s.ends_with('i') {
        let body = &s[..s.len() - 1];
        match split_point(body) {
            Some(k) => Complex::new(parse_number(&body[..k], input)?, parse_imaginary(&body[k..], input)?),
            None => Complex::new(0.0, parse_imaginary(body, input)?),
        }
    } else {
        Complex::new(parse_number(s, input)?, 0.0)
    };

    if value.re.is_finite() && value.im.is_finite() {
        Ok(value)
    } else {
        Err(RenderError::parse(input, "coefficients must be finite"))
    }
}

/// Parses a comma separated coefficient list, highest power first.
pub fn parse_polynomial(s: &str) -> Result<Polynomial, RenderError> {
    let coefficients = s.split(',').map(parse_complex).collect::<Result<Vec<_>, _>>()?;
    Polynomial::new(coefficients).map_err(|e| RenderError::parse(s, e.to_string()))
}

/// Parses `coefficients[@frame]`.
pub fn parse_keyframe(s: &str) -> Result<(usize, Polynomial), RenderError> {
    let parts: Vec<&str> = s.split('@').collect();
    match parts.as_slice() {
        [coefficients] => Ok((0, parse_polynomial(coefficients)?)),
        [coefficients, frame] => Ok((parse_number(frame.trim(), s)?, parse_polynomial(coefficients)?)),
        _ => Err(RenderError::parse(s, "more than one '@'")),
    }
}

/// Parses several keyframes into one animation.  Two keyframes for the
/// same frame are rejected.
pub fn parse_keyframes<'a, I>(specs: I) -> Result<Keyframes, RenderError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keyframes = Keyframes::new();
    for spec in specs {
        let (frame, polynomial) = parse_keyframe(spec)?;
        if keyframes.insert(frame, polynomial).is_some() {
            return Err(RenderError::parse(spec, format!("frame {} already has a keyframe", frame)));
        }
    }
    Ok(keyframes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_parse_complex() {
        assert_eq!(parse_complex("1.25").unwrap(), c(1.25, 0.0));
        assert_eq!(parse_complex("-3").unwrap(), c(-3.0, 0.0));
        assert_eq!(parse_complex("2i").unwrap(), c(0.0, 2.0));
        assert_eq!(parse_complex("+2.5i").unwrap(), c(0.0, 2.5));
        assert_eq!(parse_complex("i").unwrap(), c(0.0, 1.0));
        assert_eq!(parse_complex("-i").unwrap(), c(0.0, -1.0));
        assert_eq!(parse_complex("1+2i").unwrap(), c(1.0, 2.0));
        assert_eq!(parse_complex("1-2i").unwrap(), c(1.0, -2.0));
        assert_eq!(parse_complex("-0.5+i").unwrap(), c(-0.5, 1.0));
        assert_eq!(parse_complex("3-i").unwrap(), c(3.0, -1.0));
        assert_eq!(parse_complex(" 4 ").unwrap(), c(4.0, 0.0));
        assert_eq!(parse_complex("1e-3+2e2i").unwrap(), c(0.001, 200.0));
    }

    #[test]
    fn test_parse_complex_rejects_junk() {
        assert!(parse_complex("").is_err());
        assert!(parse_complex("x").is_err());
        assert!(parse_complex("2i+3").is_err());
        assert!(parse_complex("1+2").is_err());
        assert!(parse_complex("1++2i").is_err());
        assert!(parse_complex("inf").is_err());
        assert!(parse_complex("NaN").is_err());
    }

    #[test]
    fn test_parse_polynomial() {
        let p = parse_polynomial("1,0,0,-i").unwrap();
        assert_eq!(p.degree(), 3);
        assert_eq!(p.coefficients(), &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, -1.0)][..]);
        assert!(parse_polynomial("5").is_err());
        assert!(parse_polynomial("1,,2").is_err());
    }

    #[test]
    fn test_parse_keyframe() {
        let (frame, p) = parse_keyframe("1,0,-1@60").unwrap();
        assert_eq!(frame, 60);
        assert_eq!(p.degree(), 2);
        assert_eq!(parse_keyframe("1,-1").unwrap().0, 0);
        assert!(parse_keyframe("1,-1@2@3").is_err());
        assert!(parse_keyframe("1,-1@-2").is_err());
        assert!(parse_keyframe("1,-1@").is_err());
    }

    #[test]
    fn test_parse_keyframes() {
        let keys = parse_keyframes(vec!["1,-1", "1,0,1@30"]).unwrap();
        assert_eq!(keys.keys().cloned().collect::<Vec<_>>(), vec![0, 30]);
        match parse_keyframes(vec!["1,-1@4", "1,1@4"]) {
            Err(RenderError::Parse { .. }) => {}
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
