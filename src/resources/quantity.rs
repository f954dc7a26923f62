// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes resource quantity helpers

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const BINARY_SUFFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SUFFIXES: [&str; 9] = ["n", "u", "m", "k", "M", "G", "T", "P", "E"];

/// Render a byte count in binary-SI form, using the largest suffix that
/// divides it exactly (`1073741824` is `1Gi`, `1500` stays `1500`).
pub fn binary_si(bytes: i64) -> Quantity {
    let mut value = bytes;
    let mut suffix = "";

    if value != 0 {
        for candidate in BINARY_SUFFIXES {
            if value % 1024 != 0 {
                break;
            }
            value /= 1024;
            suffix = candidate;
        }
    }

    Quantity(format!("{}{}", value, suffix))
}

/// Check a string against the Kubernetes quantity grammar:
/// `[+-]number[suffix]` where suffix is a binary or decimal SI suffix or a
/// decimal exponent such as `e3`.
pub fn is_valid_quantity(input: &str) -> bool {
    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);

    let number_len = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);

    is_valid_number(number) && is_valid_suffix(suffix)
}

fn is_valid_number(number: &str) -> bool {
    let mut parts = number.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    if fraction.is_some_and(|f| f.contains('.')) {
        return false;
    }

    match fraction {
        Some(fraction) => !(whole.is_empty() && fraction.is_empty()),
        None => !whole.is_empty(),
    }
}

fn is_valid_suffix(suffix: &str) -> bool {
    if suffix.is_empty() || BINARY_SUFFIXES.contains(&suffix) || DECIMAL_SUFFIXES.contains(&suffix)
    {
        return true;
    }

    let Some(exponent) = suffix.strip_prefix(['e', 'E']) else {
        return false;
    };
    let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
