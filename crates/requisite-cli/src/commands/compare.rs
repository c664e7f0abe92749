//! Compare command implementation

use std::cmp::Ordering;

use requisite_core::Version;

use crate::error::Result;

/// Run the compare command, returning the printed relation.
pub fn run_compare(a: &str, b: &str) -> Result<Ordering> {
    let left = Version::parse(a)?;
    let right = Version::parse(b)?;
    let ordering = left.cmp(&right);

    let symbol = match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    println!("{left} {symbol} {right}");
    Ok(ordering)
}
