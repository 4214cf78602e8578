use serde::Serialize;

/// Print a value as pretty JSON to stdout; `None` prints `null`
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
