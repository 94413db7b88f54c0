use kiemdinh_core::error::KiemdinhError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(result: &T) -> Result<(), KiemdinhError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
