/// Compare a desired attribute against the live one.
///
/// An unset desired value matches anything, so attributes the caller did not
/// declare never trigger an update.
pub fn equal<T: PartialEq>(desired: Option<T>, actual: Option<T>) -> bool {
    match desired {
        None => true,
        Some(desired) => actual.is_some_and(|actual| actual == desired),
    }
}
