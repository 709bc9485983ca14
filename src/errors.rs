use std::error::Error;
use std::fmt::{Debug, Display};

/// A failure below the API layer: a malformed url, an unsendable header, a
/// dropped connection. The executor turns these into [`ApiError`](crate::ApiError)s
/// before they reach a caller.
#[derive(Clone)]
pub struct InstituteError {
    trace: String,
    message: String,
    underlying_error: Option<String>,
}

impl InstituteError {
    pub(crate) fn new(trace: String, message: String, underlying: Option<String>) -> Self {
        Self {
            trace,
            message,
            underlying_error: underlying,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn underlying_error(&self) -> Option<&str> {
        self.underlying_error.as_deref()
    }
}

impl Error for InstituteError {}

impl Display for InstituteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error_name = self.underlying_error.as_deref().unwrap_or("InstituteError");
        write!(f, "[{}] ({}): {}", error_name, self.trace, self.message)
    }
}

impl Debug for InstituteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

macro_rules! this_errors {
    ($msg:literal, $val:expr) => {
        $val.map_err(|e| $crate::error!($msg, e))?
    };
}

macro_rules! error {
    ($val:literal) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let fun_name = &name[..name.len() - 3];
        $crate::errors::InstituteError::new(fun_name.into(), $val.into(), None)
    }};
    ($err:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let err = $err;
        let name = type_name_of(f);
        let error_type_name = type_name_of(&err);
        let fun_name = &name[..name.len() - 3];
        let error_name = error_type_name.split("::").last().map(|x| x.to_string());
        let error_msg = format!("{}", err);

        $crate::errors::InstituteError::new(fun_name.into(), error_msg, error_name)
    }};
    ($val:literal, $err:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let err = $err;
        let name = type_name_of(f);
        let error_type_name = type_name_of(&err);
        let fun_name = &name[..name.len() - 3];
        let error_name = error_type_name.split("::").last().map(|x| x.to_string());
        let final_msg = format!("{} - {}", $val, err);
        $crate::errors::InstituteError::new(fun_name.into(), final_msg, error_name)
    }};
}

pub(crate) use error;
pub(crate) use this_errors;

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> Result<(), InstituteError> {
        this_errors!("could not parse port", "abc".parse::<u16>());
        Ok(())
    }

    #[test]
    fn this_errors_captures_context_and_underlying_type() {
        let err = fails().unwrap_err();

        assert!(err.message().starts_with("could not parse port - "));
        assert_eq!(err.underlying_error(), Some("ParseIntError"));
        assert!(err.trace().contains("fails"));
    }

    #[test]
    fn literal_error_has_no_underlying_type() {
        let err = error!("no base url configured");

        assert_eq!(err.message(), "no base url configured");
        assert!(err.underlying_error().is_none());
        assert!(err.to_string().starts_with("[InstituteError]"));
    }
}
