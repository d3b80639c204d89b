/// Returns the version of the calling crate as an `Option<Cow<'static, str>>`.
///
/// This can be used with `SinkOptions` to set the code version reported in
/// the server context. It uses the information supplied by cargo.
///
/// # Examples
///
/// ```
/// let options = rollbar_core::SinkOptions {
///     code_version: rollbar_core::code_version!(),
///     ..rollbar_core::SinkOptions::new("token")
/// };
/// assert!(options.code_version.is_some());
/// ```
#[macro_export]
macro_rules! code_version {
    () => {
        ::std::option_env!("CARGO_PKG_VERSION").map(::std::borrow::Cow::Borrowed)
    };
}

/// Prints a diagnostic line to stderr if the first argument is `true`.
#[macro_export]
#[doc(hidden)]
macro_rules! rollbar_debug {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            eprint!("[rollbar] ");
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn code_version_comes_from_cargo() {
        assert_eq!(code_version!().as_deref(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn debug_output_is_gated() {
        let mut evaluated = false;
        rollbar_debug!(false, "{}", {
            evaluated = true;
            "never"
        });
        assert!(!evaluated);
    }
}
