//! Helpers for error handling.

use std::error::Error;

/// `error` followed by its sources, outermost first.
pub fn chain<'a>(
    error: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(error), |&error| error.source())
}

/// Format an error, including its chain of sources.
///
/// Always use this when logging or reporting an error; `Display` alone hides the cause.
/// The output matches `anyhow`'s `{:#}`.
pub fn format_ref(error: &(dyn Error + 'static)) -> String {
    chain(error)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_context_chain() {
        let err = anyhow::format_err!("no such file")
            .context("reading crimes.csv")
            .context("failed to load the dataset timestamps");

        assert_eq!(err.to_string(), "failed to load the dataset timestamps");
        assert_eq!(
            format_ref(&*err),
            "failed to load the dataset timestamps: reading crimes.csv: no such file"
        );
        assert_eq!(chain(&*err).count(), 3);
    }

    #[test]
    fn thiserror_source() {
        #[derive(thiserror::Error, Debug)]
        #[error("failed to load timestamps")]
        struct LoadError(#[source] std::io::Error);

        let err = LoadError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert_eq!(format_ref(&err), "failed to load timestamps: no such file");

        let messages: Vec<String> = chain(&err).map(ToString::to_string).collect();
        assert_eq!(messages, ["failed to load timestamps", "no such file"]);
    }
}
