/// Render an error and all of its sources on one line,
/// `outer: inner: innermost`.
pub fn display_chain(mut err: &dyn std::error::Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }

    fmt
}

#[cfg(test)]
mod tests {
    use std::io;

    use anyhow::Context;

    use super::*;

    #[test]
    fn chain_includes_every_source() {
        let err = Err::<(), _>(io::Error::other("permission denied"))
            .context("Could not read /etc/multiverse/multiverse.toml")
            .context("Could not parse config")
            .unwrap_err();
        assert_eq!(
            display_chain(&*err),
            "Could not parse config: Could not read /etc/multiverse/multiverse.toml: permission denied"
        );
    }
}
