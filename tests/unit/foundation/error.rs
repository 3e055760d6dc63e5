use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SlidefigError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(SlidefigError::source("x").to_string().contains("source error:"));
    assert!(SlidefigError::render("x").to_string().contains("render error:"));
    assert!(
        SlidefigError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlidefigError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_errors_convert() {
    fn fails() -> SlidefigResult<()> {
        Err(std::io::Error::other("disk full"))?;
        Ok(())
    }
    assert!(matches!(fails(), Err(SlidefigError::Io(_))));
}
