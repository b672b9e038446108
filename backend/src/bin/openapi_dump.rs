//! Print the OpenAPI document as pretty JSON for external tooling.

use std::io::{self, Write};

use color_eyre::eyre::{Context, Result};
use fieldcrew::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("failed to serialise the OpenAPI document")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{document}").wrap_err("failed to write the OpenAPI document")?;
    Ok(())
}
