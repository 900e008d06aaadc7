use kdl::KdlDocument;
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use std::path::Path;
use tg_entities_html::{ErrorPolicy, RendererConfig};

/// Reads renderer settings from a KDL file:
///
/// ```kdl
/// fix-inaccuracies true
/// throw-errors false
/// ```
///
/// Missing nodes keep their defaults.
pub fn load(path: &Path) -> Result<RendererConfig> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    parse(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
}

pub fn parse(content: &str) -> Result<RendererConfig> {
    let doc: KdlDocument = content.parse().into_diagnostic()?;
    Ok(apply_overrides(
        RendererConfig::default(),
        flag(&doc, "fix-inaccuracies")?,
        flag(&doc, "throw-errors")?,
    ))
}

/// Layers explicitly given settings over `config`; `None` keeps what is there.
pub fn apply_overrides(
    mut config: RendererConfig,
    fix_inaccuracies: Option<bool>,
    throw_errors: Option<bool>,
) -> RendererConfig {
    if let Some(fix) = fix_inaccuracies {
        config.fix_inaccuracies = fix;
    }
    if let Some(throw) = throw_errors {
        config.on_error = if throw {
            ErrorPolicy::Propagate
        } else {
            ErrorPolicy::Suppress
        };
    }
    config
}

fn flag(doc: &KdlDocument, name: &str) -> Result<Option<bool>> {
    let Some(node) = doc.get(name) else {
        return Ok(None);
    };
    node.entries()
        .first()
        .and_then(|entry| entry.value().as_bool())
        .map(Some)
        .ok_or_else(|| miette!("`{name}` expects a boolean, e.g. `{name} true`"))
}
