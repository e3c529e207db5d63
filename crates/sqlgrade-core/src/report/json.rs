use serde::Serialize;
use std::path::Path;

pub fn write_json<T: Serialize>(value: &T, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(out, s)?;
    Ok(())
}
