use std::{collections::HashMap, fs, io::Cursor, path::Path};

use anyhow::{Context, Result};

pub type EnvMap = HashMap<String, String>;

pub fn load_env_file(path: &Path, env: &mut EnvMap) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading env file {}", path.display()))?;
    let iter = dotenvy::from_read_iter(Cursor::new(content));

    for item in iter {
        let (key, value) = item.with_context(|| format!("parsing env file {}", path.display()))?;
        env.insert(key, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn load_env_file_merges_values() -> Result<()> {
        let temp = tempdir()?;
        let env_path = temp.path().join("deck.env");
        fs::write(&env_path, "SEARCHDECK_API_KEY=secret\n# comment\nOTHER=x\n")?;

        let mut env_map = EnvMap::new();
        env_map.insert("OTHER".to_string(), "old".to_string());
        load_env_file(&env_path, &mut env_map)?;

        assert_eq!(env_map.get("SEARCHDECK_API_KEY"), Some(&"secret".to_string()));
        assert_eq!(env_map.get("OTHER"), Some(&"x".to_string()));
        Ok(())
    }

    #[test]
    fn load_env_file_propagates_io_errors() {
        let mut env_map = EnvMap::new();
        let path = PathBuf::from("does-not-exist.env");
        let err = load_env_file(&path, &mut env_map).unwrap_err();
        assert!(err.to_string().contains("reading env file"));
    }
}
