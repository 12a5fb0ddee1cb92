// validate.rs — `pipe validate`: report definition errors per resource.

use std::path::{Path, PathBuf};

use pipe_resources::{load_resources_file, validate_resource, ValidationReport};

/// Load every resource in `path` and validate each one.
pub fn validate_file(path: &Path) -> anyhow::Result<Vec<(String, ValidationReport)>> {
    let resources = load_resources_file(path)?;
    Ok(resources
        .iter()
        .map(|r| (r.key(), validate_resource(r)))
        .collect())
}

pub fn execute(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut invalid = 0usize;
    let mut total = 0usize;

    for file in files {
        println!("{}:", file.display());
        let results = match validate_file(file) {
            Ok(results) => results,
            Err(e) => {
                println!("  error: {:#}", e);
                invalid += 1;
                continue;
            }
        };
        for (key, report) in results {
            total += 1;
            if report.is_valid() {
                println!("  {}  ok", key);
                continue;
            }
            invalid += 1;
            println!("  {}  INVALID", key);
            for error in &report.errors {
                println!("    - {}", error);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} resource(s) failed validation", invalid, total.max(invalid));
    }
    println!("{} resource(s) valid", total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_resource_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.yaml");
        std::fs::write(
            &path,
            "apiVersion: pipe/v1\nkind: Tool\nmetadata: { name: search, namespace: d, version: '1' }\nspec: { type: http }\n---\n\
             apiVersion: pipe/v1\nkind: Guardrail\nmetadata: { name: g, namespace: d, version: '1' }\nspec: { type: token-limit, phase: pre }\n",
        )
        .unwrap();

        let results = validate_file(&path).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Tool/d/search");
        assert!(results[0].1.is_valid());
        assert!(results[1].1.has_error_on("spec.action"));

        assert!(execute(&[path]).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(validate_file(Path::new("/nonexistent/defs.yaml")).is_err());
    }
}
