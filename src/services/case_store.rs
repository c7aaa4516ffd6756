//! Case store
//!
//! Loads the ordered case table from `tests.toml`, selects subsets of it, and
//! regenerates tables from downloaded sample fixtures.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    error::{AppError, AppResult},
    models::{CaseRecord, TestCase, TestTable},
};

const TESTS_TOML_TEMPLATE: &str = "\
# tests.toml
# Each case provides stdin and an optional expected answer.
# Cases without an answer are run and reported as unchecked.

[[cases]]
# name = \"01-example\"
# stdin = \"\"\"input...\"\"\"
# answer = \"\"\"output...\"\"\"
";

const GENERATED_HEADER: &str = "# tests.toml (generated from sample files)\n\n";

/// Case store for loading and generating case tables
pub struct CaseStore;

impl CaseStore {
    /// Parse a case table.
    ///
    /// Never returns an empty list: a table without cases is as malformed as
    /// one that does not parse.
    pub fn load(source: &str) -> AppResult<Vec<TestCase>> {
        let table: TestTable = toml::from_str(source)?;

        if table.cases.is_empty() {
            return Err(AppError::MalformedTestTable(
                "the table declares no [[cases]]".to_string(),
            ));
        }

        Ok(table
            .cases
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_case(index))
            .collect())
    }

    /// Read and parse a case table file
    pub async fn load_file(path: &Path) -> AppResult<Vec<TestCase>> {
        let source = match fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::TestTableMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        Self::load(&source).map_err(|e| match e {
            AppError::MalformedTestTable(msg) => {
                AppError::MalformedTestTable(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Keep only the cases whose name starts with the two-digit `index`
    pub fn select(cases: Vec<TestCase>, index: Option<u32>) -> AppResult<Vec<TestCase>> {
        let Some(index) = index else {
            return Ok(cases);
        };

        let selected: Vec<TestCase> = cases
            .into_iter()
            .filter(|case| case.matches_index(index))
            .collect();

        if selected.is_empty() {
            return Err(AppError::NoMatchingCases(index));
        }

        Ok(selected)
    }

    /// Serialize cases back into a table that [`CaseStore::load`] accepts
    pub fn render(cases: &[TestCase]) -> AppResult<String> {
        let table = TestTable {
            cases: cases.iter().map(CaseRecord::from).collect(),
        };
        let body = toml::to_string_pretty(&table)
            .map_err(|e| anyhow::anyhow!("failed to serialize case table: {}", e))?;
        Ok(format!("{}{}", GENERATED_HEADER, body))
    }

    /// Commented table written when no samples are known
    pub fn template() -> &'static str {
        TESTS_TOML_TEMPLATE
    }

    /// Build cases from `*.in` fixtures and their `.ans` (or `.out`) answers
    pub async fn from_samples(dir: &Path) -> AppResult<Vec<TestCase>> {
        let inputs = Self::sample_inputs(dir).await?;
        let mut cases = Vec::with_capacity(inputs.len());

        for input in inputs {
            let name = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stdin = fs::read_to_string(&input).await?;

            let mut answer = None;
            for ext in ["ans", "out"] {
                let candidate = input.with_extension(ext);
                if fs::try_exists(&candidate).await? {
                    answer = Some(fs::read_to_string(&candidate).await?);
                    break;
                }
            }

            cases.push(TestCase {
                name,
                stdin,
                answer,
            });
        }

        Ok(cases)
    }

    /// Sorted `*.in` files directly inside `dir`
    pub async fn sample_inputs(dir: &Path) -> AppResult<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(inputs),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "in") && entry.file_type().await?.is_file()
            {
                inputs.push(path);
            }
        }

        inputs.sort();
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_preserves_order_and_defaults() {
        let cases = CaseStore::load(
            r#"
[[cases]]
name = "01-basic"
stdin = """
3
"""
answer = "9"

[[cases]]
stdin = "5\n"
"#,
        )
        .unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "01-basic");
        assert_eq!(cases[0].stdin, "3\n");
        assert_eq!(cases[0].answer.as_deref(), Some("9"));
        assert_eq!(cases[1].name, "02");
        assert!(cases[1].answer.is_none());
    }

    #[test]
    fn test_template_is_one_unchecked_case() {
        let cases = CaseStore::load(CaseStore::template()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].stdin, "");
        assert!(cases[0].answer.is_none());
    }

    #[test]
    fn test_empty_or_malformed_tables_fail_to_load() {
        for source in [
            "",
            "# only comments\n",
            "cases = []\n",
            "[[cases]\nstdin = 1",
            "[[cases]]\nstdin = 5\n",
            "[[cases]]\nexpected = \"9\"\n",
            "[[tests]]\nstdin = \"1\"\n",
        ] {
            assert!(
                matches!(CaseStore::load(source), Err(AppError::MalformedTestTable(_))),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_select_by_index() {
        let cases = CaseStore::load(
            "[[cases]]\nname = \"01-basic\"\n[[cases]]\nname = \"02-edge\"\n",
        )
        .unwrap();

        let all = CaseStore::select(cases.clone(), None).unwrap();
        assert_eq!(all.len(), 2);

        let selected = CaseStore::select(cases.clone(), Some(2)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "02-edge");

        assert!(matches!(
            CaseStore::select(cases, Some(3)),
            Err(AppError::NoMatchingCases(3))
        ));
    }

    #[test]
    fn test_render_round_trips() {
        let cases = vec![
            TestCase {
                name: "1".to_string(),
                stdin: "4 2\n1 2\n3 \"\"\" 4\n".to_string(),
                answer: Some("2\n0 1\n".to_string()),
            },
            TestCase {
                name: "2".to_string(),
                stdin: String::new(),
                answer: None,
            },
        ];

        let rendered = CaseStore::render(&cases).unwrap();
        assert!(rendered.starts_with("# tests.toml"));
        assert_eq!(CaseStore::load(&rendered).unwrap(), cases);
    }

    #[tokio::test]
    async fn test_from_samples() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2.in"), "5 1\n").unwrap();
        std::fs::write(dir.path().join("2.out"), "7\n").unwrap();
        std::fs::write(dir.path().join("1.in"), "3\n").unwrap();
        std::fs::write(dir.path().join("1.ans"), "9\n").unwrap();
        std::fs::write(dir.path().join("3.in"), "0\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let cases = CaseStore::from_samples(dir.path()).await.unwrap();
        let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["1", "2", "3"]);
        assert_eq!(cases[0].answer.as_deref(), Some("9\n"));
        assert_eq!(cases[1].answer.as_deref(), Some("7\n"));
        assert!(cases[2].answer.is_none());

        let reloaded = CaseStore::load(&CaseStore::render(&cases).unwrap()).unwrap();
        assert_eq!(reloaded, cases);
    }

    #[tokio::test]
    async fn test_load_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = CaseStore::load_file(&dir.path().join("tests.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TestTableMissing(_)));
    }
}
