//! End-to-end tests for the `dvz` binary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dvz_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dvz"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("sales.csv"),
        "region;revenue\nEMEA;1250\nAPAC;980\n",
    )
    .unwrap();
    fs::write(
        files_dir.join("targets.json"),
        r#"{"emea": 1200, "apac": 1000}"#,
    )
    .unwrap();
    fs::write(files_dir.join("memo.docx"), minimal_docx("Hiring plan approved")).unwrap();
    fs::write(files_dir.join("readme.md"), "# not a supported format").unwrap();

    let config_content = r#"[render]
theme = "corporate"
palette = "ocean"

[logging]
format = "compact"
"#;
    let config_path = config_dir.join("dvz.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn minimal_docx(phrase: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            phrase
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn run_dvz(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dvz_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dvz binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_parse_directory_outputs_json() {
    let (tmp, config) = setup_test_env();
    let files = tmp.path().join("files");

    let (stdout, stderr, ok) = run_dvz(
        &config,
        &["parse", files.to_str().unwrap(), "--progress", "off"],
    );
    assert!(ok, "parse failed: {}", stderr);

    let docs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let docs = docs.as_array().unwrap();
    // readme.md is skipped when walking a directory; the rest are sorted by path.
    let names: Vec<&str> = docs.iter().map(|d| d["filename"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["memo.docx", "sales.csv", "targets.json"]);
    assert_eq!(docs[1]["data"][1][0], "EMEA");
    assert_eq!(docs[2]["data"]["emea"], 1200);
}

#[test]
fn test_parse_explicit_unsupported_file_is_reported() {
    let (tmp, config) = setup_test_env();
    let readme = tmp.path().join("files").join("readme.md");
    let out = tmp.path().join("batch.json");

    let (stdout, stderr, ok) = run_dvz(
        &config,
        &[
            "parse",
            readme.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--progress",
            "json",
        ],
    );
    assert!(ok, "parse failed: {}", stderr);
    assert!(stdout.contains("1 failed"));
    assert!(stderr.contains("\"event\""));

    let docs: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(docs[0]["fileType"], "unsupported");
    assert!(docs[0]["error"].is_string());
}

#[test]
fn test_build_writes_presentation() {
    let (tmp, config) = setup_test_env();
    let files = tmp.path().join("files");
    let out = tmp.path().join("deck.html");

    let (stdout, stderr, ok) = run_dvz(
        &config,
        &[
            "build",
            files.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--instructions",
            "regional revenue",
        ],
    );
    assert!(ok, "build failed: {}", stderr);
    assert!(stdout.contains("Wrote"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    // Configured corporate theme and ocean palette.
    assert!(html.contains("#1e3c72"));
    assert!(html.contains("#2C8B8B"));
    assert!(html.contains("Focus: regional revenue"));
    assert!(html.contains("Files Analyzed"));
}

#[test]
fn test_render_from_analysis_json() {
    let (tmp, config) = setup_test_env();
    let analysis = tmp.path().join("analysis.json");
    fs::write(
        &analysis,
        r#"{
            "title": "Board Update",
            "summary": "Strong quarter.",
            "metrics": [{"label": "Revenue", "value": "$2.4M", "trend": "up"}],
            "insights": ["Margins expanded"],
            "recommendations": [{"title": "Raise prices", "description": "Test in EMEA", "priority": "HIGH"}]
        }"#,
    )
    .unwrap();
    let out = tmp.path().join("board.html");

    let (_, stderr, ok) = run_dvz(
        &config,
        &[
            "render",
            analysis.to_str().unwrap(),
            "--theme",
            "dark",
            "--palette",
            "sunset",
            "--features",
            "metrics,recommendations",
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert!(ok, "render failed: {}", stderr);

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("Board Update"));
    assert!(html.contains("#0f2027"));
    assert!(html.contains("#FF6B9D"));
    assert!(html.contains("HIGH PRIORITY"));
    assert!(html.contains("$2.4M"));
}

#[test]
fn test_render_rejects_invalid_json() {
    let (tmp, config) = setup_test_env();
    let analysis = tmp.path().join("broken.json");
    fs::write(&analysis, "{ not json").unwrap();

    let (_, stderr, ok) = run_dvz(&config, &["render", analysis.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("Invalid analysis JSON"));
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[render]\ntheme = \"neon\"\n").unwrap();

    let (_, stderr, ok) = run_dvz(&bad, &["parse", tmp.path().to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("render.theme"));
}

#[test]
fn test_themes_lists_identifiers() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, ok) = run_dvz(&config, &["themes"]);
    assert!(ok);
    for id in ["modern", "dark", "nature", "purple", "midnight", "timeline-vertical"] {
        assert!(stdout.contains(id), "missing {}", id);
    }
}
