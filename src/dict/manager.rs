use crate::checker::dictionary::Dictionary;
use anyhow::{bail, Context, Result};
use colored::*;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    // en, en_US, de-CH, zh-Hant-TW
    static ref LANGUAGE_CODE: Regex = Regex::new(r"^[A-Za-z]{2,3}([_-][A-Za-z0-9]{2,8})*$").unwrap();
}

pub fn is_language_code(language: &str) -> bool {
    LANGUAGE_CODE.is_match(language)
}

pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

/// Installed `.dict` files of `data_dir`, sorted by language.
pub fn installed(data_dir: &Path) -> Result<Vec<DictionaryInfo>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let size_bytes = fs::metadata(&path)?.len();
        let word_count = Dictionary::load_from_path(&path).map_or(0, |dict| dict.len());
        found.push(DictionaryInfo {
            language,
            path,
            word_count,
            size_bytes,
        });
    }
    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

pub fn list_dictionaries(data_dir: &Path) -> Result<()> {
    let dictionaries = installed(data_dir)?;

    if dictionaries.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to build one from a word list.",
            "flowspell dict build <language> <wordlist>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for dict in &dictionaries {
        println!(
            "  {} {} {} ({})",
            "✓".green(),
            dict.language.cyan().bold(),
            format!("{} words", dict.word_count),
            format!("{}KB", dict.size_bytes / 1024).dimmed()
        );
    }

    println!();
    println!("Data directory: {}", data_dir.display().to_string().dimmed());

    Ok(())
}

/// Build `<language>.dict` in `data_dir` from a one-word-per-line list.
pub fn build_dictionary(language: &str, wordlist: &Path, data_dir: &Path) -> Result<PathBuf> {
    if !is_language_code(language) {
        bail!("Invalid language code: {}", language);
    }
    let content = fs::read_to_string(wordlist)
        .with_context(|| format!("Failed to read word list: {}", wordlist.display()))?;

    let words: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let dict_path = Dictionary::path_in(data_dir, language);
    let count = Dictionary::build_from_words(&words, &dict_path)?;
    info!("built {} with {} words", dict_path.display(), count);

    println!(
        "{} Dictionary installed: {} ({} words)",
        "✓".green().bold(),
        dict_path.display().to_string().cyan(),
        count
    );

    Ok(dict_path)
}

pub fn show_info(language: &str, data_dir: &Path) -> Result<()> {
    let dict_path = Dictionary::path_in(data_dir, language);

    println!("{}", format!("Dictionary: {}", language).bold());
    println!();

    if !dict_path.exists() {
        println!("  Status: {}", "Not installed".red());
        println!("  Checks fall back to the bundled word list.");
        return Ok(());
    }

    let dictionary = Dictionary::load_from_path(&dict_path)?;
    let size = fs::metadata(&dict_path)?.len();

    println!("  Status: {}", "Installed".green());
    println!("  Path: {}", dict_path.display());
    println!("  Words: {}", dictionary.len());
    println!("  Size: {}KB", size / 1024);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_then_list() {
        let dir = tempdir().unwrap();
        let wordlist = dir.path().join("words.txt");
        fs::write(&wordlist, "# comment\nalpha\nBeta\n\nalpha\n").unwrap();
        let data_dir = dir.path().join("data");

        let path = build_dictionary("xx_XX", &wordlist, &data_dir).unwrap();
        assert!(path.ends_with("xx_XX.dict"));

        let found = installed(&data_dir).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].language, "xx_XX");
        assert_eq!(found[0].word_count, 2);
    }

    #[test]
    fn test_language_codes() {
        assert!(is_language_code("en"));
        assert!(is_language_code("en_US"));
        assert!(is_language_code("zh-Hant-TW"));
        assert!(!is_language_code("../etc/passwd"));
        assert!(!is_language_code("en US"));

        let dir = tempdir().unwrap();
        let wordlist = dir.path().join("words.txt");
        fs::write(&wordlist, "alpha\n").unwrap();
        assert!(build_dictionary("../escape", &wordlist, dir.path()).is_err());
    }

    #[test]
    fn test_missing_data_dir_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(installed(&dir.path().join("absent")).unwrap().is_empty());
    }
}
