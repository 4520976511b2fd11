/*!
 * Tests for scanning: glob filtering, discovery, extraction and dedup
 */

use anyhow::Result;
use std::collections::HashSet;

use crate::common::{create_temp_dir, create_test_file};
use greyparrot::scan::{
    ProjectKind, ScanPattern, TextExtractor, UniqueTextIndex, discover, relative_path,
    scan_project,
};

/// Test the include/exclude property on the canonical three paths
#[test]
fn test_patternMatcher_withTsIncludeAndNodeModulesExclude_shouldFilterPaths() -> Result<()> {
    let matcher = ScanPattern::new(
        vec!["**/*.ts".to_string()],
        vec!["**/node_modules/**".to_string()],
    )
    .compile()?;

    assert!(!matcher.matches("node_modules/x/a.ts"));
    assert!(matcher.matches("src/a.ts"));
    assert!(!matcher.matches("src/a.json"));
    Ok(())
}

/// Test that the flutter preset selects dart sources outside build output
#[test]
fn test_flutterPreset_shouldSelectDartOutsideBuildDirs() -> Result<()> {
    let matcher = ScanPattern::preset(ProjectKind::Flutter).compile()?;

    assert!(matcher.matches("lib/main.dart"));
    assert!(!matcher.matches("build/app/main.dart"));
    assert!(!matcher.matches("test/widget_test.dart"));
    assert!(!matcher.matches("lib/main.js"));
    Ok(())
}

/// Test that discovery is deterministic and never enters excluded trees
#[test]
fn test_discover_withExcludedTrees_shouldBeSortedAndPruned() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "src/b.ts", "")?;
    create_test_file(dir.path(), "src/a.ts", "")?;
    create_test_file(dir.path(), "src/nested/c.vue", "")?;
    create_test_file(dir.path(), "node_modules/pkg/index.ts", "")?;
    create_test_file(dir.path(), "dist/out.js", "")?;
    create_test_file(dir.path(), "README.md", "")?;

    let matcher = ScanPattern::default().compile()?;
    let first: Vec<String> = discover(dir.path(), &matcher)?
        .iter()
        .map(|p| relative_path(dir.path(), p))
        .collect();
    let second: Vec<String> = discover(dir.path(), &matcher)?
        .iter()
        .map(|p| relative_path(dir.path(), p))
        .collect();

    assert_eq!(first, vec!["src/a.ts", "src/b.ts", "src/nested/c.vue"]);
    assert_eq!(first, second);
    Ok(())
}

/// Test that a missing root fails discovery
#[test]
fn test_discover_withMissingRoot_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let matcher = ScanPattern::default().compile()?;

    assert!(discover(&dir.path().join("missing"), &matcher).is_err());
    Ok(())
}

/// Test offset correctness over mixed content
#[test]
fn test_extract_withMixedContent_shouldSliceBackToFullMatch() {
    let content = "<template>\n  <h1>{{ $tt('Title') }}</h1>\n  <p>{{ $tt(\"Count: {n}\", { n: count }) }}</p>\n</template>\n<script>t('ignored'); $tt( 'Spaced')</script>";
    let extractor = TextExtractor::default();
    let matches = extractor.extract(content);

    let texts: Vec<&str> = matches.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Title", "Count: {n}", "Spaced"]);

    for m in &matches {
        assert_eq!(&content[m.start..m.end], m.full_match);
        assert!(m.full_match.contains(&m.text));
    }
    assert_eq!(matches[1].params.as_deref(), Some("{ n: count }"));
    assert_eq!(matches[0].line_number, 2);
    assert_eq!(matches[2].line_number, 5);
    assert_eq!(extractor.extract(content), matches);
}

/// Test dedup invariants across several files
#[tokio::test]
async fn test_scanProject_withRepeatedTexts_shouldCollapseAndCountLocations() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "a.ts", "$tt('Save')\n$tt('Cancel')\n$tt('Save')")?;
    create_test_file(dir.path(), "b.vue", "{{ $tt('Cancel') }} {{ $tt('Close') }}")?;
    create_test_file(dir.path(), "c.ts", "const nothing = 1;")?;

    let matcher = ScanPattern::default().compile()?;
    let result = scan_project(dir.path(), &matcher, &TextExtractor::default()).await?;

    let distinct: HashSet<&str> = result
        .files
        .iter()
        .flat_map(|f| f.matches.iter().map(|m| m.text.as_str()))
        .collect();

    assert_eq!(result.scanned_files, 3);
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.index.len(), distinct.len());
    assert_eq!(result.index.total_locations(), result.total_matches());
    assert_eq!(result.index.texts(), &["Save", "Cancel", "Close"]);

    let duplicates: Vec<&str> = result.index.duplicates().iter().map(|(t, _)| *t).collect();
    assert_eq!(duplicates, vec!["Save", "Cancel"]);
    Ok(())
}

/// Test that building the index twice from the same files gives the same order
#[test]
fn test_uniqueTextIndex_withSameInput_shouldBeReproducible() {
    let extractor = TextExtractor::default();
    let mut first = UniqueTextIndex::new();
    let mut second = UniqueTextIndex::new();

    for index in [&mut first, &mut second] {
        index.record("x.ts", &extractor.extract("$tt('B') $tt('A')"));
        index.record("y.ts", &extractor.extract("$tt('A') $tt('C')"));
    }

    assert_eq!(first.texts(), second.texts());
    assert_eq!(first.texts(), &["B", "A", "C"]);
    assert_eq!(first.locations("A").len(), 2);
}

/// Test that a tree with no marker calls yields an empty but successful scan
#[test]
fn test_scanProject_withNoMarkers_shouldReturnEmptyIndex() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "src/plain.ts", "export const x = t('not marked');")?;

    let result = tokio_test::block_on(async {
        let matcher = ScanPattern::default().compile()?;
        scan_project(dir.path(), &matcher, &TextExtractor::default()).await
    })?;

    assert_eq!(result.scanned_files, 1);
    assert!(result.files.is_empty());
    assert!(result.index.is_empty());
    Ok(())
}
